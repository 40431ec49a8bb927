// Declare the feature-gated modules
#[cfg(feature = "analytics")]
pub mod analytics;
#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "exports")]
pub mod exports;
#[cfg(feature = "hoyo")]
pub mod hoyo;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "utils")]
pub mod utils;

// Re-export the most commonly wired types
#[cfg(feature = "loggers")]
pub use loggers::sink::{Level, LogSink};
#[cfg(feature = "retrieve")]
pub use retrieve::fetcher::{FetchFailure, FetchOutcome, Fetcher, RetryPolicy};
