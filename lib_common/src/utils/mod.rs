//! # Utilities Module
//!
//! This module serves as a collection point for general-purpose helper
//! functions that are widely applicable across the `lib_common` crate and
//! the broader `wishtrack` project.
//!
//! ## Contained Modules:
//!
//! - **`misc`**: Miscellaneous functions for timestamp and duration
//!   formatting used by the loggers and the CLI.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Miscellaneous utility functions for time and duration formatting.
pub mod misc;
