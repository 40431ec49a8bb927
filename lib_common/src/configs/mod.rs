//! # Configuration Module
//!
//! Runtime configuration loading for the wishtrack programs.
//!
//! ## Purpose:
//! Retry counts, backoff delays, truncation limits and output locations are
//! explicit configuration handed to the components at construction time;
//! there is no process-wide mutable state. The configuration file is plain
//! JSON, discovered from an explicit path, the `WISHTRACK_CONFIG`
//! environment variable, or the platform configuration directory, in that
//! order. Every value has a default, so the file is optional.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Application configuration structure, defaults and loading.
pub mod config_app;
