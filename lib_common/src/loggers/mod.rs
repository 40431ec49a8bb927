//! # Logging Module
//!
//! This module provides the observability layer of the project.
//!
//! ## Purpose:
//! Every fetch attempt, retry, export outcome and validation failure in the
//! rest of the crate is announced through a leveled message channel. The
//! channel is a capability (`LogSink`) rather than a concrete console, so
//! cores can be exercised under test with an in-memory sink and embedded
//! behind whatever presentation a host program prefers.
//!
//! ## Contained Modules:
//!
//! - **`sink`**: The `Level` enum, the `LogSink` capability trait with one
//!   required `record(level, message)` operation, and `CaptureSink`, an
//!   in-memory implementation for tests and embedding.
//!
//! - **`loggerlocal`**: `LoggerLocal`, the local implementation writing
//!   colored output to the TTY and optionally appending to a rotated log
//!   file.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Local console/file logger implementing the `LogSink` capability.
pub mod loggerlocal;
/// Leveled message channel capability and in-memory capture sink.
pub mod sink;
