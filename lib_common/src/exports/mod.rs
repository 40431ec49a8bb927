//! # Export Module
//!
//! Serialization of the run's results into flat files.
//!
//! ## Purpose:
//! Characters, wishes and the user report are written as JSON and CSV
//! pairs. Each individual write is isolated: its failure is announced
//! through the message channel and never aborts sibling exports or the
//! run. A half-exported run is still a useful run.
//!
//! ## Contained Modules:
//!
//! - **`files`**: The low-level `export_json` / `export_csv` writers and
//!   their error type.
//!
//! - **`report`**: Row shaping for the character and wish tables, the
//!   fixed-shape user report, and the isolated save orchestrations.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Low-level JSON and CSV file writers.
pub mod files;
/// Row shaping, the user report, and save orchestrations.
pub mod report;
