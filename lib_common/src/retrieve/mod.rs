//! # Data Retrieval Module
//!
//! This module provides a centralized location for generic data retrieval
//! clients and utilities, primarily focused on HTTP-based interactions.
//!
//! ## Purpose:
//! The goal of the `retrieve` module is to offer a consistent and robust way
//! to fetch data from external services, encapsulating common concerns such
//! as HTTP request building, error handling, and retry mechanisms. This
//! prevents duplication of networking logic across API clients.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic HTTP transport built on `reqwest` and
//!   `reqwest-middleware`, exposed behind the object-safe `HttpTransport`
//!   capability so alternative transports (e.g. an authenticated
//!   third-party client) can back the same contract.
//!
//! - **`backoff`**: A pure generator for the geometric delay sequence
//!   inserted between retry attempts.
//!
//! - **`fetcher`**: The retrying fetch primitive. It owns the attempt
//!   budget, consumes the backoff sequence, and resolves every call into a
//!   typed success-or-terminal-failure value; failures never cross this
//!   boundary as panics or raw errors.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Pure geometric backoff sequence generator.
pub mod backoff;
/// Retrying fetch primitive returning typed outcomes.
pub mod fetcher;
/// Generic HTTP transport with attempt reporting.
pub mod ky_http;
