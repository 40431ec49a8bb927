//! # HoYoLAB APIs Module
//!
//! This module groups together the logic for querying the HoYoLAB-family
//! game-account APIs and for shaping their payloads into typed records.
//!
//! ## Contained Modules:
//!
//! - **`endpoints`**: Credentials, the endpoint catalogue (profile, wish
//!   history, game record, daily reward) and the authenticated header set
//!   attached to every request.
//!
//! - **`aggregator`**: Fans the retrying fetcher out over the endpoint
//!   catalogue, joins the results into one record with a slot per endpoint
//!   whether it succeeded or not, and reports the success rate.
//!
//! - **`models`**: Strict `serde` models for wishes, characters and the
//!   user profile, plus the extraction helpers that validate raw payloads
//!   into them.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Multi-endpoint aggregation over the retrying fetcher.
pub mod aggregator;
/// Credentials, endpoint catalogue and request headers.
pub mod endpoints;
/// Typed payload models and extraction from aggregated records.
pub mod models;
