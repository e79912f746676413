//! # Agile Tracker - half-hourly electricity price engine
//!
//! Tracks the half-hourly unit rates published by a time-of-use tariff and
//! answers two questions: what does electricity cost right now, and when is
//! the cheapest contiguous block to run an appliance.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration with validation and JSON schema
//! - `logging`: Structured logging and tracing
//! - `cache`: Disk-backed JSON cache with atomic writes and expiry sweeps
//! - `staleness`: Daily publish-time staleness rule
//! - `rates`: Slot series, normalization, current-slot lookup and window search
//! - `fetch`: Provider fetch seam and the Octopus HTTP client
//! - `repository`: Cache-backed rate access
//! - `countdown`: Ticking countdown to a window start
//! - `schedule`: Refresh timing helpers

pub mod cache;
pub mod config;
pub mod countdown;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod rates;
pub mod repository;
pub mod schedule;
pub mod staleness;

pub use config::Config;
pub use error::{FetchError, Result, TrackerError};
