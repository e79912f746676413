//! Rates provider integration
//!
//! The repository only sees the [`RateFetcher`] trait; the HTTP client for
//! Octopus Energy lives behind the `octopus` feature.

#[cfg(feature = "octopus")]
pub mod octopus;

#[cfg(feature = "octopus")]
pub use octopus::OctopusClient;

use crate::error::FetchError;

/// Source of raw rate records.
///
/// Each record exposes `valid_from`, `valid_to` (RFC 3339) and
/// `value_inc_vat` (minor currency units). One call is one attempt.
#[async_trait::async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_rates(&self) -> Result<Vec<serde_json::Value>, FetchError>;
}

/// Pull the `results` array out of a provider response body
pub fn extract_results(body: serde_json::Value) -> Result<Vec<serde_json::Value>, FetchError> {
    match body {
        serde_json::Value::Object(mut map) => match map.remove("results") {
            Some(serde_json::Value::Array(records)) => Ok(records),
            Some(_) => Err(FetchError::malformed("`results` is not an array")),
            None => Err(FetchError::malformed("response has no `results` field")),
        },
        _ => Err(FetchError::malformed("response body is not a JSON object")),
    }
}
