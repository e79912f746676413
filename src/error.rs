//! Error types and handling for Agile Tracker
//!
//! This module defines the error types used throughout the crate. Transport
//! failures from the rates provider get their own [`FetchError`] so callers can
//! tell them apart from local configuration or I/O problems.

use thiserror::Error;

/// Result type alias for Agile Tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Main error type for Agile Tracker
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Rates provider failures
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

/// Failure to obtain rates from the provider.
///
/// Never cached and never retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connect, timeout, TLS)
    #[error("network failure: {message}")]
    Network { message: String },

    /// Provider answered with a non-success HTTP status
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// Response body was not the expected shape
    #[error("malformed response: {message}")]
    Malformed { message: String },
}

impl TrackerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }
}

impl FetchError {
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub const fn status(status: u16) -> Self {
        Self::Status { status }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for TrackerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for TrackerError {
    fn from(err: chrono::ParseError) -> Self {
        Self::validation("datetime", err.to_string())
    }
}

#[cfg(feature = "octopus")]
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::status(status.as_u16());
        }
        if err.is_decode() {
            return Self::malformed(err.to_string());
        }
        Self::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TrackerError::config("test config error");
        assert!(matches!(err, TrackerError::Config { .. }));

        let err = TrackerError::validation("field", "test validation error");
        assert!(matches!(err, TrackerError::Validation { .. }));

        let err: TrackerError = FetchError::status(503).into();
        assert!(matches!(
            err,
            TrackerError::Fetch(FetchError::Status { status: 503 })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = TrackerError::config("test error");
        assert_eq!(format!("{}", err), "Configuration error: test error");

        let err = TrackerError::validation("test_field", "invalid value");
        assert_eq!(
            format!("{}", err),
            "Validation error: test_field - invalid value"
        );

        let err = TrackerError::from(FetchError::network("connection refused"));
        assert_eq!(
            format!("{}", err),
            "Fetch error: network failure: connection refused"
        );
    }
}
