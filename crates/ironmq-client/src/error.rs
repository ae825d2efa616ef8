//! Error types for IronMQ operations.

use thiserror::Error;

/// Error type for all queue operations
#[derive(Debug, Error)]
pub enum MqError {
    #[error("Reservation timeout {value}s is out of range ({min}-{max}s)")]
    TimeoutOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Long-poll wait {value}s is out of range ({min}-{max}s)")]
    WaitOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IronMQ API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Response decoding failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl MqError {
    /// Check if error is transient and a caller-side retry may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TimeoutOutOfRange { .. } => false,
            Self::WaitOutOfRange { .. } => false,
            Self::Cancelled => false,
            Self::Transport(e) => e.is_transient(),
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Encode(_) => false,
            Self::Decode(_) => false,
            Self::Configuration(_) => false,
            Self::Validation(_) => false,
        }
    }

    /// Check if the error was raised before any request left the client
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::TimeoutOutOfRange { .. }
                | Self::WaitOutOfRange { .. }
                | Self::Encode(_)
                | Self::Configuration(_)
                | Self::Validation(_)
        )
    }
}

/// Failures of the underlying HTTP exchange
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timed out")]
    Timeout {
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    /// Check if the exchange may succeed when attempted again
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Timeout { .. } => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
        }
    }

    /// Classify a reqwest failure
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { source: Some(err) }
        } else if err.is_connect() {
            Self::Connection {
                message: err.to_string(),
                source: Some(err),
            }
        } else {
            Self::Http(err)
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },
}

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
