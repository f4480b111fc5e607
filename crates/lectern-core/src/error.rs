//! Error types for Lectern operations.
//!
//! A single `Error` enum and `Result<T>` alias shared by every Lectern crate.
//! "No results" is never an error; it is [`SearchOutcome::NoResults`].
//!
//! [`SearchOutcome::NoResults`]: crate::SearchOutcome::NoResults

use std::time::Duration;

use thiserror::Error;

use crate::types::EndpointId;

/// Errors that can occur in Lectern operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied something unusable (empty query, unknown endpoint id).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network-level failure talking to an endpoint.
    #[error("Transport error: {message}")]
    Transport {
        /// What was being attempted.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The endpoint answered with a body we could not decode.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A single endpoint call exceeded its time budget.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// No executor is registered for the endpoint.
    #[error("No executor registered for endpoint {0}")]
    NotRegistered(EndpointId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a transport error without an underlying cause.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a transport error wrapping its cause.
    pub fn transport_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable short code, used when an error is folded into a search outcome.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Transport { .. } => "transport",
            Self::HttpStatus { .. } => "http_status",
            Self::Decode(_) => "decode",
            Self::Timeout(_) => "timeout",
            Self::NotRegistered(_) => "not_registered",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// Whether this error should be surfaced to the caller rather than
    /// absorbed by fallback handling.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias using Lectern's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(Error::invalid_input("x").code(), "invalid_input");
        assert_eq!(Error::transport("x").code(), "transport");
        assert_eq!(Error::decode("x").code(), "decode");
        assert_eq!(Error::Timeout(Duration::from_secs(1)).code(), "timeout");
        assert_eq!(
            Error::HttpStatus {
                status: 503,
                body: String::new()
            }
            .code(),
            "http_status"
        );
        assert_eq!(Error::NotRegistered(EndpointId::Archive).code(), "not_registered");
    }

    #[test]
    fn test_error_display() {
        let err = Error::HttpStatus {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert_eq!(
            Error::NotRegistered(EndpointId::MultiType).to_string(),
            "No executor registered for endpoint multi-type"
        );
    }

    #[test]
    fn test_transport_with_source_keeps_cause() {
        let io = std::io::Error::other("connection reset");
        let err = Error::transport_with_source("GET failed", io);
        let source = std::error::Error::source(&err);
        assert!(source.is_some());
        assert!(err.to_string().contains("GET failed"));
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(Error::invalid_input("empty").is_invalid_input());
        assert!(!Error::transport("down").is_invalid_input());
    }
}
