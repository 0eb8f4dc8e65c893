//! Error types for the HubSpot connector
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the HubSpot connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authorization failed (HTTP {status}): {body}")]
    Authorization { status: u16, body: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Client { status: u16, body: String },

    #[error("Request failed after {attempts} attempts: {message}")]
    RequestFailed {
        attempts: u32,
        last_status: Option<u16>,
        message: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response Envelope Errors
    // ============================================================================
    #[error("Malformed response: field '{field}': {message}")]
    MalformedResponse { field: String, message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an authorization error
    pub fn authorization(status: u16, body: impl Into<String>) -> Self {
        Self::Authorization {
            status,
            body: body.into(),
        }
    }

    /// Create a client error for a non-retryable HTTP status
    pub fn client(status: u16, body: impl Into<String>) -> Self {
        Self::Client {
            status,
            body: body.into(),
        }
    }

    /// Create a request-failed error after retries are exhausted
    pub fn request_failed(
        attempts: u32,
        last_status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::RequestFailed {
            attempts,
            last_status,
            message: message.into(),
        }
    }

    /// Create a malformed response error naming the offending field
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a token refresh error
    pub fn token_refresh(message: impl Into<String>) -> Self {
        Self::TokenRefresh {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Client { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
///
/// Server errors are retried; authorization failures and other client
/// errors are not.
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 500..=599)
}

/// Result type alias for the HubSpot connector
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("apiKey");
        assert_eq!(err.to_string(), "Missing required config field: apiKey");

        let err = Error::client(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::authorization(403, "Forbidden");
        assert_eq!(err.to_string(), "Authorization failed (HTTP 403): Forbidden");

        let err = Error::malformed("lists", "expected an array");
        assert_eq!(
            err.to_string(),
            "Malformed response: field 'lists': expected an array"
        );
    }

    #[test]
    fn test_request_failed_display() {
        let err = Error::request_failed(3, Some(500), "HTTP 500: upstream down");
        assert_eq!(
            err.to_string(),
            "Request failed after 3 attempts: HTTP 500: upstream down"
        );
        match err {
            Error::RequestFailed { last_status, .. } => assert_eq!(last_status, Some(500)),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::client(500, "").is_retryable());
        assert!(Error::client(502, "").is_retryable());
        assert!(Error::client(503, "").is_retryable());

        assert!(!Error::client(400, "").is_retryable());
        assert!(!Error::client(404, "").is_retryable());
        assert!(!Error::client(429, "").is_retryable());
        assert!(!Error::authorization(403, "").is_retryable());
        assert!(!Error::config("test").is_retryable());
        assert!(!Error::request_failed(3, Some(500), "exhausted").is_retryable());
    }

    #[test]
    fn test_retryable_status_range() {
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(599));
        assert!(!is_retryable_status(499));
        assert!(!is_retryable_status(403));
    }
}
