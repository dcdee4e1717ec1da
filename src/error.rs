//! Error types for the Schwab API client.
//!
//! Every fallible operation in this crate returns [`Result`]. The variants
//! separate authentication problems, payloads that do not match the
//! expected model, and transport failures.

use serde_json::Value;
use thiserror::Error;

/// A specialized `Result` type for Schwab operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all Schwab API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed outside of response decoding
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A response payload did not match the expected model
    #[error("Invalid {model} payload: {message}")]
    Validation {
        /// Name of the model being decoded
        model: &'static str,
        /// What was wrong with the payload
        message: String,
    },

    /// API returned a non-success status
    #[error("API error: status={status}, message={message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable error message
        message: String,
        /// Raw response body for debugging
        body: Value,
    },

    /// Authentication failed (missing or expired tokens, rejected grant)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limited by the API
    #[error("Rate limited; retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Number of seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Reading or writing the token file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building a DataFrame failed
    #[cfg(feature = "dataframe")]
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),
}

impl Error {
    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(err) => err.is_timeout() || err.is_connect(),
            Error::RateLimited { .. } => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }

    /// Returns `true` if this error indicates a client-side issue.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => (400..500).contains(status),
            Error::InvalidInput(_) | Error::NotFound(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn validation(model: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            model,
            message: message.into(),
        }
    }

    /// Create an API error from a non-success response body.
    ///
    /// The trader API reports `{"message": .., "errors": [..]}` while the
    /// OAuth endpoints use `{"error": .., "error_description": ..}`.
    pub(crate) fn from_api_response(status: u16, body: Value) -> Self {
        let message = body
            .get("message")
            .or_else(|| body.get("error_description"))
            .or_else(|| body.get("error"))
            .and_then(|m| m.as_str())
            .map(String::from)
            .or_else(|| {
                body.get("errors")
                    .and_then(|e| e.get(0))
                    .and_then(|e| e.get("detail").or_else(|| e.get("title")))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| "Unknown API error".to_string());

        Error::Api {
            status,
            message,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(Error::RateLimited { retry_after_secs: 30 }.is_retryable());
        assert!(Error::from_api_response(503, Value::Null).is_retryable());
        assert!(!Error::InvalidInput("bad".into()).is_retryable());
        assert!(!Error::Authentication("expired".into()).is_retryable());
    }

    #[test]
    fn test_error_auth() {
        assert!(Error::Authentication("failed".into()).is_auth_error());
        assert!(!Error::NotFound("x".into()).is_auth_error());
    }

    #[test]
    fn test_from_api_response_message() {
        let body = serde_json::json!({
            "message": "Invalid account hash",
            "errors": ["unused"]
        });

        match Error::from_api_response(400, body) {
            Error::Api {
                status, message, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid account hash");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_api_response_errors_array() {
        let body = serde_json::json!({
            "errors": [{"title": "Bad Request", "detail": "fromEnteredTime is required"}]
        });

        let err = Error::from_api_response(400, body);
        assert!(err.is_client_error());
        assert!(err.to_string().contains("fromEnteredTime is required"));
    }

    #[test]
    fn test_from_oauth_error() {
        let body = serde_json::json!({
            "error": "invalid_grant",
            "error_description": "refresh token is invalid"
        });

        let err = Error::from_api_response(400, body);
        assert!(err.to_string().contains("refresh token is invalid"));
    }
}
