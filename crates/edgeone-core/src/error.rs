//! Error types for the EdgeOne IP range system
//!
//! Every fetch-path error is contained inside the refresher's cycle. Only
//! [`Error::Config`] escapes to the host, and only at provisioning time.

use thiserror::Error;

/// Result type alias for EdgeOne IP range operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (surfaced synchronously at provisioning)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failures: connection, DNS, unexpected HTTP status
    #[error("HTTP error: {0}")]
    Http(String),

    /// A source attempt exceeded its per-fetch deadline
    #[error("Fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The privileged API returned a non-null `Error` envelope
    #[error("API error ({code}): {message}")]
    Api {
        /// Server-side error code, e.g. `AuthFailure.SignatureFailure`
        code: String,
        /// Server-side error message
        message: String,
    },

    /// A CIDR expression could not be parsed
    #[error("Invalid CIDR expression '{input}': {reason}")]
    Parse {
        /// The offending input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The signed request could not be assembled
    #[error("Signing error: {0}")]
    Signing(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an API error from the envelope's code and message
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a CIDR parse error
    pub fn parse(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a signing error
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Whether this error came from the privileged API's error envelope
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Whether this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
