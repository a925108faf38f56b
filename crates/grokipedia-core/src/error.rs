//! Error taxonomy shared by every Grokipedia client.

use std::fmt;

use thiserror::Error;

/// Result type for Grokipedia operations.
pub type Result<T> = std::result::Result<T, GrokipediaError>;

/// Errors surfaced by the transport clients.
///
/// Every variant belongs to exactly one [`ErrorKind`]. Connection failures,
/// timeouts and malformed bodies all share the generic [`ErrorKind::Service`]
/// kind, which is the only kind the retry policy treats as transient.
#[derive(Error, Debug)]
pub enum GrokipediaError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request gate closed: client is shutting down")]
    GateClosed,
}

/// The four failure kinds a caller can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport-level failure: connection, timeout, unreadable response.
    Service,
    NotFound,
    Api,
    RateLimited,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Service => "service",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Api => "api",
            ErrorKind::RateLimited => "rate_limited",
        };
        f.write_str(name)
    }
}

impl GrokipediaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrokipediaError::NotFound(_) => ErrorKind::NotFound,
            GrokipediaError::Api { .. } => ErrorKind::Api,
            GrokipediaError::RateLimited(_) => ErrorKind::RateLimited,
            GrokipediaError::Http(_)
            | GrokipediaError::Timeout { .. }
            | GrokipediaError::Malformed(_)
            | GrokipediaError::Io(_)
            | GrokipediaError::GateClosed => ErrorKind::Service,
        }
    }

    /// True for failures a retry might fix.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Service
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        GrokipediaError::NotFound(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        GrokipediaError::Malformed(msg.into())
    }

    pub fn rate_limited<S: Into<String>>(msg: S) -> Self {
        GrokipediaError::RateLimited(msg.into())
    }
}

impl From<serde_json::Error> for GrokipediaError {
    fn from(err: serde_json::Error) -> Self {
        GrokipediaError::Malformed(err.to_string())
    }
}
