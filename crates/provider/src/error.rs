use std::fmt;

use thiserror::Error;

/// Errors surfaced by the external collaborators (storage, label detection,
/// mail sending).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The service rejected or failed the request.
    #[error("service error{}: {message}", CodeSuffix(.code.as_deref()))]
    Service {
        /// Upstream error code (e.g. `"InvalidImageFormatException"`).
        code: Option<String>,
        /// Upstream error message.
        message: String,
    },

    /// The service did not answer in time.
    #[error("request timed out")]
    Timeout,

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The request was throttled.
    #[error("rate limited")]
    RateLimited,

    /// The client was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The request could not be built from the given input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

struct CodeSuffix<'a>(Option<&'a str>);

impl fmt::Display for CodeSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, " [{code}]"),
            None => Ok(()),
        }
    }
}

impl ProviderError {
    /// Build a [`ProviderError::Service`] without an error code.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            code: None,
            message: message.into(),
        }
    }

    /// Build a [`ProviderError::Service`] carrying an upstream error code.
    pub fn service_with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// The upstream error code, when the service reported one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if the error is transient and a later invocation may
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_) | Self::RateLimited)
    }
}
