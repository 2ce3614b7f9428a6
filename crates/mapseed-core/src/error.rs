//! Client error taxonomy.

use thiserror::Error;

/// Errors produced by calls to the backend and translation collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status code.
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body was malformed or absent.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The operation did not settle within its time budget.
    #[error("{operation} timed out after {elapsed_ms} ms")]
    Timeout {
        /// Operation name used in logs.
        operation: String,
        /// Budget that elapsed.
        elapsed_ms: u64,
    },

    /// Local configuration is inconsistent.
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),
}

impl ClientError {
    /// Returns `true` when repeating the request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) | Self::Misconfiguration(_) => false,
        }
    }
}
