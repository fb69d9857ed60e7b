use thiserror::Error;

use crate::domain::errors::ValidationError;

/// Errors raised by the API session client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused, DNS failure, TLS failure
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The transport timeout elapsed
    #[error("Request timeout: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The service answered with a status the operation does not accept
    #[error("Unexpected status {actual} (expected {expected}): {body}")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        body: String,
    },

    /// The body is not the JSON shape the operation needs
    #[error("Invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Auth token is not a valid header value")]
    InvalidAuthToken,

    #[error("Session response has no session_id")]
    MissingSessionId,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Network(err)
        }
    }
}

impl ApiError {
    /// Transport faults abort a scenario; everything else fails it
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}
