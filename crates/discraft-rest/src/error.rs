//! REST client errors

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The credential cannot be used as a header value
    #[error("Credential contains characters not allowed in a header")]
    InvalidCredential,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode API response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl RestError {
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) | Self::Decode(e) => e.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

pub type RestResult<T> = Result<T, RestError>;
