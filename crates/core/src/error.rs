//! Errors raised by search and recommendation calls.
//!
//! These never reach the rendering layer: each channel converts them into an
//! empty result at its own boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Connection, timeout, or other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx HTTP status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The envelope came back with a non-success `code`.
    #[error("search service returned code {code}: {message}")]
    Api { code: i64, message: String },

    /// The body could not be decoded into the expected payload.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Coarse failure class used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::Transport(_) | SearchError::Status { .. } => "transport",
            SearchError::Api { .. } | SearchError::Decode(_) => "payload",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SearchError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
