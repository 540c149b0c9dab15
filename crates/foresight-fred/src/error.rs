//! Error types for the FRED API client.

use foresight_traits::ForesightError;
use thiserror::Error;

/// Errors that can occur when using the FRED API.
#[derive(Debug, Error)]
pub enum FredError {
    /// Missing API key.
    #[error("FRED_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// No usable observations in the requested range.
    #[error("No observations available for {0}")]
    EmptyResult(String),
}

impl FredError {
    /// Whether the request may succeed when repeated.
    ///
    /// Connection failures, timeouts, rate limiting and server errors are
    /// transient. Bad requests and missing credentials are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => !e.is_builder() && !e.is_decode(),
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::MissingApiKey | Self::Json(_) | Self::EmptyResult(_) => false,
        }
    }
}

impl From<FredError> for ForesightError {
    fn from(err: FredError) -> Self {
        match err {
            FredError::MissingApiKey => Self::Configuration(err.to_string()),
            FredError::EmptyResult(series) => Self::EmptyResult(series),
            ref e if e.is_transient() => Self::TransientFetch(e.to_string()),
            other => Self::InvalidData(other.to_string()),
        }
    }
}
