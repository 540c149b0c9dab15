//! Error types for the Foresight workspace.
//!
//! The variants follow the failure taxonomy of the research pipeline: fatal
//! configuration problems, retryable fetch failures, data that is too thin to
//! warm a model up, and single-class training sets. Only the first two are ever
//! surfaced as hard failures by a completed walk-forward run.

use thiserror::Error;

/// The main error type for Foresight operations.
#[derive(Debug, Error)]
pub enum ForesightError {
    /// Invalid or missing configuration, including absent credentials.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or HTTP failure while fetching data; the whole fetch may be retried.
    #[error("Transient fetch error: {0}")]
    TransientFetch(String),

    /// The data source answered but returned no usable observations.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Not enough history to train a model.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The labeled training set contains a single class.
    #[error("Degenerate training set: {0}")]
    DegenerateTrainingSet(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A feature row does not match the configured schema.
    #[error("Schema mismatch: expected {expected} features, found {found}")]
    SchemaMismatch {
        /// Width declared by the schema.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// Error raised by a scorer implementation.
    #[error("Model error: {0}")]
    Model(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// I/O error while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForesightError {
    /// Whether retrying the operation that produced this error can succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFetch(_))
    }
}

/// A specialized Result type for Foresight operations.
pub type Result<T> = std::result::Result<T, ForesightError>;
