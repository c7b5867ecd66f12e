//! Error types for shorewatch

use thiserror::Error;

/// Main error type for shorewatch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Degenerate curve: {0}")]
    DegenerateCurve(String),

    #[error("Canonical year list is empty")]
    EmptyYears,

    #[error("Reference year {0} has no shoreline data")]
    MissingReferenceYear(i32),

    #[error("No shoreline data loaded for any of the requested years")]
    NoShorelineData,

    #[error("Insufficient training data: {available} windows, need at least {required}")]
    InsufficientTrainingData { available: usize, required: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidParameter`].
    pub fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for shorewatch operations
pub type Result<T> = std::result::Result<T, Error>;
