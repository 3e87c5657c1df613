//! Error types for otoc-core.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OtocError>;

/// Everything that can go wrong while validating or aggregating OTOC data.
#[derive(Debug, Error)]
pub enum OtocError {
    /// Two series that must be depth-aligned have different lengths.
    #[error("dimension mismatch in {context}: expected {expected} depths, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Sample standard deviation needs at least two runs.
    #[error("{context}: {runs} run(s) is not enough for a sample standard deviation (need >= 2)")]
    InsufficientRuns { context: String, runs: usize },

    /// A run set was built with no runs at all.
    #[error("{0}: run set is empty")]
    EmptyRunSet(String),

    /// A series with no samples was passed where a mean is required.
    #[error("series is empty")]
    EmptySeries,

    /// The model has no exact-simulation baseline (e.g. the SYK ensemble).
    #[error("model '{0}' has no exact reference series")]
    MissingReference(String),

    /// Lookup by key failed.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// Two runs in one run set share an identifier.
    #[error("model '{model}': duplicate run id '{run}'")]
    DuplicateRun { model: String, run: String },

    /// Correlation is undefined for a constant series.
    #[error("correlation undefined: series has zero variance")]
    ZeroVariance,

    /// The embedded dataset document could not be parsed.
    #[error("dataset parse error: {0}")]
    Dataset(#[from] serde_json::Error),
}
