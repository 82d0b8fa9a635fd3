// =============================================================================
// Error types
// =============================================================================
//
// The numerical core reports expected degenerate conditions (too few chunk
// sizes, zero-variance chunks) as `None`. The variants below cover inputs the
// caller must fix: unordered series, empty series, nonsensical parameters.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("empty price series")]
    EmptySeries,

    /// Timestamps must be strictly increasing; `index` is the first offender.
    #[error("price series not chronological at index {index}")]
    NotChronological { index: usize },

    #[error("insufficient history: required {required} points, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
