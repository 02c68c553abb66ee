// =============================================================================
// Pipeline Errors
// =============================================================================
//
// Every failure the signal pipeline can produce is recoverable: the caller
// skips the refresh cycle and keeps the previous snapshot. The pipeline never
// partially mutates shared state, so there is nothing to clean up on error.

use thiserror::Error;

/// Recoverable failures of the signal-derivation pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Fewer bars than a derived column needs. The scorer refuses to do
    /// arithmetic with NaN warm-up values.
    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// The caller supplied an empty series or one whose timestamps are not
    /// strictly increasing. The pipeline fails fast instead of sorting.
    #[error("invalid bar series: {0}")]
    InvalidSeries(String),

    /// No usable auxiliary volatility-index reading for this cycle.
    #[error("auxiliary volatility reading missing or not finite")]
    MissingAux,
}

impl PipelineError {
    pub fn invalid_series(reason: impl Into<String>) -> Self {
        Self::InvalidSeries(reason.into())
    }
}
