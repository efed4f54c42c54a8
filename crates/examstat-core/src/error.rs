//! Analysis error types.
//!
//! Only conditions that make an analysis impossible are errors. Small
//! samples, unknown variant codes and zero-variance inputs are not: they
//! surface as `None` or empty values in the results.

use thiserror::Error;

/// Errors returned by [`analyze_exam`](crate::exam::analyze_exam).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The response set was empty.
    #[error("No student responses found for analysis.")]
    NoResponses,

    /// Every response was removed by `exclude_incomplete_data`.
    #[error("all {excluded} student responses were excluded as incomplete")]
    NoUsableResponses { excluded: usize },

    /// The analysis configuration failed validation.
    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// Returns `true` if the error is caused by missing data rather than by
    /// the caller's configuration.
    pub fn is_empty_input(&self) -> bool {
        matches!(
            self,
            AnalysisError::NoResponses | AnalysisError::NoUsableResponses { .. }
        )
    }
}
