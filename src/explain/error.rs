//! Error types for the explanation engine.

use crate::math::LinalgError;

/// Errors that can abort an explanation.
///
/// A `max_iter` exhaustion is deliberately *not* here: the driver returns the
/// last running estimate with `converged = false` and leaves the judgment to
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    /// Instance, background or coalition shapes disagree.
    #[error("shape mismatch: {0}")]
    InvalidShape(String),

    /// The model produced NaN or infinite predictions.
    #[error("prediction output is not numeric: {0}")]
    InvalidPredictionKind(String),

    /// The model output shape does not match the masked input.
    #[error(
        "prediction shape mismatch: expected {expected_rows}x{expected_outputs}, \
         got {got_rows}x{got_outputs}"
    )]
    PredictionShapeMismatch {
        expected_rows: usize,
        expected_outputs: usize,
        got_rows: usize,
        got_outputs: usize,
    },

    /// The weighted system lost the rank needed for the efficiency
    /// constraint; with correct weights this indicates a precomputation bug.
    #[error("singular weighted system: {0}")]
    SingularSystem(#[from] LinalgError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ExplainError::InvalidShape("x has 3 features, background has 4".into());
        assert!(err.to_string().contains("shape mismatch"));

        let err = ExplainError::PredictionShapeMismatch {
            expected_rows: 8,
            expected_outputs: 1,
            got_rows: 6,
            got_outputs: 1,
        };
        assert!(err.to_string().contains("expected 8x1"));
    }

    #[test]
    fn linalg_error_converts() {
        let err: ExplainError = LinalgError::ConstraintUnsatisfiable.into();
        assert!(matches!(err, ExplainError::SingularSystem(_)));
    }
}
