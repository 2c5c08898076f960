//! Masked-prediction evaluation.
//!
//! For every coalition row `z` the masker builds one copy of the explained
//! instance per background row, substitutes background values where `z` is
//! off, runs the model over the stack, and averages each coalition's group of
//! predictions back into a single expectation `v(z)`.
//!
//! The stack is coalition-major, so a coalition's background rows are
//! contiguous and aggregation is a positional pass; groups are never
//! reordered. When a row budget is set, the stack is streamed in batches of
//! whole coalitions so grouping stays intact across batch boundaries.

use nalgebra::DMatrix;

use super::error::ExplainError;
use crate::data::{CoalitionMatrix, MaskableTable};
use crate::model::{PredictModel, PredictionOutput};

/// Evaluates coalition expectations `v(z)` for one explained instance.
pub struct Masker<'a, T: MaskableTable> {
    x: &'a T::Row,
    background: &'a T,
    case_weights: Option<&'a [f64]>,
    weight_total: f64,
    n_outputs: usize,
    batch_rows: Option<usize>,
}

impl<'a, T: MaskableTable> Masker<'a, T> {
    /// Create a masker for one instance against a background.
    ///
    /// `case_weights`, when present, must be validated by the caller (one
    /// non-negative weight per background row, positive total).
    pub fn new(
        x: &'a T::Row,
        background: &'a T,
        case_weights: Option<&'a [f64]>,
        n_outputs: usize,
        batch_rows: Option<usize>,
    ) -> Self {
        let weight_total = match case_weights {
            Some(w) => w.iter().sum(),
            None => background.n_rows() as f64,
        };
        Self {
            x,
            background,
            case_weights,
            weight_total,
            n_outputs,
            batch_rows,
        }
    }

    /// Compute `v(z)` for every coalition row. Returns an m×K matrix.
    pub fn values<M: PredictModel<T>>(
        &self,
        model: &M,
        coalitions: &CoalitionMatrix,
    ) -> Result<DMatrix<f64>, ExplainError> {
        let m = coalitions.n_rows();
        let n_bg = self.background.n_rows();
        let mut vz = DMatrix::zeros(m, self.n_outputs);

        // Whole coalitions per batch; a budget below one group still sends
        // one coalition at a time so groups never split.
        let coalitions_per_batch = match self.batch_rows {
            Some(budget) => (budget / n_bg).max(1),
            None => m.max(1),
        };

        let mut start = 0;
        while start < m {
            let end = (start + coalitions_per_batch).min(m);
            let chunk = coalitions.slice_rows(start, end);
            let stacked = self.background.masked_stack(self.x, &chunk);
            let preds = model.predict(&stacked);
            self.validate(&preds, (end - start) * n_bg)?;
            self.aggregate(&preds, start, end - start, n_bg, &mut vz);
            start = end;
        }
        Ok(vz)
    }

    fn validate(&self, preds: &PredictionOutput, expected_rows: usize) -> Result<(), ExplainError> {
        if preds.n_rows() != expected_rows || preds.n_outputs() != self.n_outputs {
            return Err(ExplainError::PredictionShapeMismatch {
                expected_rows,
                expected_outputs: self.n_outputs,
                got_rows: preds.n_rows(),
                got_outputs: preds.n_outputs(),
            });
        }
        if !preds.is_finite() {
            return Err(ExplainError::InvalidPredictionKind(
                "masked predictions contain NaN or infinity".into(),
            ));
        }
        Ok(())
    }

    /// Fold each coalition's group of predictions into its expectation row.
    fn aggregate(
        &self,
        preds: &PredictionOutput,
        vz_offset: usize,
        n_coalitions: usize,
        n_bg: usize,
        vz: &mut DMatrix<f64>,
    ) {
        for r in 0..n_coalitions {
            for b in 0..n_bg {
                let w = self.case_weights.map_or(1.0, |ws| ws[b]);
                let row = preds.row(r * n_bg + b);
                for (k, &pred) in row.iter().enumerate() {
                    vz[(vz_offset + r, k)] += w * pred;
                }
            }
            for k in 0..self.n_outputs {
                vz[(vz_offset + r, k)] /= self.weight_total;
            }
        }
    }
}
