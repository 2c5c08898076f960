//! Black-box prediction seam.
//!
//! The engine treats the model as an opaque function from a feature table to a
//! numeric output matrix. Anything the prediction needs beyond the features
//! (framework handles, preprocessing state, forwarded options) lives inside
//! the implementor: a closure capture or a struct field. The engine never
//! interprets it.
//!
//! # Example
//!
//! ```
//! use kernelshap::data::{DenseTable, MaskableTable};
//! use kernelshap::model::PredictionOutput;
//!
//! // A linear model as a closure over a DenseTable.
//! let weights = [0.5, -1.0];
//! let model = move |data: &DenseTable| {
//!     let preds = (0..MaskableTable::n_rows(data))
//!         .map(|i| {
//!             let row = data.row_slice(i);
//!             row.iter().zip(weights).map(|(x, w)| x * w).sum()
//!         })
//!         .collect();
//!     PredictionOutput::from_column(preds)
//! };
//! # let _ = model;
//! ```

use approx::{AbsDiffEq, RelativeEq};

use crate::data::MaskableTable;

// =============================================================================
// PredictionOutput
// =============================================================================

/// Prediction output: flat storage with shape metadata.
///
/// Stores predictions in row-major layout. Each row contains `n_outputs`
/// values (1 for regression, K for K-class models).
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutput {
    /// Flat data in row-major layout.
    data: Vec<f64>,
    /// Number of rows (samples).
    n_rows: usize,
    /// Number of outputs per row.
    n_outputs: usize,
}

impl PredictionOutput {
    /// Create a new prediction output.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_outputs`.
    pub fn new(data: Vec<f64>, n_rows: usize, n_outputs: usize) -> Self {
        assert_eq!(
            data.len(),
            n_rows * n_outputs,
            "Data length {} does not match shape {}x{}",
            data.len(),
            n_rows,
            n_outputs
        );
        Self {
            data,
            n_rows,
            n_outputs,
        }
    }

    /// Wrap a 1-D prediction vector as a single-output matrix.
    pub fn from_column(data: Vec<f64>) -> Self {
        let n_rows = data.len();
        Self {
            data,
            n_rows,
            n_outputs: 1,
        }
    }

    /// Number of rows (samples).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of outputs per row.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Shape as (rows, outputs).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_outputs)
    }

    /// Predictions for a single row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= n_rows`.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.n_outputs;
        &self.data[start..start + self.n_outputs]
    }

    /// Raw flat data.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Whether every prediction is a finite number.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

// =============================================================================
// Approx trait implementations
// =============================================================================

impl AbsDiffEq for PredictionOutput {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.n_rows == other.n_rows
            && self.n_outputs == other.n_outputs
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for PredictionOutput {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.n_rows == other.n_rows
            && self.n_outputs == other.n_outputs
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

// =============================================================================
// PredictModel trait
// =============================================================================

/// A black-box model the engine can query with masked feature tables.
///
/// The engine evaluates `predict` on stacks of masked instance copies and on
/// the background itself. The output must have one row per input row; 1-D
/// outputs enter as a single-output matrix via
/// [`PredictionOutput::from_column`]. The engine validates row counts, the
/// output dimension, and finiteness after every call.
///
/// Predictions are assumed deterministic: the boundary values v0 = E\[f(bg)\]
/// and v1 = f(x) are evaluated once per explanation and never re-sampled.
pub trait PredictModel<T: MaskableTable> {
    /// Evaluate the model on every row of `data`.
    fn predict(&self, data: &T) -> PredictionOutput;
}

impl<T, F> PredictModel<T> for F
where
    T: MaskableTable,
    F: Fn(&T) -> PredictionOutput,
{
    fn predict(&self, data: &T) -> PredictionOutput {
        self(data)
    }
}
