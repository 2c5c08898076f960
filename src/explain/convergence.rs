//! Convergence tracking for the sampling loop.
//!
//! Each iteration produces an independent estimate of the attribution matrix.
//! The spread of those estimates yields per-entry standard errors for the
//! running mean, and the loop stops once the worst relative standard error
//! across features drops below the tolerance. A single iteration carries no
//! spread information, so the first iteration never reports convergence.

use nalgebra::DMatrix;

/// Floor added to the per-feature magnitude so near-zero attributions do not
/// blow up the relative criterion.
pub const STABILITY_FLOOR: f64 = 1e-8;

/// History of per-iteration attribution estimates.
#[derive(Debug, Clone, Default)]
pub struct EstimateHistory {
    estimates: Vec<DMatrix<f64>>,
}

impl EstimateHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one iteration's estimate.
    ///
    /// # Panics
    ///
    /// Panics if the estimate's shape differs from earlier entries.
    pub fn push(&mut self, estimate: DMatrix<f64>) {
        if let Some(first) = self.estimates.first() {
            assert_eq!(
                first.shape(),
                estimate.shape(),
                "Estimate shape changed between iterations"
            );
        }
        self.estimates.push(estimate);
    }

    /// Number of recorded iterations.
    #[inline]
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// Whether nothing has been recorded yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// The most recent estimate, if any.
    pub fn last(&self) -> Option<&DMatrix<f64>> {
        self.estimates.last()
    }

    /// Per-entry standard error of the mean of the recorded estimates:
    /// `sqrt(Σ_i (e_i − ē)² / (n (n − 1)))`.
    ///
    /// With fewer than two estimates the spread is unknowable and the result
    /// is all zeros of the recorded shape (or an empty matrix when nothing
    /// was recorded).
    pub fn std_errors(&self) -> DMatrix<f64> {
        let n = self.estimates.len();
        let (rows, cols) = self
            .estimates
            .first()
            .map_or((0, 0), |e| e.shape());
        if n < 2 {
            return DMatrix::zeros(rows, cols);
        }

        let mut mean = DMatrix::zeros(rows, cols);
        for e in &self.estimates {
            mean += e;
        }
        mean /= n as f64;

        let mut sq_dev = DMatrix::zeros(rows, cols);
        for e in &self.estimates {
            let dev = e - &mean;
            sq_dev += dev.component_mul(&dev);
        }
        (sq_dev / (n * (n - 1)) as f64).map(f64::sqrt)
    }
}

/// Worst relative standard error: for each feature row the largest standard
/// error over outputs, divided by the largest attribution magnitude over
/// outputs (plus [`STABILITY_FLOOR`]); the maximum over features.
///
/// # Panics
///
/// Panics if the shapes disagree.
pub fn conv_crit(sigma: &DMatrix<f64>, beta: &DMatrix<f64>) -> f64 {
    assert_eq!(
        sigma.shape(),
        beta.shape(),
        "Standard errors and estimates must have equal shapes"
    );
    let mut worst = 0.0_f64;
    for j in 0..sigma.nrows() {
        let sigma_row = sigma.row(j).iter().fold(0.0_f64, |a, &s| a.max(s.abs()));
        let beta_row = beta.row(j).iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
        worst = worst.max(sigma_row / (beta_row + STABILITY_FLOOR));
    }
    worst
}
