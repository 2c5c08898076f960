//! Explanation result container.

use std::fmt;

use nalgebra::DMatrix;

// =============================================================================
// Strategy
// =============================================================================

/// Which estimator produced an explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every coalition enumerated; deterministic, no sampling error.
    Exact,
    /// The `degree` smallest and largest size layers enumerated, the middle
    /// sampled.
    Hybrid {
        /// Number of exactly enumerated size layers at each end.
        degree: usize,
    },
    /// All non-degenerate coalitions sampled.
    Sampling,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Hybrid { degree } => write!(f, "hybrid(degree={})", degree),
            Self::Sampling => write!(f, "sampling"),
        }
    }
}

// =============================================================================
// Explanation
// =============================================================================

/// Kernel SHAP attributions for one explained instance.
///
/// Stores a p×K attribution matrix whose column sums equal `v1 − v0`, the
/// matching per-entry standard errors (zero for the exact strategy), and the
/// loop diagnostics.
#[derive(Debug, Clone)]
pub struct Explanation {
    beta: DMatrix<f64>,
    sigma: DMatrix<f64>,
    v0: Vec<f64>,
    v1: Vec<f64>,
    n_iter: usize,
    converged: bool,
    criterion: f64,
    strategy: Strategy,
}

impl Explanation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        beta: DMatrix<f64>,
        sigma: DMatrix<f64>,
        v0: Vec<f64>,
        v1: Vec<f64>,
        n_iter: usize,
        converged: bool,
        criterion: f64,
        strategy: Strategy,
    ) -> Self {
        debug_assert_eq!(beta.shape(), sigma.shape());
        debug_assert_eq!(beta.ncols(), v0.len());
        debug_assert_eq!(v0.len(), v1.len());
        Self {
            beta,
            sigma,
            v0,
            v1,
            n_iter,
            converged,
            criterion,
            strategy,
        }
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.beta.nrows()
    }

    /// Number of model outputs.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.beta.ncols()
    }

    /// Attribution of feature `j` to output `k`.
    #[inline]
    pub fn beta(&self, j: usize, k: usize) -> f64 {
        self.beta[(j, k)]
    }

    /// Standard error of the attribution of feature `j` to output `k`.
    #[inline]
    pub fn sigma(&self, j: usize, k: usize) -> f64 {
        self.sigma[(j, k)]
    }

    /// The full attribution matrix.
    #[inline]
    pub fn beta_matrix(&self) -> &DMatrix<f64> {
        &self.beta
    }

    /// The full standard-error matrix.
    #[inline]
    pub fn sigma_matrix(&self) -> &DMatrix<f64> {
        &self.sigma
    }

    /// Background expectation v0 = E\[f(bg)\].
    #[inline]
    pub fn v0(&self) -> &[f64] {
        &self.v0
    }

    /// Instance prediction v1 = f(x).
    #[inline]
    pub fn v1(&self) -> &[f64] {
        &self.v1
    }

    /// Iterations run (1 for the exact strategy).
    #[inline]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Whether the stopping criterion was met.
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Final value of the convergence criterion (0 for exact).
    #[inline]
    pub fn criterion(&self) -> f64 {
        self.criterion
    }

    /// The estimator that produced this explanation.
    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Sum of attributions for output `k`.
    pub fn sum_beta(&self, k: usize) -> f64 {
        self.beta.column(k).sum()
    }

    /// Check the efficiency property: for every output `k`,
    /// `Σ_j beta[j, k] = v1[k] − v0[k]` within `tolerance`.
    pub fn verify_efficiency(&self, tolerance: f64) -> bool {
        (0..self.n_outputs())
            .all(|k| (self.sum_beta(k) - (self.v1[k] - self.v0[k])).abs() <= tolerance)
    }
}
