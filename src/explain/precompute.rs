//! Instance-independent precomputation.
//!
//! Everything that depends only on the feature count and the configuration is
//! computed once and shared read-only across explained rows: the normalized
//! kernel size weights, the exactly enumerated coalition block with its
//! weights and system matrix, and the sampler for the residual layers.

use nalgebra::DMatrix;

use super::config::ExplainConfig;
use super::explanation::Strategy;
use super::kernel::size_weights;
use super::subsets::{enumerate_layers, exact_sizes, weighted_outer_sum, SubsetSampler};
use crate::data::CoalitionMatrix;

/// Precomputed exact-layer structures for one feature count.
#[derive(Debug, Clone)]
pub struct ExactArtifacts {
    n_features: usize,
    /// Normalized kernel mass per size, indexed by `s − 1`.
    size_weights: Vec<f64>,
    /// Exactly enumerated coalitions.
    z_exact: CoalitionMatrix,
    /// Their contribution weights (full-range normalization).
    w_exact: Vec<f64>,
    /// `Σ w_i z_i z_iᵀ` over the exact block.
    a_exact: DMatrix<f64>,
    /// Kernel mass covered exactly.
    exact_mass: f64,
    /// Sampler for the residual layers; `None` when fully covered.
    sampler: Option<SubsetSampler>,
}

impl ExactArtifacts {
    /// Precompute for `p` features under the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if `p < 2`; the single-feature case never reaches the solver.
    pub fn new(p: usize, config: &ExplainConfig) -> Self {
        assert!(p >= 2, "Precomputation needs at least 2 features, got {}", p);
        let weights = size_weights(p);
        let degree = if config.exact { p - 1 } else { config.hybrid_degree };
        let sizes = exact_sizes(p, degree);
        let (z_exact, w_exact) = enumerate_layers(p, &sizes, &weights);
        let a_exact = weighted_outer_sum(&z_exact, &w_exact);
        let exact_mass: f64 = w_exact.iter().sum();
        let sampler = SubsetSampler::new(p, &sizes, &weights, config.paired);
        Self {
            n_features: p,
            size_weights: weights,
            z_exact,
            w_exact,
            a_exact,
            exact_mass,
            sampler,
        }
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Normalized kernel mass per size, indexed by `s − 1`.
    #[inline]
    pub fn size_weights(&self) -> &[f64] {
        &self.size_weights
    }

    /// The exactly enumerated coalition block.
    #[inline]
    pub fn z_exact(&self) -> &CoalitionMatrix {
        &self.z_exact
    }

    /// Contribution weights of the exact block.
    #[inline]
    pub fn w_exact(&self) -> &[f64] {
        &self.w_exact
    }

    /// System matrix contribution of the exact block.
    #[inline]
    pub fn a_exact(&self) -> &DMatrix<f64> {
        &self.a_exact
    }

    /// Kernel mass covered by the exact block.
    #[inline]
    pub fn exact_mass(&self) -> f64 {
        self.exact_mass
    }

    /// Sampler for the residual layers, when any remain.
    #[inline]
    pub fn sampler(&self) -> Option<&SubsetSampler> {
        self.sampler.as_ref()
    }

    /// The estimator these artifacts support.
    pub fn strategy(&self, config: &ExplainConfig) -> Strategy {
        if self.sampler.is_none() {
            Strategy::Exact
        } else if self.z_exact.n_rows() == 0 {
            Strategy::Sampling
        } else {
            Strategy::Hybrid {
                degree: config.hybrid_degree,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(exact: bool, degree: usize) -> ExplainConfig {
        ExplainConfig::builder()
            .exact(exact)
            .hybrid_degree(degree)
            .build()
            .unwrap()
    }

    #[test]
    fn exact_flag_enumerates_everything() {
        let artifacts = ExactArtifacts::new(4, &config(true, 0));
        assert_eq!(artifacts.z_exact().n_rows(), 14);
        assert_relative_eq!(artifacts.exact_mass(), 1.0, epsilon = 1e-12);
        assert!(artifacts.sampler().is_none());
        assert_eq!(artifacts.strategy(&config(true, 0)), Strategy::Exact);
    }

    #[test]
    fn hybrid_splits_mass() {
        let cfg = config(false, 1);
        let artifacts = ExactArtifacts::new(6, &cfg);
        // Sizes 1 and 5 enumerated: 12 rows.
        assert_eq!(artifacts.z_exact().n_rows(), 12);
        let residual = artifacts.sampler().unwrap().residual_mass();
        assert_relative_eq!(artifacts.exact_mass() + residual, 1.0, epsilon = 1e-12);
        assert_eq!(
            artifacts.strategy(&cfg),
            Strategy::Hybrid { degree: 1 }
        );
    }

    #[test]
    fn degree_zero_is_pure_sampling() {
        let cfg = config(false, 0);
        let artifacts = ExactArtifacts::new(5, &cfg);
        assert_eq!(artifacts.z_exact().n_rows(), 0);
        assert_eq!(artifacts.exact_mass(), 0.0);
        assert_relative_eq!(
            artifacts.sampler().unwrap().residual_mass(),
            1.0,
            epsilon = 1e-12
        );
        assert_eq!(artifacts.strategy(&cfg), Strategy::Sampling);
    }

    #[test]
    fn small_p_collapses_hybrid_to_exact() {
        // p = 3, degree 1: sizes {1, 2} cover everything.
        let cfg = config(false, 1);
        let artifacts = ExactArtifacts::new(3, &cfg);
        assert!(artifacts.sampler().is_none());
        assert_relative_eq!(artifacts.exact_mass(), 1.0, epsilon = 1e-12);
        assert_eq!(artifacts.strategy(&cfg), Strategy::Exact);

        // p = 2 has a single size layer.
        let artifacts = ExactArtifacts::new(2, &cfg);
        assert_eq!(artifacts.z_exact().n_rows(), 2);
        assert!(artifacts.sampler().is_none());
    }

    #[test]
    fn exact_system_matrix_shape() {
        let artifacts = ExactArtifacts::new(5, &config(false, 2));
        assert_eq!(artifacts.a_exact().shape(), (5, 5));
        // Degree 2 covers sizes {1, 2, 3, 4} = everything for p = 5.
        assert!(artifacts.sampler().is_none());
    }

    #[test]
    #[should_panic(expected = "at least 2 features")]
    fn single_feature_panics() {
        ExactArtifacts::new(1, &config(false, 1));
    }
}
