//! Explanation configuration with builder pattern.
//!
//! [`ExplainConfig`] collects the estimator knobs: strategy selection
//! (`exact`, `hybrid_degree`), sampling volume (`n_samples`, `paired`), the
//! convergence loop (`tol`, `max_iter`), reproducibility (`seed`) and
//! resource control (`batch_rows`). The builder (via `bon`) validates at
//! build time.
//!
//! # Example
//!
//! ```
//! use kernelshap::explain::ExplainConfig;
//!
//! // All defaults: hybrid degree 1, 64 paired samples per iteration.
//! let config = ExplainConfig::builder().build().unwrap();
//! assert_eq!(config.hybrid_degree, 1);
//!
//! // Pure sampling with a tight tolerance.
//! let config = ExplainConfig::builder()
//!     .hybrid_degree(0)
//!     .n_samples(256)
//!     .tol(1e-3)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! # let _ = config;
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Sample count must be at least 2.
    InvalidSampleCount(usize),
    /// Tolerance must be a positive finite number.
    InvalidTolerance(f64),
    /// Iteration cap must be at least 1.
    InvalidMaxIter,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSampleCount(v) => {
                write!(f, "n_samples must be at least 2, got {}", v)
            }
            Self::InvalidTolerance(v) => {
                write!(f, "tol must be positive and finite, got {}", v)
            }
            Self::InvalidMaxIter => write!(f, "max_iter must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Verbosity
// =============================================================================

/// How chatty the explanation loop is on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No output. Default.
    #[default]
    Silent,
    /// One line per convergence check.
    Info,
    /// Per-iteration details.
    Debug,
}

// =============================================================================
// ExplainConfig
// =============================================================================

/// Configuration for a Kernel SHAP explanation.
///
/// # Example
///
/// ```
/// use kernelshap::explain::{ExplainConfig, Verbosity};
///
/// let config = ExplainConfig::builder()
///     .exact(true)
///     .verbosity(Verbosity::Info)
///     .build()
///     .unwrap();
/// assert!(config.exact);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct ExplainConfig {
    // === Strategy ===
    /// Enumerate every coalition instead of sampling. Default: false.
    ///
    /// Cost grows as 2^p; meant for small feature counts and for validating
    /// sampled runs.
    #[builder(default = false)]
    pub exact: bool,

    /// Number of smallest and largest coalition sizes enumerated exactly.
    /// Default: 1. Zero means pure sampling. When the enumerated sizes cover
    /// every layer the run collapses to the exact strategy.
    #[builder(default = 1)]
    pub hybrid_degree: usize,

    // === Sampling ===
    /// Coalitions sampled per iteration. Default: 64.
    ///
    /// Rounded up to an even count when `paired` is set.
    #[builder(default = 64)]
    pub n_samples: usize,

    /// Sample antithetic (z, ¬z) pairs. Default: true.
    #[builder(default = true)]
    pub paired: bool,

    // === Convergence ===
    /// Relative standard error below which the loop stops. Default: 0.01.
    #[builder(default = 0.01)]
    pub tol: f64,

    /// Iteration cap; reaching it yields `converged = false`. Default: 100.
    #[builder(default = 100)]
    pub max_iter: usize,

    // === Reproducibility ===
    /// Random seed. Default: 42. Identical seeds and inputs give
    /// bit-identical attributions.
    #[builder(default = 42)]
    pub seed: u64,

    // === Resource control ===
    /// Upper bound on masked rows per prediction call. `None` sends each
    /// coalition block in one call.
    pub batch_rows: Option<NonZeroUsize>,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: explain_config_builder::IsComplete> ExplainConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `n_samples < 2`
    /// - `tol` non-positive or non-finite
    /// - `max_iter == 0`
    pub fn build(self) -> Result<ExplainConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ExplainConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.n_samples < 2 {
            return Err(ConfigError::InvalidSampleCount(self.n_samples));
        }
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(ConfigError::InvalidTolerance(self.tol));
        }
        if self.max_iter == 0 {
            return Err(ConfigError::InvalidMaxIter);
        }
        Ok(())
    }
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}
