//! kernelshap: model-agnostic Kernel SHAP attributions.
//!
//! Computes per-feature attributions for a single prediction against a
//! black-box regression or classification model. Given an instance, a
//! background dataset and a prediction function, the engine returns a p×K
//! attribution matrix whose columns sum to `f(x) − E[f(bg)]` and approximate
//! Shapley values under the Kernel SHAP weighting.
//!
//! # Key Types
//!
//! - [`KernelExplainer`] - the driver: precompute once, explain rows
//! - [`ExplainConfig`] - estimator configuration builder
//! - [`Explanation`] - attributions, standard errors, loop diagnostics
//! - [`PredictModel`] / [`PredictionOutput`] - the black-box model seam
//! - [`MaskableTable`] - feature tables the engine can mask
//!   ([`DenseTable`] numeric fast path, [`ColumnTable`] heterogeneous)
//!
//! # Estimators
//!
//! Three strategies, picked from the configuration and the feature count:
//!
//! - **Exact**: enumerate all `2^p − 2` coalitions. Deterministic; for small p.
//! - **Hybrid(d)**: enumerate the `d` smallest and largest coalition sizes
//!   (most of the kernel mass), sample the middle layers.
//! - **Sampling**: sample everything.
//!
//! Sampled strategies iterate with paired antithetic draws until the worst
//! relative standard error of the attributions falls below the tolerance.
//!
//! # Example
//!
//! ```
//! use kernelshap::data::{DenseTable, MaskableTable};
//! use kernelshap::model::PredictionOutput;
//! use kernelshap::{ExplainConfig, KernelExplainer};
//!
//! let background = DenseTable::from_vec(vec![0.0, 0.0, 1.0, 2.0], 2, 2);
//! let model = |data: &DenseTable| {
//!     let preds = (0..MaskableTable::n_rows(data))
//!         .map(|i| {
//!             let row = data.row_slice(i);
//!             3.0 * row[0] + row[1]
//!         })
//!         .collect();
//!     PredictionOutput::from_column(preds)
//! };
//!
//! let config = ExplainConfig::builder().exact(true).build().unwrap();
//! let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();
//! let explanation = explainer.explain_row(&vec![1.0, 1.0]).unwrap();
//!
//! // 3·(1 − 0.5) for feature 0, 1·(1 − 1) for feature 1.
//! assert!((explanation.beta(0, 0) - 1.5).abs() < 1e-10);
//! assert!(explanation.beta(1, 0).abs() < 1e-10);
//! ```

// Re-export approx traits for users who want to compare attributions
pub use approx;

pub mod data;
pub mod explain;
pub mod math;
pub mod model;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Driver types (most users want these)
pub use explain::{
    ConfigError, ExplainConfig, ExplainError, Explanation, KernelExplainer, Strategy, Verbosity,
};

// Data types (for preparing the background and instances)
pub use data::{Column, ColumnTable, DenseTable, MaskableTable, RowMatrix, Value};

// Model seam
pub use model::{PredictModel, PredictionOutput};
