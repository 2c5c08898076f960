//! Kernel SHAP explanation engine.
//!
//! The pipeline, leaves first:
//!
//! - [`kernel`]: subset-size weight distribution.
//! - [`subsets`]: exact layer enumeration and residual-layer sampling.
//! - [`masker`]: masked-prediction expectations v(z).
//! - [`precompute`]: instance-independent artifacts.
//! - [`convergence`]: per-iteration estimates and the stopping rule.
//! - [`explainer`]: the single-row driver and batch dispatch.
//!
//! # Example
//!
//! ```
//! use kernelshap::data::{DenseTable, MaskableTable};
//! use kernelshap::explain::{ExplainConfig, KernelExplainer};
//! use kernelshap::model::PredictionOutput;
//!
//! // f(x) = 2·x0 − x1 over a two-row background.
//! let background = DenseTable::from_vec(vec![0.0, 0.0, 2.0, 2.0], 2, 2);
//! let model = |data: &DenseTable| {
//!     let preds = (0..MaskableTable::n_rows(data))
//!         .map(|i| {
//!             let row = data.row_slice(i);
//!             2.0 * row[0] - row[1]
//!         })
//!         .collect();
//!     PredictionOutput::from_column(preds)
//! };
//!
//! let config = ExplainConfig::builder().exact(true).build().unwrap();
//! let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();
//! let explanation = explainer.explain_row(&vec![3.0, 1.0]).unwrap();
//!
//! // Attributions close the gap between f(x) and the background mean.
//! assert!(explanation.verify_efficiency(1e-10));
//! ```

pub mod config;
pub mod convergence;
mod error;
pub mod explainer;
pub mod explanation;
pub mod kernel;
pub mod masker;
pub mod precompute;
pub mod subsets;

pub use config::{ConfigError, ExplainConfig, Verbosity};
pub use error::ExplainError;
pub use explainer::KernelExplainer;
pub use explanation::{Explanation, Strategy};
pub use masker::Masker;
pub use precompute::ExactArtifacts;
pub use subsets::{SubsetSample, SubsetSampler};
