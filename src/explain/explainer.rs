//! Single-row driver and batch dispatch.
//!
//! [`KernelExplainer`] borrows a model and a background table, precomputes
//! the layer structures once, and explains instances one at a time:
//!
//! 1. Evaluate the boundary values v0 = E\[f(bg)\] (at construction) and
//!    v1 = f(x) (per row).
//! 2. Run one exact pass over the enumerated coalition block.
//! 3. If residual layers remain, iterate: sample a coalition block, evaluate
//!    its masked expectations, accumulate the weighted system, solve, and
//!    check the convergence criterion.
//!
//! Each explanation is sequential; [`KernelExplainer::explain_batch`] runs
//! independent rows in parallel over the shared read-only artifacts.
//!
//! # Example
//!
//! ```
//! use kernelshap::data::{DenseTable, MaskableTable};
//! use kernelshap::explain::{ExplainConfig, KernelExplainer};
//! use kernelshap::model::PredictionOutput;
//!
//! let background = DenseTable::from_vec(vec![0.0, 0.0, 1.0, 1.0], 2, 2);
//! let model = |data: &DenseTable| {
//!     let preds = (0..MaskableTable::n_rows(data))
//!         .map(|i| data.row_slice(i).iter().sum())
//!         .collect();
//!     PredictionOutput::from_column(preds)
//! };
//! let config = ExplainConfig::builder().exact(true).build().unwrap();
//!
//! let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();
//! let explanation = explainer.explain_row(&vec![2.0, 3.0]).unwrap();
//! assert!(explanation.verify_efficiency(1e-10));
//! ```

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use super::config::{ExplainConfig, Verbosity};
use super::convergence::{conv_crit, EstimateHistory};
use super::error::ExplainError;
use super::explanation::{Explanation, Strategy};
use super::masker::Masker;
use super::precompute::ExactArtifacts;
use crate::data::{CoalitionMatrix, MaskableTable};
use crate::math::solve_constrained;
use crate::model::{PredictModel, PredictionOutput};

/// Kernel SHAP explainer over a borrowed model and background.
pub struct KernelExplainer<'a, T: MaskableTable, M: PredictModel<T>> {
    model: &'a M,
    background: &'a T,
    case_weights: Option<Vec<f64>>,
    config: ExplainConfig,
    /// `None` only for the trivial single-feature case.
    artifacts: Option<ExactArtifacts>,
    v0: Vec<f64>,
    n_outputs: usize,
}

impl<'a, T: MaskableTable, M: PredictModel<T>> std::fmt::Debug for KernelExplainer<'a, T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelExplainer")
            .field("case_weights", &self.case_weights)
            .field("config", &self.config)
            .field("v0", &self.v0)
            .field("n_outputs", &self.n_outputs)
            .finish_non_exhaustive()
    }
}

impl<'a, T: MaskableTable, M: PredictModel<T>> KernelExplainer<'a, T, M> {
    /// Create an explainer and precompute the layer structures.
    ///
    /// `case_weights`, when given, weight the background rows in every
    /// expectation (one non-negative entry per row, positive total).
    ///
    /// # Errors
    ///
    /// - [`ExplainError::InvalidShape`] for an empty background or malformed
    ///   case weights.
    /// - [`ExplainError::PredictionShapeMismatch`] /
    ///   [`ExplainError::InvalidPredictionKind`] if evaluating the model on
    ///   the background misbehaves.
    pub fn new(
        model: &'a M,
        background: &'a T,
        case_weights: Option<Vec<f64>>,
        config: ExplainConfig,
    ) -> Result<Self, ExplainError> {
        let n_bg = background.n_rows();
        let p = background.n_cols();
        if n_bg == 0 || p == 0 {
            return Err(ExplainError::InvalidShape(format!(
                "background must be non-empty, got {}x{}",
                n_bg, p
            )));
        }
        if let Some(w) = &case_weights {
            if w.len() != n_bg {
                return Err(ExplainError::InvalidShape(format!(
                    "{} case weights for {} background rows",
                    w.len(),
                    n_bg
                )));
            }
            if w.iter().any(|x| !x.is_finite() || *x < 0.0) {
                return Err(ExplainError::InvalidShape(
                    "case weights must be finite and non-negative".into(),
                ));
            }
            if w.iter().sum::<f64>() <= 0.0 {
                return Err(ExplainError::InvalidShape(
                    "case weights must have a positive total".into(),
                ));
            }
        }

        let preds = model.predict(background);
        if preds.n_rows() != n_bg {
            return Err(ExplainError::PredictionShapeMismatch {
                expected_rows: n_bg,
                expected_outputs: preds.n_outputs(),
                got_rows: preds.n_rows(),
                got_outputs: preds.n_outputs(),
            });
        }
        if !preds.is_finite() {
            return Err(ExplainError::InvalidPredictionKind(
                "background predictions contain NaN or infinity".into(),
            ));
        }
        let n_outputs = preds.n_outputs();
        let v0 = weighted_mean(&preds, case_weights.as_deref());

        let artifacts = if p >= 2 {
            Some(ExactArtifacts::new(p, &config))
        } else {
            None
        };

        Ok(Self {
            model,
            background,
            case_weights,
            config,
            artifacts,
            v0,
            n_outputs,
        })
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.background.n_cols()
    }

    /// Number of model outputs.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Background expectation v0 = E\[f(bg)\].
    #[inline]
    pub fn v0(&self) -> &[f64] {
        &self.v0
    }

    /// The configured estimator for this feature count.
    pub fn strategy(&self) -> Strategy {
        match &self.artifacts {
            Some(artifacts) => artifacts.strategy(&self.config),
            None => Strategy::Exact,
        }
    }

    /// Explain one instance with the configured seed.
    pub fn explain_row(&self, x: &T::Row) -> Result<Explanation, ExplainError> {
        self.explain_row_seeded(x, self.config.seed)
    }

    /// Explain independent instances in parallel.
    ///
    /// Row `i` uses a seed derived from the configured seed and `i`, so the
    /// result is reproducible and independent of scheduling order.
    pub fn explain_batch(&self, rows: &[T::Row]) -> Result<Vec<Explanation>, ExplainError>
    where
        T: Sync,
        T::Row: Sync,
        M: Sync,
    {
        rows.par_iter()
            .enumerate()
            .map(|(i, x)| self.explain_row_seeded(x, derive_seed(self.config.seed, i as u64)))
            .collect()
    }

    fn explain_row_seeded(&self, x: &T::Row, seed: u64) -> Result<Explanation, ExplainError> {
        if !self.background.schema_matches(x) {
            return Err(ExplainError::InvalidShape(
                "instance does not match the background schema".into(),
            ));
        }
        let v1 = self.evaluate_v1(x)?;
        let delta: Vec<f64> = v1.iter().zip(&self.v0).map(|(a, b)| a - b).collect();

        // Single feature: the one coalition layer is degenerate and the
        // attribution is the whole gap.
        let Some(artifacts) = &self.artifacts else {
            let beta = DMatrix::from_fn(1, self.n_outputs, |_, k| delta[k]);
            let sigma = DMatrix::zeros(1, self.n_outputs);
            return Ok(Explanation::new(
                beta,
                sigma,
                self.v0.clone(),
                v1,
                1,
                true,
                0.0,
                Strategy::Exact,
            ));
        };

        let p = artifacts.n_features();
        let strategy = artifacts.strategy(&self.config);
        let masker = Masker::new(
            x,
            self.background,
            self.case_weights.as_deref(),
            self.n_outputs,
            self.config.batch_rows.map(|b| b.get()),
        );

        // Exact pass over the enumerated block.
        let b_exact = if artifacts.z_exact().n_rows() > 0 {
            let vz = masker.values(self.model, artifacts.z_exact())?;
            contribution(artifacts.z_exact(), artifacts.w_exact(), &vz, &self.v0)
        } else {
            DMatrix::zeros(p, self.n_outputs)
        };

        let Some(sampler) = artifacts.sampler() else {
            let beta = solve_constrained(artifacts.a_exact(), &b_exact, &delta)?;
            return Ok(Explanation::new(
                beta,
                DMatrix::zeros(p, self.n_outputs),
                self.v0.clone(),
                v1,
                1,
                true,
                0.0,
                strategy,
            ));
        };

        // Iterative sampling over the residual layers.
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut a_sum = DMatrix::zeros(p, p);
        let mut b_sum = DMatrix::zeros(p, self.n_outputs);
        let mut history = EstimateHistory::new();
        let mut running: Option<DMatrix<f64>> = None;
        let mut sigma = DMatrix::zeros(p, self.n_outputs);
        let mut criterion = f64::INFINITY;
        let mut converged = false;
        let mut n_iter = 0;

        for n in 1..=self.config.max_iter {
            n_iter = n;
            let sample = sampler.draw(self.config.n_samples, &mut rng);
            let vz = masker.values(self.model, &sample.coalitions)?;

            // Exact block plus sampled block carries total weight 1.
            let a_temp = artifacts.a_exact() + &sample.a_matrix;
            let b_temp =
                &b_exact + contribution(&sample.coalitions, &sample.weights, &vz, &self.v0);
            a_sum += &a_temp;
            b_sum += &b_temp;

            let beta_n = solve_constrained(&a_temp, &b_temp, &delta)?;
            history.push(beta_n);

            if n >= 2 {
                let scale = 1.0 / n as f64;
                let mean_beta =
                    solve_constrained(&a_sum.scale(scale), &b_sum.scale(scale), &delta)?;
                sigma = history.std_errors();
                criterion = conv_crit(&sigma, &mean_beta);
                if self.config.verbosity >= Verbosity::Info {
                    eprintln!(
                        "[kernelshap] iteration {}: criterion {:.3e} (tol {:.1e})",
                        n, criterion, self.config.tol
                    );
                }
                running = Some(mean_beta);
                if criterion < self.config.tol {
                    converged = true;
                    break;
                }
            } else if self.config.verbosity >= Verbosity::Debug {
                eprintln!("[kernelshap] iteration 1: first estimate recorded");
            }
        }

        let beta = match running {
            Some(beta) => beta,
            // max_iter = 1: only the single-iteration estimate exists.
            None => history
                .last()
                .cloned()
                .unwrap_or_else(|| DMatrix::zeros(p, self.n_outputs)),
        };
        Ok(Explanation::new(
            beta,
            sigma,
            self.v0.clone(),
            v1,
            n_iter,
            converged,
            criterion,
            strategy,
        ))
    }

    fn evaluate_v1(&self, x: &T::Row) -> Result<Vec<f64>, ExplainError> {
        let single = T::from_row(x);
        let preds = self.model.predict(&single);
        if preds.n_rows() != 1 || preds.n_outputs() != self.n_outputs {
            return Err(ExplainError::PredictionShapeMismatch {
                expected_rows: 1,
                expected_outputs: self.n_outputs,
                got_rows: preds.n_rows(),
                got_outputs: preds.n_outputs(),
            });
        }
        if !preds.is_finite() {
            return Err(ExplainError::InvalidPredictionKind(
                "instance prediction contains NaN or infinity".into(),
            ));
        }
        Ok(preds.row(0).to_vec())
    }
}

/// `b` contribution of a weighted coalition block:
/// `b[j, k] = Σ_i w_i z_ij (vz[i, k] − v0[k])`.
fn contribution(
    coalitions: &CoalitionMatrix,
    weights: &[f64],
    vz: &DMatrix<f64>,
    v0: &[f64],
) -> DMatrix<f64> {
    let p = coalitions.n_cols();
    let n_outputs = v0.len();
    let mut b = DMatrix::zeros(p, n_outputs);
    for (i, (z, &w)) in coalitions.rows().zip(weights).enumerate() {
        for (k, &v0_k) in v0.iter().enumerate() {
            let weighted_gap = w * (vz[(i, k)] - v0_k);
            for (j, &on) in z.iter().enumerate() {
                if on {
                    b[(j, k)] += weighted_gap;
                }
            }
        }
    }
    b
}

/// Weighted column means of a prediction matrix.
fn weighted_mean(preds: &PredictionOutput, case_weights: Option<&[f64]>) -> Vec<f64> {
    let n = preds.n_rows();
    let k_out = preds.n_outputs();
    let mut mean = vec![0.0; k_out];
    let mut total = 0.0;
    for i in 0..n {
        let w = case_weights.map_or(1.0, |ws| ws[i]);
        total += w;
        for (k, &pred) in preds.row(i).iter().enumerate() {
            mean[k] += w * pred;
        }
    }
    for m in &mut mean {
        *m /= total;
    }
    mean
}

/// Per-row seed for batch dispatch: SplitMix-style spread of the row index.
fn derive_seed(seed: u64, row: u64) -> u64 {
    seed ^ (row.wrapping_add(1)).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
