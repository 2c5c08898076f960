//! Integration tests for the exact estimator.
//!
//! These pin down the closed-form behaviors: known attributions for linear
//! models, determinism, boundary cases, and the hybrid-collapses-to-exact
//! guarantee for small feature counts.

use kernelshap::data::{Column, ColumnTable, DenseTable, MaskableTable, Value};
use kernelshap::model::PredictionOutput;
use kernelshap::{ExplainConfig, KernelExplainer, Strategy};

// =============================================================================
// Models
// =============================================================================

/// f(X) = X · weights, one output.
fn linear_model(weights: Vec<f64>) -> impl Fn(&DenseTable) -> PredictionOutput + Sync {
    move |data: &DenseTable| {
        let preds = (0..MaskableTable::n_rows(data))
            .map(|i| {
                data.row_slice(i)
                    .iter()
                    .zip(&weights)
                    .map(|(x, w)| x * w)
                    .sum()
            })
            .collect();
        PredictionOutput::from_column(preds)
    }
}

// =============================================================================
// Closed-form scenarios
// =============================================================================

#[test]
fn linear_model_diagonal_background() {
    // Background diag([1, 2, 3, 4]): column means are x_j / 4, so the
    // attributions are a_j · x_j · 3/4.
    let background = DenseTable::from_vec(
        vec![
            1.0, 0.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, 0.0, //
            0.0, 0.0, 3.0, 0.0, //
            0.0, 0.0, 0.0, 4.0,
        ],
        4,
        4,
    );
    let model = linear_model(vec![0.1, 0.2, 0.3, 0.4]);
    let config = ExplainConfig::builder().exact(true).build().unwrap();
    let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();

    let explanation = explainer.explain_row(&vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(explanation.strategy(), Strategy::Exact);
    assert_eq!(explanation.n_iter(), 1);
    assert!(explanation.converged());

    let expected = [0.075, 0.3, 0.675, 1.2];
    for (j, &want) in expected.iter().enumerate() {
        assert!(
            (explanation.beta(j, 0) - want).abs() < 1e-10,
            "beta[{}] = {}, expected {}",
            j,
            explanation.beta(j, 0),
            want
        );
        assert_eq!(explanation.sigma(j, 0), 0.0);
    }
    // Sum closes the gap: f(x) = 3.0, v0 = 0.75.
    assert!((explanation.sum_beta(0) - 2.25).abs() < 1e-10);
    assert!(explanation.verify_efficiency(1e-10));
}

#[test]
fn exact_output_ignores_sampling_options() {
    let background = DenseTable::from_vec(vec![0.0, 0.0, 1.0, 1.0, 2.0, 0.5], 3, 2);
    let model = linear_model(vec![1.5, -2.0]);
    let x = vec![2.0, 1.0];

    let base = {
        let config = ExplainConfig::builder().exact(true).build().unwrap();
        KernelExplainer::new(&model, &background, None, config)
            .unwrap()
            .explain_row(&x)
            .unwrap()
    };
    for (seed, n_samples, paired) in [(0u64, 2usize, false), (999, 128, true), (7, 10, false)] {
        let config = ExplainConfig::builder()
            .exact(true)
            .seed(seed)
            .n_samples(n_samples)
            .paired(paired)
            .build()
            .unwrap();
        let other = KernelExplainer::new(&model, &background, None, config)
            .unwrap()
            .explain_row(&x)
            .unwrap();
        assert_eq!(base.beta_matrix(), other.beta_matrix());
    }
}

#[test]
fn constant_model_attributes_nothing() {
    let background = DenseTable::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
    let model = |data: &DenseTable| {
        PredictionOutput::from_column(vec![5.0; MaskableTable::n_rows(data)])
    };
    let config = ExplainConfig::builder().exact(true).build().unwrap();
    let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();

    let explanation = explainer.explain_row(&vec![9.0, 9.0, 9.0]).unwrap();
    assert_eq!(explanation.n_iter(), 1);
    assert!(explanation.converged());
    for j in 0..3 {
        assert!(explanation.beta(j, 0).abs() < 1e-12);
        assert_eq!(explanation.sigma(j, 0), 0.0);
    }
}

#[test]
fn single_feature_gap() {
    let background = DenseTable::from_vec(vec![2.0, 6.0], 2, 1);
    let model = linear_model(vec![3.0]);
    let config = ExplainConfig::builder().build().unwrap();
    let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();

    let explanation = explainer.explain_row(&vec![10.0]).unwrap();
    // v1 = 30, v0 = 12.
    assert_eq!(explanation.n_features(), 1);
    assert!((explanation.beta(0, 0) - 18.0).abs() < 1e-12);
    assert!(explanation.converged());
    assert_eq!(explanation.strategy(), Strategy::Exact);
}

#[test]
fn case_weights_shift_the_baseline() {
    // Weighted background mean of feature 0: (3·0 + 1·8) / 4 = 2.
    let background = DenseTable::from_vec(vec![0.0, 8.0], 2, 1);
    let model = linear_model(vec![1.0]);
    let config = ExplainConfig::builder().exact(true).build().unwrap();
    let explainer =
        KernelExplainer::new(&model, &background, Some(vec![3.0, 1.0]), config).unwrap();

    let explanation = explainer.explain_row(&vec![5.0]).unwrap();
    assert!((explanation.v0()[0] - 2.0).abs() < 1e-12);
    assert!((explanation.beta(0, 0) - 3.0).abs() < 1e-12);
}

// =============================================================================
// Hybrid collapses to exact for small p
// =============================================================================

#[test]
fn hybrid_matches_exact_when_layers_cover_everything() {
    let background = DenseTable::from_vec(vec![0.0, 1.0, 0.5, 2.0, -1.0, 0.0], 3, 2);
    let model = linear_model(vec![1.0, -3.0]);
    let x = vec![4.0, 2.0];

    let exact = {
        let config = ExplainConfig::builder().exact(true).build().unwrap();
        KernelExplainer::new(&model, &background, None, config)
            .unwrap()
            .explain_row(&x)
            .unwrap()
    };
    // p = 2, degree 1 covers the single size layer; no sampling happens.
    let hybrid = {
        let config = ExplainConfig::builder().hybrid_degree(1).build().unwrap();
        KernelExplainer::new(&model, &background, None, config)
            .unwrap()
            .explain_row(&x)
            .unwrap()
    };
    assert_eq!(hybrid.strategy(), Strategy::Exact);
    assert_eq!(hybrid.n_iter(), 1);
    for j in 0..2 {
        assert!((exact.beta(j, 0) - hybrid.beta(j, 0)).abs() < 1e-12);
    }
}

#[test]
fn hybrid_degree_covers_p_three() {
    // p = 3, degree 1: sizes {1, 2} are all of them.
    let background = DenseTable::from_vec(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2, 3);
    let model = linear_model(vec![1.0, 2.0, 3.0]);
    let config = ExplainConfig::builder().hybrid_degree(1).build().unwrap();
    let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();
    assert_eq!(explainer.strategy(), Strategy::Exact);

    let explanation = explainer.explain_row(&vec![2.0, 2.0, 2.0]).unwrap();
    // Column means are all 0.5.
    for (j, a) in [1.0, 2.0, 3.0].iter().enumerate() {
        assert!((explanation.beta(j, 0) - a * 1.5).abs() < 1e-10);
    }
}

// =============================================================================
// Multi-output
// =============================================================================

#[test]
fn multi_output_efficiency_per_column() {
    let background = DenseTable::from_vec(vec![0.0, 0.0, 2.0, 4.0], 2, 2);
    // Two outputs with different weight vectors.
    let model = |data: &DenseTable| {
        let n = MaskableTable::n_rows(data);
        let mut out = Vec::with_capacity(n * 2);
        for i in 0..n {
            let row = data.row_slice(i);
            out.push(row[0] + row[1]);
            out.push(2.0 * row[0] - 0.5 * row[1]);
        }
        PredictionOutput::new(out, n, 2)
    };
    let config = ExplainConfig::builder().exact(true).build().unwrap();
    let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();

    let explanation = explainer.explain_row(&vec![3.0, 1.0]).unwrap();
    assert_eq!(explanation.n_outputs(), 2);
    assert!(explanation.verify_efficiency(1e-10));
    // Column means: 1 and 2. Output 0: [3−1, 1−2]; output 1: [2·2, −0.5·(−1)].
    assert!((explanation.beta(0, 0) - 2.0).abs() < 1e-10);
    assert!((explanation.beta(1, 0) + 1.0).abs() < 1e-10);
    assert!((explanation.beta(0, 1) - 4.0).abs() < 1e-10);
    assert!((explanation.beta(1, 1) - 0.5).abs() < 1e-10);
}

// =============================================================================
// Heterogeneous tables
// =============================================================================

#[test]
fn column_table_matches_dense_for_numeric_data() {
    let dense_bg = DenseTable::from_vec(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 3, 2);
    let column_bg = ColumnTable::new(vec![
        Column::Numeric(vec![0.0, 2.0, 4.0]),
        Column::Numeric(vec![1.0, 3.0, 5.0]),
    ]);

    let dense_model = linear_model(vec![2.0, -1.0]);
    let column_model = |data: &ColumnTable| {
        let preds = (0..MaskableTable::n_rows(data))
            .map(|i| {
                data.row(i)
                    .iter()
                    .zip([2.0, -1.0])
                    .map(|(v, w)| match v {
                        Value::Numeric(x) => x * w,
                        Value::Categorical(_) => unreachable!(),
                    })
                    .sum()
            })
            .collect();
        PredictionOutput::from_column(preds)
    };

    let config = ExplainConfig::builder().exact(true).build().unwrap();
    let dense_exp = KernelExplainer::new(&dense_model, &dense_bg, None, config.clone())
        .unwrap()
        .explain_row(&vec![1.0, 2.0])
        .unwrap();
    let column_exp = KernelExplainer::new(&column_model, &column_bg, None, config)
        .unwrap()
        .explain_row(&vec![Value::Numeric(1.0), Value::Numeric(2.0)])
        .unwrap();

    assert_eq!(dense_exp.beta_matrix(), column_exp.beta_matrix());
}

#[test]
fn categorical_features_explain_cleanly() {
    // One numeric and one categorical feature; the model pays a bonus when
    // the category matches level 1.
    let background = ColumnTable::new(vec![
        Column::Numeric(vec![0.0, 2.0]),
        Column::Categorical(vec![0, 1]),
    ]);
    let model = |data: &ColumnTable| {
        let preds = (0..MaskableTable::n_rows(data))
            .map(|i| {
                let row = data.row(i);
                let base = match row[0] {
                    Value::Numeric(x) => x,
                    Value::Categorical(_) => unreachable!(),
                };
                let bonus = match row[1] {
                    Value::Categorical(1) => 10.0,
                    _ => 0.0,
                };
                base + bonus
            })
            .collect();
        PredictionOutput::from_column(preds)
    };
    let config = ExplainConfig::builder().exact(true).build().unwrap();
    let explainer = KernelExplainer::new(&model, &background, None, config).unwrap();

    let explanation = explainer
        .explain_row(&vec![Value::Numeric(4.0), Value::Categorical(1)])
        .unwrap();
    assert!(explanation.verify_efficiency(1e-10));
    // v0 = (0 + 2 + 10) / 2 = 6; v1 = 14.
    assert!((explanation.v0()[0] - 6.0).abs() < 1e-12);
    assert!((explanation.sum_beta(0) - 8.0).abs() < 1e-10);
    // Numeric gap: 4 − mean(0, 2) = 3; categorical bonus gap: 10 − 5 = 5.
    assert!((explanation.beta(0, 0) - 3.0).abs() < 1e-10);
    assert!((explanation.beta(1, 0) - 5.0).abs() < 1e-10);
}
