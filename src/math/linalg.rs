//! Pseudoinverse and equality-constrained least squares.
//!
//! The weighted system assembled from coalition contributions is symmetric
//! positive semi-definite with rank at most p−1 (the all-ones direction is
//! absorbed by the efficiency constraint), so plain inversion is off the
//! table. The solver goes through the Moore–Penrose pseudoinverse and adds a
//! Lagrange correction so every output column of the solution sums to its
//! constraint value.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Relative cutoff for discarding singular values: `sqrt(machine epsilon)`.
const SV_RELATIVE_CUTOFF: f64 = 1.4901161193847656e-8;

/// Absolute floor below which the constraint denominator counts as zero.
const CONSTRAINT_DENOM_FLOOR: f64 = 1e-12;

/// Errors from the constrained solve.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// `1ᵀ A⁺ 1` vanished, so no solution can satisfy the sum constraint.
    #[error("weighted system cannot satisfy the efficiency constraint")]
    ConstraintUnsatisfiable,
}

/// Moore–Penrose pseudoinverse via SVD.
///
/// Singular values are kept when they exceed `sqrt(eps) * sigma_max`; if none
/// pass, the result is the zero matrix of transposed shape.
pub fn pseudo_inverse(a: &DMatrix<f64>) -> DMatrix<f64> {
    let (n_rows, n_cols) = a.shape();
    let svd = a.clone().svd(true, true);
    let sigma_max = svd
        .singular_values
        .iter()
        .fold(0.0_f64, |acc, &s| acc.max(s));
    let cutoff = SV_RELATIVE_CUTOFF * sigma_max;
    // `pseudo_inverse` only errors for a negative cutoff.
    svd.pseudo_inverse(cutoff)
        .unwrap_or_else(|_| DMatrix::zeros(n_cols, n_rows))
}

/// Solve `A β = b` subject to `1ᵀ β = c` per output column.
///
/// Closed form: `β_k = A⁺ (b_k − s_k 1)` with
/// `s_k = (1ᵀ A⁺ b_k − c_k) / (1ᵀ A⁺ 1)`, the Lagrange-multiplier solution of
/// the least-squares problem with a single equality constraint per column.
///
/// `b` is p×K and `c` has one entry per output column. Rank-deficient `A` is
/// fine (the pseudoinverse picks the minimum-norm solution); only a vanishing
/// `1ᵀ A⁺ 1` is an error.
///
/// # Panics
///
/// Panics if `a` is not square, or the shapes of `a`, `b` and `c` disagree.
pub fn solve_constrained(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    c: &[f64],
) -> Result<DMatrix<f64>, LinalgError> {
    let p = a.nrows();
    assert_eq!(a.ncols(), p, "System matrix must be square");
    assert_eq!(b.nrows(), p, "Right-hand side has {} rows, expected {}", b.nrows(), p);
    assert_eq!(
        b.ncols(),
        c.len(),
        "Constraint has {} entries for {} output columns",
        c.len(),
        b.ncols()
    );

    let a_pinv = pseudo_inverse(a);
    let unconstrained = &a_pinv * b;
    let ones = DVector::from_element(p, 1.0);
    let pinv_ones = &a_pinv * &ones;
    let denom: f64 = pinv_ones.sum();
    if denom.abs() < CONSTRAINT_DENOM_FLOOR || !denom.is_finite() {
        return Err(LinalgError::ConstraintUnsatisfiable);
    }

    let mut beta = unconstrained;
    for (k, &ck) in c.iter().enumerate() {
        let shift = (beta.column(k).sum() - ck) / denom;
        let mut col = beta.column_mut(k);
        col.axpy(-shift, &pinv_ones, 1.0);
    }
    Ok(beta)
}
