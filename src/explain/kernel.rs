//! Kernel SHAP subset-size weights.
//!
//! The weighted least-squares formulation recovers Shapley values when a
//! coalition of size `s` carries kernel mass
//!
//! ```text
//! w'(s) = (p − 1) / (C(p, s) · s · (p − s))
//! ```
//!
//! normalized over the active sizes `1..p`. The binomial coefficient is
//! accumulated in log space so large feature counts never overflow, and the
//! normalization shifts by the maximum before exponentiating.

/// Normalized kernel mass per coalition size.
///
/// Returns a vector indexed by `s − 1` for sizes `1..p`, summing to 1.
///
/// # Panics
///
/// Panics if `p < 2` (no non-degenerate coalitions exist).
pub fn size_weights(p: usize) -> Vec<f64> {
    assert!(p >= 2, "Kernel weights need at least 2 features, got {}", p);
    let ln_weights = ln_size_weights(p);
    normalize_ln(&ln_weights)
}

/// Unnormalized kernel mass per size, in log space.
fn ln_size_weights(p: usize) -> Vec<f64> {
    let ln_p_minus_1 = (p as f64 - 1.0).ln();
    let mut out = Vec::with_capacity(p - 1);
    // ln C(p, 1) = ln p; ln C(p, s+1) = ln C(p, s) + ln(p−s) − ln(s+1).
    let mut ln_binom = (p as f64).ln();
    for s in 1..p {
        out.push(ln_p_minus_1 - ln_binom - (s as f64).ln() - ((p - s) as f64).ln());
        ln_binom += ((p - s) as f64).ln() - (s as f64 + 1.0).ln();
    }
    out
}

/// Exponentiate log weights with a max shift and normalize to sum 1.
fn normalize_ln(ln_weights: &[f64]) -> Vec<f64> {
    let max = ln_weights.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let mut out: Vec<f64> = ln_weights.iter().map(|&w| (w - max).exp()).collect();
    let total: f64 = out.iter().sum();
    for w in &mut out {
        *w /= total;
    }
    out
}
