//! Coalition enumeration and sampling.
//!
//! Coalition space splits into size layers: layer `s` holds the `C(p, s)`
//! coalitions of size `s` with total kernel mass `w_s`. The smallest and
//! largest `degree` layers are cheap to enumerate exhaustively and carry most
//! of the mass, so they get their closed-form weights; the middle layers are
//! sampled with per-size probability proportional to the residual mass and
//! uniformly within a size.
//!
//! # Paired sampling
//!
//! With pairing enabled every draw also emits its complement, which cancels
//! first-order sampling noise because `z zᵀ + ¬z ¬zᵀ` has a closed-form
//! expectation. The requested row count is rounded up to even so pairs never
//! split.

use itertools::Itertools;
use nalgebra::DMatrix;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::CoalitionMatrix;

// =============================================================================
// Exact enumeration
// =============================================================================

/// The coalition sizes enumerated exactly for a hybrid degree.
///
/// Degree `d` covers sizes `1..=d` and `p−d..=p−1`, clamped to the valid
/// range and deduplicated. Degree 0 enumerates nothing; a degree of `p / 2`
/// or more covers every size.
pub fn exact_sizes(p: usize, degree: usize) -> Vec<usize> {
    if p < 2 {
        return Vec::new();
    }
    let d = degree.min(p - 1);
    let mut sizes: Vec<usize> = (1..=d).collect();
    for s in p.saturating_sub(d).max(1)..p {
        if !sizes.contains(&s) {
            sizes.push(s);
        }
    }
    sizes.sort_unstable();
    sizes
}

/// Enumerate every coalition of the given sizes with its contribution weight.
///
/// Each coalition of size `s` weighs `size_weights[s − 1] / C(p, s)`, so an
/// enumerated layer carries exactly its kernel mass under the full-range
/// normalization.
///
/// # Panics
///
/// Panics if a size is outside `1..p`.
pub fn enumerate_layers(
    p: usize,
    sizes: &[usize],
    size_weights: &[f64],
) -> (CoalitionMatrix, Vec<f64>) {
    let mut coalitions = CoalitionMatrix::new(p);
    let mut weights = Vec::new();
    for &s in sizes {
        assert!(s >= 1 && s < p, "Coalition size {} invalid for {} features", s, p);
        let before = coalitions.n_rows();
        for members in (0..p).combinations(s) {
            coalitions.push_members(&members);
        }
        let count = coalitions.n_rows() - before;
        let per_row = size_weights[s - 1] / count as f64;
        weights.extend(std::iter::repeat(per_row).take(count));
    }
    (coalitions, weights)
}

/// Weighted sum of coalition outer products: `Σ_i w_i z_i z_iᵀ`.
pub fn weighted_outer_sum(coalitions: &CoalitionMatrix, weights: &[f64]) -> DMatrix<f64> {
    assert_eq!(
        coalitions.n_rows(),
        weights.len(),
        "Weight count {} does not match {} coalitions",
        weights.len(),
        coalitions.n_rows()
    );
    let p = coalitions.n_cols();
    let mut a = DMatrix::zeros(p, p);
    let mut members = Vec::with_capacity(p);
    for (z, &w) in coalitions.rows().zip(weights) {
        members.clear();
        members.extend(z.iter().enumerate().filter(|(_, &on)| on).map(|(j, _)| j));
        for &j in &members {
            for &l in &members {
                a[(j, l)] += w;
            }
        }
    }
    a
}

// =============================================================================
// SubsetSampler
// =============================================================================

/// One sampled block of coalitions with its weighted system contribution.
#[derive(Debug, Clone)]
pub struct SubsetSample {
    /// Sampled coalition indicators (complement-adjacent when paired).
    pub coalitions: CoalitionMatrix,
    /// Per-row contribution weight, shared by `a_matrix` and the b update.
    pub weights: Vec<f64>,
    /// `Σ_i w_i z_i z_iᵀ` over the sampled rows.
    pub a_matrix: DMatrix<f64>,
}

/// Draws coalitions from the non-enumerated middle size layers.
///
/// Sizes are drawn by inverse CDF over their kernel mass, members uniformly
/// within a size via a partial Fisher–Yates shuffle. Every row carries weight
/// `residual_mass / m`, which makes the exact block plus a sampled block an
/// unbiased estimate of the fully enumerated system.
#[derive(Debug, Clone)]
pub struct SubsetSampler {
    n_features: usize,
    sizes: Vec<usize>,
    /// Cumulative selection probabilities aligned with `sizes`; last entry 1.
    cumulative: Vec<f64>,
    residual_mass: f64,
    paired: bool,
}

impl SubsetSampler {
    /// Build a sampler over the sizes in `1..p` not covered exactly.
    ///
    /// Returns `None` when every size is enumerated (nothing left to sample).
    pub fn new(
        p: usize,
        exact_sizes: &[usize],
        size_weights: &[f64],
        paired: bool,
    ) -> Option<Self> {
        let middle: Vec<usize> = (1..p).filter(|s| !exact_sizes.contains(s)).collect();
        if middle.is_empty() {
            return None;
        }
        let residual_mass: f64 = middle.iter().map(|&s| size_weights[s - 1]).sum();
        let mut cumulative = Vec::with_capacity(middle.len());
        let mut acc = 0.0;
        for &s in &middle {
            acc += size_weights[s - 1] / residual_mass;
            cumulative.push(acc);
        }
        // Guard the inverse CDF against accumulated rounding.
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        Some(Self {
            n_features: p,
            sizes: middle,
            cumulative,
            residual_mass,
            paired,
        })
    }

    /// The sizes this sampler draws from.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Kernel mass left for the sampled layers.
    #[inline]
    pub fn residual_mass(&self) -> f64 {
        self.residual_mass
    }

    /// Number of rows a request for `m` actually produces.
    #[inline]
    pub fn rows_for(&self, m: usize) -> usize {
        if self.paired && m % 2 == 1 {
            m + 1
        } else {
            m
        }
    }

    /// Draw a block of `m` coalitions (rounded up to even when paired).
    pub fn draw(&self, m: usize, rng: &mut Xoshiro256PlusPlus) -> SubsetSample {
        let rows = self.rows_for(m);
        let mut coalitions = CoalitionMatrix::with_capacity(self.n_features, rows);
        if self.paired {
            let mut complement = vec![false; self.n_features];
            for _ in 0..rows / 2 {
                let z = self.draw_one(rng);
                for (c, &on) in complement.iter_mut().zip(&z) {
                    *c = !on;
                }
                coalitions.push_row(&z);
                coalitions.push_row(&complement);
            }
        } else {
            for _ in 0..rows {
                coalitions.push_row(&self.draw_one(rng));
            }
        }
        let weights = vec![self.residual_mass / rows as f64; rows];
        let a_matrix = weighted_outer_sum(&coalitions, &weights);
        SubsetSample {
            coalitions,
            weights,
            a_matrix,
        }
    }

    /// Draw one coalition: size by inverse CDF, members uniformly.
    fn draw_one(&self, rng: &mut Xoshiro256PlusPlus) -> Vec<bool> {
        let u: f64 = rng.gen();
        let idx = self
            .cumulative
            .iter()
            .position(|&c| u < c)
            .unwrap_or(self.sizes.len() - 1);
        let s = self.sizes[idx];

        // Partial Fisher–Yates: the first s entries form a uniform subset.
        let p = self.n_features;
        let mut pool: Vec<usize> = (0..p).collect();
        for i in 0..s {
            let j = rng.gen_range(i..p);
            pool.swap(i, j);
        }
        let mut row = vec![false; p];
        for &j in &pool[..s] {
            row[j] = true;
        }
        row
    }
}
