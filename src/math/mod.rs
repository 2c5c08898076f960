//! Numeric building blocks shared by the explanation engine.

mod linalg;

pub use linalg::{pseudo_inverse, solve_constrained, LinalgError};
