//! Feature data containers.
//!
//! This module provides the data types the explanation engine consumes:
//!
//! - [`RowMatrix`]: dense row-major numeric storage.
//! - [`CoalitionMatrix`]: on-off feature coalition indicators.
//! - [`MaskableTable`]: the seam the masking step is generic over, with the
//!   numeric fast path [`DenseTable`] and the heterogeneous per-column path
//!   [`ColumnTable`].

mod coalitions;
mod matrix;
mod table;

pub use coalitions::CoalitionMatrix;
pub use matrix::RowMatrix;
pub use table::{Column, ColumnTable, DenseTable, MaskableTable, Value};
