//! Maskable feature tables.
//!
//! The masking step substitutes background values into copies of the explained
//! instance wherever a coalition switches a feature off. [`MaskableTable`] is
//! the seam that lets the engine do this over different physical
//! representations:
//!
//! - [`DenseTable`]: homogeneous numeric matrix, column-aligned fast path.
//! - [`ColumnTable`]: heterogeneous per-column storage (numeric and
//!   categorical columns), masked column by column.
//!
//! Both representations must produce identical masked stacks for equivalent
//! data; the engine does not care which one a model consumes.

use super::coalitions::CoalitionMatrix;
use super::matrix::RowMatrix;

// =============================================================================
// MaskableTable trait
// =============================================================================

/// A read-only feature table the engine can mask against a background.
///
/// `masked_stack` builds the evaluation input for a block of coalitions: for
/// each coalition row `z` it emits one copy of `x` per background row, with
/// feature `j` replaced by the background's value wherever `z[j]` is off.
/// The stack is coalition-major: the `n_rows()` rows belonging to a coalition
/// are contiguous, background order preserved.
pub trait MaskableTable {
    /// Owned row type for the explained instance.
    type Row: Clone;

    /// Number of rows.
    fn n_rows(&self) -> usize;

    /// Number of feature columns.
    fn n_cols(&self) -> usize;

    /// Extract a row.
    fn row(&self, i: usize) -> Self::Row;

    /// Build a single-row table from a row (used to evaluate f at x).
    fn from_row(row: &Self::Row) -> Self;

    /// Whether a row has this table's column schema.
    fn schema_matches(&self, row: &Self::Row) -> bool;

    /// Build the masked stack of `coalitions.n_rows() * self.n_rows()` rows.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `coalitions` do not match this table's schema. The
    /// engine validates schemas up front, so this indicates caller misuse.
    fn masked_stack(&self, x: &Self::Row, coalitions: &CoalitionMatrix) -> Self;
}

// =============================================================================
// DenseTable (numeric fast path)
// =============================================================================

/// Homogeneous numeric table backed by a [`RowMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTable {
    matrix: RowMatrix,
}

impl DenseTable {
    /// Wrap a numeric matrix.
    pub fn new(matrix: RowMatrix) -> Self {
        Self { matrix }
    }

    /// Create from row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_cols`.
    pub fn from_vec(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Self {
        Self {
            matrix: RowMatrix::from_vec(data, n_rows, n_cols),
        }
    }

    /// The backing matrix.
    #[inline]
    pub fn matrix(&self) -> &RowMatrix {
        &self.matrix
    }

    /// Row access as a slice.
    #[inline]
    pub fn row_slice(&self, i: usize) -> &[f64] {
        self.matrix.row_slice(i)
    }
}

impl MaskableTable for DenseTable {
    type Row = Vec<f64>;

    #[inline]
    fn n_rows(&self) -> usize {
        self.matrix.n_rows()
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.matrix.n_cols()
    }

    fn row(&self, i: usize) -> Vec<f64> {
        self.matrix.row_slice(i).to_vec()
    }

    fn from_row(row: &Vec<f64>) -> Self {
        Self {
            matrix: RowMatrix::from_vec(row.clone(), 1, row.len()),
        }
    }

    fn schema_matches(&self, row: &Vec<f64>) -> bool {
        row.len() == self.matrix.n_cols()
    }

    fn masked_stack(&self, x: &Vec<f64>, coalitions: &CoalitionMatrix) -> Self {
        let p = self.matrix.n_cols();
        assert_eq!(
            x.len(),
            p,
            "Instance length {} does not match {} features",
            x.len(),
            p
        );
        assert_eq!(
            coalitions.n_cols(),
            p,
            "Coalition width {} does not match {} features",
            coalitions.n_cols(),
            p
        );
        let n_bg = self.matrix.n_rows();
        let m = coalitions.n_rows();
        let mut data = Vec::with_capacity(m * n_bg * p);
        for z in coalitions.rows() {
            for b in 0..n_bg {
                let bg_row = self.matrix.row_slice(b);
                for j in 0..p {
                    data.push(if z[j] { x[j] } else { bg_row[j] });
                }
            }
        }
        Self {
            matrix: RowMatrix::from_vec(data, m * n_bg, p),
        }
    }
}

// =============================================================================
// ColumnTable (heterogeneous path)
// =============================================================================

/// A single heterogeneous cell value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Numeric feature value.
    Numeric(f64),
    /// Categorical level index.
    Categorical(u32),
}

/// A typed feature column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric column.
    Numeric(Vec<f64>),
    /// Categorical column of level indices.
    Categorical(Vec<u32>),
}

impl Column {
    fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    fn value(&self, i: usize) -> Value {
        match self {
            Column::Numeric(v) => Value::Numeric(v[i]),
            Column::Categorical(v) => Value::Categorical(v[i]),
        }
    }
}

/// Heterogeneous table stored column by column.
///
/// # Example
///
/// ```
/// use kernelshap::data::{Column, ColumnTable, MaskableTable, Value};
///
/// let table = ColumnTable::new(vec![
///     Column::Numeric(vec![1.0, 2.0]),
///     Column::Categorical(vec![0, 3]),
/// ]);
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.row(1), vec![Value::Numeric(2.0), Value::Categorical(3)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl ColumnTable {
    /// Build a table from typed columns.
    ///
    /// # Panics
    ///
    /// Panics if the columns have unequal lengths.
    pub fn new(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map_or(0, Column::len);
        for (j, col) in columns.iter().enumerate() {
            assert_eq!(
                col.len(),
                n_rows,
                "Column {} length {} does not match first column length {}",
                j,
                col.len(),
                n_rows
            );
        }
        Self { columns, n_rows }
    }

    /// Column access.
    #[inline]
    pub fn column(&self, j: usize) -> &Column {
        &self.columns[j]
    }

    /// Convert a purely numeric table to its dense representation.
    ///
    /// Returns `None` if any column is categorical.
    pub fn to_dense(&self) -> Option<DenseTable> {
        let p = self.columns.len();
        let mut data = vec![0.0; self.n_rows * p];
        for (j, col) in self.columns.iter().enumerate() {
            match col {
                Column::Numeric(v) => {
                    for (i, &x) in v.iter().enumerate() {
                        data[i * p + j] = x;
                    }
                }
                Column::Categorical(_) => return None,
            }
        }
        Some(DenseTable::from_vec(data, self.n_rows, p))
    }
}

impl MaskableTable for ColumnTable {
    type Row = Vec<Value>;

    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.columns.len()
    }

    fn row(&self, i: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value(i)).collect()
    }

    fn from_row(row: &Vec<Value>) -> Self {
        let columns = row
            .iter()
            .map(|v| match v {
                Value::Numeric(x) => Column::Numeric(vec![*x]),
                Value::Categorical(x) => Column::Categorical(vec![*x]),
            })
            .collect();
        Self { columns, n_rows: 1 }
    }

    fn schema_matches(&self, row: &Vec<Value>) -> bool {
        row.len() == self.columns.len()
            && self.columns.iter().zip(row).all(|(col, v)| {
                matches!(
                    (col, v),
                    (Column::Numeric(_), Value::Numeric(_))
                        | (Column::Categorical(_), Value::Categorical(_))
                )
            })
    }

    fn masked_stack(&self, x: &Vec<Value>, coalitions: &CoalitionMatrix) -> Self {
        assert!(
            self.schema_matches(x),
            "Instance schema does not match table columns"
        );
        assert_eq!(
            coalitions.n_cols(),
            self.columns.len(),
            "Coalition width {} does not match {} features",
            coalitions.n_cols(),
            self.columns.len()
        );
        let n_bg = self.n_rows;
        let m = coalitions.n_rows();
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(j, col)| {
                // One pass per column; row i of the stack maps to coalition
                // i / n_bg and background row i % n_bg.
                match (col, &x[j]) {
                    (Column::Numeric(bg), Value::Numeric(xj)) => {
                        let mut out = Vec::with_capacity(m * n_bg);
                        for zi in 0..m {
                            let keep = coalitions.row_slice(zi)[j];
                            for bg_value in bg.iter().take(n_bg) {
                                out.push(if keep { *xj } else { *bg_value });
                            }
                        }
                        Column::Numeric(out)
                    }
                    (Column::Categorical(bg), Value::Categorical(xj)) => {
                        let mut out = Vec::with_capacity(m * n_bg);
                        for zi in 0..m {
                            let keep = coalitions.row_slice(zi)[j];
                            for bg_value in bg.iter().take(n_bg) {
                                out.push(if keep { *xj } else { *bg_value });
                            }
                        }
                        Column::Categorical(out)
                    }
                    _ => unreachable!("schema checked above"),
                }
            })
            .collect();
        Self {
            columns,
            n_rows: m * n_bg,
        }
    }
}
