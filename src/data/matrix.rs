//! Dense row-major matrix used for feature data.
//!
//! The explanation engine only ever stacks and reads `f64` rows, so this is a
//! deliberately small container: contiguous row-major storage with O(1) row
//! access.
//!
//! # Example
//!
//! ```
//! use kernelshap::data::RowMatrix;
//!
//! let m = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
//! assert_eq!(m.row_slice(0), &[1.0, 2.0, 3.0]);
//! assert_eq!(m.get(1, 2), Some(6.0));
//! ```

/// Dense row-major `f64` matrix.
///
/// Rows are contiguous: `data[row * n_cols + col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl RowMatrix {
    /// Create a matrix from row-major data, taking ownership.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n_rows * n_cols`.
    pub fn from_vec(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Self {
        assert_eq!(
            data.len(),
            n_rows * n_cols,
            "Data length {} does not match dimensions {}x{}",
            data.len(),
            n_rows,
            n_cols
        );
        Self {
            data,
            n_rows,
            n_cols,
        }
    }

    /// Create a matrix from a slice of rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have unequal lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            assert_eq!(
                row.len(),
                n_cols,
                "Row length {} does not match first row length {}",
                row.len(),
                n_cols
            );
            data.extend_from_slice(row);
        }
        Self {
            data,
            n_rows,
            n_cols,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (features).
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Get element at (row, col), or `None` if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.n_rows || col >= self.n_cols {
            return None;
        }
        Some(self.data[row * self.n_cols + col])
    }

    /// Get a row as a contiguous slice. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `row >= n_rows`.
    #[inline]
    pub fn row_slice(&self, row: usize) -> &[f64] {
        assert!(row < self.n_rows, "Row index {} out of bounds", row);
        let start = row * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Mean of a column, or `None` for an empty matrix or bad index.
    pub fn col_mean(&self, col: usize) -> Option<f64> {
        if self.n_rows == 0 || col >= self.n_cols {
            return None;
        }
        let sum: f64 = (0..self.n_rows)
            .map(|r| self.data[r * self.n_cols + col])
            .sum();
        Some(sum / self.n_rows as f64)
    }

    /// The underlying row-major data.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_from_vec() {
        let m = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 3);
    }

    #[test]
    #[should_panic(expected = "does not match dimensions")]
    fn create_wrong_size_panics() {
        RowMatrix::from_vec(vec![1.0, 2.0, 3.0], 2, 3);
    }

    #[test]
    fn create_from_rows() {
        let m = RowMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(m.row_slice(1), &[3.0, 4.0]);
    }

    #[test]
    #[should_panic(expected = "does not match first row length")]
    fn ragged_rows_panic() {
        RowMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
    }

    #[test]
    fn get_element() {
        let m = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_eq!(m.get(0, 1), Some(2.0));
        assert_eq!(m.get(1, 0), Some(3.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 2), None);
    }

    #[test]
    fn row_slice_access() {
        let m = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        assert_eq!(m.row_slice(0), &[1.0, 2.0]);
        assert_eq!(m.row_slice(2), &[5.0, 6.0]);
    }

    #[test]
    fn col_mean() {
        let m = RowMatrix::from_vec(vec![1.0, 10.0, 3.0, 20.0], 2, 2);
        assert_eq!(m.col_mean(0), Some(2.0));
        assert_eq!(m.col_mean(1), Some(15.0));
        assert_eq!(m.col_mean(2), None);
    }
}
