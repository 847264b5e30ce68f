//! Sparse row matrix for target distributions.
//!
//! Target distributions over the vocabulary are almost always one-hot, so the
//! trainer keeps them as per-row (column, value) pairs. The only place a dense
//! batch×V buffer is materialized is the elementwise log/multiply inside the
//! cross-entropy objective; the backward pass subtracts targets by scattering
//! into the prediction buffer instead.

/// One sparse row: parallel column indices and values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    /// Column indices with non-zero entries, strictly less than the width.
    pub cols: Vec<usize>,
    /// Values at those columns.
    pub vals: Vec<f32>,
}

impl SparseRow {
    /// One-hot row: a single 1.0 at `col`.
    pub fn one_hot(col: usize) -> Self {
        Self {
            cols: vec![col],
            vals: vec![1.0],
        }
    }
}

/// Row-sparse matrix with a fixed column count.
#[derive(Debug, Clone)]
pub struct SparseRowMatrix {
    rows: Vec<SparseRow>,
    cols: usize,
}

impl SparseRowMatrix {
    /// Create an empty matrix with `cols` columns.
    pub fn new(cols: usize) -> Self {
        Self {
            rows: Vec::new(),
            cols,
        }
    }

    /// Build a one-hot matrix from target word indices.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn from_one_hot(targets: &[usize], cols: usize) -> Self {
        let rows = targets
            .iter()
            .map(|&col| {
                assert!(col < cols, "target index {} out of range for {} columns", col, cols);
                SparseRow::one_hot(col)
            })
            .collect();
        Self { rows, cols }
    }

    /// Append a row.
    ///
    /// # Panics
    ///
    /// Panics if the row's indices and values differ in length or any index
    /// is out of range.
    pub fn push_row(&mut self, row: SparseRow) {
        assert_eq!(row.cols.len(), row.vals.len(), "row indices/values length mismatch");
        assert!(
            row.cols.iter().all(|&c| c < self.cols),
            "row index out of range for {} columns",
            self.cols
        );
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// Borrow a row.
    pub fn row(&self, i: usize) -> &SparseRow {
        &self.rows[i]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &SparseRow> {
        self.rows.iter()
    }

    /// Gather a subset of rows into a new matrix, in the given order.
    pub fn gather(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            cols: self.cols,
        }
    }

    /// Materialize to a dense row-major buffer.
    ///
    /// This is the single densification point in the trainer; everything else
    /// iterates the sparse entries directly.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0f32; self.rows.len() * self.cols];
        for (i, row) in self.rows.iter().enumerate() {
            let offset = i * self.cols;
            for (&col, &val) in row.cols.iter().zip(&row.vals) {
                dense[offset + col] = val;
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_one_hot() {
        let m = SparseRowMatrix::from_one_hot(&[2, 0, 1], 3);
        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.num_cols(), 3);
        assert_eq!(m.row(0), &SparseRow::one_hot(2));
    }

    #[test]
    fn test_to_dense() {
        let m = SparseRowMatrix::from_one_hot(&[1, 0], 3);
        assert_eq!(m.to_dense(), vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_gather_order() {
        let m = SparseRowMatrix::from_one_hot(&[0, 1, 2, 3], 4);
        let g = m.gather(&[3, 1]);
        assert_eq!(g.num_rows(), 2);
        assert_eq!(g.row(0), &SparseRow::one_hot(3));
        assert_eq!(g.row(1), &SparseRow::one_hot(1));
    }

    #[test]
    fn test_push_row_general_distribution() {
        let mut m = SparseRowMatrix::new(4);
        m.push_row(SparseRow {
            cols: vec![0, 3],
            vals: vec![0.5, 0.5],
        });
        let dense = m.to_dense();
        assert_eq!(dense, vec![0.5, 0.0, 0.0, 0.5]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_index_panics() {
        SparseRowMatrix::from_one_hot(&[5], 3);
    }
}
