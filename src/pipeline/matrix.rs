//! Dense row-major feature matrix

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};

/// Row-major `f64` matrix. One row per record, one column per schema feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl Matrix {
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            data: vec![0.0; n_rows * n_cols],
            n_rows,
            n_cols,
        }
    }

    /// Build from owned rows. All rows must have the same width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> PipelineResult<Self> {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(PipelineError::SchemaMismatch {
                    expected: n_cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { data, n_rows, n_cols })
    }

    /// Single-row matrix from a feature vector
    pub fn from_row(row: &[f64]) -> Self {
        Self {
            data: row.to_vec(),
            n_rows: 1,
            n_cols: row.len(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n_cols + j]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// Append a row; panics in debug builds if the width is wrong
    pub fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.n_cols);
        self.data.extend_from_slice(row);
        self.n_rows += 1;
    }

    /// New matrix containing the given rows, in order
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Matrix {
            data,
            n_rows: indices.len(),
            n_cols: self.n_cols,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Fail with `SchemaMismatch` unless the matrix has `expected` columns
    pub fn ensure_width(&self, expected: usize) -> PipelineResult<()> {
        if self.n_cols != expected {
            return Err(PipelineError::SchemaMismatch {
                expected,
                found: self.n_cols,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_access() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.get(0, 1), 2.0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(PipelineError::SchemaMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_select_rows_and_push() {
        let mut m = Matrix::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let picked = m.select_rows(&[2, 0]);
        assert_eq!(picked.as_slice(), &[3.0, 1.0]);

        m.push_row(&[4.0]);
        assert_eq!(m.n_rows(), 4);
        assert_eq!(m.row(3), &[4.0]);
    }
}
