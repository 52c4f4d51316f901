//! Dense matrices for the projective transform

use crate::error::{Result, ScanError};

/// Small dense row-major matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero matrix with given dimensions
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create an `n x n` identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from nested rows; every row must have the same length
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != cols) {
            return Err(ScanError::InvalidDimensions(cols, rows.len()));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Homogeneous column vector `[x, y, 1]ᵀ`
    pub fn column3(x: f64, y: f64) -> Self {
        Self {
            rows: 3,
            cols: 1,
            data: vec![x, y, 1.0],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Overwrite element at `(row, col)`
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Multiply every element by `factor`
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    /// Matrix product `self · other`
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(ScanError::DimensionMismatch {
                left_cols: self.cols,
                right_rows: other.rows,
            });
        }

        let mut result = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.get(i, k) * other.get(k, j);
                }
                result.set(i, j, sum);
            }
        }
        Ok(result)
    }

    /// Gauss-Jordan inverse on the augmented matrix `[M | I]`
    ///
    /// Rows are never swapped: an exactly-zero pivot is reported as
    /// [`ScanError::SingularMatrix`] even when a reordering would succeed.
    pub fn invert(&self) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(ScanError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        let width = 2 * n;
        let mut aug = vec![0.0f64; n * width];
        for i in 0..n {
            for j in 0..n {
                aug[i * width + j] = self.get(i, j);
            }
            aug[i * width + n + i] = 1.0;
        }

        for i in 0..n {
            let pivot = aug[i * width + i];
            if pivot == 0.0 {
                return Err(ScanError::SingularMatrix { row: i });
            }
            for j in 0..width {
                aug[i * width + j] /= pivot;
            }

            for k in 0..n {
                if k == i {
                    continue;
                }
                let factor = aug[k * width + i];
                for j in 0..width {
                    aug[k * width + j] -= factor * aug[i * width + j];
                }
            }
        }

        let mut result = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                result.set(i, j, aug[i * width + n + j]);
            }
        }
        Ok(result)
    }

    /// Largest absolute element-wise difference to `other`
    pub fn max_abs_diff(&self, other: &Matrix) -> f64 {
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_by_inverse_is_identity() {
        let m = Matrix::from_rows(&[&[4.0, 7.0, 2.0], &[3.0, 6.0, 1.0], &[2.0, 5.0, 3.0]]).unwrap();
        let inv = m.invert().unwrap();
        let product = m.multiply(&inv).unwrap();
        assert!(product.max_abs_diff(&Matrix::identity(3)) < 1e-9);

        let product = inv.multiply(&m).unwrap();
        assert!(product.max_abs_diff(&Matrix::identity(3)) < 1e-9);
    }

    #[test]
    fn test_inverse_of_larger_matrix() {
        let m = Matrix::from_rows(&[
            &[2.0, 1.0, 0.0, 0.0],
            &[1.0, 3.0, 1.0, 0.0],
            &[0.0, 1.0, 4.0, 1.0],
            &[0.0, 0.0, 1.0, 5.0],
        ])
        .unwrap();
        let product = m.multiply(&m.invert().unwrap()).unwrap();
        assert!(product.max_abs_diff(&Matrix::identity(4)) < 1e-9);
    }

    #[test]
    fn test_zero_pivot_is_fatal_without_reordering() {
        // Invertible, but the first pivot is zero and rows are not swapped
        let m = Matrix::from_rows(&[&[0.0, 1.0], &[1.0, 0.0]]).unwrap();
        match m.invert() {
            Err(ScanError::SingularMatrix { row }) => assert_eq!(row, 0),
            other => panic!("expected singular matrix error, got {:?}", other),
        }
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        assert!(matches!(a.multiply(&b), Err(ScanError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_invert_requires_square() {
        assert!(matches!(Matrix::zeros(2, 3).invert(), Err(ScanError::NotSquare { .. })));
    }

    #[test]
    fn test_multiply_column() {
        let m = Matrix::identity(3).scale(2.0);
        let v = m.multiply(&Matrix::column3(3.0, 4.0)).unwrap();
        assert_eq!(v.get(0, 0), 6.0);
        assert_eq!(v.get(1, 0), 8.0);
        assert_eq!(v.get(2, 0), 2.0);
    }
}
