use crate::error::{Error, Result};

/// Dense row-major matrix of `f64` values.
///
/// A matrix with `cols == 1` doubles as a column vector (biases, activations).
/// All binary operations check shapes up front and return a fresh matrix;
/// only [`Matrix::set`] mutates in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Build a matrix from row-major data.
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Matrix> {
        if data.len() != rows * cols {
            return Err(Error::Shape(format!(
                "data length {} does not fit a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Build an n×1 column vector.
    pub fn column(data: Vec<f64>) -> Matrix {
        let rows = data.len();
        Matrix {
            data,
            rows,
            cols: 1,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major view of the entries.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_index(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// In-place indexed assignment, the only mutating operation.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_index(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise scalar multiply.
    pub fn scale(&self, k: f64) -> Matrix {
        self.map(|x| x * k)
    }

    /// Standard matrix product; requires `self.cols == other.rows`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::Shape(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut result = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                result[i * other.cols + j] = sum;
            }
        }
        Ok(Matrix {
            data: result,
            rows: self.rows,
            cols: other.cols,
        })
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.rows * self.cols];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Elementwise transform.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Elementwise combination of two equal-shaped matrices.
    pub fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Matrix, f: F) -> Result<Matrix> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(Error::Shape(format!(
                "{}x{} vs {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Elementwise product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Copy of row `i` as a 1×cols matrix.
    pub fn row(&self, i: usize) -> Result<Matrix> {
        self.check_index(i, 0)?;
        let start = i * self.cols;
        Ok(Matrix {
            data: self.data[start..start + self.cols].to_vec(),
            rows: 1,
            cols: self.cols,
        })
    }

    /// Stack row matrices with equal column counts into one matrix.
    /// Used to assemble a mini-batch from individual example rows.
    pub fn stack_rows(rows: &[Matrix]) -> Result<Matrix> {
        let first = rows
            .first()
            .ok_or_else(|| Error::Shape("cannot stack zero rows".to_owned()))?;
        let cols = first.cols;
        let mut data = Vec::with_capacity(rows.iter().map(|r| r.data.len()).sum());
        let mut total_rows = 0;
        for row in rows {
            if row.cols != cols {
                return Err(Error::Shape(format!(
                    "stacked rows must share a column count: {} vs {}",
                    cols, row.cols
                )));
            }
            data.extend_from_slice(&row.data);
            total_rows += row.rows;
        }
        Ok(Matrix {
            data,
            rows: total_rows,
            cols,
        })
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::Index {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}
