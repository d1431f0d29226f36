use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};

/// Row-major dense matrix. Weight matrices are stored as
/// `[output_size][input_size]` so that a layer computes `W · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Xavier (Glorot) uniform initialization.
    ///
    /// Samples every entry from `U(-limit, limit)` with
    /// `limit = sqrt(6 / (fan_in + fan_out))`, where `cols` is the fan-in and
    /// `rows` the fan-out of the layer.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let limit = (6.0 / (rows + cols).max(1) as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for w in row.iter_mut() {
                *w = rng.gen_range(-limit..=limit);
            }
        }
        res
    }

    /// Builds a matrix from nested rows, rejecting ragged or non-finite data.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map(|r| r.len()).unwrap_or(0);

        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(NetError::Configuration(format!(
                "row {i} has {} columns, expected {cols}", row.len()
            )));
        }
        if data.iter().flatten().any(|v| !v.is_finite()) {
            return Err(NetError::Configuration(
                "matrix must contain only finite values".to_owned(),
            ));
        }

        Ok(Matrix { rows, cols, data })
    }

    /// Fails unless the matrix is exactly `rows x cols`.
    pub fn expect_shape(&self, rows: usize, cols: usize, name: &str) -> Result<()> {
        if self.rows != rows || self.cols != cols {
            return Err(NetError::Configuration(format!(
                "{name} is {}x{}, expected {rows}x{cols}", self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// `W · x`. The caller guarantees `x.len() == self.cols`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        self.data.iter()
            .map(|row| row.iter().zip(x).map(|(w, v)| w * v).sum())
            .collect()
    }

    /// `Wᵀ · v`. The caller guarantees `v.len() == self.rows`.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        let mut res = vec![0.0; self.cols];
        for (row, &d) in self.data.iter().zip(v) {
            for (acc, w) in res.iter_mut().zip(row) {
                *acc += w * d;
            }
        }
        res
    }

    /// Outer product `a ⊗ b`, shape `[a.len()][b.len()]`.
    pub fn outer(a: &[f64], b: &[f64]) -> Matrix {
        Matrix {
            rows: a.len(),
            cols: b.len(),
            data: a.iter().map(|x| b.iter().map(|y| x * y).collect()).collect(),
        }
    }

    /// Shapes `[n][1]` column data, the layout used for snapshot biases.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|v| vec![*v]).collect(),
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
