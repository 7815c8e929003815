//! Vector storage and exact nearest-neighbour search.
//!
//! Vectors are kept in a single row-major `f32` buffer. Row `i` belongs to
//! chunk `i` of the document store; nothing in here knows about chunks.

mod flat;

pub use flat::FlatIndex;

use crate::error::{FolioError, Result};

/// A dense row-major matrix of `f32` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Build a matrix from a flat row-major buffer.
    pub fn from_flat(rows: usize, dim: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * dim {
            return Err(FolioError::Dimension {
                expected: rows * dim,
                actual: data.len(),
            });
        }
        Ok(Self { rows, dim, data })
    }

    /// Build a matrix from individual rows, which must share one length.
    pub fn from_rows(dim: usize, rows: &[Vec<f32>]) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(FolioError::Dimension {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            dim,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Borrow row `i`.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// The whole buffer, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// One search hit: a row of the index and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row index in the index (equal to the chunk position).
    pub row: usize,
    /// Squared Euclidean distance (lower is closer).
    pub distance: f32,
}

/// Compute the squared Euclidean distance between two vectors.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
