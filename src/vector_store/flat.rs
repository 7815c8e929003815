//! Brute-force flat index.
//!
//! Every search scans all rows. There is no incremental insert: the document
//! store refits the vectorizer on each new document, which changes the
//! dimension and invalidates every stored row, so the index is always rebuilt
//! from a complete matrix. Cost is O(rows * dim) per search and per rebuild.

use super::{squared_euclidean, Matrix, Neighbor};
use crate::error::{FolioError, Result};
use std::cmp::Ordering;

/// Exact k-nearest-neighbour index under squared Euclidean distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatIndex {
    vectors: Matrix,
}

impl FlatIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole contents of the index.
    ///
    /// The new matrix is built by the caller before this is called, so the
    /// index holds either the old set or the new set, never a mix.
    pub fn rebuild(&mut self, vectors: Matrix) {
        self.vectors = vectors;
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of the stored vectors.
    pub fn dimension(&self) -> usize {
        self.vectors.dim()
    }

    /// The stored vectors.
    pub fn vectors(&self) -> &Matrix {
        &self.vectors
    }

    /// Find the `k` rows closest to `query`, nearest first.
    ///
    /// Returns `min(k, len)` results. An empty index or `k == 0` gives an
    /// empty result. Equal distances are ordered by row index.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension() {
            return Err(FolioError::Dimension {
                expected: self.dimension(),
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = (0..self.len())
            .map(|row| Neighbor {
                row,
                distance: squared_euclidean(query, self.vectors.row(row)),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.row.cmp(&b.row))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}
