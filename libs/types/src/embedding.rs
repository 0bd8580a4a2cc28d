//! Fixed-dimension face feature vectors
//!
//! An embedding is produced by the external embedder from a single face
//! image. All embeddings in one deployment share the same dimensionality
//! D, fixed at store-initialization time; comparing vectors of unequal
//! dimension is a defect, never a "no match".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimensionality mismatch between two vectors that were compared
///
/// This indicates an internal invariant violation (mixed embedder
/// versions or a corrupted template), not user input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("embedding dimension mismatch: expected {expected}, got {got}")]
pub struct DimensionMismatch {
    pub expected: usize,
    pub got: usize,
}

/// A face feature vector of fixed dimensionality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Dimensionality of the vector
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Euclidean distance to another embedding of the same dimension
    pub fn distance(&self, other: &Embedding) -> Result<f32, DimensionMismatch> {
        if self.dim() != other.dim() {
            return Err(DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        let sum: f32 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Ok(sum.sqrt())
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}
