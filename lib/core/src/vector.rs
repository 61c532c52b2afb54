use serde::{Deserialize, Serialize};

/// A dense embedding vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        dot_product(&self.data, &other.data)
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        dot_product(&self.data, &self.data).sqrt()
    }

    /// Compute cosine similarity with another vector.
    ///
    /// A zero vector on either side, a dimension mismatch, or a non-finite
    /// intermediate result all score `0.0`.
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }

        let norm_a = self.norm();
        let norm_b = other.norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        let score = self.dot(other) / (norm_a * norm_b);
        if score.is_finite() {
            score
        } else {
            0.0
        }
    }

    /// Normalize the vector to unit length
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x *= inv_norm;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

// Two accumulators keep the dependency chain short.
#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let mut chunks_a = a.chunks_exact(2);
    let mut chunks_b = b.chunks_exact(2);
    for (ca, cb) in (&mut chunks_a).zip(&mut chunks_b) {
        sum0 += ca[0] * cb[0];
        sum1 += ca[1] * cb[1];
    }
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum0 += x * y;
    }

    sum0 + sum1
}
