//! Feature-hashing embedder
//!
//! Maps words and padded character trigrams onto a fixed number of buckets
//! with a signed hash, then L2-normalizes. No model files, no network, fully
//! deterministic for a given build. Texts sharing words or word fragments
//! land close together, which is enough for offline deployments and tests.

use crate::EmbeddingProvider;
use catmatch_core::{Error, Result, Vector};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default number of hash buckets
pub const DEFAULT_HASHING_DIM: usize = 256;

const WORD_WEIGHT: f32 = 2.0;
const TRIGRAM_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct HashingProvider {
    dim: usize,
}

impl HashingProvider {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "hashing embedder dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dim })
    }

    fn add_feature<T: Hash + ?Sized>(&self, vector: &mut [f32], feature: &T, weight: f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let hash = hasher.finish();

        let pos = (hash % self.dim as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[pos] += sign * weight;
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self {
            dim: DEFAULT_HASHING_DIM,
        }
    }
}

impl EmbeddingProvider for HashingProvider {
    fn embed(&self, text: &str) -> Result<Vector> {
        let mut components = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        // Blank text stays a zero vector; the matcher scores it 0.0.
        for word in normalized.split_whitespace() {
            self.add_feature(&mut components, word, WORD_WEIGHT);

            let padded: Vec<char> = format!("  {}  ", word).chars().collect();
            for window in padded.windows(3) {
                self.add_feature(&mut components, window, TRIGRAM_WEIGHT);
            }
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "feature-hashing"
    }
}
