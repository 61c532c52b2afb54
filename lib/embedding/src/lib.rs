//! # catmatch Embedding
//!
//! Text-to-vector encoders behind the [`EmbeddingProvider`] trait.
//!
//! - [`MiniLmProvider`] - all-MiniLM-L6-v2 sentence embeddings via fastembed
//!   (requires the `fastembed` feature, on by default)
//! - [`HashingProvider`] - deterministic offline feature hashing
//!
//! Providers are synchronous; async callers run them on the blocking pool.
//!
//! ```rust
//! use catmatch_embedding::{create_provider, EmbeddingConfig, ProviderKind};
//!
//! let config = EmbeddingConfig {
//!     provider: ProviderKind::Hashing,
//!     ..Default::default()
//! };
//! let provider = create_provider(&config).unwrap();
//! let vector = provider.embed("water pump").unwrap();
//! assert_eq!(vector.dim(), provider.dimensions());
//! ```

pub mod hashing;
#[cfg(feature = "fastembed")]
pub mod minilm;

use catmatch_core::{Result, Vector};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub use hashing::{HashingProvider, DEFAULT_HASHING_DIM};
#[cfg(feature = "fastembed")]
pub use minilm::{MiniLmProvider, MINILM_DIM, MINILM_MODEL_NAME};

/// Encodes text into fixed-length vectors.
///
/// The same text must always produce the same vector for a given provider.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vector>;

    /// Encode several texts. Override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize;

    /// Model identifier, for logs and status endpoints
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// all-MiniLM-L6-v2
    #[default]
    #[serde(rename = "minilm")]
    MiniLm,
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    /// Bucket count for [`ProviderKind::Hashing`]
    pub hashing_dim: usize,
    /// Where model files are cached; fastembed's default when unset
    pub cache_dir: Option<PathBuf>,
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::MiniLm,
            hashing_dim: DEFAULT_HASHING_DIM,
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

/// Create the configured provider. Fails with `ModelLoad` if the backend
/// cannot be initialised.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Hashing => Arc::new(HashingProvider::new(config.hashing_dim)?),
        #[cfg(feature = "fastembed")]
        ProviderKind::MiniLm => Arc::new(MiniLmProvider::new(config)?),
        #[cfg(not(feature = "fastembed"))]
        ProviderKind::MiniLm => {
            return Err(catmatch_core::Error::ModelLoad(
                "built without the `fastembed` feature".to_string(),
            ))
        }
    };
    Ok(provider)
}
