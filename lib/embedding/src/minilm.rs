//! all-MiniLM-L6-v2 through fastembed (ONNX Runtime)

use crate::{EmbeddingConfig, EmbeddingProvider};
use catmatch_core::{Error, Result, Vector};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Output dimension of all-MiniLM-L6-v2
pub const MINILM_DIM: usize = 384;

pub const MINILM_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Frozen pretrained sentence-embedding model, loaded once
pub struct MiniLmProvider {
    model: TextEmbedding,
}

impl MiniLmProvider {
    /// Load the model, downloading it into the cache directory on first use.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(config.show_download_progress);
        if let Some(cache_dir) = &config.cache_dir {
            options = options.with_cache_dir(cache_dir.clone());
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::ModelLoad(format!("{}: {:#}", MINILM_MODEL_NAME, e)))?;

        tracing::info!(model = MINILM_MODEL_NAME, dim = MINILM_DIM, "embedding model loaded");
        Ok(Self { model })
    }
}

impl EmbeddingProvider for MiniLmProvider {
    fn embed(&self, text: &str) -> Result<Vector> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Prediction("model returned no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let embeddings = self
            .model
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::Prediction(format!("embedding failed: {:#}", e)))?;

        if embeddings.len() != texts.len() {
            return Err(Error::Prediction(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        Ok(embeddings.into_iter().map(Vector::new).collect())
    }

    fn dimensions(&self) -> usize {
        MINILM_DIM
    }

    fn name(&self) -> &str {
        MINILM_MODEL_NAME
    }
}
