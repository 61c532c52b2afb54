use catmatch_embedding::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CATALOG_PATH: &str = "data/oio_category.csv";

pub const DEFAULT_ENCODE_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_MAX_CONCURRENT_ENCODES: usize = 16;

/// Everything needed to build a [`CategoryPredictor`](crate::CategoryPredictor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// CSV file with `category_id` and `name` columns
    pub catalog_path: PathBuf,
    pub embedding: EmbeddingConfig,
    /// Upper bound for one model call
    pub encode_timeout_ms: u64,
    /// Model calls allowed on the blocking pool at once
    pub max_concurrent_encodes: usize,
}

impl PredictorConfig {
    #[inline]
    pub fn encode_timeout(&self) -> Duration {
        Duration::from_millis(self.encode_timeout_ms)
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            embedding: EmbeddingConfig::default(),
            encode_timeout_ms: DEFAULT_ENCODE_TIMEOUT.as_millis() as u64,
            max_concurrent_encodes: DEFAULT_MAX_CONCURRENT_ENCODES,
        }
    }
}
