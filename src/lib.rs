//! # catmatch
//!
//! Maps free-text product descriptions to the closest category of a fixed
//! catalog using sentence embeddings and cosine similarity.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! catmatch --catalog data/oio_category.csv --http-port 5000
//! curl -X POST localhost:5000/predict \
//!      -H 'content-type: application/json' \
//!      -d '{"type": "single", "description": "wasing machn"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use catmatch::prelude::*;
//!
//! # async fn run() -> catmatch::Result<()> {
//! let predictor = CategoryPredictor::from_config(&PredictorConfig::default())?;
//! let result = predictor.predict_single("motr pmp").await?;
//! println!("{} ({:.3})", result.predicted_category_name, result.confidence_score);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `catmatch-core` - Catalog, text normalization, vectors, cosine matching
//! - `catmatch-embedding` - Embedding providers (all-MiniLM-L6-v2, feature hashing)
//! - `catmatch-predictor` - The category predictor pipeline
//! - `catmatch-api` - REST API

// Re-export core types
pub use catmatch_core::{
    best_match, clean, Catalog, CategoryEntry, CategoryId, CorrectionTable, Error, Match,
    PredictionResult, Result, TextNormalizer, Vector, UNKNOWN_CATEGORY,
};

// Re-export embedding providers
pub use catmatch_embedding::{
    create_provider, EmbeddingConfig, EmbeddingProvider, HashingProvider, ProviderKind,
};

// Re-export predictor
pub use catmatch_predictor::{CategoryPredictor, PredictorBuilder, PredictorConfig};

// Re-export API
pub use catmatch_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, CategoryEntry, CategoryId, CategoryPredictor, CorrectionTable,
        EmbeddingConfig, EmbeddingProvider, Error, HashingProvider, PredictionResult,
        PredictorBuilder, PredictorConfig, ProviderKind, Result, RestApi, TextNormalizer,
        Vector,
    };
}
