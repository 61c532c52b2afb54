//! # catmatch Predictor
//!
//! Composition root for category prediction. A [`CategoryPredictor`] owns
//! the catalog, the correction table, the embedding provider and the
//! precomputed catalog embeddings, and is shared by handle (`Arc`) with
//! every caller.
//!
//! ## Pipeline
//!
//! ```text
//! description ─> suggestions ─> correct_spelling ─> clean ─> embed ─> best_match ─> result
//!                                                           (blocking pool,
//!                                                            bounded timeout)
//! ```
//!
//! Per-query failures never escape: they are logged and reported as the
//! `"Unknown"` category with a score of `0.0`, so one bad description
//! cannot sink a batch.
//!
//! ## Example
//!
//! ```rust
//! use catmatch_core::{Catalog, CategoryEntry};
//! use catmatch_embedding::HashingProvider;
//! use catmatch_predictor::PredictorBuilder;
//! use std::sync::Arc;
//!
//! let catalog = Catalog::from_entries(vec![
//!     CategoryEntry::new(1i64, "Water Pump"),
//!     CategoryEntry::new(2i64, "Washing Machine"),
//! ]).unwrap();
//! let predictor = PredictorBuilder::new(catalog, Arc::new(HashingProvider::default()))
//!     .build()
//!     .unwrap();
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let result = rt.block_on(predictor.predict_single("wasing machn")).unwrap();
//! assert_eq!(result.predicted_category_name, "Washing Machine");
//! ```

pub mod config;
pub mod predictor;

pub use config::{
    PredictorConfig, DEFAULT_CATALOG_PATH, DEFAULT_ENCODE_TIMEOUT, DEFAULT_MAX_CONCURRENT_ENCODES,
};
pub use predictor::{CategoryPredictor, PredictorBuilder, SELF_TEST_QUERY};
