//! # catmatch Core
//!
//! Core library for catmatch, the catalog category matcher.
//!
//! This crate provides the building blocks that do not depend on an
//! embedding backend:
//!
//! - [`Catalog`] - Deduplicated, ordered category reference data
//! - [`TextNormalizer`] - Technical-term spelling correction and cleaning
//! - [`Vector`] - Dense embedding vector with cosine similarity
//! - [`best_match`] - Exhaustive nearest-category search
//! - [`PredictionResult`] - What a prediction reports back
//!
//! ## Example
//!
//! ```rust
//! use catmatch_core::{best_match, Catalog, CategoryEntry, TextNormalizer, Vector};
//!
//! let catalog = Catalog::from_entries(vec![
//!     CategoryEntry::new(1i64, "Water Pump"),
//!     CategoryEntry::new(2i64, "Washing Machine"),
//! ]).unwrap();
//!
//! let normalizer = TextNormalizer::default();
//! assert_eq!(normalizer.correct_spelling("wasing machn"), "washing machine");
//!
//! let catalog_vectors = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![0.0, 1.0])];
//! let m = best_match(&Vector::new(vec![0.1, 0.9]), &catalog_vectors).unwrap();
//! assert_eq!(catalog.get(m.index).unwrap().name, "Washing Machine");
//! ```

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod result;
pub mod vector;

pub use catalog::{Catalog, CategoryEntry, CategoryId};
pub use error::{Error, Result};
pub use matcher::{best_match, Match};
pub use normalizer::{clean, CorrectionTable, TextNormalizer, TECH_CORRECTIONS};
pub use result::{PredictionResult, UNKNOWN_CATEGORY};
pub use vector::Vector;
