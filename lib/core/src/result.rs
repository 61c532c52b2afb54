use crate::catalog::{CategoryEntry, CategoryId};
use serde::{Deserialize, Serialize};

/// Category name reported when a prediction could not be made
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Outcome of matching one description against the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub original_query: String,
    /// The spelling-corrected query that was actually encoded
    pub used_query: String,
    /// `None` only for the [`unknown`](Self::unknown) result
    pub predicted_category_id: Option<CategoryId>,
    pub predicted_category_name: String,
    /// Raw cosine similarity, not a calibrated probability
    pub confidence_score: f32,
    pub spelling_suggestions: Vec<String>,
}

impl PredictionResult {
    pub fn matched(
        original_query: impl Into<String>,
        used_query: impl Into<String>,
        entry: &CategoryEntry,
        confidence_score: f32,
        spelling_suggestions: Vec<String>,
    ) -> Self {
        Self {
            original_query: original_query.into(),
            used_query: used_query.into(),
            predicted_category_id: Some(entry.category_id.clone()),
            predicted_category_name: entry.name.clone(),
            confidence_score,
            spelling_suggestions,
        }
    }

    /// Sentinel returned in place of an error
    pub fn unknown(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            used_query: description.clone(),
            original_query: description,
            predicted_category_id: None,
            predicted_category_name: UNKNOWN_CATEGORY.to_string(),
            confidence_score: 0.0,
            spelling_suggestions: Vec::new(),
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.predicted_category_id.is_none()
    }
}
