//! Catalog Store
//!
//! Loads the category reference table and keeps the deduplicated
//! `(category_id, name)` pairs in first-seen order. The position of an entry
//! is the join key between a similarity score and its category, so the order
//! never changes after construction.

use crate::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column holding the category identifier
pub const ID_COLUMN: &str = "category_id";

/// Column holding the category display name
pub const NAME_COLUMN: &str = "name";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryId {
    Integer(i64),
    String(String),
}

impl CategoryId {
    /// Parse a raw cell: numeric ids become integers, anything else is kept as text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(i) => CategoryId::Integer(i),
            Err(_) => CategoryId::String(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryId::Integer(i) => write!(f, "{}", i),
            CategoryId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for CategoryId {
    fn from(i: i64) -> Self {
        CategoryId::Integer(i)
    }
}

impl From<String> for CategoryId {
    fn from(s: String) -> Self {
        CategoryId::String(s)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        CategoryId::String(s.to_string())
    }
}

/// A single target category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category_id: CategoryId,
    pub name: String,
}

impl CategoryEntry {
    #[inline]
    #[must_use]
    pub fn new(category_id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            name: name.into(),
        }
    }
}

/// Immutable, ordered set of categories
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CategoryEntry>,
}

impl Catalog {
    /// Build a catalog from entries, dropping repeated `(id, name)` pairs.
    ///
    /// The first occurrence of each pair keeps its relative position.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = CategoryEntry>,
    {
        let mut seen = AHashSet::new();
        let entries: Vec<CategoryEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.clone()))
            .collect();

        if entries.is_empty() {
            return Err(Error::DataLoad("catalog contains no categories".to_string()));
        }

        Ok(Self { entries })
    }

    /// Load a catalog from a CSV file with a header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::DataLoad(format!("cannot open {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            categories = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Load a catalog from CSV data.
    ///
    /// Requires the `category_id` and `name` columns; other columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::DataLoad(format!("cannot read header row: {}", e)))?
            .clone();

        let column = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
                .ok_or_else(|| Error::DataLoad(format!("missing required column '{}'", wanted)))
        };
        let id_idx = column(ID_COLUMN)?;
        let name_idx = column(NAME_COLUMN)?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::DataLoad(format!("malformed row: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let raw_id = record.get(id_idx).unwrap_or_default();
            if raw_id.trim().is_empty() {
                return Err(Error::DataLoad(format!("empty {} on line {}", ID_COLUMN, line)));
            }
            let name = record.get(name_idx).unwrap_or_default();
            if name.trim().is_empty() {
                return Err(Error::DataLoad(format!("empty {} on line {}", NAME_COLUMN, line)));
            }

            entries.push(CategoryEntry::new(CategoryId::parse(raw_id), name));
        }

        Self::from_entries(entries)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&CategoryEntry> {
        self.entries.get(index)
    }

    #[inline]
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    /// Category names in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }
}
