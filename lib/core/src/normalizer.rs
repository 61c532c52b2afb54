//! Text Normalizer
//!
//! Table-driven spelling correction for technical terms plus the cleaning
//! step applied to both queries and category names before encoding.
//! Only exact token hits in the table are corrected; there is no fuzzy
//! fallback, so legitimate short words are never rewritten.

use crate::{Error, Result};
use ahash::AHashMap;

/// Known misspellings of technical terms and their corrections
pub const TECH_CORRECTIONS: &[(&str, &str)] = &[
    ("motr", "motor"),
    ("wasing", "washing"),
    ("machn", "machine"),
    ("pmp", "pump"),
    ("dishwshr", "dishwasher"),
    ("blwr", "blower"),
    ("heetr", "heater"),
    ("gyser", "geyser"),
    ("swich", "switch"),
    ("grndr", "grinder"),
    ("compresr", "compressor"),
    ("sensr", "sensor"),
    ("turbin", "turbine"),
    ("reley", "relay"),
    ("circut", "circuit"),
    ("invertr", "inverter"),
    ("modul", "module"),
    ("solr", "solar"),
    ("bearng", "bearing"),
    ("rollr", "roller"),
    ("actuatrr", "actuator"),
    ("dampr", "damper"),
    ("driv", "drive"),
    ("extruuder", "extruder"),
    ("couplng", "coupling"),
    ("bernr", "burner"),
    ("sytem", "system"),
    ("ctrl", "control"),
    ("bord", "board"),
    ("un", "unit"),
    ("fl", "unit"),
];

/// Lowercase, replace everything outside `[a-z0-9]` and whitespace with a
/// space, then trim.
pub fn clean(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.trim().to_string()
}

/// Fixed misspelled-token to corrected-token mapping
#[derive(Debug, Clone)]
pub struct CorrectionTable {
    corrections: AHashMap<String, String>,
}

impl CorrectionTable {
    /// Build a table from `(misspelled, corrected)` pairs.
    ///
    /// Keys are lowercased. A corrected form may not itself be corrected
    /// further, which keeps correction idempotent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let corrections: AHashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_lowercase(), v.as_ref().to_lowercase()))
            .collect();

        for (from, to) in &corrections {
            let chained = corrections.get(to).is_some_and(|next| next != to);
            if from != to && chained {
                return Err(Error::InvalidConfig(format!(
                    "correction '{}' -> '{}' targets another misspelling",
                    from, to
                )));
            }
        }

        Ok(Self { corrections })
    }

    /// The built-in technical-term table
    pub fn builtin() -> Self {
        let corrections = TECH_CORRECTIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { corrections }
    }

    #[inline]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.corrections.get(token).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}

impl Default for CorrectionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Spelling correction and cleaning over a fixed [`CorrectionTable`]
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    table: CorrectionTable,
}

impl TextNormalizer {
    pub fn new(table: CorrectionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CorrectionTable {
        &self.table
    }

    /// See [`clean`].
    #[inline]
    pub fn clean(&self, text: &str) -> String {
        clean(text)
    }

    /// Lowercase, split on whitespace, substitute known misspellings and
    /// rejoin with single spaces.
    pub fn correct_spelling(&self, text: &str) -> String {
        text.to_lowercase()
            .split_whitespace()
            .map(|word| self.table.get(word).unwrap_or(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Human-readable hints for every corrected token, in token order.
    pub fn suggestions_for(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .filter_map(|word| {
                self.table
                    .get(word)
                    .filter(|corrected| *corrected != word)
                    .map(|corrected| format!("'{}' might be '{}'", word, corrected))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_clean() {
        assert_eq!(clean("  Water-Pump (5HP)! "), "water pump  5hp");
        assert_eq!(clean("!!!"), "");
        assert_eq!(clean(""), "");
        assert_eq!(clean("Café"), "caf");
    }

    #[test]
    fn test_clean_keeps_inner_whitespace() {
        assert_eq!(clean("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn test_clean_idempotent_random() {
        let alphabet: Vec<char> = "aZ9 _-./\t\nÉéßİ€,😀x".chars().collect();
        let mut rng = rand::rng();
        for _ in 0..500 {
            let len = rng.random_range(0..24);
            let s: String = (0..len)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect();
            let once = clean(&s);
            assert_eq!(clean(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn test_correct_spelling() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.correct_spelling("Wasing   MACHN"), "washing machine");
        assert_eq!(normalizer.correct_spelling("motr oil"), "motor oil");
        assert_eq!(normalizer.correct_spelling("ctrl bord un"), "control board unit");
        assert_eq!(normalizer.correct_spelling("ceiling fan"), "ceiling fan");
        assert_eq!(normalizer.correct_spelling("   "), "");
    }

    #[test]
    fn test_correction_needs_whole_token() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.correct_spelling("motrs unit"), "motrs unit");
        assert_eq!(normalizer.correct_spelling("motr,"), "motr,");
    }

    #[test]
    fn test_correct_spelling_idempotent() {
        let normalizer = TextNormalizer::default();
        let all_keys: Vec<&str> = TECH_CORRECTIONS.iter().map(|(k, _)| *k).collect();
        let input = all_keys.join(" ");
        let once = normalizer.correct_spelling(&input);
        assert_eq!(normalizer.correct_spelling(&once), once);
    }

    #[test]
    fn test_suggestions() {
        let normalizer = TextNormalizer::default();
        assert_eq!(
            normalizer.suggestions_for("wasing machn"),
            vec![
                "'wasing' might be 'washing'".to_string(),
                "'machn' might be 'machine'".to_string(),
            ]
        );
        assert!(normalizer.suggestions_for("washing machine").is_empty());
    }

    #[test]
    fn test_suggestions_skip_identity_entries() {
        let table = CorrectionTable::from_pairs([("pump", "pump"), ("pmp", "pump")]).unwrap();
        let normalizer = TextNormalizer::new(table);
        assert_eq!(
            normalizer.suggestions_for("PMP pump"),
            vec!["'pmp' might be 'pump'".to_string()]
        );
    }

    #[test]
    fn test_builtin_table_is_idempotent_by_construction() {
        assert!(CorrectionTable::from_pairs(TECH_CORRECTIONS.iter().copied()).is_ok());
        assert_eq!(CorrectionTable::builtin().len(), TECH_CORRECTIONS.len());
    }

    #[test]
    fn test_chained_corrections_rejected() {
        let err = CorrectionTable::from_pairs([("a", "b"), ("b", "c")]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
