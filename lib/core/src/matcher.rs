//! Exhaustive cosine matching against the catalog embeddings

use crate::{Error, Result, Vector};

/// Best-scoring catalog position for a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub score: f32,
}

/// Score `query` against every candidate and return the maximum.
///
/// Ties resolve to the lowest index. Zero vectors score `0.0`.
pub fn best_match(query: &Vector, candidates: &[Vector]) -> Result<Match> {
    let mut best: Option<Match> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.dim() != query.dim() {
            return Err(Error::InvalidDimension {
                expected: candidate.dim(),
                actual: query.dim(),
            });
        }

        let score = query.cosine_similarity(candidate);
        match best {
            Some(current) if score <= current.score => {}
            _ => best = Some(Match { index, score }),
        }
    }

    best.ok_or_else(|| Error::Prediction("no catalog vectors to match against".to_string()))
}
