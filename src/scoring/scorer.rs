use tracing::trace;

use super::error::ScoringError;

/// Similarity between a reference answer and a generated candidate.
///
/// Implementations must be pure: identical inputs always produce identical scores.
pub trait Scorer: Send + Sync {
    fn score(&self, reference: &str, candidate: &str) -> Result<f64, ScoringError>;
}

impl<S: Scorer + ?Sized> Scorer for std::sync::Arc<S> {
    fn score(&self, reference: &str, candidate: &str) -> Result<f64, ScoringError> {
        (**self).score(reference, candidate)
    }
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(&self, reference: &str, candidate: &str) -> Result<f64, ScoringError> {
        (**self).score(reference, candidate)
    }
}

/// Returns `score` unchanged if it is a finite value in `[0, 1]`.
pub fn ensure_unit_interval(score: f64) -> Result<f64, ScoringError> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(ScoringError::OutOfRange { score })
    }
}

/// Normalized Levenshtein similarity over case-folded, whitespace-collapsed text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    pub fn new() -> Self {
        Self
    }

    fn normalize(text: &str) -> String {
        text.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Scorer for LexicalScorer {
    fn score(&self, reference: &str, candidate: &str) -> Result<f64, ScoringError> {
        let reference = Self::normalize(reference);
        let candidate = Self::normalize(candidate);

        let score = strsim::normalized_levenshtein(&reference, &candidate);

        trace!(
            reference_len = reference.len(),
            candidate_len = candidate.len(),
            score,
            "Lexical similarity computed"
        );

        Ok(score)
    }
}
