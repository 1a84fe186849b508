use std::collections::HashMap;

use super::error::ScoringError;
use super::scorer::Scorer;

/// Returns the same score for every pair.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer {
    score: f64,
}

impl FixedScorer {
    pub fn new(score: f64) -> Self {
        Self { score }
    }
}

impl Scorer for FixedScorer {
    fn score(&self, _reference: &str, _candidate: &str) -> Result<f64, ScoringError> {
        Ok(self.score)
    }
}

/// Looks scores up by candidate text, falling back to a default.
///
/// Candidates registered with [`ScriptedScorer::fail_on`] return an error instead.
#[derive(Debug, Clone, Default)]
pub struct ScriptedScorer {
    scores: HashMap<String, f64>,
    failures: Vec<String>,
    default: f64,
}

impl ScriptedScorer {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            ..Default::default()
        }
    }

    pub fn with(mut self, candidate: impl Into<String>, score: f64) -> Self {
        self.scores.insert(candidate.into(), score);
        self
    }

    pub fn fail_on(mut self, candidate: impl Into<String>) -> Self {
        self.failures.push(candidate.into());
        self
    }
}

impl Scorer for ScriptedScorer {
    fn score(&self, _reference: &str, candidate: &str) -> Result<f64, ScoringError> {
        if self.failures.iter().any(|c| c == candidate) {
            return Err(ScoringError::ComputationFailed {
                reason: format!("scripted failure for '{candidate}'"),
            });
        }
        Ok(self.scores.get(candidate).copied().unwrap_or(self.default))
    }
}
