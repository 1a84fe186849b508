//! The unit flowing through the feedback loop.
//!
//! A [`CandidateMessage`] arrives as UTF-8 JSON on the input topic:
//!
//! ```json
//! {"id": 7, "expected": "Paris", "answer": "Paris", "retries": 1}
//! ```
//!
//! `retries` may be absent (treated as `0`). Any other fields the generator attaches are
//! kept untouched and forwarded on both the accept and regeneration paths.

pub mod error;
pub mod ledger;

#[cfg(test)]
mod tests;

pub use error::MessageError;
pub use ledger::RetryLedger;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A generated answer paired with its reference answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMessage {
    /// Opaque identifier of the original question; stable across regenerations.
    pub id: Value,

    /// Reference answer.
    pub expected: String,

    /// Generated candidate.
    pub answer: String,

    /// Prior regeneration attempts for this `id`.
    #[serde(default)]
    pub retries: RetryLedger,

    /// Similarity score; only present on validated output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Fields this stage does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateMessage {
    /// Creates a fresh candidate with no retries and no score.
    pub fn new(id: impl Into<Value>, expected: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expected: expected.into(),
            answer: answer.into(),
            retries: RetryLedger::default(),
            score: None,
            extra: Map::new(),
        }
    }

    /// Sets the retry count (builder-style).
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = RetryLedger::new(retries);
        self
    }

    /// Decodes a broker payload.
    pub fn decode(payload: &[u8]) -> Result<Self, MessageError> {
        serde_json::from_slice(payload).map_err(|source| MessageError::Malformed { source })
    }

    /// Encodes the candidate as UTF-8 JSON.
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        serde_json::to_vec(self).map_err(|source| MessageError::Encode {
            id: self.key(),
            source,
        })
    }

    /// Partition key for this candidate's chain.
    ///
    /// String ids are used verbatim; anything else is rendered as JSON.
    pub fn key(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Accepted output: same payload plus the freshly computed `score`.
    pub fn into_validated(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Regeneration request: same payload, retries replaced by `next`, no score.
    pub fn into_regeneration(mut self, next: RetryLedger) -> Self {
        self.retries = next;
        self.score = None;
        self
    }
}
