use serde::{Deserialize, Serialize};

/// Regeneration count carried on every [`CandidateMessage`](super::CandidateMessage).
///
/// The count only ever moves forward: a regenerated copy carries `advance()` of the
/// original, and the original is dropped. Serialized as a plain non-negative integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RetryLedger(u32);

impl RetryLedger {
    /// Creates a ledger that has already seen `count` regenerations.
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    /// Number of prior regeneration attempts.
    pub const fn count(self) -> u32 {
        self.0
    }

    /// Returns `true` while another regeneration is allowed under `max_retries`.
    pub const fn has_remaining(self, max_retries: u32) -> bool {
        self.0 < max_retries
    }

    /// Ledger for the next attempt in the chain.
    pub const fn advance(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u32> for RetryLedger {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

impl std::fmt::Display for RetryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
