use crate::constants::{MAX_RETRIES, SCORE_THRESHOLD};
use crate::message::RetryLedger;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Threshold and retry bound used by [`RoutingPolicy::decide`].
pub struct RoutingPolicy {
    score_threshold: f64,
    max_retries: u32,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            score_threshold: SCORE_THRESHOLD,
            max_retries: MAX_RETRIES,
        }
    }
}

impl RoutingPolicy {
    pub fn new(score_threshold: f64, max_retries: u32) -> Self {
        Self {
            score_threshold,
            max_retries,
        }
    }

    pub fn score_threshold(&self) -> f64 {
        self.score_threshold
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decides where a candidate scored at `score` goes next. Stateless.
    pub fn decide(&self, score: f64, retries: RetryLedger) -> RoutingDecision {
        if score >= self.score_threshold {
            RoutingDecision::Accept { score }
        } else if retries.has_remaining(self.max_retries) {
            RoutingDecision::Regenerate {
                score,
                next: retries.advance(),
            }
        } else {
            RoutingDecision::Discard { score, retries }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Outcome of routing a single scored candidate.
pub enum RoutingDecision {
    /// Publish to the validated sink with `score` attached.
    Accept {
        score: f64,
    },
    /// Publish to the questions sink with `next` as the new retry count.
    Regenerate {
        score: f64,
        next: RetryLedger,
    },
    /// Retry budget spent; log and drop.
    Discard {
        score: f64,
        retries: RetryLedger,
    },
}

impl RoutingDecision {
    /// Score the decision was made on.
    pub fn score(&self) -> f64 {
        match self {
            Self::Accept { score }
            | Self::Regenerate { score, .. }
            | Self::Discard { score, .. } => *score,
        }
    }

    /// Returns `true` if the candidate is accepted.
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept { .. })
    }

    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accept { .. } => "ACCEPT",
            Self::Regenerate { .. } => "REGENERATE",
            Self::Discard { .. } => "DISCARD",
        }
    }
}

impl std::fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept { score } => write!(f, "ACCEPT (score: {:.3})", score),
            Self::Regenerate { score, next } => {
                write!(f, "REGENERATE (score: {:.3}, retry #{})", score, next)
            }
            Self::Discard { score, retries } => {
                write!(f, "DISCARD (score: {:.3}, retries: {})", score, retries)
            }
        }
    }
}
