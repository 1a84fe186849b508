//! Candidate-vs-reference similarity.
//!
//! The controller only depends on the [`Scorer`] trait: a pure, deterministic function from
//! `(reference, candidate)` to a score in `[0, 1]`. [`LexicalScorer`] is the default
//! implementation wired into the binary; swap in a semantic scorer by implementing the trait.
//!
//! Scores outside `[0, 1]` (or NaN) are rejected by [`ensure_unit_interval`] before routing,
//! since comparing them against the threshold would be meaningless.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod scorer;

#[cfg(test)]
mod tests;

pub use error::ScoringError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{FixedScorer, ScriptedScorer};
pub use scorer::{LexicalScorer, Scorer, ensure_unit_interval};
