//! Accept / regenerate / discard decision.
//!
//! Rules are evaluated in order, first match wins:
//!
//! 1. `score >= threshold` → [`RoutingDecision::Accept`]
//! 2. `retries < max_retries` → [`RoutingDecision::Regenerate`] with `retries + 1`
//! 3. otherwise → [`RoutingDecision::Discard`]
//!
//! Acceptance is checked first, so a candidate that clears the threshold on its last
//! allowed attempt is still accepted. A chain therefore sees at most `max_retries + 1`
//! scoring attempts.

pub mod decision;


pub use decision::{RoutingDecision, RoutingPolicy};
