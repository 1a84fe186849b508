//! Feedback router library crate (used by the binary and integration tests).
//!
//! Scores generated answers against a reference and routes each one to exactly one of:
//!
//! - the **validated** topic (score at or above the threshold, `score` attached)
//! - the **questions** topic (below threshold, `retries + 1`, sent back for regeneration)
//! - nowhere (below threshold with the retry budget spent; logged and dropped)
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`CandidateMessage`], [`RetryLedger`] - Message payload and its retry count
//! - [`RoutingPolicy`], [`RoutingDecision`] - The accept/regenerate/discard rule
//! - [`FeedbackController`], [`Disposition`], [`RunSummary`] - Per-message orchestration
//!
//! ## Collaborators
//! - [`Scorer`], [`LexicalScorer`] - Similarity scoring
//! - [`BrokerConnector`], [`MessageConsumer`], [`MessagePublisher`] - Broker seam
//! - [`InMemoryBroker`] - In-process backend; `KafkaConnector` behind the `kafka` feature
//! - [`ResilientConnector`] - Fixed-delay, retry-forever connection
//!
//! ## Test/Mock Support
//! Mock scorers are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod broker;
pub mod config;
pub mod connector;
pub mod constants;
pub mod controller;
pub mod message;
pub mod pipeline;
pub mod routing;
pub mod scoring;

#[cfg(feature = "kafka")]
pub use broker::KafkaConnector;
pub use broker::{
    BrokerConnector, BrokerError, Delivery, DeliveryPosition, InMemoryBroker, MessageConsumer,
    MessagePublisher,
};
pub use config::{BrokerKind, Config, ConfigError};
pub use connector::ResilientConnector;
pub use constants::{MAX_RETRIES, SCORE_THRESHOLD};
pub use controller::{
    ControllerError, ControllerSettings, Disposition, FeedbackController, PublishPolicy,
    RunSummary,
};
pub use message::{CandidateMessage, MessageError, RetryLedger};
pub use pipeline::run_feedback_loop;
pub use routing::{RoutingDecision, RoutingPolicy};
#[cfg(any(test, feature = "mock"))]
pub use scoring::{FixedScorer, ScriptedScorer};
pub use scoring::{LexicalScorer, Scorer, ScoringError};
