//! Cross-cutting, shared constants.
//!
//! These are the defaults behind [`Config`](crate::config::Config). Everything here can be
//! overridden through `FEEDBACK_*` environment variables; code that needs a value at runtime
//! should read it from the config rather than from this module.

use std::time::Duration;

pub const DEFAULT_BROKER_ADDR: &str = "kafka:9092";

/// Inbound subscription: answers produced by the generator.
pub const DEFAULT_INPUT_TOPIC: &str = "respuestas_exitosas";
/// Regeneration sink, consumed by the upstream question generator.
pub const DEFAULT_QUESTIONS_TOPIC: &str = "preguntas";
/// Accept sink, consumed by the persistence stage.
pub const DEFAULT_VALIDATED_TOPIC: &str = "respuestas_validadas";

pub const DEFAULT_CONSUMER_GROUP: &str = "flink-processor-group";

/// Inclusive acceptance threshold.
pub const SCORE_THRESHOLD: f64 = 0.7;

/// Number of regenerations allowed per `id` before the chain is discarded.
pub const MAX_RETRIES: u32 = 2;

pub const CONNECT_RETRY_DELAY_SECS: u64 = 5;
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(CONNECT_RETRY_DELAY_SECS);

pub const DEFAULT_PUBLISH_ATTEMPTS: u32 = 3;
pub const DEFAULT_PUBLISH_BACKOFF_MS: u64 = 750;

/// Flush after every publish: a decided message is durable before the next one is pulled.
pub const DEFAULT_FLUSH_EVERY: u32 = 1;
