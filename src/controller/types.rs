use std::time::Duration;

use crate::constants::{
    DEFAULT_FLUSH_EVERY, DEFAULT_PUBLISH_ATTEMPTS, DEFAULT_PUBLISH_BACKOFF_MS,
    DEFAULT_QUESTIONS_TOPIC, DEFAULT_VALIDATED_TOPIC,
};
use crate::message::RetryLedger;
use crate::routing::RoutingPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Bounded retry for publish and flush.
pub struct PublishPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for PublishPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_PUBLISH_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_PUBLISH_BACKOFF_MS),
        }
    }
}

#[derive(Debug, Clone)]
/// Controller settings (see [`Config::controller_settings`](crate::config::Config::controller_settings)).
pub struct ControllerSettings {
    pub policy: RoutingPolicy,
    pub validated_topic: String,
    pub questions_topic: String,
    pub publish: PublishPolicy,
    /// Flush after this many publishes. `1` flushes before the next message is pulled.
    pub flush_every: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            policy: RoutingPolicy::default(),
            validated_topic: DEFAULT_VALIDATED_TOPIC.to_string(),
            questions_topic: DEFAULT_QUESTIONS_TOPIC.to_string(),
            publish: PublishPolicy::default(),
            flush_every: DEFAULT_FLUSH_EVERY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Terminal outcome of one consumed delivery.
pub enum Disposition {
    /// Published to the validated sink.
    Accepted { score: f64 },
    /// Published to the questions sink carrying `retries`.
    Regenerated { score: f64, retries: RetryLedger },
    /// Retry budget spent; nothing published.
    Discarded { score: f64, retries: RetryLedger },
    /// Payload could not be decoded; skipped.
    Poisoned,
}

impl Disposition {
    /// Number of records this disposition publishes.
    pub fn publishes(&self) -> usize {
        match self {
            Self::Accepted { .. } | Self::Regenerated { .. } => 1,
            Self::Discarded { .. } | Self::Poisoned => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Counters reported when the controller stops.
pub struct RunSummary {
    pub processed: u64,
    pub accepted: u64,
    pub regenerated: u64,
    pub discarded: u64,
    pub poisoned: u64,
}

impl RunSummary {
    pub fn record(&mut self, disposition: &Disposition) {
        self.processed += 1;
        match disposition {
            Disposition::Accepted { .. } => self.accepted += 1,
            Disposition::Regenerated { .. } => self.regenerated += 1,
            Disposition::Discarded { .. } => self.discarded += 1,
            Disposition::Poisoned => self.poisoned += 1,
        }
    }
}
