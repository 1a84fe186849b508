//! Environment-backed configuration.
//!
//! Every setting has a default (see [`crate::constants`]). Override with `FEEDBACK_*`
//! environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    CONNECT_RETRY_DELAY_SECS, DEFAULT_BROKER_ADDR, DEFAULT_CONSUMER_GROUP, DEFAULT_FLUSH_EVERY,
    DEFAULT_INPUT_TOPIC, DEFAULT_PUBLISH_ATTEMPTS, DEFAULT_PUBLISH_BACKOFF_MS,
    DEFAULT_QUESTIONS_TOPIC, DEFAULT_VALIDATED_TOPIC, MAX_RETRIES, SCORE_THRESHOLD,
};
use crate::controller::{ControllerSettings, PublishPolicy};
use crate::routing::RoutingPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Broker backend selection.
pub enum BrokerKind {
    #[default]
    /// Apache Kafka (requires the `kafka` feature).
    Kafka,
    /// In-process broker; useful for local runs and tests.
    Memory,
}

impl BrokerKind {
    /// Returns the lowercase name used in `FEEDBACK_BROKER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kafka => "kafka",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for BrokerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kafka" => Ok(Self::Kafka),
            "memory" | "in-memory" | "local" => Ok(Self::Memory),
            _ => Err(format!("unknown broker backend: {}", s)),
        }
    }
}

/// Controller configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FEEDBACK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Broker backend. Default: `kafka`.
    pub broker: BrokerKind,

    /// Bootstrap address of the broker. Default: `kafka:9092`.
    pub broker_addr: String,

    /// Topic this controller consumes. Default: `respuestas_exitosas`.
    pub input_topic: String,

    /// Regeneration sink. Default: `preguntas`.
    pub questions_topic: String,

    /// Accept sink. Default: `respuestas_validadas`.
    pub validated_topic: String,

    /// Consumer group shared by every instance. Default: `flink-processor-group`.
    pub consumer_group: String,

    /// Inclusive acceptance threshold. Default: `0.7`.
    pub score_threshold: f64,

    /// Regenerations allowed per `id`. Default: `2`.
    pub max_retries: u32,

    /// Fixed delay between connection attempts. Default: 5s.
    pub connect_retry_delay: Duration,

    /// Publish attempts before the worker gives up. Default: `3`.
    pub publish_attempts: u32,

    /// Delay between publish attempts. Default: 750ms.
    pub publish_backoff: Duration,

    /// Flush after this many publishes. Default: `1`.
    pub flush_every: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker: BrokerKind::default(),
            broker_addr: DEFAULT_BROKER_ADDR.to_string(),
            input_topic: DEFAULT_INPUT_TOPIC.to_string(),
            questions_topic: DEFAULT_QUESTIONS_TOPIC.to_string(),
            validated_topic: DEFAULT_VALIDATED_TOPIC.to_string(),
            consumer_group: DEFAULT_CONSUMER_GROUP.to_string(),
            score_threshold: SCORE_THRESHOLD,
            max_retries: MAX_RETRIES,
            connect_retry_delay: Duration::from_secs(CONNECT_RETRY_DELAY_SECS),
            publish_attempts: DEFAULT_PUBLISH_ATTEMPTS,
            publish_backoff: Duration::from_millis(DEFAULT_PUBLISH_BACKOFF_MS),
            flush_every: DEFAULT_FLUSH_EVERY,
        }
    }
}

impl Config {
    const ENV_BROKER: &'static str = "FEEDBACK_BROKER";
    const ENV_BROKER_ADDR: &'static str = "FEEDBACK_BROKER_ADDR";
    const ENV_INPUT_TOPIC: &'static str = "FEEDBACK_INPUT_TOPIC";
    const ENV_QUESTIONS_TOPIC: &'static str = "FEEDBACK_QUESTIONS_TOPIC";
    const ENV_VALIDATED_TOPIC: &'static str = "FEEDBACK_VALIDATED_TOPIC";
    const ENV_CONSUMER_GROUP: &'static str = "FEEDBACK_CONSUMER_GROUP";
    const ENV_SCORE_THRESHOLD: &'static str = "FEEDBACK_SCORE_THRESHOLD";
    const ENV_MAX_RETRIES: &'static str = "FEEDBACK_MAX_RETRIES";
    const ENV_CONNECT_RETRY_DELAY_SECS: &'static str = "FEEDBACK_CONNECT_RETRY_DELAY_SECS";
    const ENV_PUBLISH_ATTEMPTS: &'static str = "FEEDBACK_PUBLISH_ATTEMPTS";
    const ENV_PUBLISH_BACKOFF_MS: &'static str = "FEEDBACK_PUBLISH_BACKOFF_MS";
    const ENV_FLUSH_EVERY: &'static str = "FEEDBACK_FLUSH_EVERY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let broker = match env::var(Self::ENV_BROKER) {
            Ok(value) => value
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: Self::ENV_BROKER,
                    value,
                    reason,
                })?,
            Err(_) => defaults.broker,
        };

        let broker_addr = Self::parse_string_from_env(Self::ENV_BROKER_ADDR, defaults.broker_addr);
        let input_topic = Self::parse_string_from_env(Self::ENV_INPUT_TOPIC, defaults.input_topic);
        let questions_topic =
            Self::parse_string_from_env(Self::ENV_QUESTIONS_TOPIC, defaults.questions_topic);
        let validated_topic =
            Self::parse_string_from_env(Self::ENV_VALIDATED_TOPIC, defaults.validated_topic);
        let consumer_group =
            Self::parse_string_from_env(Self::ENV_CONSUMER_GROUP, defaults.consumer_group);

        let score_threshold =
            Self::parse_from_env(Self::ENV_SCORE_THRESHOLD, defaults.score_threshold)?;
        let max_retries = Self::parse_from_env(Self::ENV_MAX_RETRIES, defaults.max_retries)?;
        let connect_retry_delay = Self::parse_from_env(
            Self::ENV_CONNECT_RETRY_DELAY_SECS,
            defaults.connect_retry_delay.as_secs(),
        )
        .map(Duration::from_secs)?;
        let publish_attempts =
            Self::parse_from_env(Self::ENV_PUBLISH_ATTEMPTS, defaults.publish_attempts)?;
        let publish_backoff = Self::parse_from_env(
            Self::ENV_PUBLISH_BACKOFF_MS,
            defaults.publish_backoff.as_millis() as u64,
        )
        .map(Duration::from_millis)?;
        let flush_every = Self::parse_from_env(Self::ENV_FLUSH_EVERY, defaults.flush_every)?;

        Ok(Self {
            broker,
            broker_addr,
            input_topic,
            questions_topic,
            validated_topic,
            consumer_group,
            score_threshold,
            max_retries,
            connect_retry_delay,
            publish_attempts,
            publish_backoff,
            flush_every,
        })
    }

    /// Validates value ranges and topic wiring.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.score_threshold.is_finite() || !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.score_threshold,
            });
        }

        if self.publish_attempts == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_PUBLISH_ATTEMPTS,
            });
        }
        if self.flush_every == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_FLUSH_EVERY,
            });
        }

        for (name, value) in [
            (Self::ENV_BROKER_ADDR, &self.broker_addr),
            (Self::ENV_INPUT_TOPIC, &self.input_topic),
            (Self::ENV_QUESTIONS_TOPIC, &self.questions_topic),
            (Self::ENV_VALIDATED_TOPIC, &self.validated_topic),
            (Self::ENV_CONSUMER_GROUP, &self.consumer_group),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyValue { name });
            }
        }

        if self.validated_topic == self.input_topic {
            return Err(ConfigError::TopicCollision {
                topic: self.validated_topic.clone(),
            });
        }

        if self.broker == BrokerKind::Kafka && !cfg!(feature = "kafka") {
            return Err(ConfigError::BackendNotCompiled {
                backend: BrokerKind::Kafka.as_str(),
                feature: "kafka",
            });
        }

        Ok(())
    }

    /// Threshold and retry bound as a [`RoutingPolicy`].
    pub fn routing_policy(&self) -> RoutingPolicy {
        RoutingPolicy::new(self.score_threshold, self.max_retries)
    }

    /// Everything the controller needs besides its collaborators.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            policy: self.routing_policy(),
            validated_topic: self.validated_topic.clone(),
            questions_topic: self.questions_topic.clone(),
            publish: PublishPolicy {
                attempts: self.publish_attempts,
                backoff: self.publish_backoff,
            },
            flush_every: self.flush_every,
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    reason: e.to_string(),
                    value,
                }),
            Err(_) => Ok(default),
        }
    }
}
