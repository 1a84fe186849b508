//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Score threshold is NaN, infinite, or outside `[0, 1]`.
    #[error("invalid score threshold {value}: must be a finite number between 0 and 1")]
    InvalidThreshold { value: f64 },

    /// A count that must be at least one was set to zero.
    #[error("{name} must be at least 1")]
    ZeroValue { name: &'static str },

    /// A topic or group name was empty.
    #[error("{name} must not be empty")]
    EmptyValue { name: &'static str },

    /// The accept sink is the inbound topic, so accepted answers would be re-scored forever.
    #[error("validated topic '{topic}' must differ from the input topic")]
    TopicCollision { topic: String },

    /// The selected broker backend was not compiled into this binary.
    #[error("broker backend '{backend}' requires the '{feature}' cargo feature")]
    BackendNotCompiled {
        backend: &'static str,
        feature: &'static str,
    },
}
