use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by broker operations.
pub enum BrokerError {
    /// No broker could be reached at the configured address.
    #[error("broker unavailable at '{endpoint}': {message}")]
    Unavailable {
        /// Bootstrap address.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// Client construction or subscription failed for another reason.
    #[error("failed to connect to '{endpoint}': {message}")]
    Connect {
        /// Bootstrap address.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// Receiving from the subscription failed.
    #[error("failed to receive from '{topic}': {message}")]
    Receive {
        /// Subscribed topic.
        topic: String,
        /// Error message.
        message: String,
    },

    /// Storing or committing a consumed offset failed.
    #[error("failed to commit offset {offset} on '{topic}': {message}")]
    Commit {
        /// Topic.
        topic: String,
        /// Offset being committed.
        offset: i64,
        /// Error message.
        message: String,
    },

    /// The record could not be handed to the producer.
    #[error("failed to publish to '{topic}': {message}")]
    Publish {
        /// Destination topic.
        topic: String,
        /// Error message.
        message: String,
    },

    /// Buffered records were not confirmed by the broker.
    #[error("flush failed: {message}")]
    Flush {
        /// Error message.
        message: String,
    },
}

impl BrokerError {
    /// Returns `true` for "no broker reachable" (as opposed to an unexpected failure).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
