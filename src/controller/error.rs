use thiserror::Error;

use crate::broker::BrokerError;
use crate::message::MessageError;
use crate::scoring::ScoringError;

/// Errors that stop the controller.
///
/// Poison messages are not errors: they are logged and skipped inside
/// [`FeedbackController::handle`](super::FeedbackController::handle).
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("scoring failed for message '{id}': {source}")]
    Scoring {
        id: String,
        #[source]
        source: ScoringError,
    },

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error("publish to '{topic}' failed for message '{id}' after {attempts} attempt(s): {source}")]
    Publish {
        topic: String,
        id: String,
        attempts: u32,
        #[source]
        source: BrokerError,
    },

    #[error("flush failed after {attempts} attempt(s): {source}")]
    Flush {
        attempts: u32,
        #[source]
        source: BrokerError,
    },

    #[error("receive failed: {0}")]
    Receive(#[source] BrokerError),
}
