use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("score {score} is outside [0, 1]")]
    OutOfRange { score: f64 },

    #[error("scoring computation failed: {reason}")]
    ComputationFailed { reason: String },
}
