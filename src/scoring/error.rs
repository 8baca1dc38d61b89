use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("threshold must be within [0, 1], got {threshold}")]
    InvalidThreshold { threshold: f32 },

    #[error("invalid risk policy: {reason}")]
    InvalidPolicy { reason: String },
}

pub type ScoringResult<T> = Result<T, ScoringError>;
