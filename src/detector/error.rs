use thiserror::Error;

use crate::corpus::CorpusError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// The embedding provider cannot serve requests.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ScoringError),

    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
}

pub type DetectorResult<T> = Result<T, DetectorError>;
