use thiserror::Error;
use uuid::Uuid;

use crate::embedding::EmbeddingError;

/// Errors returned by [`CorpusIndex`](super::CorpusIndex).
///
/// Cloneable because every caller waiting on one build receives the same error.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("failed to embed document {id}: {source}")]
    Embedding {
        id: Uuid,
        #[source]
        source: EmbeddingError,
    },

    #[error("document {id} was invalidated while it was being indexed")]
    Stale { id: Uuid },
}

impl IndexError {
    /// Returns `true` when the underlying provider call timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, IndexError::Embedding { source, .. } if source.is_timeout())
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
