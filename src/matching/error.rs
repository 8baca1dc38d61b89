use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Clone, Error)]
pub enum MatchingError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("{side} has {sentences} sentences but {rows} embedding rows")]
    MisalignedEmbeddings {
        side: &'static str,
        sentences: usize,
        rows: usize,
    },

    #[error("embedding dimensions differ: submission {submission}, corpus {corpus}")]
    DimensionMismatch { submission: usize, corpus: usize },
}

pub type MatchingResult<T> = Result<T, MatchingError>;
