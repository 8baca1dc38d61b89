//! Sentence embeddings.
//!
//! - [`EmbeddingProvider`] is the seam the pipeline embeds through.
//! - [`SentenceEmbedder`] is the candle-backed implementation.
//! - [`EmbeddingMatrix`] stores one embedding per sentence.

/// BERT encoder with mean pooling.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
mod matrix;
/// Candle sentence embedder.
pub mod sentence;
/// Tokenizer loading helpers.
pub mod utils;

#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(test)]
mod tests;

pub use error::EmbeddingError;
pub use matrix::EmbeddingMatrix;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingProvider;
pub use sentence::{
    DEFAULT_MODEL_ID, SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceEmbedder,
    SentenceEmbedderConfig,
};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::constants::validate_embedding_dim;
use crate::hashing::hash_embedding_seed;

/// Batch embedding capability.
///
/// Implementations must be deterministic for a given model version: the same input texts
/// always produce the same vectors. Calls are blocking and run on the blocking pool via
/// [`embed_batch`].
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Model identifier (name and version).
    fn model_id(&self) -> &str;

    /// Output dimension `D`.
    fn dim(&self) -> usize;

    /// Returns `false` when the provider cannot serve requests.
    fn is_ready(&self) -> bool {
        true
    }

    /// Embeds `texts`, returning exactly one `dim()`-length vector per input, in order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Embeds a whole sentence set in one provider call, bounded by `timeout`.
///
/// An empty set never reaches the provider. A call that misses the deadline is reported as
/// [`EmbeddingError::Timeout`]; the blocking task is left to finish on its own.
pub async fn embed_batch(
    provider: &Arc<dyn EmbeddingProvider>,
    texts: Vec<String>,
    timeout: Duration,
) -> Result<EmbeddingMatrix, EmbeddingError> {
    let dim = provider.dim();
    validate_embedding_dim(dim, dim)?;

    if texts.is_empty() {
        return Ok(EmbeddingMatrix::empty(dim));
    }

    let expected = texts.len();
    let worker = Arc::clone(provider);
    let task = tokio::task::spawn_blocking(move || worker.embed(&texts));

    let rows = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => {
            return Err(EmbeddingError::TaskFailed {
                reason: join_err.to_string(),
            });
        }
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(timeout_ms, batch = expected, "Embedding call timed out");
            return Err(EmbeddingError::Timeout { timeout_ms });
        }
    };

    if rows.len() != expected {
        return Err(EmbeddingError::BatchSizeMismatch {
            expected,
            actual: rows.len(),
        });
    }

    let matrix = EmbeddingMatrix::from_rows(rows, dim)?;
    debug!(
        rows = matrix.len(),
        dim,
        model_id = provider.model_id(),
        "Embedded batch"
    );
    Ok(matrix)
}

/// Scales `vector` to unit length in place (zero vectors are left untouched).
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Deterministic pseudo-embedding for `text`, seeded from the model id and the text.
pub fn stub_embedding(model_id: &str, text: &str, dim: usize) -> Vec<f32> {
    let mut state = hash_embedding_seed(model_id, text);
    let mut embedding = Vec::with_capacity(dim);

    for _ in 0..dim {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        embedding.push(value);
    }

    l2_normalize(&mut embedding);
    embedding
}
