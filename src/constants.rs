//! Cross-cutting, shared constants.
//!
//! Thresholds, length floors and risk boundaries used by more than one stage of the
//! pipeline live here so the segmenter, matchers and aggregator cannot drift apart.
//!
//! # Length units
//!
//! Every length in this module counts Unicode scalar values (`str::chars`), never bytes.
//! Bangla text is multi-byte in UTF-8, so byte lengths would silently triple every floor.

/// Output dimension of the default multilingual MiniLM sentence model.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Max tokens fed to the sentence model per input.
pub const DEFAULT_MAX_SEQ_LEN: usize = 128;

/// Default similarity threshold for a check request.
pub const DEFAULT_THRESHOLD: f32 = 0.70;

/// Semantic matches at or above this similarity are classified `similar`, below it `paraphrase`.
pub const SIMILAR_CUTOFF: f32 = 0.95;

/// Segmented fragments shorter than this are dropped as noise.
pub const MIN_SENTENCE_CHARS: usize = 10;

/// Sentences shorter than this are excluded from semantic matching.
pub const MIN_SEMANTIC_CHARS: usize = 20;

/// Default floor for the character length of a reported exact run.
pub const DEFAULT_MIN_MATCH_CHARS: usize = 50;

/// Plagiarism scores at or above this are `medium` risk.
pub const RISK_MEDIUM_SCORE: f64 = 15.0;

/// Plagiarism scores at or above this are `high` risk.
pub const RISK_HIGH_SCORE: f64 = 50.0;

/// A check is reported as plagiarized when its score is strictly above this.
pub const PLAGIARIZED_SCORE: f64 = 30.0;

/// Default number of corpus documents whose sentences and embeddings stay cached.
pub const DEFAULT_INDEX_CAPACITY: u64 = 10_000;

/// Default deadline for a single embedding-provider call.
pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 30_000;

/// Default width of the per-check document worker pool.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Corpus documents with more words than this skip the exact-match scan.
pub const DEFAULT_MAX_EXACT_SCAN_WORDS: usize = 20_000;

/// Bangla full stop (dari), appended by the normalizer when text lacks a terminator.
pub const BANGLA_FULL_STOP: char = '।';

/// Sentence-final punctuation recognized by the normalizer and segmenter.
pub const SENTENCE_TERMINATORS: [char; 3] = ['।', '!', '?'];

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// Providers are checked at the index boundary so a model swap that changes `D` fails
/// loudly instead of producing a ragged embedding matrix.
///
/// # Example
///
/// ```
/// use plagiarism::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(384, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
