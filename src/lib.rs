//! Bangla/English plagiarism scoring library (used by the CLI and integration tests).
//!
//! # Pipeline
//!
//! A check runs Normalize → Segment → {exact scan, semantic scan} per corpus document →
//! Aggregate. The exports are organized by stage:
//!
//! ## Text
//! - [`normalize`], [`segment`], [`SegmentedText`], [`Sentence`] - cleaning and segmentation
//!
//! ## Matching
//! - [`find_exact_matches`] - shared word runs
//! - [`SemanticMatcher`], [`match_embedded`] - cosine matching over sentence embeddings
//!
//! ## Embedding & Index
//! - [`EmbeddingProvider`], [`SentenceEmbedder`] - sentence embeddings
//! - [`CorpusIndex`] - cached per-document sentences and embeddings
//!
//! ## Scoring & Checks
//! - [`Aggregator`], [`RiskLevel`], [`Analysis`] - best-match selection and risk tiers
//! - [`PlagiarismDetector`], [`CheckRequest`], [`CheckResponse`] - the check entry point
//!
//! ## Corpus
//! - [`CorpusStore`], [`InMemoryCorpusStore`], [`DiskCorpusStore`] - document storage
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod detector;
pub mod embedding;
pub mod hashing;
pub mod index;
pub mod matching;
pub mod scoring;
pub mod text;

pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use corpus::{
    CorpusDocument, CorpusError, CorpusStats, CorpusStore, DiskCorpusStore, ImportReport,
    InMemoryCorpusStore, NewDocument, SearchHit,
};
pub use detector::{CheckRequest, CheckResponse, DetectorConfig, DetectorError, PlagiarismDetector};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingProvider;
pub use embedding::{
    EmbeddingError, EmbeddingMatrix, EmbeddingProvider, SentenceEmbedder, SentenceEmbedderConfig,
};
pub use hashing::hash_content;
pub use index::{CorpusIndex, IndexConfig, IndexError, IndexedDocument};
pub use matching::{
    ExactRun, Match, MatchType, MatchingError, SemanticMatcher, SourceRef, find_exact_matches,
    match_embedded,
};
pub use scoring::{
    Aggregator, Analysis, DocumentScan, RiskLevel, ScanOutcome, ScoringError, SourceFailure,
};
pub use text::{SegmentedText, Sentence, normalize, segment};
