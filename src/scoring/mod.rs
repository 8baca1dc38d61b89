//! Per-sentence best-match selection and risk scoring.
//!
//! The [`Aggregator`] consumes one [`DocumentScan`] per corpus document. Failed stages are
//! data ([`ScanOutcome::Failed`]): they contribute no matches and are reported back as
//! skipped sources rather than aborting the check.

pub mod aggregator;
pub mod error;
pub mod types;


pub use aggregator::{Aggregator, RiskPolicy, compare_candidates, validate_threshold};
pub use error::{ScoringError, ScoringResult};
pub use types::{
    Analysis, DocumentScan, FailureKind, RiskLevel, ScanOutcome, ScanStage, ScoredCheck,
    SourceFailure,
};
