use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{RISK_HIGH_SCORE, RISK_MEDIUM_SCORE};
use crate::matching::{Match, SourceRef};

/// Coarse plagiarism-severity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Buckets a plagiarism score with the default boundaries.
    ///
    /// ```
    /// use plagiarism::scoring::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::from_score(14.9), RiskLevel::Low);
    /// assert_eq!(RiskLevel::from_score(15.0), RiskLevel::Medium);
    /// assert_eq!(RiskLevel::from_score(50.0), RiskLevel::High);
    /// ```
    pub fn from_score(score: f64) -> Self {
        if score >= RISK_HIGH_SCORE {
            RiskLevel::High
        } else if score >= RISK_MEDIUM_SCORE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate view of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub total_sentences: usize,
    pub flagged_sentences: usize,
    /// Distinct corpus documents among the retained matches.
    pub unique_sources: usize,
    /// Longest retained `matched_text`, in chars.
    pub longest_match_length: usize,
    /// Mean best similarity over all sentences; unflagged sentences count as 0.
    pub average_similarity: f64,
    pub risk_level: RiskLevel,
}

impl Analysis {
    /// The analysis of a submission with no sentences.
    pub fn empty() -> Self {
        Self {
            total_sentences: 0,
            flagged_sentences: 0,
            unique_sources: 0,
            longest_match_length: 0,
            average_similarity: 0.0,
            risk_level: RiskLevel::Low,
        }
    }
}

/// Pipeline stage a per-document failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStage {
    Exact,
    Semantic,
}

/// Why a document was dropped from one stage of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The embedding call missed its deadline.
    Timeout,
    /// The embedding provider returned an error.
    ProviderFailure,
    /// The document changed while it was being indexed.
    Stale,
    /// The document is above the exact-scan size guard.
    TooLarge,
    /// A worker task panicked or was cancelled.
    TaskFailed,
}

/// A corpus document that contributed no matches from one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source_id: Uuid,
    pub source_title: String,
    pub stage: ScanStage,
    pub kind: FailureKind,
    pub reason: String,
}

impl SourceFailure {
    pub fn new(
        source: &SourceRef,
        stage: ScanStage,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source.id,
            source_title: source.title.clone(),
            stage,
            kind,
            reason: reason.into(),
        }
    }
}

/// Result of one matching stage against one document.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Matched(Vec<Match>),
    /// The stage was not requested for this check.
    Disabled,
    Failed(SourceFailure),
}

impl ScanOutcome {
    pub fn matches(&self) -> &[Match] {
        match self {
            ScanOutcome::Matched(matches) => matches,
            ScanOutcome::Disabled | ScanOutcome::Failed(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&SourceFailure> {
        match self {
            ScanOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Both stages' outcomes for one corpus document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentScan {
    pub source: SourceRef,
    pub exact: ScanOutcome,
    pub semantic: ScanOutcome,
}

impl DocumentScan {
    pub fn new(source: SourceRef, exact: ScanOutcome, semantic: ScanOutcome) -> Self {
        Self {
            source,
            exact,
            semantic,
        }
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.exact.matches().iter().chain(self.semantic.matches())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SourceFailure> {
        self.exact.failure().into_iter().chain(self.semantic.failure())
    }
}

/// Aggregated outcome of one check.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCheck {
    /// Best match per flagged sentence, in sentence order.
    pub matches: Vec<Match>,
    pub analysis: Analysis,
    /// `flagged / total * 100`.
    pub plagiarism_score: f64,
    pub overall_similarity: f64,
    pub is_plagiarized: bool,
    pub skipped: Vec<SourceFailure>,
}
