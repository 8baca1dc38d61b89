use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EMBED_TIMEOUT_MS, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_EXACT_SCAN_WORDS,
    DEFAULT_MIN_MATCH_CHARS, DEFAULT_THRESHOLD,
};
use crate::matching::Match;
use crate::scoring::{Analysis, ScoredCheck, SourceFailure};

/// Settings for [`PlagiarismDetector`](super::PlagiarismDetector).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Char floor for exact runs.
    pub min_match_chars: usize,
    /// Corpus documents scanned concurrently.
    pub max_concurrency: usize,
    /// Deadline for embedding the submission.
    pub embed_timeout: Duration,
    /// Documents with more words skip the exact scan.
    pub max_exact_scan_words: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_match_chars: DEFAULT_MIN_MATCH_CHARS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            embed_timeout: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
            max_exact_scan_words: DEFAULT_MAX_EXACT_SCAN_WORDS,
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_check_paraphrase() -> bool {
    true
}

/// One submission to score against the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub text: String,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Run semantic matching in addition to exact matching.
    #[serde(default = "default_check_paraphrase")]
    pub check_paraphrase: bool,
}

impl CheckRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            threshold: DEFAULT_THRESHOLD,
            check_paraphrase: true,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_paraphrase(mut self, enabled: bool) -> Self {
        self.check_paraphrase = enabled;
        self
    }
}

/// Scored result of a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub overall_similarity: f64,
    pub plagiarism_score: f64,
    pub is_plagiarized: bool,
    /// Best match per flagged sentence, in sentence order.
    pub matches: Vec<Match>,
    pub analysis: Analysis,
    pub processing_time_seconds: f64,
    /// Documents that contributed nothing from one stage, and why.
    #[serde(default)]
    pub skipped_sources: Vec<SourceFailure>,
}

impl CheckResponse {
    /// Response for a submission with no sentences.
    pub fn empty(elapsed: Duration) -> Self {
        Self {
            overall_similarity: 0.0,
            plagiarism_score: 0.0,
            is_plagiarized: false,
            matches: Vec::new(),
            analysis: Analysis::empty(),
            processing_time_seconds: elapsed.as_secs_f64(),
            skipped_sources: Vec::new(),
        }
    }

    pub fn from_scored(scored: ScoredCheck, elapsed: Duration) -> Self {
        Self {
            overall_similarity: scored.overall_similarity,
            plagiarism_score: scored.plagiarism_score,
            is_plagiarized: scored.is_plagiarized,
            matches: scored.matches,
            analysis: scored.analysis,
            processing_time_seconds: elapsed.as_secs_f64(),
            skipped_sources: scored.skipped,
        }
    }
}
