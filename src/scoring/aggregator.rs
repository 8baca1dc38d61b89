use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::constants::{PLAGIARIZED_SCORE, RISK_HIGH_SCORE, RISK_MEDIUM_SCORE};
use crate::matching::Match;
use crate::text::Sentence;

use super::error::{ScoringError, ScoringResult};
use super::types::{Analysis, DocumentScan, RiskLevel, ScoredCheck};

/// Checks that a similarity threshold is a finite value in `[0, 1]`.
pub fn validate_threshold(threshold: f32) -> ScoringResult<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(ScoringError::InvalidThreshold { threshold });
    }
    Ok(())
}

/// Score boundaries for risk tiers and the plagiarized flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPolicy {
    /// Scores at or above this are `medium`.
    pub medium: f64,
    /// Scores at or above this are `high`.
    pub high: f64,
    /// Scores strictly above this are plagiarized.
    pub plagiarized: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            medium: RISK_MEDIUM_SCORE,
            high: RISK_HIGH_SCORE,
            plagiarized: PLAGIARIZED_SCORE,
        }
    }
}

impl RiskPolicy {
    pub fn validate(&self) -> ScoringResult<()> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.medium) || !in_range(self.high) || !in_range(self.plagiarized) {
            return Err(ScoringError::InvalidPolicy {
                reason: "boundaries must be within [0, 100]".to_string(),
            });
        }
        if self.medium > self.high {
            return Err(ScoringError::InvalidPolicy {
                reason: format!(
                    "medium boundary {} is above high boundary {}",
                    self.medium, self.high
                ),
            });
        }
        Ok(())
    }

    pub fn classify(&self, score: f64) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn is_plagiarized(&self, score: f64) -> bool {
        score > self.plagiarized
    }
}

/// Similarity used to rank candidates: exact runs always rank as `1.0`.
#[inline]
fn ranking_similarity(candidate: &Match) -> f32 {
    if candidate.is_exact() {
        1.0
    } else {
        candidate.similarity
    }
}

/// Total order over candidates for one sentence; `Greater` means `a` is kept over `b`.
///
/// Higher similarity wins, then exact over semantic, then the longer matched text, then
/// the smaller source id, then the lexicographically smaller source text.
pub fn compare_candidates(a: &Match, b: &Match) -> Ordering {
    ranking_similarity(a)
        .total_cmp(&ranking_similarity(b))
        .then_with(|| a.is_exact().cmp(&b.is_exact()))
        .then_with(|| a.matched_chars().cmp(&b.matched_chars()))
        .then_with(|| b.source_id.cmp(&a.source_id))
        .then_with(|| b.source_text.cmp(&a.source_text))
}

/// Folds per-document match sets into one best match per submission sentence.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    policy: RiskPolicy,
}

impl Aggregator {
    pub fn new(policy: RiskPolicy) -> ScoringResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Selects the best candidate per sentence across every scan and computes the analysis.
    ///
    /// Candidates below `threshold` are ignored. The result is independent of the order of
    /// `scans` and of the order of matches within each scan.
    pub fn aggregate(
        &self,
        sentences: &[Sentence],
        scans: &[DocumentScan],
        threshold: f32,
    ) -> ScoredCheck {
        let total = sentences.len();
        let mut best: Vec<Option<&Match>> = vec![None; total];

        for candidate in scans.iter().flat_map(|scan| scan.matches()) {
            if ranking_similarity(candidate) < threshold {
                continue;
            }
            let Some(slot) = best.get_mut(candidate.submission_sentence_index) else {
                warn!(
                    index = candidate.submission_sentence_index,
                    total, "Match points past the last submission sentence, ignoring"
                );
                continue;
            };
            let replace = match slot {
                Some(current) => compare_candidates(candidate, current) == Ordering::Greater,
                None => true,
            };
            if replace {
                *slot = Some(candidate);
            }
        }

        let matches: Vec<Match> = best.iter().flatten().map(|m| (*m).clone()).collect();
        let flagged = matches.len();

        let similarity_sum: f64 = matches.iter().map(|m| f64::from(ranking_similarity(m))).sum();
        let (plagiarism_score, average_similarity) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                flagged as f64 / total as f64 * 100.0,
                similarity_sum / total as f64,
            )
        };

        let unique_sources = matches
            .iter()
            .map(|m| m.source_id)
            .collect::<HashSet<_>>()
            .len();
        let longest_match_length = matches.iter().map(Match::matched_chars).max().unwrap_or(0);

        let skipped = scans
            .iter()
            .flat_map(|scan| scan.failures())
            .cloned()
            .collect::<Vec<_>>();

        let analysis = Analysis {
            total_sentences: total,
            flagged_sentences: flagged,
            unique_sources,
            longest_match_length,
            average_similarity,
            risk_level: self.policy.classify(plagiarism_score),
        };

        debug!(
            total,
            flagged,
            unique_sources,
            score = plagiarism_score,
            skipped = skipped.len(),
            "Aggregated check"
        );

        ScoredCheck {
            matches,
            analysis,
            plagiarism_score,
            overall_similarity: average_similarity,
            is_plagiarized: self.policy.is_plagiarized(plagiarism_score),
            skipped,
        }
    }
}
