use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a match was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Verbatim word-run overlap.
    Exact,
    /// Semantic match below the `similar` cutoff.
    Paraphrase,
    /// Semantic match at or above the `similar` cutoff.
    Similar,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Paraphrase => "paraphrase",
            MatchType::Similar => "similar",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the corpus document a match points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: Uuid,
    pub title: String,
}

impl SourceRef {
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// One submission sentence matched against one piece of a corpus document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub source_id: Uuid,
    pub source_title: String,
    /// In `[0, 1]`; exact matches are always `1.0`.
    #[serde(rename = "similarity_score")]
    pub similarity: f32,
    /// Submission text that matched.
    pub matched_text: String,
    /// Corpus text it matched.
    pub source_text: String,
    pub submission_sentence_index: usize,
    pub match_type: MatchType,
}

impl Match {
    pub fn is_exact(&self) -> bool {
        self.match_type == MatchType::Exact
    }

    /// Length of `matched_text` in chars.
    pub fn matched_chars(&self) -> usize {
        self.matched_text.chars().count()
    }
}
