use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::hashing::hash_content;
use crate::matching::SourceRef;

use super::error::{CorpusError, CorpusResult};

/// Source tag used when none is given.
pub const DEFAULT_SOURCE: &str = "manual";

/// Language tag used when none is given.
pub const DEFAULT_LANGUAGE: &str = "bangla";

/// A reference document plagiarism checks compare against.
///
/// Derived sentences and embeddings are not stored here; the corpus index computes them
/// lazily and drops them whenever `content` changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub word_count: usize,
    pub language: String,
}

impl CorpusDocument {
    /// Builds a stored document from ingestion input, assigning a fresh id.
    pub fn from_new(new: NewDocument) -> CorpusResult<Self> {
        new.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            word_count: count_words(&new.content),
            title: new.title,
            content: new.content,
            source: new.source,
            // Microsecond precision matches what the disk store persists.
            created_at: Utc::now().trunc_subsecs(6),
            metadata: new.metadata,
            language: new.language,
        })
    }

    /// Replaces the content and recomputes the word count.
    pub fn set_content(&mut self, content: String) {
        self.word_count = count_words(&content);
        self.content = content;
    }

    pub fn source_ref(&self) -> SourceRef {
        SourceRef::new(self.id, self.title.clone())
    }

    /// BLAKE3 digest of `content`.
    pub fn content_hash(&self) -> [u8; 32] {
        hash_content(&self.content)
    }
}

/// Ingestion input for a new corpus document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl NewDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            source: default_source(),
            language: default_language(),
            metadata: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> CorpusResult<()> {
        if self.title.trim().is_empty() {
            return Err(CorpusError::InvalidDocument {
                reason: "title must not be empty".to_string(),
            });
        }
        if self.source.trim().is_empty() {
            return Err(CorpusError::InvalidDocument {
                reason: "source must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Whitespace-delimited word count.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
