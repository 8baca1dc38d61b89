//! On-disk record for [`DiskCorpusStore`](super::DiskCorpusStore).

use chrono::DateTime;
use rkyv::{Archive, Deserialize, Serialize};
use uuid::Uuid;

use super::error::{CorpusError, CorpusResult};
use super::model::CorpusDocument;

/// A corpus document as persisted with `rkyv`.
///
/// Timestamps are Unix microseconds; metadata is kept as a JSON object string.
///
/// # Example
/// ```rust
/// use plagiarism::corpus::StoredDocument;
///
/// let record = StoredDocument {
///     id: [0; 16],
///     title: "নমুনা".to_string(),
///     content: "একটি নমুনা লেখা।".to_string(),
///     source: "manual".to_string(),
///     language: "bangla".to_string(),
///     created_at_micros: 0,
///     word_count: 2,
///     metadata_json: "{}".to_string(),
/// };
/// assert_eq!(record.word_count, 2);
/// ```
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct StoredDocument {
    /// UUID bytes.
    pub id: [u8; 16],
    pub title: String,
    pub content: String,
    pub source: String,
    pub language: String,
    pub created_at_micros: i64,
    pub word_count: u64,
    pub metadata_json: String,
}

impl StoredDocument {
    pub fn from_document(doc: &CorpusDocument) -> CorpusResult<Self> {
        Ok(Self {
            id: *doc.id.as_bytes(),
            title: doc.title.clone(),
            content: doc.content.clone(),
            source: doc.source.clone(),
            language: doc.language.clone(),
            created_at_micros: doc.created_at.timestamp_micros(),
            word_count: doc.word_count as u64,
            metadata_json: serde_json::to_string(&doc.metadata)?,
        })
    }

    pub fn into_document(self) -> CorpusResult<CorpusDocument> {
        let created_at = DateTime::from_timestamp_micros(self.created_at_micros).ok_or_else(
            || CorpusError::Serialization {
                reason: format!("timestamp out of range: {}", self.created_at_micros),
            },
        )?;

        Ok(CorpusDocument {
            id: Uuid::from_bytes(self.id),
            title: self.title,
            content: self.content,
            source: self.source,
            created_at,
            metadata: serde_json::from_str(&self.metadata_json)?,
            word_count: self.word_count as usize,
            language: self.language,
        })
    }
}
