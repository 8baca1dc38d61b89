use async_trait::async_trait;
use uuid::Uuid;

use super::error::CorpusResult;
use super::model::{CorpusDocument, NewDocument};
use super::search::{CorpusStats, SearchHit, corpus_stats, search_documents};

#[async_trait]
/// CRUD capability over corpus documents keyed by id.
pub trait CorpusStore: Send + Sync {
    /// Snapshot of every document, oldest first.
    async fn list_documents(&self) -> CorpusResult<Vec<CorpusDocument>>;

    /// Fetches a document by id.
    async fn get(&self, id: Uuid) -> CorpusResult<Option<CorpusDocument>>;

    /// Stores a new document and returns it with its assigned id.
    async fn add(&self, document: NewDocument) -> CorpusResult<CorpusDocument>;

    /// Replaces a document's content. Fails with `NotFound` for unknown ids.
    async fn update_content(&self, id: Uuid, content: String) -> CorpusResult<CorpusDocument>;

    /// Deletes a document; returns `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> CorpusResult<bool>;

    /// Case-insensitive substring search (see [`search_documents`]).
    async fn search(
        &self,
        query: &str,
        limit: usize,
        threshold: f64,
    ) -> CorpusResult<Vec<SearchHit>> {
        let documents = self.list_documents().await?;
        Ok(search_documents(&documents, query, limit, threshold))
    }

    /// Corpus statistics (see [`corpus_stats`]).
    async fn stats(&self) -> CorpusResult<CorpusStats> {
        let documents = self.list_documents().await?;
        Ok(corpus_stats(&documents))
    }
}

/// Oldest first, ties broken by id.
pub(crate) fn sort_documents(documents: &mut [CorpusDocument]) {
    documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
