use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::error::{CorpusError, CorpusResult};
use super::model::{CorpusDocument, NewDocument};
use super::store::{CorpusStore, sort_documents};

/// Process-local corpus store.
#[derive(Debug, Default)]
pub struct InMemoryCorpusStore {
    documents: RwLock<HashMap<Uuid, CorpusDocument>>,
}

impl InMemoryCorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `documents`.
    pub fn with_documents(documents: impl IntoIterator<Item = CorpusDocument>) -> Self {
        Self {
            documents: RwLock::new(documents.into_iter().map(|doc| (doc.id, doc)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl CorpusStore for InMemoryCorpusStore {
    async fn list_documents(&self) -> CorpusResult<Vec<CorpusDocument>> {
        let mut documents: Vec<_> = self.documents.read().values().cloned().collect();
        sort_documents(&mut documents);
        Ok(documents)
    }

    async fn get(&self, id: Uuid) -> CorpusResult<Option<CorpusDocument>> {
        Ok(self.documents.read().get(&id).cloned())
    }

    async fn add(&self, document: NewDocument) -> CorpusResult<CorpusDocument> {
        let document = CorpusDocument::from_new(document)?;
        debug!(id = %document.id, words = document.word_count, "Added document to memory store");
        self.documents.write().insert(document.id, document.clone());
        Ok(document)
    }

    async fn update_content(&self, id: Uuid, content: String) -> CorpusResult<CorpusDocument> {
        let mut documents = self.documents.write();
        let document = documents.get_mut(&id).ok_or(CorpusError::NotFound { id })?;
        document.set_content(content);
        Ok(document.clone())
    }

    async fn delete(&self, id: Uuid) -> CorpusResult<bool> {
        Ok(self.documents.write().remove(&id).is_some())
    }
}
