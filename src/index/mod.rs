//! Per-document cache of sentences and sentence embeddings.
//!
//! Entries are keyed by `(document id, BLAKE3 of content)`, so a content edit can never be
//! served from an older entry. Builds go through [`moka::future::Cache::try_get_with`], which
//! gives at most one concurrent build per key: later callers wait for and share the
//! in-flight result.
//!
//! # Staleness
//!
//! Every document id carries an epoch that [`CorpusIndex::invalidate`] and
//! [`CorpusIndex::remove_from_index`] bump. A caller that captured the epoch before
//! reading the document passes it to [`CorpusIndex::ensure_indexed_at`]; if the epoch moves
//! while the build runs, the result is discarded and [`IndexError::Stale`] is returned, and
//! the next call rebuilds from fresh content.
//!
//! Removed ids keep their epoch slot only while a build for them is still running.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{IndexError, IndexResult};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::future::Cache;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::constants::{DEFAULT_EMBED_TIMEOUT_MS, DEFAULT_INDEX_CAPACITY};
use crate::corpus::CorpusDocument;
use crate::embedding::{EmbeddingMatrix, EmbeddingProvider, embed_batch};
use crate::hashing::short_hex;
use crate::text::{SegmentedText, Sentence};

type IndexKey = (Uuid, [u8; 32]);

/// Sentences and embeddings derived from one version of a corpus document.
///
/// Row `i` of `embeddings` is the embedding of `sentences()[i]`.
#[derive(Debug)]
pub struct IndexedDocument {
    pub id: Uuid,
    pub content_hash: [u8; 32],
    pub text: SegmentedText,
    pub embeddings: EmbeddingMatrix,
}

impl IndexedDocument {
    pub fn sentences(&self) -> &[Sentence] {
        self.text.sentences()
    }
}

#[derive(Debug, Clone)]
/// Sizing and timeout settings for [`CorpusIndex`].
pub struct IndexConfig {
    /// Max documents kept cached.
    pub capacity: u64,
    /// Deadline for one document's embedding call.
    pub embed_timeout: Duration,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INDEX_CAPACITY,
            embed_timeout: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    epoch: u64,
    hash: Option<[u8; 32]>,
    in_flight: usize,
    removed: bool,
}

type Slots = Mutex<HashMap<Uuid, Slot>>;

/// Holds a slot open for the duration of one build; the last guard out prunes a removed id.
struct BuildGuard<'a> {
    slots: &'a Slots,
    id: Uuid,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        let prune = match slots.get_mut(&self.id) {
            Some(slot) => {
                slot.in_flight = slot.in_flight.saturating_sub(1);
                slot.removed && slot.in_flight == 0
            }
            None => false,
        };
        if prune {
            slots.remove(&self.id);
        }
    }
}

/// Snapshot of per-document epochs, taken before reading documents from the store.
#[derive(Debug, Clone, Default)]
pub struct EpochSnapshot(HashMap<Uuid, u64>);

impl EpochSnapshot {
    /// Epoch of `id` at snapshot time (0 for ids never seen).
    pub fn epoch(&self, id: Uuid) -> u64 {
        self.0.get(&id).copied().unwrap_or(0)
    }
}

/// Cache of derived sentence/embedding pairs, shared by every check.
pub struct CorpusIndex {
    cache: Cache<IndexKey, Arc<IndexedDocument>>,
    slots: Slots,
    provider: Arc<dyn EmbeddingProvider>,
    config: IndexConfig,
    builds: AtomicU64,
}

impl std::fmt::Debug for CorpusIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusIndex")
            .field("entries", &self.cache.entry_count())
            .field("model_id", &self.provider.model_id())
            .field("config", &self.config)
            .finish()
    }
}

impl CorpusIndex {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: IndexConfig) -> Self {
        let cache = Cache::builder().max_capacity(config.capacity).build();
        Self {
            cache,
            slots: Mutex::new(HashMap::new()),
            provider,
            config,
            builds: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Current epoch of `id`.
    pub fn epoch(&self, id: Uuid) -> u64 {
        self.slots.lock().get(&id).map_or(0, |slot| slot.epoch)
    }

    /// Captures every document's epoch.
    pub fn epoch_snapshot(&self) -> EpochSnapshot {
        EpochSnapshot(
            self.slots
                .lock()
                .iter()
                .map(|(id, slot)| (*id, slot.epoch))
                .collect(),
        )
    }

    /// Returns the cached entry for this version of `document`, building it if needed.
    pub async fn ensure_indexed(
        &self,
        document: &CorpusDocument,
    ) -> IndexResult<Arc<IndexedDocument>> {
        let epoch = self.epoch(document.id);
        self.ensure_indexed_at(document, epoch).await
    }

    /// Like [`ensure_indexed`](Self::ensure_indexed), but fails with [`IndexError::Stale`]
    /// if `document` was invalidated after `epoch` was observed.
    #[instrument(skip(self, document), fields(doc_id = %document.id))]
    pub async fn ensure_indexed_at(
        &self,
        document: &CorpusDocument,
        epoch: u64,
    ) -> IndexResult<Arc<IndexedDocument>> {
        let id = document.id;
        let hash = document.content_hash();
        let key = (id, hash);

        let superseded = {
            let mut slots = self.slots.lock();
            if slots.get(&id).map_or(0, |slot| slot.epoch) != epoch {
                return Err(IndexError::Stale { id });
            }
            let slot = slots.entry(id).or_default();
            slot.in_flight += 1;
            slot.hash.replace(hash).filter(|previous| *previous != hash)
        };
        let _guard = BuildGuard {
            slots: &self.slots,
            id,
        };

        if let Some(previous) = superseded {
            self.cache.invalidate(&(id, previous)).await;
            debug!(
                old_hash = %short_hex(&previous),
                new_hash = %short_hex(&hash),
                "Content changed, dropped previous index entry"
            );
        }

        let indexed = self
            .cache
            .try_get_with(key, self.build(document, hash))
            .await
            .map_err(|e| (*e).clone())?;

        if self.epoch(id) != epoch {
            self.cache.invalidate(&key).await;
            warn!(doc_id = %id, "Document invalidated during indexing, discarding build");
            return Err(IndexError::Stale { id });
        }

        Ok(indexed)
    }

    async fn build(
        &self,
        document: &CorpusDocument,
        content_hash: [u8; 32],
    ) -> IndexResult<Arc<IndexedDocument>> {
        let started = Instant::now();
        let text = SegmentedText::new(&document.content);
        let texts = text.sentences().iter().map(|s| s.text.clone()).collect();

        let embeddings = embed_batch(&self.provider, texts, self.config.embed_timeout)
            .await
            .map_err(|source| IndexError::Embedding {
                id: document.id,
                source,
            })?;

        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!(
            sentences = embeddings.len(),
            bytes = embeddings.memory_bytes(),
            hash = %short_hex(&content_hash),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Indexed corpus document"
        );

        Ok(Arc::new(IndexedDocument {
            id: document.id,
            content_hash,
            text,
            embeddings,
        }))
    }

    /// Marks `id` as changed: in-flight builds become stale and cached entries are dropped.
    pub async fn invalidate(&self, id: Uuid) {
        let previous = {
            let mut slots = self.slots.lock();
            let slot = slots.entry(id).or_default();
            slot.epoch += 1;
            slot.hash.take()
        };
        if let Some(hash) = previous {
            self.cache.invalidate(&(id, hash)).await;
        }
        debug!(doc_id = %id, "Invalidated index entry");
    }

    /// Drops everything cached for `id`, including its epoch slot once no build for it is
    /// running. Returns whether an entry was present; unknown ids are a no-op.
    pub async fn remove_from_index(&self, id: Uuid) -> bool {
        let previous = {
            let mut slots = self.slots.lock();
            let Some(slot) = slots.get_mut(&id) else {
                return false;
            };
            slot.epoch += 1;
            let previous = slot.hash.take();
            let idle = slot.in_flight == 0;
            if !idle {
                slot.removed = true;
            }
            if idle {
                slots.remove(&id);
            }
            previous
        };

        let Some(hash) = previous else {
            return false;
        };
        let present = self.cache.remove(&(id, hash)).await.is_some();
        debug!(doc_id = %id, present, "Removed document from index");
        present
    }

    /// Drops every cached entry.
    pub async fn clear(&self) {
        for slot in self.slots.lock().values_mut() {
            slot.epoch += 1;
            slot.hash = None;
        }
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Number of cached documents.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of ids with epoch bookkeeping.
    pub fn tracked_ids(&self) -> usize {
        self.slots.lock().len()
    }

    /// Number of completed builds since construction.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }
}
