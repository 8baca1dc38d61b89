//! The check pipeline and corpus maintenance entry points.
//!
//! A check normalizes and segments the submission, embeds it once, then scans every corpus
//! document on a bounded worker pool. Each document gets an exact scan and, when requested,
//! a semantic scan against its cached [`IndexedDocument`](crate::index::IndexedDocument).
//! Per-document failures become [`ScanOutcome::Failed`] and surface as skipped sources.

pub mod error;
pub mod types;


pub use error::{DetectorError, DetectorResult};
pub use types::{CheckRequest, CheckResponse, DetectorConfig};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::corpus::{
    CorpusDocument, CorpusStats, CorpusStore, ImportReport, NewDocument, SearchHit, export_json,
    import_directory,
};
use crate::embedding::{EmbeddingMatrix, embed_batch};
use crate::index::{CorpusIndex, EpochSnapshot, IndexError};
use crate::matching::{SourceRef, exact_sentence_matches, match_embedded};
use crate::scoring::{
    Aggregator, DocumentScan, FailureKind, ScanOutcome, ScanStage, SourceFailure,
    validate_threshold,
};
use crate::text::SegmentedText;

/// Submission embeddings for one check.
enum SubmissionVectors {
    /// Paraphrase checking is off or the corpus is empty.
    Skipped,
    Embedded(Arc<EmbeddingMatrix>),
    /// The provider failed on the submission; every semantic scan reports this.
    Failed { kind: FailureKind, reason: String },
}

/// Inputs shared by every document scan of one check.
struct ScanContext<'a> {
    submission: Arc<SegmentedText>,
    vectors: SubmissionVectors,
    snapshot: &'a EpochSnapshot,
    threshold: f32,
}

/// Scores submissions against a corpus and keeps the corpus index in step with edits.
pub struct PlagiarismDetector {
    store: Arc<dyn CorpusStore>,
    index: Arc<CorpusIndex>,
    config: DetectorConfig,
    aggregator: Aggregator,
}

impl std::fmt::Debug for PlagiarismDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlagiarismDetector")
            .field("index", &self.index)
            .field("config", &self.config)
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

impl PlagiarismDetector {
    pub fn new(store: Arc<dyn CorpusStore>, index: Arc<CorpusIndex>, config: DetectorConfig) -> Self {
        Self {
            store,
            index,
            config,
            aggregator: Aggregator::default(),
        }
    }

    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn store(&self) -> &Arc<dyn CorpusStore> {
        &self.store
    }

    pub fn index(&self) -> &Arc<CorpusIndex> {
        &self.index
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Scores `request.text` against every corpus document.
    ///
    /// Fails only when the request is invalid, the provider is not ready for a paraphrase
    /// check, or the store cannot be listed. A provider failure while embedding the
    /// submission drops the semantic stage for every document and keeps exact matches.
    #[instrument(
        skip(self, request),
        fields(threshold = request.threshold, paraphrase = request.check_paraphrase)
    )]
    pub async fn check(&self, request: CheckRequest) -> DetectorResult<CheckResponse> {
        let started = Instant::now();
        validate_threshold(request.threshold)?;

        let submission = Arc::new(SegmentedText::new(&request.text));
        if submission.is_empty() {
            debug!("Submission has no sentences");
            return Ok(CheckResponse::empty(started.elapsed()));
        }

        let provider = self.index.provider();
        if request.check_paraphrase && !provider.is_ready() {
            return Err(DetectorError::Configuration {
                reason: format!("embedding provider '{}' is not ready", provider.model_id()),
            });
        }

        let snapshot = self.index.epoch_snapshot();
        let documents = self.store.list_documents().await?;

        let vectors = if request.check_paraphrase && !documents.is_empty() {
            let texts = submission.sentences().iter().map(|s| s.text.clone()).collect();
            match embed_batch(provider, texts, self.config.embed_timeout).await {
                Ok(matrix) => SubmissionVectors::Embedded(Arc::new(matrix)),
                Err(e) => {
                    warn!(error = %e, documents = documents.len(), "Submission embedding failed");
                    let kind = if e.is_timeout() {
                        FailureKind::Timeout
                    } else {
                        FailureKind::ProviderFailure
                    };
                    SubmissionVectors::Failed {
                        kind,
                        reason: format!("submission embedding failed: {e}"),
                    }
                }
            }
        } else {
            SubmissionVectors::Skipped
        };

        let ctx = ScanContext {
            submission: Arc::clone(&submission),
            vectors,
            snapshot: &snapshot,
            threshold: request.threshold,
        };

        let pending: Vec<_> = documents
            .into_iter()
            .map(|document| self.scan_document(document, &ctx, request.check_paraphrase))
            .collect();
        let mut scans: Vec<DocumentScan> = stream::iter(pending)
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;
        scans.sort_by_key(|scan| scan.source.id);

        let scored = self
            .aggregator
            .aggregate(submission.sentences(), &scans, request.threshold);
        let response = CheckResponse::from_scored(scored, started.elapsed());

        info!(
            sentences = response.analysis.total_sentences,
            flagged = response.analysis.flagged_sentences,
            documents = scans.len(),
            skipped = response.skipped_sources.len(),
            score = response.plagiarism_score,
            risk = %response.analysis.risk_level,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Check complete"
        );

        Ok(response)
    }

    async fn scan_document(
        &self,
        document: CorpusDocument,
        ctx: &ScanContext<'_>,
        check_paraphrase: bool,
    ) -> DocumentScan {
        let source = document.source_ref();
        let (exact, semantic) = tokio::join!(
            self.exact_scan(&document, &source, ctx),
            self.semantic_scan(&document, &source, ctx, check_paraphrase),
        );

        for failure in exact.failure().into_iter().chain(semantic.failure()) {
            warn!(
                source_id = %failure.source_id,
                stage = ?failure.stage,
                kind = ?failure.kind,
                reason = %failure.reason,
                "Corpus document skipped"
            );
        }

        DocumentScan::new(source, exact, semantic)
    }

    async fn exact_scan(
        &self,
        document: &CorpusDocument,
        source: &SourceRef,
        ctx: &ScanContext<'_>,
    ) -> ScanOutcome {
        if document.word_count > self.config.max_exact_scan_words {
            return ScanOutcome::Failed(SourceFailure::new(
                source,
                ScanStage::Exact,
                FailureKind::TooLarge,
                format!(
                    "{} words exceeds the exact-scan limit of {}",
                    document.word_count, self.config.max_exact_scan_words
                ),
            ));
        }

        let submission = Arc::clone(&ctx.submission);
        let content = document.content.clone();
        let run_source = source.clone();
        let min_match_chars = self.config.min_match_chars;

        let task = tokio::task::spawn_blocking(move || {
            let corpus = SegmentedText::new(&content);
            exact_sentence_matches(&submission, &corpus, &run_source, min_match_chars)
        });

        match task.await {
            Ok(matches) => ScanOutcome::Matched(matches),
            Err(e) => ScanOutcome::Failed(SourceFailure::new(
                source,
                ScanStage::Exact,
                FailureKind::TaskFailed,
                e.to_string(),
            )),
        }
    }

    async fn semantic_scan(
        &self,
        document: &CorpusDocument,
        source: &SourceRef,
        ctx: &ScanContext<'_>,
        check_paraphrase: bool,
    ) -> ScanOutcome {
        if !check_paraphrase {
            return ScanOutcome::Disabled;
        }
        let embeddings = match &ctx.vectors {
            SubmissionVectors::Embedded(embeddings) => embeddings,
            SubmissionVectors::Skipped => return ScanOutcome::Matched(Vec::new()),
            SubmissionVectors::Failed { kind, reason } => {
                return ScanOutcome::Failed(SourceFailure::new(
                    source,
                    ScanStage::Semantic,
                    *kind,
                    reason.clone(),
                ));
            }
        };

        let indexed = match self
            .index
            .ensure_indexed_at(document, ctx.snapshot.epoch(document.id))
            .await
        {
            Ok(indexed) => indexed,
            Err(e) => {
                return ScanOutcome::Failed(SourceFailure::new(
                    source,
                    ScanStage::Semantic,
                    failure_kind(&e),
                    e.to_string(),
                ));
            }
        };

        let submission = Arc::clone(&ctx.submission);
        let embeddings = Arc::clone(embeddings);
        let match_source = source.clone();
        let threshold = ctx.threshold;

        let task = tokio::task::spawn_blocking(move || {
            match_embedded(
                submission.sentences(),
                &embeddings,
                indexed.sentences(),
                &indexed.embeddings,
                &match_source,
                threshold,
            )
        });

        match task.await {
            Ok(Ok(matches)) => ScanOutcome::Matched(matches),
            Ok(Err(e)) => ScanOutcome::Failed(SourceFailure::new(
                source,
                ScanStage::Semantic,
                FailureKind::ProviderFailure,
                e.to_string(),
            )),
            Err(e) => ScanOutcome::Failed(SourceFailure::new(
                source,
                ScanStage::Semantic,
                FailureKind::TaskFailed,
                e.to_string(),
            )),
        }
    }

    /// Stores a document and indexes it eagerly. Indexing failures are logged, not returned;
    /// the next check retries them.
    pub async fn add_document(&self, document: NewDocument) -> DetectorResult<CorpusDocument> {
        let stored = self.store.add(document).await?;
        info!(doc_id = %stored.id, title = %stored.title, words = stored.word_count, "Added corpus document");

        if self.index.provider().is_ready()
            && let Err(e) = self.index.ensure_indexed(&stored).await
        {
            warn!(doc_id = %stored.id, error = %e, "Eager indexing failed");
        }

        Ok(stored)
    }

    /// Replaces a document's content and invalidates its index entry.
    pub async fn update_document(&self, id: Uuid, content: String) -> DetectorResult<CorpusDocument> {
        let updated = self.store.update_content(id, content).await?;
        self.index.invalidate(id).await;
        info!(doc_id = %id, words = updated.word_count, "Updated corpus document");
        Ok(updated)
    }

    /// Deletes a document and drops its index entry. Returns `false` for unknown ids.
    pub async fn remove_document(&self, id: Uuid) -> DetectorResult<bool> {
        let removed = self.store.delete(id).await?;
        self.index.remove_from_index(id).await;
        if removed {
            info!(doc_id = %id, "Removed corpus document");
        }
        Ok(removed)
    }

    pub async fn get_document(&self, id: Uuid) -> DetectorResult<Option<CorpusDocument>> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_documents(&self) -> DetectorResult<Vec<CorpusDocument>> {
        Ok(self.store.list_documents().await?)
    }

    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        threshold: f64,
    ) -> DetectorResult<Vec<SearchHit>> {
        Ok(self.store.search(query, limit, threshold).await?)
    }

    pub async fn stats(&self) -> DetectorResult<CorpusStats> {
        Ok(self.store.stats().await?)
    }

    /// Imports every `*.txt` file in `dir`. Documents are indexed lazily on the next check.
    pub async fn import_directory(&self, dir: &Path, source: &str) -> DetectorResult<ImportReport> {
        Ok(import_directory(self.store.as_ref(), dir, source).await?)
    }

    /// Writes the whole corpus to `path` as JSON and returns the document count.
    pub async fn export(&self, path: &Path) -> DetectorResult<usize> {
        Ok(export_json(self.store.as_ref(), path).await?)
    }
}

fn failure_kind(err: &IndexError) -> FailureKind {
    match err {
        IndexError::Stale { .. } => FailureKind::Stale,
        e if e.is_timeout() => FailureKind::Timeout,
        IndexError::Embedding { .. } => FailureKind::ProviderFailure,
    }
}
