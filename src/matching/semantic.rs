use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::constants::{MIN_SEMANTIC_CHARS, SIMILAR_CUTOFF};
use crate::embedding::{EmbeddingMatrix, EmbeddingProvider, embed_batch};
use crate::text::Sentence;

use super::error::{MatchingError, MatchingResult};
use super::types::{Match, MatchType, SourceRef};

/// `similar` at or above [`SIMILAR_CUTOFF`], `paraphrase` below it.
pub fn classify_similarity(similarity: f32) -> MatchType {
    if similarity >= SIMILAR_CUTOFF {
        MatchType::Similar
    } else {
        MatchType::Paraphrase
    }
}

/// Returns `true` if the sentence is long enough to take part in semantic matching.
#[inline]
pub fn is_semantic_candidate(sentence: &Sentence) -> bool {
    sentence.char_len() >= MIN_SEMANTIC_CHARS
}

/// Emits a match for every sentence pair whose cosine similarity reaches `threshold`.
///
/// Row `i` of each matrix must embed sentence `i` of the matching slice. Sentences shorter
/// than [`MIN_SEMANTIC_CHARS`] on either side are skipped. Similarities are clamped to
/// `[0, 1]`. Output is ordered by submission sentence, then corpus sentence.
pub fn match_embedded(
    submission: &[Sentence],
    submission_embeddings: &EmbeddingMatrix,
    corpus: &[Sentence],
    corpus_embeddings: &EmbeddingMatrix,
    source: &SourceRef,
    threshold: f32,
) -> MatchingResult<Vec<Match>> {
    check_aligned("submission", submission, submission_embeddings)?;
    check_aligned("corpus", corpus, corpus_embeddings)?;

    if submission.is_empty() || corpus.is_empty() {
        return Ok(Vec::new());
    }

    if submission_embeddings.dim() != corpus_embeddings.dim() {
        return Err(MatchingError::DimensionMismatch {
            submission: submission_embeddings.dim(),
            corpus: corpus_embeddings.dim(),
        });
    }

    let corpus_candidates: Vec<usize> = corpus
        .iter()
        .enumerate()
        .filter(|(_, sentence)| is_semantic_candidate(sentence))
        .map(|(row, _)| row)
        .collect();

    let mut matches = Vec::new();
    for (row, sentence) in submission.iter().enumerate() {
        if !is_semantic_candidate(sentence) {
            continue;
        }

        for &corpus_row in &corpus_candidates {
            let similarity = submission_embeddings
                .cosine(row, corpus_embeddings, corpus_row)
                .clamp(0.0, 1.0);

            if similarity >= threshold {
                matches.push(Match {
                    source_id: source.id,
                    source_title: source.title.clone(),
                    similarity,
                    matched_text: sentence.text.clone(),
                    source_text: corpus[corpus_row].text.clone(),
                    submission_sentence_index: sentence.index,
                    match_type: classify_similarity(similarity),
                });
            }
        }
    }

    Ok(matches)
}

fn check_aligned(
    side: &'static str,
    sentences: &[Sentence],
    embeddings: &EmbeddingMatrix,
) -> MatchingResult<()> {
    if sentences.len() != embeddings.len() {
        return Err(MatchingError::MisalignedEmbeddings {
            side,
            sentences: sentences.len(),
            rows: embeddings.len(),
        });
    }
    Ok(())
}

/// Embeds sentence sets through a provider and matches them.
#[derive(Clone)]
pub struct SemanticMatcher {
    provider: Arc<dyn EmbeddingProvider>,
    timeout: Duration,
}

impl std::fmt::Debug for SemanticMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticMatcher")
            .field("model_id", &self.provider.model_id())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SemanticMatcher {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embeds `sentences` in a single provider call.
    pub async fn embed_sentences(&self, sentences: &[Sentence]) -> MatchingResult<EmbeddingMatrix> {
        let texts = sentences.iter().map(|s| s.text.clone()).collect();
        Ok(embed_batch(&self.provider, texts, self.timeout).await?)
    }

    /// Embeds both sets (one call each) and returns every pair at or above `threshold`.
    #[instrument(skip(self, submission, corpus, source), fields(source_id = %source.id))]
    pub async fn match_sentences(
        &self,
        submission: &[Sentence],
        corpus: &[Sentence],
        source: &SourceRef,
        threshold: f32,
    ) -> MatchingResult<Vec<Match>> {
        let submission_embeddings = self.embed_sentences(submission).await?;
        let corpus_embeddings = self.embed_sentences(corpus).await?;

        let matches = match_embedded(
            submission,
            &submission_embeddings,
            corpus,
            &corpus_embeddings,
            source,
            threshold,
        )?;

        debug!(
            submission_sentences = submission.len(),
            corpus_sentences = corpus.len(),
            matches = matches.len(),
            "Semantic matching complete"
        );
        Ok(matches)
    }
}
