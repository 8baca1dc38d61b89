use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::model::CorpusDocument;

/// Default number of search hits returned.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default minimum hit score: the query must cover at least half the document.
pub const DEFAULT_SEARCH_THRESHOLD: f64 = 0.5;

/// Chars of context kept before a search hit.
const SNIPPET_BEFORE: usize = 50;

/// Chars of context kept after the end of the query in a search hit.
const SNIPPET_AFTER: usize = 100;

/// Rough words-per-sentence ratio used for the corpus sentence estimate.
const WORDS_PER_SENTENCE: usize = 15;

/// A corpus document containing the search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: Uuid,
    pub title: String,
    /// Query length over content length, capped at 1.0.
    pub score: f64,
    /// Content around the first occurrence of the query.
    pub snippet: String,
    pub source: String,
    pub metadata: Map<String, Value>,
}

/// Aggregate counts over a corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub total_words: usize,
    /// Estimated from the word count.
    pub total_sentences: usize,
    pub sources: BTreeMap<String, usize>,
    pub languages: BTreeMap<String, usize>,
    /// Newest `created_at`, or `None` for an empty corpus.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Case-insensitive substring search over `documents`.
///
/// Hits scoring below `threshold` are dropped; the rest are sorted by score (highest first)
/// and truncated to `limit`. An empty query matches nothing.
pub fn search_documents(
    documents: &[CorpusDocument],
    query: &str,
    limit: usize,
    threshold: f64,
) -> Vec<SearchHit> {
    let needle = fold_chars(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = documents
        .iter()
        .filter_map(|doc| {
            let content: Vec<char> = doc.content.chars().collect();
            let haystack = fold_chars(&doc.content);
            let position = find_chars(&haystack, &needle)?;

            let score = (needle.len() as f64 / haystack.len() as f64).min(1.0);
            if score < threshold {
                return None;
            }

            let start = position.saturating_sub(SNIPPET_BEFORE);
            let end = (position + needle.len() + SNIPPET_AFTER).min(content.len());

            Some(SearchHit {
                document_id: doc.id,
                title: doc.title.clone(),
                score,
                snippet: content[start..end].iter().collect(),
                source: doc.source.clone(),
                metadata: doc.metadata.clone(),
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.title.cmp(&b.title)));
    hits.truncate(limit);
    hits
}

/// Computes corpus statistics.
pub fn corpus_stats(documents: &[CorpusDocument]) -> CorpusStats {
    let total_words: usize = documents.iter().map(|doc| doc.word_count).sum();
    let mut sources = BTreeMap::new();
    let mut languages = BTreeMap::new();

    for doc in documents {
        *sources.entry(doc.source.clone()).or_insert(0) += 1;
        *languages.entry(doc.language.clone()).or_insert(0) += 1;
    }

    CorpusStats {
        total_documents: documents.len(),
        total_words,
        total_sentences: total_words / WORDS_PER_SENTENCE,
        sources,
        languages,
        last_updated: documents.iter().map(|doc| doc.created_at).max(),
    }
}

/// Lowercases char by char so folded offsets line up with the original text.
fn fold_chars(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
