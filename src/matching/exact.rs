use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::text::{SegmentedText, Word, is_terminator, tokenize_words};

use super::types::{Match, MatchType, SourceRef};

/// Corpus words absent from the submission get this id and can never compare equal.
const UNSHARED: u32 = u32::MAX;

/// A contiguous word run shared by a submission and a corpus text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactRun {
    /// Submission words of the run joined by single spaces.
    pub matched_text: String,
    /// First submission word of the run.
    pub start_word: usize,
    /// One past the last submission word of the run.
    pub end_word: usize,
    /// First corpus word of the run.
    pub corpus_start_word: usize,
    /// Length of the reconstructed run in chars.
    pub char_len: usize,
}

/// Finds every shared word run of at least `min_match_chars` chars.
///
/// Words are whitespace-delimited and compared case-folded. Every `(i, j)` start pair is
/// grown while words agree, so a long run is reported together with each of its suffixes.
/// Overlapping runs are not merged. Cost is `O(n·m·k)`; bound the inputs before calling.
pub fn find_exact_matches(submission: &str, corpus: &str, min_match_chars: usize) -> Vec<ExactRun> {
    let sub_words = tokenize_words(submission);
    let corpus_words = tokenize_words(corpus);
    let alignment = WordAlignment::new(&sub_words, &corpus_words);

    alignment
        .runs(min_match_chars, RunSelection::All)
        .into_iter()
        .map(|run| ExactRun {
            matched_text: join_words(&sub_words[run.sub_start..run.sub_end()]),
            start_word: run.sub_start,
            end_word: run.sub_end(),
            corpus_start_word: run.corpus_start,
            char_len: run.char_len,
        })
        .collect()
}

/// Exact matches attributed to submission sentences, at most one per sentence.
///
/// A run counts for a sentence when its part inside the sentence is at least
/// `min_match_chars` chars, or when it covers the whole sentence. The longest part wins.
pub fn exact_sentence_matches(
    submission: &SegmentedText,
    corpus: &SegmentedText,
    source: &SourceRef,
    min_match_chars: usize,
) -> Vec<Match> {
    let sub_words = submission.words();
    let corpus_words = corpus.words();
    let alignment = WordAlignment::new(&sub_words, &corpus_words);
    if !alignment.shares_vocabulary() {
        return Vec::new();
    }

    let sentences = submission.sentences();
    let mut best: BTreeMap<usize, (usize, Match)> = BTreeMap::new();

    for run in alignment.runs(min_match_chars, RunSelection::LeftMaximal) {
        let run_words = run.sub_start..run.sub_end();
        let run_start = sub_words[run.sub_start].span.start;
        let run_end = sub_words[run.sub_end() - 1].span.end;

        let first_sentence = sentences.partition_point(|s| s.span.end <= run_start);
        for sentence in sentences[first_sentence..]
            .iter()
            .take_while(|s| s.span.start < run_end)
        {
            let start = run_start.max(sentence.span.start);
            let end = run_end.min(sentence.span.end);
            if end <= start {
                continue;
            }

            let portion = end - start;
            let covers_sentence = start == sentence.span.start && end == sentence.span.end;
            if portion < min_match_chars && !covers_sentence {
                continue;
            }

            if best
                .get(&sentence.index)
                .is_some_and(|(kept, _)| *kept >= portion)
            {
                continue;
            }

            let Some(first_word) = run_words
                .clone()
                .find(|&w| sub_words[w].span.end > start)
            else {
                continue;
            };
            let Some(last_word) = run_words.clone().rev().find(|&w| sub_words[w].span.start < end)
            else {
                continue;
            };

            let corpus_first = &corpus_words[run.corpus_start + (first_word - run.sub_start)];
            let corpus_last = &corpus_words[run.corpus_start + (last_word - run.sub_start)];
            let source_text = corpus
                .slice_chars(corpus_first.span.start, corpus_last.span.end)
                .trim_end_matches(is_terminator);

            best.insert(
                sentence.index,
                (
                    portion,
                    Match {
                        source_id: source.id,
                        source_title: source.title.clone(),
                        similarity: 1.0,
                        matched_text: submission.slice_chars(start, end).to_string(),
                        source_text: source_text.to_string(),
                        submission_sentence_index: sentence.index,
                        match_type: MatchType::Exact,
                    },
                ),
            );
        }
    }

    best.into_values().map(|(_, m)| m).collect()
}

/// Returns `true` when the two texts have at least one folded word in common.
pub fn shares_vocabulary(submission: &str, corpus: &str) -> bool {
    let sub_words = tokenize_words(submission);
    let corpus_words = tokenize_words(corpus);
    WordAlignment::new(&sub_words, &corpus_words).shares_vocabulary()
}

fn join_words(words: &[Word<'_>]) -> String {
    words.iter().map(|w| w.text).collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunSelection {
    /// Every start pair.
    All,
    /// Only runs that cannot be extended to the left.
    LeftMaximal,
}

#[derive(Debug, Clone, Copy)]
struct WordRun {
    sub_start: usize,
    corpus_start: usize,
    len: usize,
    char_len: usize,
}

impl WordRun {
    fn sub_end(&self) -> usize {
        self.sub_start + self.len
    }
}

/// Both word sequences interned to integer ids, plus char-length prefix sums.
struct WordAlignment {
    sub_ids: Vec<u32>,
    corpus_ids: Vec<u32>,
    sub_prefix_chars: Vec<usize>,
}

impl WordAlignment {
    fn new(sub_words: &[Word<'_>], corpus_words: &[Word<'_>]) -> Self {
        let mut vocab: HashMap<&str, u32> = HashMap::with_capacity(sub_words.len());
        let mut sub_ids = Vec::with_capacity(sub_words.len());
        let mut sub_prefix_chars = Vec::with_capacity(sub_words.len() + 1);
        sub_prefix_chars.push(0);

        for word in sub_words {
            let next = vocab.len() as u32;
            sub_ids.push(*vocab.entry(word.folded.as_str()).or_insert(next));
            let total = sub_prefix_chars[sub_prefix_chars.len() - 1];
            sub_prefix_chars.push(total + word.char_len());
        }

        let corpus_ids = corpus_words
            .iter()
            .map(|word| vocab.get(word.folded.as_str()).copied().unwrap_or(UNSHARED))
            .collect();

        Self {
            sub_ids,
            corpus_ids,
            sub_prefix_chars,
        }
    }

    fn shares_vocabulary(&self) -> bool {
        self.corpus_ids.iter().any(|&id| id != UNSHARED)
    }

    /// Chars in `len` words starting at submission word `start`, single-space joined.
    fn char_len(&self, start: usize, len: usize) -> usize {
        self.sub_prefix_chars[start + len] - self.sub_prefix_chars[start] + len.saturating_sub(1)
    }

    fn runs(&self, min_match_chars: usize, selection: RunSelection) -> Vec<WordRun> {
        let (sub, corpus) = (&self.sub_ids, &self.corpus_ids);
        let mut runs = Vec::new();

        for i in 0..sub.len() {
            for j in 0..corpus.len() {
                if sub[i] != corpus[j] {
                    continue;
                }
                if selection == RunSelection::LeftMaximal
                    && i > 0
                    && j > 0
                    && sub[i - 1] == corpus[j - 1]
                {
                    continue;
                }

                let mut len = 1;
                while i + len < sub.len() && j + len < corpus.len() && sub[i + len] == corpus[j + len]
                {
                    len += 1;
                }

                let char_len = self.char_len(i, len);
                if char_len >= min_match_chars {
                    runs.push(WordRun {
                        sub_start: i,
                        corpus_start: j,
                        len,
                        char_len,
                    });
                }
            }
        }

        runs
    }
}
