use serde::{Deserialize, Serialize};

use crate::constants::MIN_SENTENCE_CHARS;

use super::normalize::{is_terminator, normalize};

/// Half-open `[start, end)` range of char offsets into a normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of chars covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// A sentence cut from exactly one parent text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Trimmed sentence text, without its terminator.
    pub text: String,
    /// Position in the parent's sentence sequence.
    pub index: usize,
    /// Location in the parent's normalized text.
    pub span: SourceSpan,
}

impl Sentence {
    /// Length in chars.
    #[inline]
    pub fn char_len(&self) -> usize {
        self.span.len()
    }
}

/// A whitespace-delimited word with its folded comparison form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub folded: String,
    pub span: SourceSpan,
}

impl Word<'_> {
    #[inline]
    pub fn char_len(&self) -> usize {
        self.span.len()
    }
}

/// Splits text on whitespace, recording char spans. Words are case-folded for comparison only.
pub fn tokenize_words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut char_pos = 0;

    for (byte_idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some((start_byte, start_char)) = start.take() {
                words.push(make_word(text, start_byte, byte_idx, start_char, char_pos));
            }
        } else if start.is_none() {
            start = Some((byte_idx, char_pos));
        }
        char_pos += 1;
    }

    if let Some((start_byte, start_char)) = start {
        words.push(make_word(text, start_byte, text.len(), start_char, char_pos));
    }

    words
}

fn make_word(
    text: &str,
    start_byte: usize,
    end_byte: usize,
    start_char: usize,
    end_char: usize,
) -> Word<'_> {
    let slice = &text[start_byte..end_byte];
    Word {
        text: slice,
        folded: slice.to_lowercase(),
        span: SourceSpan::new(start_char, end_char),
    }
}

/// Splits already-normalized text into sentences.
///
/// Splits on runs of `।`, `!`, `?`; trims each fragment and drops fragments shorter than
/// [`MIN_SENTENCE_CHARS`]. Text with no terminator at all is a single candidate sentence.
pub fn segment_normalized(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut fragment_start_byte = 0;
    let mut fragment_start_char = 0;
    let mut char_pos = 0;

    for (byte_idx, ch) in text.char_indices() {
        char_pos += 1;
        if is_terminator(ch) {
            push_fragment(
                &text[fragment_start_byte..byte_idx],
                fragment_start_char,
                &mut sentences,
            );
            fragment_start_byte = byte_idx + ch.len_utf8();
            fragment_start_char = char_pos;
        }
    }

    push_fragment(
        &text[fragment_start_byte..],
        fragment_start_char,
        &mut sentences,
    );

    sentences
}

fn push_fragment(raw: &str, start_char: usize, sentences: &mut Vec<Sentence>) {
    let trimmed_start = raw.trim_start();
    let leading_chars = raw[..raw.len() - trimmed_start.len()].chars().count();
    let trimmed = trimmed_start.trim_end();
    let len = trimmed.chars().count();

    if len < MIN_SENTENCE_CHARS {
        return;
    }

    let start = start_char + leading_chars;
    sentences.push(Sentence {
        text: trimmed.to_string(),
        index: sentences.len(),
        span: SourceSpan::new(start, start + len),
    });
}

/// Normalizes `raw` and segments the result.
pub fn segment(raw: &str) -> Vec<Sentence> {
    segment_normalized(&normalize(raw))
}

/// A normalized text together with its sentences and a char→byte offset table.
///
/// Built once per text and shared read-only between the exact and semantic matchers.
#[derive(Debug, Clone)]
pub struct SegmentedText {
    normalized: String,
    sentences: Vec<Sentence>,
    char_offsets: Vec<usize>,
}

impl SegmentedText {
    /// Normalizes and segments raw text.
    pub fn new(raw: &str) -> Self {
        Self::from_normalized(normalize(raw))
    }

    /// Segments text that is already normalized.
    pub fn from_normalized(normalized: String) -> Self {
        let sentences = segment_normalized(&normalized);
        let mut char_offsets: Vec<usize> = normalized.char_indices().map(|(i, _)| i).collect();
        char_offsets.push(normalized.len());

        Self {
            normalized,
            sentences,
            char_offsets,
        }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Returns `true` when segmentation produced no sentences.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Length of the normalized text in chars.
    pub fn char_len(&self) -> usize {
        self.char_offsets.len() - 1
    }

    /// Slices the normalized text by char offsets (clamped to the text).
    pub fn slice_chars(&self, start: usize, end: usize) -> &str {
        let max = self.char_len();
        let start = start.min(max);
        let end = end.clamp(start, max);
        &self.normalized[self.char_offsets[start]..self.char_offsets[end]]
    }

    /// Words of the normalized text.
    pub fn words(&self) -> Vec<Word<'_>> {
        tokenize_words(&self.normalized)
    }

    /// Index of the sentence whose span contains `offset`, if any.
    pub fn sentence_at(&self, offset: usize) -> Option<usize> {
        let idx = self
            .sentences
            .partition_point(|sentence| sentence.span.end <= offset);
        self.sentences
            .get(idx)
            .filter(|sentence| sentence.span.contains(offset))
            .map(|sentence| sentence.index)
    }
}
