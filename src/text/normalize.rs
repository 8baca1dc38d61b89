use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{BANGLA_FULL_STOP, SENTENCE_TERMINATORS};

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static PAGE_MARKER_RE: OnceLock<Regex> = OnceLock::new();
static TABLE_MARKER_RE: OnceLock<Regex> = OnceLock::new();
static REPEATED_TERMINATOR_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Matches `--- Page 3 ---` as inserted by the PDF extractors.
fn page_marker_re() -> &'static Regex {
    PAGE_MARKER_RE.get_or_init(|| Regex::new(r"-{3}\s*Page\s+\d+\s*-{3}").expect("static regex"))
}

/// Matches `=== Table 2 ===` as inserted by the PDF extractors.
fn table_marker_re() -> &'static Regex {
    TABLE_MARKER_RE
        .get_or_init(|| Regex::new(r"={3}\s*Table\s+\d+\s*={3}").expect("static regex"))
}

fn repeated_terminator_re() -> &'static Regex {
    REPEATED_TERMINATOR_RE
        .get_or_init(|| Regex::new(r"([।!?])(?:\s*[।!?])+").expect("static regex"))
}

/// Returns `true` for `।`, `!` and `?`.
#[inline]
pub fn is_terminator(ch: char) -> bool {
    SENTENCE_TERMINATORS.contains(&ch)
}

/// Cleans raw extracted text.
///
/// Rules, in order:
/// 1. collapse whitespace runs to a single space
/// 2. strip page and table markers (and re-collapse the gaps they leave)
/// 3. collapse adjacent terminators to the first one (`।!` → `।`)
/// 4. append `।` when the text does not already end with a terminator
///
/// Empty (or whitespace-only) input yields an empty string. The function is idempotent.
pub fn normalize(raw: &str) -> String {
    let collapsed = whitespace_re().replace_all(raw, " ");

    let without_pages = page_marker_re().replace_all(&collapsed, " ");
    let without_tables = table_marker_re().replace_all(&without_pages, " ");
    let spaced = whitespace_re().replace_all(&without_tables, " ");

    let repaired = repeated_terminator_re().replace_all(spaced.trim(), "$1");
    let mut text = repaired.trim().to_string();

    if text.is_empty() {
        return text;
    }

    if !text.chars().next_back().is_some_and(is_terminator) {
        text.push(BANGLA_FULL_STOP);
    }

    text
}
