//! Exact and semantic sentence matching against one corpus text.

pub mod error;
pub mod exact;
pub mod semantic;
pub mod types;


pub use error::{MatchingError, MatchingResult};
pub use exact::{ExactRun, exact_sentence_matches, find_exact_matches, shares_vocabulary};
pub use semantic::{SemanticMatcher, classify_similarity, is_semantic_candidate, match_embedded};
pub use types::{Match, MatchType, SourceRef};
