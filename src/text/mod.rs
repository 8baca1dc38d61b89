//! Text normalization and sentence segmentation.
//!
//! Both stages are pure functions of their input. Every offset and length produced here
//! counts chars, not bytes.

pub mod normalize;
pub mod segment;


pub use normalize::{is_terminator, normalize};
pub use segment::{
    SegmentedText, Sentence, SourceSpan, Word, segment, segment_normalized, tokenize_words,
};
