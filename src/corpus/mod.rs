//! Reference corpus storage and utilities.
//!
//! [`CorpusStore`] is the storage seam. [`InMemoryCorpusStore`] serves tests and embedded
//! use; [`DiskCorpusStore`] keeps one `rkyv` record per document under a directory.

pub mod disk;
pub mod error;
pub mod memory;
pub mod model;
mod record;
pub mod search;
mod store;
pub mod transfer;


pub use disk::DiskCorpusStore;
pub use error::{CorpusError, CorpusResult};
pub use memory::InMemoryCorpusStore;
pub use model::{CorpusDocument, DEFAULT_LANGUAGE, DEFAULT_SOURCE, NewDocument, count_words};
pub use record::StoredDocument;
pub use search::{CorpusStats, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_THRESHOLD, SearchHit, corpus_stats, search_documents};
pub use store::CorpusStore;
pub use transfer::{
    CorpusExport, DEFAULT_IMPORT_SOURCE, ImportReport, export_json, import_directory,
};
