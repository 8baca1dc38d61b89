//! Shared corpus fixtures and detector builders.

use std::path::Path;
use std::sync::Arc;

use plagiarism::corpus::{CorpusStore, DiskCorpusStore, InMemoryCorpusStore};
use plagiarism::embedding::{EmbeddingProvider, MockEmbeddingProvider, SentenceEmbedder};
use plagiarism::{CorpusDocument, CorpusIndex, DetectorConfig, IndexConfig, NewDocument, PlagiarismDetector};

pub const MOCK_DIM: usize = 384;

/// Four reference documents, one sentence each.
pub const BANGLA_CORPUS: [(&str, &str); 4] = [
    (
        "সাহিত্য",
        "বাংলা ভাষার অনেক গুরুত্বপূর্ণ সাহিত্য রয়েছে যা আমাদের সংস্কৃতির অংশ।",
    ),
    (
        "শিক্ষা",
        "শিক্ষা ব্যবস্থার উন্নতির জন্য আমাদের নতুন পদ্ধতি অবলম্বন করতে হবে।",
    ),
    (
        "প্রযুক্তি",
        "প্রযুক্তির উন্নতির সাথে সাথে আমাদের জীবনযাত্রার মানও উন্নত হচ্ছে।",
    ),
    (
        "গবেষণা",
        "গবেষণার ক্ষেত্রে নতুন নতুন আবিষ্কার আমাদের জ্ঞানের পরিধি বৃদ্ধি করছে।",
    ),
];

pub fn corpus_documents() -> Vec<CorpusDocument> {
    BANGLA_CORPUS
        .iter()
        .map(|(title, content)| {
            CorpusDocument::from_new(NewDocument::new(*title, *content).with_source("fixture"))
                .expect("valid fixture")
        })
        .collect()
}

pub struct MockHarness {
    pub detector: PlagiarismDetector,
    pub mock: Arc<MockEmbeddingProvider>,
    pub documents: Vec<CorpusDocument>,
}

/// Detector over an in-memory store seeded with [`BANGLA_CORPUS`]; nothing is indexed yet.
pub fn mock_detector(mock: MockEmbeddingProvider) -> MockHarness {
    let mock = Arc::new(mock);
    let documents = corpus_documents();
    let store: Arc<dyn CorpusStore> =
        Arc::new(InMemoryCorpusStore::with_documents(documents.clone()));
    let index = Arc::new(CorpusIndex::new(mock.clone(), IndexConfig::default()));

    MockHarness {
        detector: PlagiarismDetector::new(store, index, DetectorConfig::default()),
        mock,
        documents,
    }
}

/// Detector over a disk store at `root`, embedding with the stub sentence embedder.
pub async fn disk_detector(root: &Path) -> PlagiarismDetector {
    let provider: Arc<dyn EmbeddingProvider> =
        Arc::new(SentenceEmbedder::stub().expect("stub embedder"));
    let store = DiskCorpusStore::open(root).await.expect("open disk store");
    let index = Arc::new(CorpusIndex::new(provider, IndexConfig::default()));
    PlagiarismDetector::new(Arc::new(store), index, DetectorConfig::default())
}
