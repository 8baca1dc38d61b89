mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures::{BANGLA_CORPUS, MOCK_DIM, mock_detector};
use futures_util::future::join_all;
use plagiarism::embedding::{EmbeddingProvider, MockEmbeddingProvider, SentenceEmbedder};
use plagiarism::matching::{MatchType, SemanticMatcher, SourceRef, find_exact_matches};
use plagiarism::scoring::RiskLevel;
use plagiarism::text::{segment, segment_normalized};
use plagiarism::CheckRequest;
use uuid::Uuid;

#[tokio::test]
async fn test_half_copied_submission_is_high_risk() {
    let h = mock_detector(MockEmbeddingProvider::new(MOCK_DIM));
    let submission = format!(
        "{} নদীর ধারে ছোট একটি গ্রামে আমরা বড় হয়েছি।",
        BANGLA_CORPUS[1].1
    );

    let response = h.detector.check(CheckRequest::new(submission)).await.unwrap();

    assert_eq!(response.analysis.total_sentences, 2);
    assert_eq!(response.analysis.flagged_sentences, 1);
    assert_eq!(response.analysis.unique_sources, 1);
    assert!((response.plagiarism_score - 50.0).abs() < 1e-9);
    assert_eq!(response.analysis.risk_level, RiskLevel::High);
    assert!(response.is_plagiarized);

    let best = &response.matches[0];
    assert_eq!(best.source_id, h.documents[1].id);
    assert_eq!(best.submission_sentence_index, 0);
    // Long enough for an exact run, which outranks the identical semantic match.
    assert_eq!(best.match_type, MatchType::Exact);
}

#[tokio::test]
async fn test_short_identical_sentence_is_similar() {
    let h = mock_detector(MockEmbeddingProvider::new(MOCK_DIM));
    let response = h
        .detector
        .check(CheckRequest::new("এই বাক্যটি কর্পাসে আছে।"))
        .await
        .unwrap();
    assert!(response.matches.is_empty());

    let doc = h
        .detector
        .add_document(plagiarism::NewDocument::new("নমুনা", "এই বাক্যটি কর্পাসে আছে।"))
        .await
        .unwrap();
    let response = h
        .detector
        .check(CheckRequest::new("এই বাক্যটি কর্পাসে আছে।"))
        .await
        .unwrap();

    assert_eq!(response.matches.len(), 1);
    assert_eq!(response.matches[0].source_id, doc.id);
    assert_eq!(response.matches[0].match_type, MatchType::Similar);
    assert!(response.matches[0].similarity >= 0.999);
    assert_eq!(response.analysis.flagged_sentences, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checks_build_each_document_once() {
    let h = Arc::new(mock_detector(
        MockEmbeddingProvider::new(MOCK_DIM).with_delay(Duration::from_millis(30)),
    ));
    let checks = 4;

    let handles: Vec<_> = (0..checks)
        .map(|i| {
            let h = Arc::clone(&h);
            tokio::spawn(async move {
                let text = format!("প্রতিটি যাচাইয়ের জন্য আলাদা একটি বাক্য নম্বর {i}।");
                h.detector.check(CheckRequest::new(text)).await
            })
        })
        .collect();

    for result in join_all(handles).await {
        let response = result.unwrap().unwrap();
        assert_eq!(response.analysis.total_sentences, 1);
        assert!(response.skipped_sources.is_empty());
    }

    assert_eq!(h.mock.calls(), checks + BANGLA_CORPUS.len());
    assert_eq!(h.detector.index().builds(), BANGLA_CORPUS.len() as u64);
}

#[tokio::test]
async fn test_threshold_monotonicity_with_stub_embedder() {
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(SentenceEmbedder::stub().unwrap());
    let h = mock_detector(MockEmbeddingProvider::new(MOCK_DIM));
    let index = Arc::new(plagiarism::CorpusIndex::new(
        provider,
        plagiarism::IndexConfig::default(),
    ));
    let detector = plagiarism::PlagiarismDetector::new(
        Arc::clone(h.detector.store()),
        index,
        plagiarism::DetectorConfig::default(),
    );

    let text = BANGLA_CORPUS
        .iter()
        .take(2)
        .map(|(_, content)| *content)
        .chain(["সম্পূর্ণ আলাদা একটি বাক্য যা কোথাও নেই।"])
        .collect::<Vec<_>>()
        .join(" ");

    let mut previous = -1.0;
    for threshold in [1.0, 0.95, 0.8, 0.7, 0.5, 0.2, 0.0] {
        let response = detector
            .check(CheckRequest::new(text.clone()).with_threshold(threshold))
            .await
            .unwrap();
        assert!(
            response.plagiarism_score >= previous,
            "threshold {threshold} lowered the score"
        );
        previous = response.plagiarism_score;
    }
    assert!((previous - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_self_similarity_is_one() {
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(SentenceEmbedder::stub().unwrap());
    let matcher = SemanticMatcher::new(provider, Duration::from_secs(5));
    let sentences = segment(BANGLA_CORPUS[0].1);
    let source = SourceRef::new(Uuid::nil(), "self");

    let matches = matcher
        .match_sentences(&sentences, &sentences, &source, 0.99)
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].similarity >= 0.999);
    assert_eq!(matches[0].match_type, MatchType::Similar);
}

#[test]
fn test_exact_run_lengths_are_symmetric() {
    let a = "শিক্ষা ব্যবস্থার উন্নতির জন্য আমাদের নতুন পদ্ধতি অবলম্বন করতে হবে এবং গবেষণা বাড়াতে হবে";
    let b = "সরকার বলেছে শিক্ষা ব্যবস্থার উন্নতির জন্য আমাদের নতুন পদ্ধতি অবলম্বন করতে হবে দ্রুত";

    let mut forward: Vec<usize> = find_exact_matches(a, b, 20).iter().map(|r| r.char_len).collect();
    let mut backward: Vec<usize> = find_exact_matches(b, a, 20).iter().map(|r| r.char_len).collect();
    forward.sort_unstable();
    backward.sort_unstable();

    assert!(!forward.is_empty());
    assert_eq!(forward, backward);
}

#[test]
fn test_segmentation_is_idempotent() {
    let raw = "--- Page 1 --- প্রথম অনুচ্ছেদের একটি বাক্য।! দ্বিতীয় বাক্যটি এখানে?\n\n=== Table 1 === Third sentence in English";
    let first = segment(raw);
    let rejoined = first
        .iter()
        .map(|s| format!("{}।", s.text))
        .collect::<Vec<_>>()
        .join(" ");
    let second = segment_normalized(&rejoined);

    let texts = |sentences: &[plagiarism::Sentence]| {
        sentences.iter().map(|s| s.text.clone()).collect::<Vec<_>>()
    };
    assert_eq!(first.len(), 3);
    assert_eq!(texts(&first), texts(&second));
}
