use super::*;
use crate::corpus::NewDocument;
use crate::embedding::MockEmbeddingProvider;
use std::time::Duration;

fn document(content: &str) -> CorpusDocument {
    CorpusDocument::from_new(NewDocument::new("doc", content)).unwrap()
}

fn index_with(mock: &Arc<MockEmbeddingProvider>, config: IndexConfig) -> CorpusIndex {
    CorpusIndex::new(mock.clone(), config)
}

const CONTENT: &str = "বাংলা ভাষার অনেক গুরুত্বপূর্ণ সাহিত্য রয়েছে। শিক্ষা ব্যবস্থার উন্নতি দরকার।";

#[tokio::test]
async fn test_ensure_indexed_aligns_rows_with_sentences() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());
    let doc = document(CONTENT);

    let indexed = index.ensure_indexed(&doc).await.unwrap();

    assert_eq!(indexed.sentences().len(), 2);
    assert_eq!(indexed.embeddings.len(), 2);
    assert_eq!(indexed.content_hash, doc.content_hash());
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_second_call_reuses_cache() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());
    let doc = document(CONTENT);

    let first = index.ensure_indexed(&doc).await.unwrap();
    let second = index.ensure_indexed(&doc).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mock.calls(), 1);
    assert_eq!(index.builds(), 1);
    assert_eq!(index.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_build() {
    let mock = Arc::new(
        MockEmbeddingProvider::new(16).with_delay(Duration::from_millis(50)),
    );
    let index = Arc::new(index_with(&mock, IndexConfig::default()));
    let doc = document(CONTENT);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let index = Arc::clone(&index);
            let doc = doc.clone();
            tokio::spawn(async move { index.ensure_indexed(&doc).await })
        })
        .collect();

    let results = futures_util::future::join_all(handles).await;
    let first = results[0].as_ref().unwrap().as_ref().unwrap().clone();
    for result in &results {
        let indexed = result.as_ref().unwrap().as_ref().unwrap();
        assert!(Arc::ptr_eq(indexed, &first));
    }
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_content_change_rebuilds_and_drops_old_entry() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());
    let mut doc = document(CONTENT);

    index.ensure_indexed(&doc).await.unwrap();
    doc.set_content("সম্পূর্ণ নতুন একটি বাক্য এখানে লেখা হয়েছে।".to_string());
    let rebuilt = index.ensure_indexed(&doc).await.unwrap();

    assert_eq!(rebuilt.sentences().len(), 1);
    assert_eq!(mock.calls(), 2);
    assert_eq!(index.len().await, 1);
}

#[tokio::test]
async fn test_remove_from_index() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());
    let doc = document(CONTENT);

    index.ensure_indexed(&doc).await.unwrap();
    assert!(index.remove_from_index(doc.id).await);
    assert!(!index.remove_from_index(doc.id).await);
    assert!(index.is_empty().await);

    index.ensure_indexed(&doc).await.unwrap();
    assert_eq!(mock.calls(), 2);
}

#[tokio::test]
async fn test_remove_releases_epoch_slot() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());

    for _ in 0..5 {
        assert!(!index.remove_from_index(Uuid::new_v4()).await);
    }
    assert_eq!(index.tracked_ids(), 0);

    let doc = document(CONTENT);
    index.ensure_indexed(&doc).await.unwrap();
    assert_eq!(index.tracked_ids(), 1);

    assert!(index.remove_from_index(doc.id).await);
    assert_eq!(index.tracked_ids(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remove_during_build_is_stale_then_pruned() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let release = mock.hold_on("আটকে");
    let index = Arc::new(index_with(&mock, IndexConfig::default()));
    let doc = document("এই নথিটি সূচি তৈরির সময় আটকে থাকবে।");

    let task = {
        let index = Arc::clone(&index);
        let doc = doc.clone();
        tokio::spawn(async move { index.ensure_indexed(&doc).await })
    };

    while mock.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    index.remove_from_index(doc.id).await;
    assert_eq!(index.tracked_ids(), 1);
    release.send(()).unwrap();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(IndexError::Stale { id }) if id == doc.id));
    assert_eq!(index.tracked_ids(), 0);
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let mock = Arc::new(MockEmbeddingProvider::new(16).fail_when_contains("ভুল"));
    let index = index_with(&mock, IndexConfig::default());
    let doc = document("এই লেখাটিতে ভুল আছে তাই ব্যর্থ হবে।");

    let err = index.ensure_indexed(&doc).await.unwrap_err();
    assert!(matches!(err, IndexError::Embedding { id, .. } if id == doc.id));

    assert!(index.ensure_indexed(&doc).await.is_err());
    assert_eq!(mock.calls(), 2);
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn test_timeout_surfaces_as_index_error() {
    let mock = Arc::new(MockEmbeddingProvider::new(16).with_delay(Duration::from_millis(300)));
    let index = index_with(
        &mock,
        IndexConfig {
            embed_timeout: Duration::from_millis(20),
            ..Default::default()
        },
    );

    let err = index.ensure_indexed(&document(CONTENT)).await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalidation_during_build_is_stale() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let release = mock.hold_on("আটকে");
    let index = Arc::new(index_with(&mock, IndexConfig::default()));
    let doc = document("এই নথিটি সূচি তৈরির সময় আটকে থাকবে।");

    let task = {
        let index = Arc::clone(&index);
        let doc = doc.clone();
        tokio::spawn(async move { index.ensure_indexed(&doc).await })
    };

    while mock.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    index.invalidate(doc.id).await;
    release.send(()).unwrap();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(IndexError::Stale { id }) if id == doc.id));
    assert!(index.is_empty().await);

    index.ensure_indexed(&doc).await.unwrap();
    assert_eq!(mock.calls(), 2);
}

#[tokio::test]
async fn test_old_epoch_is_rejected_without_building() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());
    let doc = document(CONTENT);

    let snapshot = index.epoch_snapshot();
    index.invalidate(doc.id).await;

    let err = index
        .ensure_indexed_at(&doc, snapshot.epoch(doc.id))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Stale { .. }));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_empty_document_indexes_without_provider_call() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());

    let indexed = index.ensure_indexed(&document("")).await.unwrap();
    assert!(indexed.sentences().is_empty());
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_clear() {
    let mock = Arc::new(MockEmbeddingProvider::new(16));
    let index = index_with(&mock, IndexConfig::default());

    index.ensure_indexed(&document(CONTENT)).await.unwrap();
    index.clear().await;
    assert!(index.is_empty().await);
}
