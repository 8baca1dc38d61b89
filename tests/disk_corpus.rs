mod common;

use common::fixtures::{BANGLA_CORPUS, disk_detector};
use plagiarism::corpus::CorpusExport;
use plagiarism::{CheckRequest, MatchType, NewDocument};
use tempfile::TempDir;

#[tokio::test]
async fn test_corpus_survives_reopen_and_still_matches() {
    let dir = TempDir::new().unwrap();
    let corpus_dir = dir.path().join("corpus");

    let ids = {
        let detector = disk_detector(&corpus_dir).await;
        let mut ids = Vec::new();
        for (title, content) in BANGLA_CORPUS {
            let doc = detector
                .add_document(NewDocument::new(title, content))
                .await
                .unwrap();
            ids.push(doc.id);
        }
        ids
    };

    let detector = disk_detector(&corpus_dir).await;
    let listed = detector.list_documents().await.unwrap();
    assert_eq!(listed.len(), BANGLA_CORPUS.len());
    let mut listed_ids: Vec<_> = listed.iter().map(|d| d.id).collect();
    let mut expected = ids.clone();
    listed_ids.sort();
    expected.sort();
    assert_eq!(listed_ids, expected);

    let response = detector
        .check(CheckRequest::new(BANGLA_CORPUS[3].1))
        .await
        .unwrap();

    assert_eq!(response.analysis.flagged_sentences, 1);
    assert_eq!(response.matches[0].source_id, ids[3]);
    assert_eq!(response.matches[0].match_type, MatchType::Exact);
    assert!(response.skipped_sources.is_empty());
}

#[tokio::test]
async fn test_update_and_remove_persist() {
    let dir = TempDir::new().unwrap();
    let detector = disk_detector(dir.path()).await;

    let doc = detector
        .add_document(NewDocument::new("খসড়া", BANGLA_CORPUS[0].1))
        .await
        .unwrap();
    let other = detector
        .add_document(NewDocument::new("অন্য", BANGLA_CORPUS[1].1))
        .await
        .unwrap();
    detector
        .update_document(doc.id, BANGLA_CORPUS[2].1.to_string())
        .await
        .unwrap();
    assert!(detector.remove_document(other.id).await.unwrap());

    let reopened = disk_detector(dir.path()).await;
    let documents = reopened.list_documents().await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, doc.id);
    assert_eq!(documents[0].content, BANGLA_CORPUS[2].1);

    let stale = reopened
        .check(CheckRequest::new(BANGLA_CORPUS[0].1))
        .await
        .unwrap();
    assert!(stale.matches.is_empty());

    let fresh = reopened
        .check(CheckRequest::new(BANGLA_CORPUS[2].1))
        .await
        .unwrap();
    assert_eq!(fresh.matches.len(), 1);
}

#[tokio::test]
async fn test_import_export_and_stats() {
    let dir = TempDir::new().unwrap();
    let import_dir = dir.path().join("incoming");
    std::fs::create_dir_all(&import_dir).unwrap();
    for (i, (_, content)) in BANGLA_CORPUS.iter().enumerate() {
        std::fs::write(import_dir.join(format!("doc{i}.txt")), content).unwrap();
    }
    std::fs::write(import_dir.join("notes.md"), "ignored").unwrap();

    let detector = disk_detector(&dir.path().join("corpus")).await;
    let report = detector.import_directory(&import_dir, "bulk_import").await.unwrap();
    assert_eq!(report.imported, BANGLA_CORPUS.len());
    assert_eq!(report.failed, 0);

    let stats = detector.stats().await.unwrap();
    assert_eq!(stats.total_documents, BANGLA_CORPUS.len());
    assert_eq!(stats.sources.get("bulk_import"), Some(&BANGLA_CORPUS.len()));

    let hits = detector.search("উন্নতির", 10, 0.0).await.unwrap();
    assert_eq!(hits.len(), 2);

    let export_path = dir.path().join("export.json");
    let exported = detector.export(&export_path).await.unwrap();
    assert_eq!(exported, BANGLA_CORPUS.len());

    let export: CorpusExport =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(export.total_documents, BANGLA_CORPUS.len());
    assert_eq!(export.documents.len(), BANGLA_CORPUS.len());
}
