use super::*;

fn provider(mock: MockEmbeddingProvider) -> Arc<dyn EmbeddingProvider> {
    Arc::new(mock)
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug)]
struct ShortBatchProvider;

impl EmbeddingProvider for ShortBatchProvider {
    fn model_id(&self) -> &str {
        "short"
    }

    fn dim(&self) -> usize {
        4
    }

    fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(vec![vec![1.0, 0.0, 0.0, 0.0]])
    }
}

mod matrix_tests {
    use super::*;

    #[test]
    fn test_self_similarity_is_one() {
        let rows = vec![
            stub_embedding("m", "বাংলা ভাষার সাহিত্য", 384),
            stub_embedding("m", "another sentence", 384),
        ];
        let matrix = EmbeddingMatrix::from_rows(rows, 384).unwrap();

        for i in 0..matrix.len() {
            assert!(matrix.cosine(i, &matrix, i) >= 0.999);
        }
    }

    #[test]
    fn test_cosine_of_unnormalized_rows() {
        let a = EmbeddingMatrix::from_rows(vec![vec![3.0, 0.0]], 2).unwrap();
        let b = EmbeddingMatrix::from_rows(vec![vec![2.0, 2.0]], 2).unwrap();
        let sim = a.cosine(0, &b, 0);
        assert!((sim - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_zero_row_scores_zero() {
        let a = EmbeddingMatrix::from_rows(vec![vec![0.0, 0.0]], 2).unwrap();
        let b = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]], 2).unwrap();
        assert_eq!(a.cosine(0, &b, 0), 0.0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]], 2);
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_cosine_is_reproducible() {
        let rows = vec![
            stub_embedding("m", "first", 64),
            stub_embedding("m", "second", 64),
        ];
        let a = EmbeddingMatrix::from_rows(rows.clone(), 64).unwrap();
        let b = EmbeddingMatrix::from_rows(rows, 64).unwrap();
        assert_eq!(
            a.cosine(0, &a, 1).to_bits(),
            b.cosine(0, &b, 1).to_bits()
        );
    }

    #[test]
    fn test_memory_accounting() {
        let matrix = EmbeddingMatrix::from_rows(vec![vec![0.5; 8]; 3], 8).unwrap();
        assert_eq!(matrix.memory_bytes(), 3 * 8 * 2 + 3 * 4);
        assert_eq!(EmbeddingMatrix::empty(8).memory_bytes(), 0);
    }
}

mod batch_tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_batch_skips_provider() {
        let mock = Arc::new(MockEmbeddingProvider::new(8));
        let dyn_provider: Arc<dyn EmbeddingProvider> = mock.clone();

        let matrix = embed_batch(&dyn_provider, Vec::new(), Duration::from_secs(1))
            .await
            .unwrap();

        assert!(matrix.is_empty());
        assert_eq!(matrix.dim(), 8);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_one_call_per_batch() {
        let mock = Arc::new(MockEmbeddingProvider::new(8));
        let dyn_provider: Arc<dyn EmbeddingProvider> = mock.clone();

        let matrix = embed_batch(
            &dyn_provider,
            texts(&["a sentence", "b sentence", "c sentence"]),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(matrix.len(), 3);
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.texts_embedded(), 3);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let slow = provider(MockEmbeddingProvider::new(8).with_delay(Duration::from_millis(300)));

        let err = embed_batch(&slow, texts(&["slow"]), Duration::from_millis(20))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let failing = provider(MockEmbeddingProvider::new(8).fail_when_contains("broken"));

        let err = embed_batch(&failing, texts(&["a broken text"]), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, EmbeddingError::InferenceFailed { .. }));
    }

    #[tokio::test]
    async fn test_batch_size_mismatch() {
        let short: Arc<dyn EmbeddingProvider> = Arc::new(ShortBatchProvider);

        let err = embed_batch(&short, texts(&["one", "two"]), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::BatchSizeMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_wrong_dimension_rejected() {
        let mock = provider(MockEmbeddingProvider::new(4).with_vector("odd", vec![1.0, 0.0]));

        let err = embed_batch(&mock, texts(&["odd"]), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, EmbeddingError::DimensionMismatch { .. }));
    }
}

mod mock_tests {
    use super::*;

    #[test]
    fn test_pinned_vectors_win() {
        let mock = MockEmbeddingProvider::new(2).with_vector("pinned", vec![0.0, 1.0]);
        let out = mock.embed(&texts(&["pinned", "other"])).unwrap();

        assert_eq!(out[0], vec![0.0, 1.0]);
        assert_eq!(out[1], stub_embedding("mock", "other", 2));
    }

    #[test]
    fn test_ready_flag() {
        let mock = MockEmbeddingProvider::new(2);
        assert!(mock.is_ready());
        mock.set_ready(false);
        assert!(!mock.is_ready());
    }

    #[test]
    fn test_gate_releases_on_drop() {
        let mock = MockEmbeddingProvider::new(2);
        let release = mock.hold_on("held");
        drop(release);

        assert!(mock.embed(&texts(&["held text"])).is_ok());
    }
}

#[test]
fn test_stub_embedding_properties() {
    let a = stub_embedding("model-a", "একই বাক্য", 384);
    let b = stub_embedding("model-b", "একই বাক্য", 384);

    assert_eq!(a.len(), 384);
    assert_ne!(a, b);
    let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-4);
}

#[test]
fn test_l2_normalize_zero_vector() {
    let mut zero = vec![0.0; 4];
    l2_normalize(&mut zero);
    assert_eq!(zero, vec![0.0; 4]);
}
