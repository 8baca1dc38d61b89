use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use super::{EmbeddingError, EmbeddingProvider, stub_embedding};

/// Scriptable in-process provider for tests.
///
/// Texts without a pinned vector get the deterministic stub embedding, so unrelated
/// sentences land far apart and identical sentences score 1.0.
pub struct MockEmbeddingProvider {
    model_id: String,
    dim: usize,
    vectors: RwLock<HashMap<String, Vec<f32>>>,
    fail_markers: RwLock<Vec<String>>,
    delay: RwLock<Option<Duration>>,
    ready: AtomicBool,
    calls: AtomicUsize,
    texts_embedded: AtomicUsize,
    gate: Mutex<Option<(String, mpsc::Receiver<()>)>>,
}

impl std::fmt::Debug for MockEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbeddingProvider")
            .field("model_id", &self.model_id)
            .field("dim", &self.dim)
            .field("calls", &self.calls())
            .finish()
    }
}

impl MockEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self {
            model_id: "mock".to_string(),
            dim,
            vectors: RwLock::new(HashMap::new()),
            fail_markers: RwLock::new(Vec::new()),
            delay: RwLock::new(None),
            ready: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    /// Pins the vector returned for an exact input text.
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.write().insert(text.into(), vector);
        self
    }

    /// Fails any batch containing a text that includes `marker`.
    pub fn fail_when_contains(self, marker: impl Into<String>) -> Self {
        self.fail_markers.write().push(marker.into());
        self
    }

    /// Sleeps for `delay` inside every call.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write() = Some(delay);
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Blocks the next batch containing `marker` until the returned sender fires (or drops).
    pub fn hold_on(&self, marker: impl Into<String>) -> mpsc::Sender<()> {
        let (tx, rx) = mpsc::channel();
        *self.gate.lock() = Some((marker.into(), rx));
        tx
    }

    /// Number of `embed` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total number of texts embedded so far.
    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    fn wait_at_gate(&self, texts: &[String]) {
        let held = {
            let mut gate = self.gate.lock();
            match gate.as_ref() {
                Some((marker, _)) if texts.iter().any(|t| t.contains(marker.as_str())) => {
                    gate.take()
                }
                _ => None,
            }
        };

        if let Some((_, rx)) = held {
            let _ = rx.recv();
        }
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);

        self.wait_at_gate(texts);

        if let Some(delay) = *self.delay.read() {
            std::thread::sleep(delay);
        }

        {
            let markers = self.fail_markers.read();
            if let Some(marker) = markers
                .iter()
                .find(|m| texts.iter().any(|t| t.contains(m.as_str())))
            {
                return Err(EmbeddingError::InferenceFailed {
                    reason: format!("mock failure triggered by {marker:?}"),
                });
            }
        }

        let vectors = self.vectors.read();
        Ok(texts
            .iter()
            .map(|text| match vectors.get(text) {
                Some(vector) => vector.clone(),
                None => stub_embedding(&self.model_id, text, self.dim),
            })
            .collect())
    }
}
