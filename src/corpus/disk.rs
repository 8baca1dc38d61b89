//! Directory-backed corpus store (one `rkyv` file per document).

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use memmap2::Mmap;
use parking_lot::RwLock;
use rkyv::rancor::Error as RkyvError;
use rkyv::{from_bytes, to_bytes};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{CorpusError, CorpusResult};
use super::model::{CorpusDocument, NewDocument};
use super::record::StoredDocument;
use super::store::{CorpusStore, sort_documents};

const RKYV_EXTENSION: &str = "rkyv";

const TEMP_EXTENSION: &str = "rkyv.tmp";

/// Corpus store persisted under a directory.
///
/// Every document is loaded into memory by [`DiskCorpusStore::open`]. Writes go to a
/// temp file that is renamed over the final path, so a crash never leaves a torn record.
pub struct DiskCorpusStore {
    root: PathBuf,
    documents: RwLock<HashMap<Uuid, CorpusDocument>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for DiskCorpusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskCorpusStore")
            .field("root", &self.root)
            .field("documents", &self.documents.read().len())
            .finish()
    }
}

impl DiskCorpusStore {
    /// Opens (creating if needed) the store at `root` and loads every document.
    pub async fn open(root: impl Into<PathBuf>) -> CorpusResult<Self> {
        let root = root.into();
        let load_root = root.clone();
        let documents = tokio::task::spawn_blocking(move || load_all(&load_root)).await??;

        info!(
            root = %root.display(),
            documents = documents.len(),
            "Corpus loaded from disk"
        );

        Ok(Self {
            root,
            documents: RwLock::new(documents),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    async fn persist(&self, document: &CorpusDocument) -> CorpusResult<()> {
        let record = StoredDocument::from_document(document)?;
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || write_record(&root, &record)).await?
    }
}

#[async_trait]
impl CorpusStore for DiskCorpusStore {
    async fn list_documents(&self) -> CorpusResult<Vec<CorpusDocument>> {
        let mut documents: Vec<_> = self.documents.read().values().cloned().collect();
        sort_documents(&mut documents);
        Ok(documents)
    }

    async fn get(&self, id: Uuid) -> CorpusResult<Option<CorpusDocument>> {
        Ok(self.documents.read().get(&id).cloned())
    }

    async fn add(&self, document: NewDocument) -> CorpusResult<CorpusDocument> {
        let document = CorpusDocument::from_new(document)?;

        let _guard = self.write_lock.lock().await;
        self.persist(&document).await?;
        self.documents.write().insert(document.id, document.clone());

        debug!(id = %document.id, words = document.word_count, "Added document to disk store");
        Ok(document)
    }

    async fn update_content(&self, id: Uuid, content: String) -> CorpusResult<CorpusDocument> {
        let _guard = self.write_lock.lock().await;

        let mut document = self
            .documents
            .read()
            .get(&id)
            .cloned()
            .ok_or(CorpusError::NotFound { id })?;
        document.set_content(content);

        self.persist(&document).await?;
        self.documents.write().insert(id, document.clone());

        debug!(id = %id, words = document.word_count, "Updated document content");
        Ok(document)
    }

    async fn delete(&self, id: Uuid) -> CorpusResult<bool> {
        let _guard = self.write_lock.lock().await;

        if !self.documents.read().contains_key(&id) {
            return Ok(false);
        }

        let path = record_path(&self.root, id);
        tokio::task::spawn_blocking(move || match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CorpusError::Io(e)),
        })
        .await??;

        self.documents.write().remove(&id);
        debug!(id = %id, "Deleted document from disk store");
        Ok(true)
    }
}

fn record_path(root: &Path, id: Uuid) -> PathBuf {
    root.join(format!("{}.{}", id, RKYV_EXTENSION))
}

fn temp_record_path(root: &Path, id: Uuid) -> PathBuf {
    root.join(format!("{}.{}", id, TEMP_EXTENSION))
}

fn ensure_root(root: &Path) -> CorpusResult<()> {
    if !root.exists() {
        fs::create_dir_all(root).map_err(|_| CorpusError::StorageUnavailable {
            path: root.to_path_buf(),
        })?;
    }
    Ok(())
}

fn write_record(root: &Path, record: &StoredDocument) -> CorpusResult<()> {
    ensure_root(root)?;

    let id = Uuid::from_bytes(record.id);
    let bytes = to_bytes::<RkyvError>(record).map_err(|e| CorpusError::Serialization {
        reason: e.to_string(),
    })?;

    let temp_path = temp_record_path(root, id);
    let final_path = record_path(root, id);

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, &final_path)?;
    Ok(())
}

fn read_record(path: &Path) -> CorpusResult<CorpusDocument> {
    let corrupt = |reason: String| CorpusError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(corrupt("empty file".to_string()));
    }

    // SAFETY: record files are only replaced by rename, never modified in place.
    let mmap = unsafe { Mmap::map(&file)? };
    let record =
        from_bytes::<StoredDocument, RkyvError>(&mmap).map_err(|e| corrupt(e.to_string()))?;

    record.into_document()
}

fn load_all(root: &Path) -> CorpusResult<HashMap<Uuid, CorpusDocument>> {
    ensure_root(root)?;

    let mut documents = HashMap::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();

        // Leftover `.rkyv.tmp` files have extension `tmp` and are ignored.
        if path.extension().is_none_or(|ext| ext != RKYV_EXTENSION) {
            continue;
        }

        match read_record(&path) {
            Ok(document) => {
                documents.insert(document.id, document);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable corpus record");
            }
        }
    }

    Ok(documents)
}
