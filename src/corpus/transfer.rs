use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{CorpusError, CorpusResult};
use super::model::{CorpusDocument, NewDocument};
use super::store::CorpusStore;

/// Source tag applied to documents imported from a directory by default.
pub const DEFAULT_IMPORT_SOURCE: &str = "bulk_import";

/// Outcome of [`import_directory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    /// One `"<file>: <error>"` line per failed file.
    pub errors: Vec<String>,
    pub document_ids: Vec<Uuid>,
}

/// JSON layout written by [`export_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusExport {
    pub exported_at: DateTime<Utc>,
    pub total_documents: usize,
    pub documents: Vec<CorpusDocument>,
}

/// Imports every `*.txt` file in `dir` (not recursive), in file-name order.
///
/// The title is the file stem and `imported_from` metadata records the file name. A file
/// that cannot be read or stored is counted in the report and does not stop the import.
pub async fn import_directory(
    store: &dyn CorpusStore,
    dir: &Path,
    source: &str,
) -> CorpusResult<ImportReport> {
    if !tokio::fs::try_exists(dir).await? {
        return Err(CorpusError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_text && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut report = ImportReport::default();
    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let result = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let document = NewDocument::new(title, content)
                    .with_source(source)
                    .with_metadata("imported_from", file_name.clone());
                store.add(document).await
            }
            Err(e) => Err(CorpusError::Io(e)),
        };

        match result {
            Ok(document) => {
                report.imported += 1;
                report.document_ids.push(document.id);
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "Failed to import corpus file");
                report.failed += 1;
                report.errors.push(format!("{file_name}: {e}"));
            }
        }
    }

    info!(
        dir = %dir.display(),
        imported = report.imported,
        failed = report.failed,
        "Directory import finished"
    );
    Ok(report)
}

/// Writes the whole corpus to `path` as pretty-printed JSON and returns the document count.
pub async fn export_json(store: &dyn CorpusStore, path: &Path) -> CorpusResult<usize> {
    let documents = store.list_documents().await?;
    let export = CorpusExport {
        exported_at: Utc::now(),
        total_documents: documents.len(),
        documents,
    };

    let json = serde_json::to_string_pretty(&export)?;
    tokio::fs::write(path, json).await?;

    info!(path = %path.display(), documents = export.total_documents, "Corpus exported");
    Ok(export.total_documents)
}
