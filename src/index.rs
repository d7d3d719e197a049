//! Textbook indexing and the process-wide index snapshot.
//!
//! A reindex is a full rescan of the library directory: every `.pdf` file is
//! read, passed through the [`TextExtractor`], normalized and tagged with
//! filename metadata. Files that fail to extract are logged and skipped.
//! The finished [`Index`] is written to a flat JSON file and swapped into the
//! [`IndexStore`] in one step.
//!
//! # Snapshot model
//!
//! ```text
//!  reindex ──▶ build new Index ──▶ write index file ──▶ swap Arc
//!                                                         │
//!  queries ──▶ snapshot() ──▶ Arc<Index> (old or new, never partial)
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::extract::{ExtractError, TextExtractor};
use crate::meta::detect;
use crate::models::{Index, IndexedDocument};
use crate::text::normalize;

/// Holds the current index snapshot. Readers clone the `Arc`; reindex
/// replaces it wholesale.
#[derive(Debug, Default)]
pub struct IndexStore {
    current: RwLock<Arc<Index>>,
}

impl IndexStore {
    pub fn new(index: Index) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<Index> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the snapshot. Readers holding the old `Arc` keep it.
    pub fn replace(&self, index: Index) {
        let next = Arc::new(index);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Lists `.pdf` files (case-insensitive suffix) directly inside `dir`,
/// sorted by filename.
pub fn list_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_pdf = entry
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .ends_with(".pdf");
        if is_pdf {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Builds an index from every PDF in `dir`, creating `dir` if needed.
///
/// Extraction runs on the blocking pool. With `timeout` set, a file whose
/// extraction takes longer is skipped like any other extraction failure.
pub async fn build_index(
    dir: &Path,
    extractor: Arc<dyn TextExtractor>,
    timeout: Option<Duration>,
) -> Result<Index> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create library directory: {}", dir.display()))?;

    let files = list_pdf_files(dir)?;
    info!(dir = %dir.display(), files = files.len(), "indexing textbooks");

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let file_id = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %file_id, error = %e, "failed to read file, skipping");
                continue;
            }
        };

        match extract_with_timeout(Arc::clone(&extractor), bytes, timeout).await {
            Ok(raw) => {
                let text = normalize(&raw);
                let char_count = text.chars().count();
                info!(file = %file_id, chars = char_count, "indexed textbook");
                documents.push(IndexedDocument {
                    metadata: detect(&file_id),
                    file_id,
                    raw_text: text,
                    char_count,
                });
            }
            Err(e) => {
                warn!(file = %file_id, error = %e, "failed to index textbook, skipping");
            }
        }
    }

    Ok(Index {
        built_at: Some(Utc::now()),
        documents,
    })
}

async fn extract_with_timeout(
    extractor: Arc<dyn TextExtractor>,
    bytes: Vec<u8>,
    timeout: Option<Duration>,
) -> Result<String, ExtractError> {
    let task = tokio::task::spawn_blocking(move || extractor.extract(&bytes));
    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| ExtractError::Timeout(limit))?,
        None => task.await,
    };
    joined.map_err(|e| ExtractError::Task(e.to_string()))?
}

/// Writes the index to `path`, replacing any previous file.
///
/// The JSON goes to a sibling `.tmp` file first and is renamed over `path`,
/// so a crash mid-write never leaves a truncated index behind.
pub fn save_index(path: &Path, index: &Index) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(index).context("Failed to serialize index")?;
    let tmp_path = temp_path_for(path);
    std::fs::write(&tmp_path, json)
        .with_context(|| format!("Failed to write index file: {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace index file: {}", path.display()))?;
    debug!(path = %path.display(), documents = index.len(), "index written");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads the index file. A missing or unreadable file yields an empty index.
pub fn load_index(path: &Path) -> Index {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                info!(path = %path.display(), "no index file yet, starting empty");
            } else {
                warn!(path = %path.display(), error = %e, "failed to read index file, starting empty");
            }
            return Index::empty();
        }
    };

    match serde_json::from_str::<Index>(&content) {
        Ok(index) => {
            info!(path = %path.display(), documents = index.len(), "loaded index");
            index
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "index file is corrupt, starting empty");
            Index::empty()
        }
    }
}

/// Full reindex: build, persist, then swap into `store`.
///
/// The store is only touched after the file has been written, so a failed
/// write leaves the previous snapshot in place.
pub async fn reindex(
    store: &IndexStore,
    dir: &Path,
    index_path: &Path,
    extractor: Arc<dyn TextExtractor>,
    timeout: Option<Duration>,
) -> Result<Arc<Index>> {
    let index = build_index(dir, extractor, timeout).await?;
    save_index(index_path, &index)?;
    store.replace(index);
    Ok(store.snapshot())
}
