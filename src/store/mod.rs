//! purpose: This module is the YAML-backed document store: one record per identifier,
//!     stored as `<id>.yaml` (slashes sanitized) under the store directory. Load paths are
//!     lenient - unreadable or malformed records are warned about and skipped - while
//!     write paths surface real errors.
//!
//! invariants:
//!     - filename_for_id is the only mapping between identifiers and store paths
//!     - load_all returns records keyed and sorted by identifier
//!     - upsert creates the store directory on first write
//!
//! gotchas:
//!     - Multiline strings come out of serde_yaml as literal block scalars, which is what
//!       keeps descriptions and code snippets reviewable in diffs

mod merge;

pub use merge::merge_documents;

use crate::types::Document;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Store path is not a directory: {0}")]
    NotADirectory(String),
}

/// Keyed storage of documents, one YAML file per identifier.
pub struct DocStore {
    dir: PathBuf,
}

/// Store filename for an identifier (slashes are not path separators here).
pub fn filename_for_id(id: &str) -> String {
    format!("{}.yaml", id.replace('/', "_"))
}

impl DocStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for_id(&self, id: &str) -> PathBuf {
        self.dir.join(filename_for_id(id))
    }

    /// Load every parseable record, keyed by identifier.
    pub fn load_all(&self) -> Result<BTreeMap<String, Document>, StoreError> {
        if !self.dir.is_dir() {
            return Err(StoreError::NotADirectory(self.dir.display().to_string()));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("yaml"))
            .collect();
        paths.sort();

        let mut docs = BTreeMap::new();
        for path in paths {
            if let Some(doc) = read_record(&path) {
                docs.insert(doc.id.clone(), doc);
            }
        }
        Ok(docs)
    }

    /// Load one record by identifier; a missing or malformed record is `None`.
    pub fn load_one(&self, id: &str) -> Option<Document> {
        let path = self.path_for_id(id);
        if !path.exists() {
            return None;
        }
        read_record(&path)
    }

    /// Write (or overwrite) a record, creating the store directory if needed.
    pub fn upsert(&self, doc: &Document) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for_id(&doc.id);
        let yaml = serde_yaml::to_string(doc)?;
        fs::write(&path, yaml)?;
        Ok(path)
    }

    /// Remove a record by identifier. Returns whether a file was deleted.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path_for_id(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    /// Delete every record file not in `keep`. Returns the number pruned.
    pub fn prune_except(&self, keep: &HashSet<PathBuf>) -> Result<usize, StoreError> {
        if !self.dir.is_dir() {
            return Ok(0);
        }

        let mut pruned = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            if !keep.contains(&path) {
                fs::remove_file(&path)?;
                pruned += 1;
            }
        }
        Ok(pruned)
    }
}

/// Parse one store file, warning and skipping on failure.
fn read_record(path: &Path) -> Option<Document> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Warning: failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_yaml::from_str::<Document>(&text) {
        Ok(doc) if !doc.id.trim().is_empty() => Some(doc),
        Ok(_) => None,
        Err(e) => {
            eprintln!("Warning: failed to parse {}: {}", path.display(), e);
            None
        }
    }
}
