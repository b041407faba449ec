//! Import history
//!
//! The emissions API has no idempotency, so uploading the same file twice
//! creates every record twice. Each folder keeps a small ledger keyed by the
//! SHA-256 of imported files so a repeat can be caught before submission.

use crate::error::{CarbonImportError, Result};
use carbon_import_common::ImportReport;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const HISTORY_FILE_NAME: &str = ".import-history.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportHistory {
    version: u32,
    /// file hash -> entry
    entries: HashMap<String, HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub file_name: String,
    pub file_size: u64,
    /// RFC 3339
    pub imported_at: String,
    pub success_count: usize,
    pub error_count: usize,
}

impl ImportHistory {
    const CURRENT_VERSION: u32 = 1;

    pub fn history_path(folder: &Path) -> PathBuf {
        folder.join(HISTORY_FILE_NAME)
    }

    /// Load the folder's history; unreadable or outdated files start fresh
    pub fn load(folder: &Path) -> Self {
        let path = Self::history_path(folder);
        if !path.exists() {
            return Self::default();
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, ImportHistory>(BufReader::new(file)) {
            Ok(history) if history.version == Self::CURRENT_VERSION => history,
            Ok(_) => {
                tracing::warn!(path = %path.display(), "import history version mismatch, starting fresh");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable import history, starting fresh");
                Self::default()
            }
        }
    }

    pub fn save(&self, folder: &Path) -> Result<()> {
        let file = File::create(Self::history_path(folder))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Delete the history file; `false` if there was none
    pub fn clear(folder: &Path) -> Result<bool> {
        let path = Self::history_path(folder);
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn get(&self, hash: &str) -> Option<&HistoryEntry> {
        self.entries.get(hash)
    }

    pub fn record(&mut self, hash: String, file_size: u64, report: &ImportReport) {
        self.entries.insert(
            hash,
            HistoryEntry {
                file_name: report.source.clone(),
                file_size,
                imported_at: chrono::Local::now().to_rfc3339(),
                success_count: report.success_count,
                error_count: report.error_count,
            },
        );
    }

    /// Entries, most recent first
    pub fn entries(&self) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| b.imported_at.cmp(&a.imported_at));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ImportHistory {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// SHA-256 of a file, hex encoded
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Folder whose history a file belongs to
pub fn history_folder(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Ask before importing a file that is already in the history
pub fn confirm_reimport(file_name: &str, previous: &HistoryEntry) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "{} was already imported on {} ({} ok / {} failed). Import again?",
            file_name, previous.imported_at, previous.success_count, previous.error_count
        ))
        .default(false)
        .interact()
        .map_err(|e| CarbonImportError::Prompt(e.to_string()))
}
