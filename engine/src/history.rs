//! Persisted list of past analyses.
//!
//! The file is a JSON array of [`AnalysisRecord`] in insertion order, rewritten
//! atomically after every change. Nothing is ever dropped automatically: the
//! list only shrinks through [`HistoryStore::delete`] and [`HistoryStore::clear`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use mindmatter_types::AnalysisRecord;
use mindmatter_utils::{atomic_write, move_aside, recover_bak_file};

const CORRUPT_SUFFIX: &str = "corrupt";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to write history to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    records: Vec<AnalysisRecord>,
    load_warning: Option<String>,
}

impl HistoryStore {
    /// A store that never touches disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load `path`, starting empty when it is missing or unreadable.
    ///
    /// A file that does not parse is renamed to `<name>.corrupt` so the next
    /// save does not overwrite it.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        recover_bak_file(&path);
        let (records, load_warning) = load_records(&path);
        Self {
            path: Some(path),
            records,
            load_warning,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set when loading hit a problem the user should hear about.
    #[must_use]
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    #[must_use]
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &AnalysisRecord> {
        self.records.iter().rev()
    }

    /// Entry at `index` in newest-first order.
    #[must_use]
    pub fn get_newest(&self, index: usize) -> Option<&AnalysisRecord> {
        self.records.iter().rev().nth(index)
    }

    /// Append and persist. The record is kept in memory even if the write fails.
    pub fn add(&mut self, record: AnalysisRecord) -> Result<(), HistoryError> {
        self.records.push(record);
        self.save()
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Option<AnalysisRecord>, HistoryError> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = self.records.remove(index);
        self.save()?;
        Ok(Some(removed))
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.records.clear();
        self.save()
    }

    fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.records)?;
        let write_err = |source| HistoryError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        atomic_write(path, &json).map_err(write_err)
    }
}

fn load_records(path: &Path) -> (Vec<AnalysisRecord>, Option<String>) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return (Vec::new(), None),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read history: {e}");
            return (
                Vec::new(),
                Some("Could not read saved history.".to_string()),
            );
        }
    };

    if content.trim().is_empty() {
        return (Vec::new(), None);
    }

    match serde_json::from_str::<Vec<AnalysisRecord>>(&content) {
        Ok(records) => {
            tracing::info!(count = records.len(), "Loaded analysis history");
            (records, None)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "History file is corrupt: {e}");
            let warning = match move_aside(path, CORRUPT_SUFFIX) {
                Ok(moved) => format!(
                    "Saved history was unreadable and moved to {}.",
                    moved.display()
                ),
                Err(e) => {
                    tracing::warn!("Failed to move corrupt history aside: {e}");
                    "Saved history was unreadable; starting fresh.".to_string()
                }
            };
            (Vec::new(), Some(warning))
        }
    }
}
