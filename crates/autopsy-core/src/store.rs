//! Keyed persistence for classification records and repair suggestions
//!
//! Both stores are last-write-wins by incident id. `get_all` returns a
//! snapshot: later writes never show up in a list already returned.

use crate::error::StoreError;
use crate::types::ClassificationRecord;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Classification record persistence
pub trait RecordStore: Send + Sync {
    /// Insert or replace the record keyed by its `incident_id`
    fn put(&self, record: ClassificationRecord) -> Result<(), StoreError>;

    /// Snapshot of every stored record
    fn get_all(&self) -> Result<Vec<ClassificationRecord>, StoreError>;

    /// Record for one incident
    fn get(&self, incident_id: &str) -> Result<Option<ClassificationRecord>, StoreError> {
        Ok(self
            .get_all()?
            .into_iter()
            .find(|r| r.incident_id == incident_id))
    }
}

/// Repair suggestion text for one incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairSuggestion {
    pub incident_id: String,
    pub text: String,
}

/// Repair suggestion persistence
pub trait RepairStore: Send + Sync {
    /// Insert or replace the suggestion for `incident_id`
    fn put(&self, incident_id: &str, text: &str) -> Result<(), StoreError>;

    /// Snapshot of every stored suggestion
    fn get_all(&self) -> Result<Vec<RepairSuggestion>, StoreError>;
}

/// In-memory record store, ordered by incident id
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<BTreeMap<String, ClassificationRecord>>,
}

impl InMemoryRecordStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn put(&self, record: ClassificationRecord) -> Result<(), StoreError> {
        validate_id(&record.incident_id)?;
        self.records.lock().insert(record.incident_id.clone(), record);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<ClassificationRecord>, StoreError> {
        Ok(self.records.lock().values().cloned().collect())
    }

    fn get(&self, incident_id: &str) -> Result<Option<ClassificationRecord>, StoreError> {
        Ok(self.records.lock().get(incident_id).cloned())
    }
}

/// Directory-backed record store, one `<incident_id>.json` per record
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Backing directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, incident_id: &str) -> PathBuf {
        self.dir.join(format!("{incident_id}.json"))
    }
}

impl RecordStore for FileRecordStore {
    fn put(&self, record: ClassificationRecord) -> Result<(), StoreError> {
        validate_id(&record.incident_id)?;
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io_error(&self.dir, e))?;

        let path = self.path_for(&record.incident_id);
        let body = serde_json::to_string_pretty(&record)?;
        fs::write(&path, body).map_err(|e| StoreError::io_error(&path, e))?;
        tracing::debug!(path = %path.display(), "record written");
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<ClassificationRecord>, StoreError> {
        let mut records = Vec::new();
        for path in list_files(&self.dir, "json")? {
            let body = match fs::read_to_string(&path) {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable record");
                    continue;
                }
            };
            match serde_json::from_str::<ClassificationRecord>(&body) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable record");
                }
            }
        }
        Ok(records)
    }

    fn get(&self, incident_id: &str) -> Result<Option<ClassificationRecord>, StoreError> {
        validate_id(incident_id)?;
        let path = self.path_for(incident_id);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(serde_json::from_str(&body)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io_error(&path, e)),
        }
    }
}

/// In-memory repair store
#[derive(Debug, Default)]
pub struct InMemoryRepairStore {
    repairs: Mutex<BTreeMap<String, String>>,
}

impl InMemoryRepairStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepairStore for InMemoryRepairStore {
    fn put(&self, incident_id: &str, text: &str) -> Result<(), StoreError> {
        validate_id(incident_id)?;
        self.repairs.lock().insert(incident_id.to_string(), text.to_string());
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<RepairSuggestion>, StoreError> {
        Ok(self
            .repairs
            .lock()
            .iter()
            .map(|(id, text)| RepairSuggestion {
                incident_id: id.clone(),
                text: text.clone(),
            })
            .collect())
    }
}

/// Directory-backed repair store, one `<incident_id>.txt` per suggestion
#[derive(Debug, Clone)]
pub struct FileRepairStore {
    dir: PathBuf,
}

impl FileRepairStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RepairStore for FileRepairStore {
    fn put(&self, incident_id: &str, text: &str) -> Result<(), StoreError> {
        validate_id(incident_id)?;
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io_error(&self.dir, e))?;
        let path = self.dir.join(format!("{incident_id}.txt"));
        fs::write(&path, text).map_err(|e| StoreError::io_error(&path, e))
    }

    fn get_all(&self) -> Result<Vec<RepairSuggestion>, StoreError> {
        list_files(&self.dir, "txt")?
            .into_iter()
            .filter_map(|path| {
                let incident_id = path.file_stem()?.to_str()?.to_string();
                Some((incident_id, path))
            })
            .map(|(incident_id, path)| {
                let text = fs::read_to_string(&path).map_err(|e| StoreError::io_error(&path, e))?;
                Ok(RepairSuggestion { incident_id, text })
            })
            .collect()
    }
}

/// Ids become file names, so path syntax is rejected
fn validate_id(incident_id: &str) -> Result<(), StoreError> {
    let invalid = incident_id.is_empty()
        || incident_id == "."
        || incident_id == ".."
        || incident_id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidIncidentId(incident_id.to_string()));
    }
    Ok(())
}

/// Files in `dir` with `extension`, sorted by path; a missing dir is empty
fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io_error(dir, e)),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StoreError::io_error(dir, e))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
