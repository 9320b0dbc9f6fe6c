//! Incident sources

use crate::error::SourceError;
use crate::types::IncidentReport;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Supplies the current set of incident reports
pub trait IncidentSource: Send + Sync {
    /// All incidents, in a stable order
    fn incidents(&self) -> Result<Vec<IncidentReport>, SourceError>;
}

impl IncidentSource for Vec<IncidentReport> {
    fn incidents(&self) -> Result<Vec<IncidentReport>, SourceError> {
        Ok(self.clone())
    }
}

/// Reads `*.txt` incident files from a directory, keyed by file stem
#[derive(Debug, Clone)]
pub struct DirectoryIncidentSource {
    dir: PathBuf,
    extension: String,
}

impl DirectoryIncidentSource {
    /// Source over `*.txt` files in `dir`
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "txt".to_string(),
        }
    }

    /// Match a different file extension (without dot)
    #[inline]
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Scanned directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl IncidentSource for DirectoryIncidentSource {
    fn incidents(&self) -> Result<Vec<IncidentReport>, SourceError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(dir = %self.dir.display(), "incident directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(SourceError::io_error(&self.dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SourceError::io_error(&self.dir, e))?.path();
            let matches = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str());
            if matches {
                paths.push(path);
            }
        }
        paths.sort();

        let mut incidents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable incident file");
                    continue;
                }
            };
            match IncidentReport::from_path(&path, text) {
                Some(incident) => incidents.push(incident),
                None => tracing::warn!(path = %path.display(), "skipping file without a usable name"),
            }
        }

        tracing::debug!(count = incidents.len(), dir = %self.dir.display(), "incidents loaded");
        Ok(incidents)
    }
}
