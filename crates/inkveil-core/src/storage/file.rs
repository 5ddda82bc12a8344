//! File-based storage.

use super::{Storage, StorageError, StorageResult};
use crate::canvas::Document;
use crate::format;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of every document file.
pub const DOCUMENT_EXTENSION: &str = ".inkveil.json";

/// File-based storage.
///
/// Stores one encoded document per file in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for document storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the platform data directory.
    ///
    /// On Linux: `~/.local/share/inkveil/documents/`
    /// On Windows: `%LOCALAPPDATA%\inkveil\documents\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("inkveil").join("documents"))
    }

    /// Get the file path for a document ID.
    pub fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}{}", safe_id, DOCUMENT_EXTENSION))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &Document) -> StorageResult<()> {
        let path = self.document_path(id);
        let bytes = format::encode(document)?;
        fs::write(&path, bytes)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::debug!("Saved document {} to {}", id, path.display());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<Document> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let bytes = fs::read(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(format::decode(&bytes)?)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut ids: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                name.to_str()
                    .and_then(|n| n.strip_suffix(DOCUMENT_EXTENSION))
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.document_path(id).exists())
    }
}
