//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::canvas::Document;
use crate::format;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Documents are kept encoded, so a save/load cycle behaves like the file backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &Document) -> StorageResult<()> {
        let bytes = format::encode(document)?;
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.insert(id.to_string(), bytes);
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<Document> {
        let docs = self.documents.read().map_err(lock_error)?;
        let bytes = docs
            .get(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(format::decode(bytes)?)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self.documents.read().map_err(lock_error)?;
        let mut ids: Vec<String> = docs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.contains_key(id))
    }
}
