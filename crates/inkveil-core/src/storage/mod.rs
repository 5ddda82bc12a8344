//! Storage abstraction for persistence.
//!
//! Backends store documents in the current codec format, so anything loaded
//! through a backend has passed the same validation as [`crate::format::decode`].

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::canvas::Document;
use crate::error::CodecError;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document storage backends.
pub trait Storage: Send + Sync {
    /// Save a document, replacing any previous one with the same id.
    fn save(&self, id: &str, document: &Document) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, id: &str) -> StorageResult<Document>;

    /// Delete a document. Deleting a missing id is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document ids, sorted.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}
