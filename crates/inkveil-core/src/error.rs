//! Error types surfaced to the shell.
//!
//! The core never corrects a failure on its own: it reports the precise cause
//! and leaves the document untouched.

use crate::shapes::ShapeId;
use thiserror::Error;

/// Errors raised by the edit engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// A stroke or shape was constructed with a non-positive (or non-finite) width.
    #[error("invalid style: width must be positive, got {width}")]
    InvalidStyle { width: f32 },
    /// A corner radius was NaN or infinite.
    #[error("invalid style: corner radius must be finite, got {radius}")]
    InvalidCornerRadius { radius: f32 },
    /// A point with a NaN or infinite coordinate was supplied.
    #[error("point ({x}, {y}) is not finite")]
    NonFinitePoint { x: f32, y: f32 },
    /// Every shape id has been handed out; the document cannot grow.
    #[error("shape ids exhausted")]
    IdsExhausted,
    /// The referenced shape is not in the document (erased, undone, or never committed).
    #[error("shape {0} not found")]
    NotFound(ShapeId),
}

/// Errors raised while encoding or decoding a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The data was written by a newer format than this build understands.
    #[error("unsupported format version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    /// The data claims a known version but its contents are malformed.
    #[error("corrupt document: {0}")]
    CorruptData(String),
    /// The document could not be written.
    #[error("cannot encode document: {0}")]
    Encode(String),
}

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;
