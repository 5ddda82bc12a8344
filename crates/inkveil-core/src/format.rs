//! Versioned document codec.
//!
//! Documents are stored as compact JSON inside a small envelope:
//!
//! ```json
//! {"formatVersion":2,"document":{"items":[...],"nextId":3}}
//! ```
//!
//! Version 1 files (`{"version":1,"strokes":[...]}`) predate shapes and are
//! migrated on load. Everything decoded is checked against the model
//! invariants before it is handed back.

use crate::canvas::{Document, FIRST_SHAPE_ID};
use crate::error::CodecError;
use crate::shapes::{Item, Stroke};
use serde::{Deserialize, Serialize};

/// Format version written by [`encode`].
pub const FORMAT_VERSION: u32 = 2;

/// Strokes-only format.
const LEGACY_STROKES_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    format_version: u32,
    document: &'a Document,
}

#[derive(Deserialize)]
struct Envelope {
    document: Document,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    #[serde(alias = "version")]
    format_version: u32,
}

#[derive(Deserialize)]
struct LegacyStrokes {
    strokes: Vec<Stroke>,
}

/// Encode a document as the current format version.
///
/// Fails with [`CodecError::Encode`] if the document breaks a model invariant
/// (for example a non-finite coordinate), since such a file could not be
/// decoded again.
pub fn encode(document: &Document) -> Result<Vec<u8>, CodecError> {
    document.check_invariants().map_err(CodecError::Encode)?;
    let envelope = EnvelopeRef {
        format_version: FORMAT_VERSION,
        document,
    };
    serde_json::to_vec(&envelope).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode bytes produced by [`encode`] or by an older supported version.
pub fn decode(bytes: &[u8]) -> Result<Document, CodecError> {
    let result = decode_inner(bytes);
    if let Err(e) = &result {
        log::warn!("Failed to decode document: {}", e);
    }
    result
}

/// Format version declared by the bytes, without decoding the body.
pub fn peek_version(bytes: &[u8]) -> Result<u32, CodecError> {
    let header: Header = serde_json::from_slice(bytes).map_err(corrupt)?;
    Ok(header.format_version)
}

fn decode_inner(bytes: &[u8]) -> Result<Document, CodecError> {
    let document = match peek_version(bytes)? {
        0 => return Err(CodecError::CorruptData("format version 0".to_string())),
        LEGACY_STROKES_VERSION => {
            let legacy: LegacyStrokes = serde_json::from_slice(bytes).map_err(corrupt)?;
            log::debug!("Migrating {} strokes from format version 1", legacy.strokes.len());
            Document {
                items: legacy.strokes.into_iter().map(Item::Stroke).collect(),
                next_id: FIRST_SHAPE_ID,
            }
        }
        FORMAT_VERSION => {
            let envelope: Envelope = serde_json::from_slice(bytes).map_err(corrupt)?;
            envelope.document
        }
        found => {
            return Err(CodecError::UnsupportedVersion {
                found,
                supported: FORMAT_VERSION,
            });
        }
    };

    document.check_invariants().map_err(CodecError::CorruptData)?;
    Ok(document)
}

fn corrupt(e: serde_json::Error) -> CodecError {
    CodecError::CorruptData(e.to_string())
}
