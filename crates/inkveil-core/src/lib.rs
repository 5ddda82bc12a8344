//! Inkveil Core Library
//!
//! Platform-neutral document engine for screen annotation overlays: freehand
//! strokes and geometric shapes, an edit engine with undo/redo, and a
//! versioned codec. Shells own rendering and input; they drive a [`Canvas`]
//! and rasterize the items it hands back.

pub mod boundary;
pub mod canvas;
pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod history;
pub mod routing;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use canvas::{Canvas, Document};
pub use config::CanvasConfig;
pub use error::{CodecError, EditError, EditResult};
pub use format::{FORMAT_VERSION, decode, encode};
pub use geometry::Rect;
pub use routing::{ArrowPath, ArrowRender};
pub use shapes::{Attachment, Color, Item, Point, Shape, ShapeId, ShapeKind, ShapeStyle, Stroke, TextAlignH, TextAlignV};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tools::{ShapeDraft, StrokeDraft};
