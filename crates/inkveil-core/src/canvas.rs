//! Annotation document and the editing session that mutates it.

use crate::config::CanvasConfig;
use crate::error::{CodecError, EditError, EditResult};
use crate::format;
use crate::history::History;
use crate::routing::{self, ArrowRender};
use crate::shapes::{Color, Item, Point, Shape, ShapeId, ShapeKind, ShapeStyle, TextAlignH, TextAlignV};
use crate::tools::{ShapeDraft, StrokeDraft};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// First id handed out in a fresh document.
pub const FIRST_SHAPE_ID: ShapeId = 1;

/// The annotation document: items in paint order plus the id allocator.
///
/// Later items paint on top and win hit tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub items: Vec<Item>,
    /// Next shape id to allocate. Ids are never reused.
    pub next_id: ShapeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: FIRST_SHAPE_ID,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Get a shape by id.
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.items
            .iter()
            .filter_map(Item::as_shape)
            .find(|shape| shape.id == id)
    }

    /// Position of a shape in paint order.
    pub fn shape_index(&self, id: ShapeId) -> Option<usize> {
        self.items.iter().position(|item| item.shape_id() == Some(id))
    }

    /// Shapes in paint order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.items.iter().filter_map(Item::as_shape)
    }

    /// Check the model invariants, describing the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.next_id < FIRST_SHAPE_ID {
            return Err(format!("next id {} is below {}", self.next_id, FIRST_SHAPE_ID));
        }
        let mut seen = HashSet::new();
        for (index, item) in self.items.iter().enumerate() {
            match item {
                Item::Stroke(stroke) => {
                    if stroke.points.is_empty() {
                        return Err(format!("item {index}: stroke has no points"));
                    }
                    stroke.validate().map_err(|e| format!("item {index}: {e}"))?;
                }
                Item::Shape(shape) => {
                    shape.validate().map_err(|e| format!("item {index}: {e}"))?;
                    if shape.id < FIRST_SHAPE_ID || shape.id >= self.next_id {
                        return Err(format!(
                            "item {index}: shape id {} outside allocated range 1..{}",
                            shape.id, self.next_id
                        ));
                    }
                    if !seen.insert(shape.id) {
                        return Err(format!("item {index}: duplicate shape id {}", shape.id));
                    }
                }
            }
        }
        Ok(())
    }
}

/// An editing session: the document plus its undo/redo history.
///
/// Single-writer: every operation runs synchronously on the caller's thread
/// and no internal locking is done.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    document: Document,
    history: History,
}

impl Canvas {
    /// Create a session with an empty document.
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            document: Document::new(),
            history: History::with_limit(config.max_undo_history),
        }
    }

    /// Create a session around an existing document, with empty history.
    pub fn with_document(document: Document) -> Self {
        let mut canvas = Self::new();
        canvas.document = document;
        canvas
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Deep copy of the items in paint order, for rasterizing.
    pub fn items(&self) -> Vec<Item> {
        self.document.items.clone()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.document.shape(id)
    }

    /// Start a stroke. The draft is not part of the document until committed.
    pub fn begin_stroke(&self, color: Color, width: f32, start: Point) -> EditResult<StrokeDraft> {
        StrokeDraft::begin(color, width, start)
    }

    /// Append a finished stroke. Strokes get no id.
    ///
    /// Drafts only ever hold valid points, so committing cannot fail.
    pub fn commit_stroke(&mut self, draft: StrokeDraft) {
        let stroke = draft.into_stroke();
        log::debug!("Committing stroke with {} points", stroke.points.len());
        self.history.record(self.document.clone());
        self.document.items.push(Item::Stroke(stroke));
    }

    /// Start a shape with `end == start`.
    pub fn begin_shape(&self, kind: ShapeKind, style: ShapeStyle, start: Point) -> EditResult<ShapeDraft> {
        ShapeDraft::begin(kind, style, start)
    }

    /// Open an existing shape as a draft that keeps its id.
    pub fn edit_shape(&self, id: ShapeId) -> EditResult<ShapeDraft> {
        self.document
            .shape(id)
            .cloned()
            .map(ShapeDraft::editing)
            .ok_or(EditError::NotFound(id))
    }

    /// Commit a shape draft and return its id.
    ///
    /// New drafts get the next id and are appended on top. Drafts carrying an
    /// id replace that shape in place, keeping its z-order; if the shape is
    /// gone the document is left untouched and `NotFound` is returned.
    /// Once the id space is used up new shapes fail with `IdsExhausted`.
    pub fn commit_shape(&mut self, draft: ShapeDraft) -> EditResult<ShapeId> {
        let mut shape = draft.into_shape();
        shape.validate()?;

        if shape.id == 0 {
            let id = self.document.next_id;
            let next_id = id.checked_add(1).ok_or(EditError::IdsExhausted)?;
            shape.id = id;
            log::debug!("Committing new {} shape {}", shape.kind.name(), id);
            self.history.record(self.document.clone());
            self.document.next_id = next_id;
            self.document.items.push(Item::Shape(shape));
            Ok(id)
        } else {
            let id = shape.id;
            let index = self.document.shape_index(id).ok_or(EditError::NotFound(id))?;
            log::debug!("Replacing shape {} at index {}", id, index);
            self.history.record(self.document.clone());
            self.document.items[index] = Item::Shape(shape);
            Ok(id)
        }
    }

    /// Replace the text of a shape.
    pub fn set_shape_text(&mut self, id: ShapeId, text: impl Into<String>) -> EditResult<()> {
        let mut draft = self.edit_shape(id)?;
        draft.set_text(text);
        self.commit_shape(draft).map(|_| ())
    }

    /// Change the text alignment of a shape; `None` keeps that axis.
    pub fn set_shape_alignment(
        &mut self,
        id: ShapeId,
        h: Option<TextAlignH>,
        v: Option<TextAlignV>,
    ) -> EditResult<()> {
        let mut draft = self.edit_shape(id)?;
        draft.set_alignment(h, v);
        self.commit_shape(draft).map(|_| ())
    }

    /// Remove every item whose outline passes within `radius` of `point`.
    ///
    /// All matches go in one history step. Returns false, recording nothing,
    /// if nothing matched.
    pub fn erase_at(&mut self, point: Point, radius: f32) -> bool {
        if !self.document.items.iter().any(|item| item.is_near(point, radius)) {
            return false;
        }
        self.history.record(self.document.clone());
        let before = self.document.items.len();
        self.document.items.retain(|item| !item.is_near(point, radius));
        log::debug!(
            "Erased {} items at ({}, {})",
            before - self.document.items.len(),
            point.x,
            point.y
        );
        true
    }

    /// Remove all items. Returns false, recording nothing, if already empty.
    pub fn clear_all(&mut self) -> bool {
        if self.document.is_empty() {
            return false;
        }
        self.history.record(self.document.clone());
        self.document.items.clear();
        true
    }

    /// Topmost shape under `point`. Strokes are never selected.
    pub fn hit_test(&self, point: Point) -> Option<ShapeId> {
        self.document
            .items
            .iter()
            .rev()
            .filter_map(Item::as_shape)
            .find(|shape| shape.contains(point))
            .map(|shape| shape.id)
    }

    /// Arrows with attachments resolved and curved arrows routed around
    /// closed shapes, in paint order.
    pub fn arrows(&self) -> Vec<ArrowRender> {
        routing::render_arrows(&self.document.items)
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    ///
    /// The id allocator never moves backwards, so ids handed out before the
    /// undo are not reused.
    pub fn undo(&mut self) -> bool {
        let high_water = self.document.next_id;
        if !self.history.undo(&mut self.document) {
            return false;
        }
        self.document.next_id = self.document.next_id.max(high_water);
        log::debug!("Undo: {} items", self.document.len());
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let high_water = self.document.next_id;
        if !self.history.redo(&mut self.document) {
            return false;
        }
        self.document.next_id = self.document.next_id.max(high_water);
        log::debug!("Redo: {} items", self.document.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Encode the current document.
    pub fn save(&self) -> Result<Vec<u8>, CodecError> {
        format::encode(&self.document)
    }

    /// Replace the document with a decoded one and forget history.
    /// On error the session is unchanged.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let document = format::decode(bytes)?;
        self.load_document(document);
        Ok(())
    }

    /// Replace the document and forget history.
    pub fn load_document(&mut self, document: Document) {
        log::debug!("Loaded document with {} items", document.len());
        self.document = document;
        self.history.clear();
    }
}
