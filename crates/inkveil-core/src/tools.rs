//! In-progress strokes and shapes.
//!
//! A draft is owned by the caller between `begin_*` and `commit_*`; it is not
//! part of the document and records nothing in history. Dropping a draft
//! cancels it.

use crate::error::EditResult;
use crate::shapes::{
    Attachment, Color, Point, Shape, ShapeId, ShapeKind, ShapeStyle, Stroke, TextAlignH, TextAlignV,
    check_point,
};

/// A stroke being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDraft {
    stroke: Stroke,
}

impl StrokeDraft {
    /// Start a stroke at `start`, rejecting non-positive widths and
    /// non-finite points.
    pub fn begin(color: Color, width: f32, start: Point) -> EditResult<Self> {
        Ok(Self {
            stroke: Stroke::new(color, width, vec![start])?,
        })
    }

    /// Extend the stroke; points keep their insertion order.
    /// A non-finite point is rejected and the draft is left as it was.
    pub fn append_point(&mut self, point: Point) -> EditResult<()> {
        check_point(point)?;
        self.stroke.points.push(point);
        Ok(())
    }

    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    pub(crate) fn into_stroke(self) -> Stroke {
        self.stroke
    }
}

/// A shape being drawn, or an existing shape being edited.
///
/// Drafts opened with [`ShapeDraft::begin`] have id 0 and receive a fresh id
/// on commit. Drafts opened from the document keep their id and replace the
/// stored shape in place on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDraft {
    shape: Shape,
}

impl ShapeDraft {
    /// Start a new shape collapsed onto `start`.
    pub fn begin(kind: ShapeKind, style: ShapeStyle, start: Point) -> EditResult<Self> {
        style.validate()?;
        check_point(start)?;
        Ok(Self {
            shape: Shape::uncommitted(kind, style, start),
        })
    }

    pub(crate) fn editing(shape: Shape) -> Self {
        Self { shape }
    }

    /// Id of the shape being edited, `None` for a new shape.
    pub fn id(&self) -> Option<ShapeId> {
        (self.shape.id != 0).then_some(self.shape.id)
    }

    /// Move the dragged corner; `start` never changes.
    pub fn update_end(&mut self, point: Point) -> EditResult<()> {
        check_point(point)?;
        self.shape.end = point;
        Ok(())
    }

    /// Replace the style, rejecting non-positive widths.
    pub fn set_style(&mut self, style: ShapeStyle) -> EditResult<()> {
        style.validate()?;
        self.shape.style = style;
        Ok(())
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.shape.text = text.into();
    }

    /// Change alignment; `None` keeps the current value on that axis.
    pub fn set_alignment(&mut self, h: Option<TextAlignH>, v: Option<TextAlignV>) {
        if let Some(h) = h {
            self.shape.text_align_h = h;
        }
        if let Some(v) = v {
            self.shape.text_align_v = v;
        }
    }

    /// Attach the start to a closed shape, or detach it with `None`.
    pub fn set_start_attachment(&mut self, attachment: Option<Attachment>) -> EditResult<()> {
        check_attachment(attachment)?;
        self.shape.start_attach = attachment;
        Ok(())
    }

    /// Attach the end to a closed shape, or detach it with `None`.
    pub fn set_end_attachment(&mut self, attachment: Option<Attachment>) -> EditResult<()> {
        check_attachment(attachment)?;
        self.shape.end_attach = attachment;
        Ok(())
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) fn into_shape(self) -> Shape {
        self.shape
    }
}

fn check_attachment(attachment: Option<Attachment>) -> EditResult<()> {
    match attachment.and_then(|a| a.uv) {
        Some(uv) => check_point(uv),
        None => Ok(()),
    }
}
