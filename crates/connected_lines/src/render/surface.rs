//! Drawing targets for render passes.
use glam::Vec2;

use crate::color::Color;
use crate::source::SourceImage;

/// A 2D drawing target with canvas-like primitives.
///
/// Coordinates are logical region px; implementations apply the pixel ratio given to
/// [`Surface::resize`]. Strokes use round caps and joins.
pub trait Surface {
    /// Resizes the backing store to `width × height` logical px at `pixel_ratio` device px
    /// per logical px. Discards previous content.
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32);

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Draws `image` cover-fitted over the whole `region` at the given opacity.
    ///
    /// Implementations fit the image at their device resolution.
    fn draw_backdrop(&mut self, image: &SourceImage, region: (u32, u32), alpha: f32);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Removes the surface from wherever it is displayed. Later draws are ignored.
    fn detach(&mut self) {}
}

/// A single recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Resize {
        width: u32,
        height: u32,
        pixel_ratio: f32,
    },
    Clear,
    Backdrop {
        /// Region covered, in logical px.
        size: (u32, u32),
        alpha: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Detach,
}

/// Surface that records every call instead of drawing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded calls since the most recent `Clear`.
    pub fn last_frame(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Clear))
            .map_or(0, |i| i + 1);
        &self.ops[start..]
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawOp> {
        self.last_frame()
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawOp> {
        self.last_frame()
            .iter()
            .filter(|op| matches!(op, DrawOp::Circle { .. }))
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.ops.last(), Some(DrawOp::Detach))
    }

    pub fn clear_log(&mut self) {
        self.ops.clear();
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.ops.push(DrawOp::Resize {
            width,
            height,
            pixel_ratio,
        });
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_backdrop(&mut self, _image: &SourceImage, region: (u32, u32), alpha: f32) {
        self.ops.push(DrawOp::Backdrop {
            size: region,
            alpha,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn detach(&mut self) {
        self.ops.push(DrawOp::Detach);
    }
}
