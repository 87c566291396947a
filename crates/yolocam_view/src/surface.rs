//! Immediate-mode drawing surface.
//!
//! Renderers talk to a [`Surface`], never to a concrete canvas. The trait
//! mirrors the subset of the 2D canvas API the annotation renderer needs:
//! one affine transform (uniform scale + translation), rectangles, lines,
//! images and single-line text.
//!
//! [`DisplayList`] is a surface that only records what it was asked to draw.
//! It backs the renderer tests and is handy for debugging a frame.

use crate::color::Color;
use crate::constants::{CHAR_WIDTH_FACTOR, LINE_HEIGHT_FACTOR};
use crate::geometry::{Bounds, Point};

/// Uniform-scale affine transform: `p' = p * scale + (tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        scale: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(scale: f64, tx: f64, ty: f64) -> Self {
        Self { scale, tx, ty }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
    }

    pub fn apply_rect(&self, r: Bounds) -> Bounds {
        let origin = self.apply(r.position());
        Bounds::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A draw command as recorded by [`DisplayList`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    SetTransform(Affine),
    ResetTransform,
    DrawImage {
        image: String,
        width: f64,
        height: f64,
    },
    StrokeRect {
        rect: Bounds,
        color: Color,
        width: f64,
    },
    FillRect {
        rect: Bounds,
        color: Color,
    },
    StrokeLine {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
    FillText {
        text: String,
        /// Left edge and alphabetic baseline.
        position: Point,
        size: f64,
        color: Color,
    },
}

/// A 2D drawing target.
///
/// Coordinates passed to drawing methods are interpreted through the
/// current transform, exactly like a canvas context; stroke widths are
/// scaled by it too.
pub trait Surface {
    /// Decoded image type this surface can blit.
    type Image;

    /// Surface size in screen pixels.
    fn size(&self) -> (f64, f64);

    fn clear(&mut self);

    fn set_transform(&mut self, transform: Affine);

    fn reset_transform(&mut self);

    /// Draw `image` with its top-left at the transformed origin, covering
    /// `width x height` units.
    fn draw_image(&mut self, image: &Self::Image, width: f64, height: f64);

    fn stroke_rect(&mut self, rect: Bounds, color: Color, width: f64);

    fn fill_rect(&mut self, rect: Bounds, color: Color);

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64);

    /// Draw single-line text; `position` is the left end of the baseline.
    fn fill_text(&mut self, text: &str, position: Point, size: f64, color: Color);

    /// Estimated advance width of `text` at font `size`.
    fn measure_text(&self, text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * CHAR_WIDTH_FACTOR
    }

    /// Line height for font `size`.
    fn line_height(&self, size: f64) -> f64 {
        size * LINE_HEIGHT_FACTOR
    }
}

/// Records every command instead of drawing it.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    width: f64,
    height: f64,
    transform: Affine,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            transform: Affine::IDENTITY,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Transform active after the last recorded command.
    pub fn current_transform(&self) -> Affine {
        self.transform
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Commands recorded since the most recent `Clear` (inclusive).
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear))
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for DisplayList {
    /// Images are identified by name only.
    type Image = String;

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn reset_transform(&mut self) {
        self.transform = Affine::IDENTITY;
        self.commands.push(DrawCommand::ResetTransform);
    }

    fn draw_image(&mut self, image: &String, width: f64, height: f64) {
        self.commands.push(DrawCommand::DrawImage {
            image: image.clone(),
            width,
            height,
        });
    }

    fn stroke_rect(&mut self, rect: Bounds, color: Color, width: f64) {
        self.commands.push(DrawCommand::StrokeRect { rect, color, width });
    }

    fn fill_rect(&mut self, rect: Bounds, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, position: Point, size: f64, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            position,
            size,
            color,
        });
    }
}
