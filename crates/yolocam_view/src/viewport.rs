//! Pan/zoom viewport for an annotation canvas.
//!
//! A [`Viewport`] maps image pixels to screen pixels with a uniform scale
//! followed by a translation:
//!
//! ```text
//! screen = image * scale + offset
//! ```
//!
//! The [`ViewportController`] owns one viewport and is the only thing that
//! mutates it, through three operations: fit-to-canvas, zoom-at-point and
//! pan-by.

use crate::constants::{ZOOM_MAX, ZOOM_MIN};
use crate::fit::fit_contain;
use crate::geometry::Point;

/// Represents pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Viewport {
    /// Create a new viewport with the given scale and offset.
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Create an identity viewport (scale=1, no offset).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Inverse affine: screen pixels to image pixels.
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    /// Forward affine: image pixels to screen pixels.
    pub fn image_to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.scale + self.offset_x,
            image.y * self.scale + self.offset_y,
        )
    }

    /// Zoom as a whole-number percentage, for HUD display.
    pub fn zoom_percent(&self) -> f64 {
        (self.scale * 100.0).round()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

/// Owns the viewport of one canvas and the size of the image shown in it.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    viewport: Viewport,
    image_size: Option<(f64, f64)>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Natural size of the image currently shown, if any.
    pub fn image_size(&self) -> Option<(f64, f64)> {
        self.image_size
    }

    /// Contain-fit the image into the canvas.
    ///
    /// Returns `false` (leaving the viewport untouched) when either size is
    /// degenerate, e.g. an image whose dimensions are not known yet.
    pub fn fit_to_canvas(&mut self, image_w: f64, image_h: f64, canvas_w: f64, canvas_h: f64) -> bool {
        match fit_contain(canvas_w, canvas_h, image_w, image_h) {
            Some(fit) => {
                self.viewport = Viewport::new(fit.scale, fit.offset_x, fit.offset_y);
                self.image_size = Some((image_w, image_h));
                true
            }
            None => {
                log::debug!(
                    "Skipping fit: image {}x{} into canvas {}x{}",
                    image_w,
                    image_h,
                    canvas_w,
                    canvas_h
                );
                false
            }
        }
    }

    /// Zoom by `factor`, keeping the image point under the cursor fixed.
    ///
    /// The resulting scale is clamped to `ZOOM_MIN..=ZOOM_MAX`, so a fit
    /// scale outside that range snaps into it on the first zoom step.
    pub fn zoom_at(&mut self, factor: f64, cursor_x: f64, cursor_y: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let cursor = Point::new(cursor_x, cursor_y);

        // Image-space point under cursor (before zoom)
        let anchor = self.viewport.screen_to_image(cursor);

        let new_scale = (self.viewport.scale * factor).clamp(ZOOM_MIN, ZOOM_MAX);

        // New offset puts the same image point back under the cursor
        self.viewport = Viewport::new(
            new_scale,
            cursor.x - anchor.x * new_scale,
            cursor.y - anchor.y * new_scale,
        );
    }

    /// Apply a screen-space pan delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.offset_x += dx;
        self.viewport.offset_y += dy;
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        self.viewport.screen_to_image(screen)
    }

    pub fn image_to_screen(&self, image: Point) -> Point {
        self.viewport.image_to_screen(image)
    }

    /// Clamp an image-space point into `[0, width] x [0, height]`.
    ///
    /// Without a loaded image the point is returned unchanged.
    pub fn clamp_to_image(&self, p: Point) -> Point {
        match self.image_size {
            Some((w, h)) => Point::new(p.x.clamp(0.0, w), p.y.clamp(0.0, h)),
            None => p,
        }
    }

    /// Forget the image (viewport goes back to identity).
    pub fn reset(&mut self) {
        self.viewport = Viewport::identity();
        self.image_size = None;
    }
}
