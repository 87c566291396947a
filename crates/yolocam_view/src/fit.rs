//! Contain and cover fits.
//!
//! Every overlay (grid cell, thumbnail, lightbox) places content with a
//! "contain" fit; only the sheet compositor uses "cover". Both fits return
//! `None` for degenerate input (zero, negative or non-finite sizes) so that
//! callers skip drawing instead of dividing by zero.

use crate::geometry::{Bounds, Point};

/// Result of fitting content inside a container without cropping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainFit {
    /// Uniform scale from content pixels to container pixels.
    pub scale: f64,
    /// Horizontal letterbox offset.
    pub offset_x: f64,
    /// Vertical letterbox offset.
    pub offset_y: f64,
    /// Scaled content width.
    pub display_width: f64,
    /// Scaled content height.
    pub display_height: f64,
}

impl ContainFit {
    /// The rectangle the content occupies inside the container.
    pub fn content_rect(&self) -> Bounds {
        Bounds::new(
            self.offset_x,
            self.offset_y,
            self.display_width,
            self.display_height,
        )
    }

    /// Map a point in content pixels to container coordinates.
    pub fn content_to_container(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }
}

/// Result of filling a tile with content, cropping whatever overflows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    /// Uniform scale from content pixels to tile pixels.
    pub scale: f64,
    /// Left edge of the source crop, in content pixels.
    pub src_x: f64,
    /// Top edge of the source crop, in content pixels.
    pub src_y: f64,
    /// Width of the source crop, in content pixels.
    pub src_width: f64,
    /// Height of the source crop, in content pixels.
    pub src_height: f64,
}

impl CoverFit {
    pub fn source_rect(&self) -> Bounds {
        Bounds::new(self.src_x, self.src_y, self.src_width, self.src_height)
    }
}

fn usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Fit `content` entirely inside `container`, centered, preserving aspect.
pub fn fit_contain(
    container_w: f64,
    container_h: f64,
    content_w: f64,
    content_h: f64,
) -> Option<ContainFit> {
    if !(usable(container_w) && usable(container_h) && usable(content_w) && usable(content_h)) {
        return None;
    }
    let scale = (container_w / content_w).min(container_h / content_h);
    let display_width = content_w * scale;
    let display_height = content_h * scale;
    Some(ContainFit {
        scale,
        offset_x: ((container_w - display_width) / 2.0).max(0.0),
        offset_y: ((container_h - display_height) / 2.0).max(0.0),
        display_width,
        display_height,
    })
}

/// Fill a `tile` with `content`, centered, cropping the overflow.
pub fn fit_cover(tile_w: f64, tile_h: f64, content_w: f64, content_h: f64) -> Option<CoverFit> {
    if !(usable(tile_w) && usable(tile_h) && usable(content_w) && usable(content_h)) {
        return None;
    }
    let scale = (tile_w / content_w).max(tile_h / content_h);
    let src_width = (tile_w / scale).min(content_w);
    let src_height = (tile_h / scale).min(content_h);
    Some(CoverFit {
        scale,
        src_x: (content_w - src_width) / 2.0,
        src_y: (content_h - src_height) / 2.0,
        src_width,
        src_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_contain_exact_half() {
        let fit = fit_contain(400.0, 300.0, 800.0, 600.0).unwrap();
        assert!(approx_eq(fit.scale, 0.5));
        assert!(approx_eq(fit.offset_x, 0.0));
        assert!(approx_eq(fit.offset_y, 0.0));
    }

    #[test]
    fn test_contain_letterboxes_wide_container() {
        let fit = fit_contain(500.0, 100.0, 100.0, 100.0).unwrap();
        assert!(approx_eq(fit.scale, 1.0));
        assert!(approx_eq(fit.offset_x, 200.0));
        assert!(approx_eq(fit.offset_y, 0.0));
    }

    #[test]
    fn test_contain_stays_inside_container() {
        let sizes = [
            (640.0, 480.0, 1920.0, 1080.0),
            (123.0, 987.0, 17.0, 3.0),
            (50.0, 50.0, 4000.0, 10.0),
            (1.0, 1000.0, 1000.0, 1.0),
        ];
        for (cw, ch, iw, ih) in sizes {
            let fit = fit_contain(cw, ch, iw, ih).unwrap();
            assert!(fit.offset_x >= 0.0 && fit.offset_y >= 0.0);
            assert!(fit.display_width <= cw + EPSILON);
            assert!(fit.display_height <= ch + EPSILON);
        }
    }

    #[test]
    fn test_degenerate_sizes_are_none() {
        assert!(fit_contain(400.0, 300.0, 0.0, 600.0).is_none());
        assert!(fit_contain(400.0, 300.0, 800.0, 0.0).is_none());
        assert!(fit_contain(0.0, 300.0, 800.0, 600.0).is_none());
        assert!(fit_cover(100.0, 100.0, 0.0, 0.0).is_none());
        assert!(fit_cover(100.0, 100.0, f64::NAN, 10.0).is_none());
    }

    #[test]
    fn test_cover_crops_wide_content() {
        // 200x100 into a 100x100 tile: scale 1.0, crop the middle 100px.
        let fit = fit_cover(100.0, 100.0, 200.0, 100.0).unwrap();
        assert!(approx_eq(fit.scale, 1.0));
        assert!(approx_eq(fit.src_x, 50.0));
        assert!(approx_eq(fit.src_y, 0.0));
        assert!(approx_eq(fit.src_width, 100.0));
        assert!(approx_eq(fit.src_height, 100.0));
    }

    #[test]
    fn test_cover_fills_tile_without_bands() {
        let fit = fit_cover(160.0, 90.0, 640.0, 480.0).unwrap();
        assert!(approx_eq(fit.src_width * fit.scale, 160.0));
        assert!(approx_eq(fit.src_height * fit.scale, 90.0));
        assert!(fit.src_x >= 0.0 && fit.src_y >= 0.0);
        assert!(fit.src_x + fit.src_width <= 640.0 + EPSILON);
        assert!(fit.src_y + fit.src_height <= 480.0 + EPSILON);
    }
}
