//! Bounding boxes in pixel space (working format) and normalized YOLO space
//! (wire and file format).

use serde::{Deserialize, Serialize};
use yolocam_view::Bounds;

/// Class index into the class palette.
pub type ClassIndex = u32;

/// A bounding box in source-image pixels: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub cls: ClassIndex,
}

impl PixelBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64, cls: ClassIndex) -> Self {
        Self { x, y, w, h, cls }
    }

    pub fn from_bounds(bounds: Bounds, cls: ClassIndex) -> Self {
        Self::new(bounds.x, bounds.y, bounds.width, bounds.height, cls)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.w, self.h)
    }

    /// Convert to normalized center-based coordinates.
    ///
    /// Outputs are clamped to `[0, 1]`. Returns `None` when the image size
    /// is not positive (image not decoded yet).
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> Option<NormalizedBox> {
        if !(image_width > 0.0 && image_height > 0.0) {
            return None;
        }
        let unit = |v: f64| v.clamp(0.0, 1.0);
        Some(NormalizedBox {
            cls: self.cls,
            cx: unit((self.x + self.w / 2.0) / image_width),
            cy: unit((self.y + self.h / 2.0) / image_height),
            w: unit(self.w / image_width),
            h: unit(self.h / image_height),
        })
    }
}

/// A YOLO record: class plus center and size as fractions of the image.
///
/// On the wire the center is spelled `xc`/`yc`. Values are kept as read;
/// out-of-range input is preserved rather than fixed up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    #[serde(default)]
    pub cls: ClassIndex,
    #[serde(rename = "xc", alias = "cx", default = "centered")]
    pub cx: f64,
    #[serde(rename = "yc", alias = "cy", default = "centered")]
    pub cy: f64,
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
}

fn centered() -> f64 {
    0.5
}

impl NormalizedBox {
    pub fn new(cls: ClassIndex, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { cls, cx, cy, w, h }
    }

    /// Convert to pixel space for an image of the given natural size.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> PixelBox {
        PixelBox {
            x: (self.cx - self.w / 2.0) * image_width,
            y: (self.cy - self.h / 2.0) * image_height,
            w: self.w * image_width,
            h: self.h * image_height,
            cls: self.cls,
        }
    }
}

/// Convert a whole label set to pixel space.
pub fn denormalize_all(boxes: &[NormalizedBox], image_width: f64, image_height: f64) -> Vec<PixelBox> {
    boxes
        .iter()
        .map(|b| b.to_pixel(image_width, image_height))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_round_trip_inside_image() {
        let cases = [
            (PixelBox::new(200.0, 200.0, 400.0, 200.0, 2), 800.0, 600.0),
            (PixelBox::new(0.0, 0.0, 640.0, 480.0, 0), 640.0, 480.0),
            (PixelBox::new(13.25, 7.5, 1.0, 99.75, 5), 1920.0, 1080.0),
            (PixelBox::new(1.0, 1.0, 0.0, 0.0, 1), 3.0, 7.0),
        ];
        for (b, w, h) in cases {
            let back = b.to_normalized(w, h).unwrap().to_pixel(w, h);
            assert!(approx_eq(back.x, b.x), "{b:?}");
            assert!(approx_eq(back.y, b.y), "{b:?}");
            assert!(approx_eq(back.w, b.w), "{b:?}");
            assert!(approx_eq(back.h, b.h), "{b:?}");
            assert_eq!(back.cls, b.cls);
        }
    }

    #[test]
    fn test_normalize_scenario_box() {
        let n = PixelBox::new(200.0, 200.0, 400.0, 200.0, 2)
            .to_normalized(800.0, 600.0)
            .unwrap();
        assert_eq!(n.cls, 2);
        assert!(approx_eq(n.cx, 0.5));
        assert!(approx_eq(n.cy, 0.5));
        assert!(approx_eq(n.w, 0.5));
        assert!((n.h - 0.333).abs() < 1e-3);
    }

    #[test]
    fn test_normalize_clamps_on_write() {
        let n = PixelBox::new(-50.0, 500.0, 900.0, 400.0, 0)
            .to_normalized(800.0, 600.0)
            .unwrap();
        assert!(approx_eq(n.w, 1.0));
        assert!(n.cx <= 1.0 && n.cy <= 1.0);
    }

    #[test]
    fn test_normalize_without_dimensions() {
        assert!(PixelBox::new(0.0, 0.0, 1.0, 1.0, 0).to_normalized(0.0, 600.0).is_none());
    }

    #[test]
    fn test_denormalize_preserves_out_of_range() {
        let p = NormalizedBox::new(0, 1.2, -0.1, 0.5, 0.5).to_pixel(100.0, 100.0);
        assert!(approx_eq(p.x, 95.0));
        assert!(approx_eq(p.y, -35.0));
    }

    #[test]
    fn test_wire_field_names() {
        let n: NormalizedBox =
            serde_json::from_str(r#"{"cls":1,"xc":0.25,"yc":0.75,"w":0.1,"h":0.2}"#).unwrap();
        assert_eq!(n, NormalizedBox::new(1, 0.25, 0.75, 0.1, 0.2));
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"xc\":0.25"));
    }

    #[test]
    fn test_wire_defaults() {
        let n: NormalizedBox = serde_json::from_str(r#"{"cls":3}"#).unwrap();
        assert_eq!(n, NormalizedBox::new(3, 0.5, 0.5, 0.0, 0.0));
    }
}
