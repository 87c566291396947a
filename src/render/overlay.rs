//! Box overlays for contained images (grid cells, thumbnails, lightbox).
//!
//! These overlays do not go through a viewport: the image is shown with a
//! "contain" fit inside its container, the overlay element covers exactly
//! the displayed image, and boxes are placed by scaling their pixel
//! coordinates with the same fit scale.

use yolocam_view::constants::{CHAR_WIDTH_FACTOR, LINE_HEIGHT_FACTOR};
use yolocam_view::{fit_contain, Bounds};

use super::canvas::label_rect;
use crate::constants::{GLOW_ALPHA, LABEL_FONT_PX};
use crate::model::{denormalize_all, NormalizedBox, PixelBox};
use crate::palette::ClassPalette;

/// One absolutely-placed box element.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    /// Position relative to the overlay element.
    pub rect: Bounds,
    /// Border and label chip color (CSS).
    pub color: String,
    /// Glow color, `rgba(...)`.
    pub glow: String,
    pub label: String,
    /// Label chip, relative to the overlay element. Above the box, or just
    /// inside its top edge when the box touches the top of the image.
    pub chip: Bounds,
}

fn chip_rect(rect: Bounds, label: &str) -> Bounds {
    let text_width = label.chars().count() as f64 * LABEL_FONT_PX * CHAR_WIDTH_FACTOR;
    label_rect(rect, text_width, LABEL_FONT_PX * LINE_HEIGHT_FACTOR)
}

/// Computed overlay for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    /// Overlay element rectangle, relative to the container.
    pub content: Bounds,
    /// Fit scale from image pixels to container pixels.
    pub scale: f64,
    pub boxes: Vec<OverlayBox>,
}

/// Lay out `boxes` (image pixels) over an image of natural size `natural`
/// shown contained in `container`. `None` while either size is unknown.
pub fn layout_overlay(
    container: (f64, f64),
    natural: (f64, f64),
    boxes: &[PixelBox],
    palette: &ClassPalette,
) -> Option<OverlayLayout> {
    let fit = fit_contain(container.0, container.1, natural.0, natural.1)?;
    let boxes = boxes
        .iter()
        .map(|b| {
            let rect = b.bounds().scaled(fit.scale);
            let label = palette.name(b.cls);
            OverlayBox {
                rect,
                color: palette.color_css(b.cls).to_string(),
                glow: palette.glow_css(b.cls, GLOW_ALPHA),
                chip: chip_rect(rect, &label),
                label,
            }
        })
        .collect();
    Some(OverlayLayout {
        content: fit.content_rect(),
        scale: fit.scale,
        boxes,
    })
}

/// Retained overlay of one container. Every render replaces the previous
/// content entirely, so calling it again (e.g. on resize) never leaves
/// stale boxes behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayLayer {
    layout: Option<OverlayLayout>,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render from pixel boxes. Returns `false` (and empties the layer)
    /// when the geometry is degenerate.
    pub fn render(
        &mut self,
        container: (f64, f64),
        natural: (f64, f64),
        boxes: &[PixelBox],
        palette: &ClassPalette,
    ) -> bool {
        self.layout = layout_overlay(container, natural, boxes, palette);
        self.layout.is_some()
    }

    /// Re-render from normalized boxes, converting with the natural size.
    pub fn render_normalized(
        &mut self,
        container: (f64, f64),
        natural: (f64, f64),
        boxes: &[NormalizedBox],
        palette: &ClassPalette,
    ) -> bool {
        let pixels = denormalize_all(boxes, natural.0, natural.1);
        self.render(container, natural, &pixels, palette)
    }

    pub fn clear(&mut self) {
        self.layout = None;
    }

    pub fn layout(&self) -> Option<&OverlayLayout> {
        self.layout.as_ref()
    }

    /// Number of box elements currently shown.
    pub fn box_count(&self) -> usize {
        self.layout.as_ref().map_or(0, |l| l.boxes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassEntry;

    fn palette() -> ClassPalette {
        ClassPalette::new(vec![
            ClassEntry::new("rayon", "#ff3b30"),
            ClassEntry::new("mancha", "#00c7be"),
        ])
    }

    #[test]
    fn test_layout_letterboxed() {
        let boxes = [PixelBox::new(100.0, 50.0, 200.0, 100.0, 1)];
        let layout = layout_overlay((400.0, 400.0), (800.0, 400.0), &boxes, &palette()).unwrap();
        assert_eq!(layout.content, Bounds::new(0.0, 100.0, 400.0, 200.0));
        assert_eq!(layout.boxes[0].rect, Bounds::new(50.0, 25.0, 100.0, 50.0));
        assert_eq!(layout.boxes[0].label, "mancha");
        assert_eq!(layout.boxes[0].color, "#00c7be");
        assert_eq!(layout.boxes[0].glow, "rgba(0,199,190,0.35)");
    }

    #[test]
    fn test_label_chip_placement() {
        let boxes = [
            PixelBox::new(100.0, 200.0, 200.0, 100.0, 0),
            PixelBox::new(100.0, 0.0, 200.0, 100.0, 1),
        ];
        let layout = layout_overlay((400.0, 400.0), (800.0, 800.0), &boxes, &palette()).unwrap();

        let low = &layout.boxes[0];
        let chip_h = LABEL_FONT_PX * LINE_HEIGHT_FACTOR + 3.0;
        assert!((low.chip.y - (100.0 - chip_h)).abs() < 1e-9);
        assert_eq!(low.chip.x, low.rect.x);
        assert!((low.chip.width - (5.0 * LABEL_FONT_PX * CHAR_WIDTH_FACTOR + 6.0)).abs() < 1e-9);

        let top = &layout.boxes[1];
        assert_eq!(top.chip.y, 0.0);
        assert!(top.chip.width > low.chip.width);
    }

    #[test]
    fn test_render_is_idempotent() {
        let palette = palette();
        let boxes = [PixelBox::new(0.0, 0.0, 10.0, 10.0, 0), PixelBox::new(5.0, 5.0, 1.0, 1.0, 0)];
        let mut layer = OverlayLayer::new();
        assert!(layer.render((100.0, 100.0), (50.0, 50.0), &boxes, &palette));
        let first = layer.layout().cloned();
        assert!(layer.render((100.0, 100.0), (50.0, 50.0), &boxes, &palette));
        assert_eq!(layer.box_count(), 2);
        assert_eq!(layer.layout().cloned(), first);
    }

    #[test]
    fn test_resize_rescales() {
        let palette = palette();
        let boxes = [PixelBox::new(10.0, 10.0, 10.0, 10.0, 0)];
        let mut layer = OverlayLayer::new();
        layer.render((100.0, 100.0), (100.0, 100.0), &boxes, &palette);
        layer.render((200.0, 200.0), (100.0, 100.0), &boxes, &palette);
        let layout = layer.layout().unwrap();
        assert_eq!(layout.boxes.len(), 1);
        assert_eq!(layout.boxes[0].rect, Bounds::new(20.0, 20.0, 20.0, 20.0));
    }

    #[test]
    fn test_zero_boxes_keeps_sized_overlay() {
        let mut layer = OverlayLayer::new();
        assert!(layer.render((300.0, 200.0), (600.0, 400.0), &[], &palette()));
        assert_eq!(layer.layout().unwrap().content, Bounds::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(layer.box_count(), 0);
    }

    #[test]
    fn test_unknown_natural_size_empties_layer() {
        let palette = palette();
        let mut layer = OverlayLayer::new();
        layer.render((300.0, 200.0), (600.0, 400.0), &[PixelBox::new(0.0, 0.0, 1.0, 1.0, 0)], &palette);
        assert!(!layer.render((300.0, 200.0), (0.0, 0.0), &[], &palette));
        assert!(layer.layout().is_none());
    }

    #[test]
    fn test_render_normalized() {
        let mut layer = OverlayLayer::new();
        let boxes = [NormalizedBox::new(0, 0.5, 0.5, 0.5, 0.5)];
        layer.render_normalized((100.0, 100.0), (200.0, 200.0), &boxes, &palette());
        assert_eq!(layer.layout().unwrap().boxes[0].rect, Bounds::new(25.0, 25.0, 50.0, 50.0));
    }
}
