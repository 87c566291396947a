//! Annotation canvas renderer.
//!
//! One call draws a complete frame onto any [`Surface`]:
//!
//! 1. clear
//! 2. viewport transform, base image at the origin
//! 3. committed boxes in their class color, at constant screen thickness
//! 4. the box being drawn, in the highlight color
//! 5. identity transform, class labels above each box at a fixed font size
//! 6. full-canvas crosshair at the pointer

use yolocam_view::{Affine, Bounds, Color, Point, Surface, Viewport};

use crate::constants::{BASE_STROKE_WIDTH, LABEL_FONT_PX};
use crate::model::PixelBox;
use crate::palette::ClassPalette;

/// Label chip padding in screen pixels.
const LABEL_PAD: f64 = 3.0;

/// Visual parameters of the annotation canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasStyle {
    /// Box outline width in screen pixels.
    pub base_stroke_width: f64,
    /// Label font size in screen pixels.
    pub label_font_px: f64,
    pub crosshair_color: Color,
    pub provisional_color: Color,
    pub label_text_color: Color,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            base_stroke_width: BASE_STROKE_WIDTH,
            label_font_px: LABEL_FONT_PX,
            crosshair_color: Color::LIME,
            provisional_color: Color::LIME,
            label_text_color: Color::WHITE,
        }
    }
}

/// Everything one frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct FrameState<'a> {
    pub viewport: Viewport,
    /// Natural image size; `None` until the image is decoded.
    pub image_size: Option<(f64, f64)>,
    pub boxes: &'a [PixelBox],
    /// Box being drawn, in image pixels.
    pub provisional: Option<Bounds>,
    /// Last pointer position in screen pixels.
    pub pointer: Option<Point>,
    pub palette: &'a ClassPalette,
}

/// Draw one frame.
pub fn render_frame<S: Surface>(
    surface: &mut S,
    image: Option<&S::Image>,
    frame: &FrameState<'_>,
    style: &CanvasStyle,
) {
    surface.reset_transform();
    surface.clear();

    let vp = frame.viewport;
    if let Some((width, height)) = frame.image_size {
        surface.set_transform(Affine::new(vp.scale, vp.offset_x, vp.offset_y));
        if let Some(image) = image {
            surface.draw_image(image, width, height);
        }

        let line_width = style.base_stroke_width / vp.scale;
        for b in frame.boxes {
            surface.stroke_rect(b.bounds(), frame.palette.color(b.cls), line_width);
        }
        if let Some(rect) = frame.provisional {
            surface.stroke_rect(rect, style.provisional_color, line_width);
        }

        surface.reset_transform();
        for b in frame.boxes {
            draw_label(surface, frame, style, b);
        }
    }

    if let Some(p) = frame.pointer {
        draw_crosshair(surface, p, style.crosshair_color);
    }
}

/// Screen-space placement of a class label chip for a box.
///
/// The chip sits on top of the box's top edge; when that would leave the
/// canvas it moves just inside the box instead.
pub fn label_rect(
    box_screen: Bounds,
    text_width: f64,
    line_height: f64,
) -> Bounds {
    let height = line_height + LABEL_PAD;
    let width = text_width + 2.0 * LABEL_PAD;
    let y = if box_screen.y - height >= 0.0 {
        box_screen.y - height
    } else {
        box_screen.y
    };
    Bounds::new(box_screen.x, y, width, height)
}

fn draw_label<S: Surface>(surface: &mut S, frame: &FrameState<'_>, style: &CanvasStyle, b: &PixelBox) {
    let vp = frame.viewport;
    let top_left = vp.image_to_screen(Point::new(b.x, b.y));
    let box_screen = Bounds::new(top_left.x, top_left.y, b.w * vp.scale, b.h * vp.scale);

    let text = frame.palette.name(b.cls);
    let font = style.label_font_px;
    let chip = label_rect(box_screen, surface.measure_text(&text, font), surface.line_height(font));

    surface.fill_rect(chip, frame.palette.color(b.cls));
    let baseline = Point::new(chip.x + LABEL_PAD, chip.bottom() - LABEL_PAD - (surface.line_height(font) - font) / 2.0);
    surface.fill_text(&text, baseline, font, style.label_text_color);
}

fn draw_crosshair<S: Surface>(surface: &mut S, p: Point, color: Color) {
    let (width, height) = surface.size();
    surface.stroke_line(Point::new(0.0, p.y), Point::new(width, p.y), color, 1.0);
    surface.stroke_line(Point::new(p.x, 0.0), Point::new(p.x, height), color, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use yolocam_view::{DisplayList, DrawCommand};

    use crate::model::ClassEntry;

    fn palette() -> ClassPalette {
        ClassPalette::new(vec![
            ClassEntry::new("rayon", "#ff0000"),
            ClassEntry::new("mancha", "#0000ff"),
        ])
    }

    fn strokes(list: &DisplayList) -> Vec<(Bounds, Color, f64)> {
        list.last_frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect { rect, color, width } => Some((*rect, *color, *width)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_frame_order_and_stroke_width() {
        let palette = palette();
        let boxes = [PixelBox::new(200.0, 200.0, 400.0, 200.0, 1)];
        let frame = FrameState {
            viewport: Viewport::new(0.5, 0.0, 0.0),
            image_size: Some((800.0, 600.0)),
            boxes: &boxes,
            provisional: Some(Bounds::new(10.0, 10.0, 50.0, 50.0)),
            pointer: Some(Point::new(120.0, 80.0)),
            palette: &palette,
        };
        let mut list = DisplayList::new(400.0, 300.0);
        render_frame(&mut list, Some(&"img".to_string()), &frame, &CanvasStyle::default());

        let cmds = list.last_frame();
        assert_eq!(cmds[0], DrawCommand::Clear);
        assert_eq!(cmds[1], DrawCommand::SetTransform(Affine::new(0.5, 0.0, 0.0)));
        assert!(matches!(cmds[2], DrawCommand::DrawImage { width, .. } if width == 800.0));

        let s = strokes(&list);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].1, Color::from_hex("#0000ff").unwrap());
        assert_eq!(s[0].2, 4.0);
        assert_eq!(s[1].1, Color::LIME);

        let text = cmds.iter().find_map(|c| match c {
            DrawCommand::FillText { text, size, .. } => Some((text.clone(), *size)),
            _ => None,
        });
        assert_eq!(text, Some(("mancha".to_string(), LABEL_FONT_PX)));

        let lines: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeLine { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(lines[0], (Point::new(0.0, 80.0), Point::new(400.0, 80.0)));
        assert_eq!(lines[1], (Point::new(120.0, 0.0), Point::new(120.0, 300.0)));
        assert_eq!(list.current_transform(), Affine::IDENTITY);
    }

    #[test]
    fn test_labels_are_drawn_in_screen_space() {
        let palette = palette();
        let boxes = [PixelBox::new(100.0, 100.0, 10.0, 10.0, 0)];
        for scale in [0.25, 4.0] {
            let frame = FrameState {
                viewport: Viewport::new(scale, 0.0, 0.0),
                image_size: Some((800.0, 600.0)),
                boxes: &boxes,
                provisional: None,
                pointer: None,
                palette: &palette,
            };
            let mut list = DisplayList::new(400.0, 300.0);
            render_frame(&mut list, None, &frame, &CanvasStyle::default());
            let size = list.last_frame().iter().find_map(|c| match c {
                DrawCommand::FillText { size, .. } => Some(*size),
                _ => None,
            });
            assert_eq!(size, Some(LABEL_FONT_PX));
            let reset_before_text = list
                .last_frame()
                .iter()
                .position(|c| matches!(c, DrawCommand::ResetTransform))
                .zip(list.last_frame().iter().position(|c| matches!(c, DrawCommand::FillText { .. })))
                .is_some_and(|(r, t)| r < t);
            assert!(reset_before_text);
        }
    }

    #[test]
    fn test_label_flips_inside_near_top() {
        let above = label_rect(Bounds::new(10.0, 100.0, 50.0, 50.0), 30.0, 14.4);
        assert!(above.bottom() <= 100.0 + 1e-9);
        let inside = label_rect(Bounds::new(10.0, 5.0, 50.0, 50.0), 30.0, 14.4);
        assert_eq!(inside.y, 5.0);
    }

    #[test]
    fn test_no_image_draws_only_crosshair() {
        let palette = palette();
        let frame = FrameState {
            viewport: Viewport::identity(),
            image_size: None,
            boxes: &[],
            provisional: None,
            pointer: Some(Point::new(5.0, 5.0)),
            palette: &palette,
        };
        let mut list = DisplayList::new(100.0, 100.0);
        render_frame(&mut list, None, &frame, &CanvasStyle::default());
        let kinds: Vec<_> = list.last_frame().iter().map(std::mem::discriminant).collect();
        assert_eq!(kinds.len(), 3);
        assert!(strokes(&list).is_empty());
    }
}
