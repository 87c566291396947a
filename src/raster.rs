//! Headless raster target for the annotation canvas, backed by tiny-skia.
//!
//! Text is shaped with cosmic-text against the system font database and its
//! glyph coverage is blended straight into the pixmap. Width measurement
//! stays on the shared approximate metrics so layout matches every surface.

use std::path::Path;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache};
use image::{Rgba, RgbaImage};
use tiny_skia::{ColorU8, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform};
use yolocam_view::{Affine, Bounds, Color, Point, Surface};

/// Canvas background.
const BACKGROUND: Color = Color {
    r: 0.07,
    g: 0.07,
    b: 0.08,
    a: 1.0,
};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("cannot create a {0}x{1} surface")]
    Size(u32, u32),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Premultiplied copy of an RGBA image, ready to be blitted.
pub fn pixmap_from_rgba(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let Rgba([r, g, b, a]) = *src;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn to_transform(t: Affine) -> Transform {
    let scale = t.scale as f32;
    Transform::from_row(scale, 0.0, 0.0, scale, t.tx as f32, t.ty as f32)
}

fn paint(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn rect(b: Bounds) -> Option<Rect> {
    Rect::from_xywh(b.x as f32, b.y as f32, b.width as f32, b.height as f32)
}

/// Shaping state, created on the first text draw.
struct GlyphRasterizer {
    fonts: FontSystem,
    cache: SwashCache,
}

impl GlyphRasterizer {
    fn new() -> Self {
        let fonts = FontSystem::new();
        if fonts.db().faces().next().is_none() {
            log::warn!("no system fonts found; text will not be drawn");
        }
        Self {
            fonts,
            cache: SwashCache::new(),
        }
    }

    /// Draw one line of text whose baseline starts at `(x, y)` in device
    /// pixels.
    fn draw(&mut self, pixmap: &mut Pixmap, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let mut buffer = Buffer::new(&mut self.fonts, Metrics::new(size, size * 1.2));
        buffer.set_size(&mut self.fonts, None, None);
        buffer.set_text(
            &mut self.fonts,
            text,
            &Attrs::new().family(Family::SansSerif),
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(&mut self.fonts, false);

        let Some(baseline) = buffer.layout_runs().next().map(|run| run.line_y) else {
            return;
        };
        let origin_x = x.round() as i32;
        let origin_y = (y - baseline).round() as i32;
        let [r, g, b, a] = color.to_rgba8();
        let ink = cosmic_text::Color::rgba(r, g, b, a);

        buffer.draw(&mut self.fonts, &mut self.cache, ink, |gx, gy, w, h, c| {
            if c.a() == 0 {
                return;
            }
            let Some(cell) = Rect::from_xywh(
                (origin_x + gx) as f32,
                (origin_y + gy) as f32,
                w as f32,
                h as f32,
            ) else {
                return;
            };
            let mut paint = Paint::default();
            paint.set_color_rgba8(c.r(), c.g(), c.b(), c.a());
            pixmap.fill_rect(cell, &paint, Transform::identity(), None);
        });
    }
}

pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Affine,
    glyphs: Option<GlyphRasterizer>,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        let pixmap = Pixmap::new(width, height).ok_or(RasterError::Size(width, height))?;
        Ok(Self {
            pixmap,
            transform: Affine::IDENTITY,
            glyphs: None,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha copy of the surface.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RasterError> {
        self.to_rgba_image().save(path)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }

    fn current(&self) -> Transform {
        to_transform(self.transform)
    }
}

impl Surface for PixmapSurface {
    type Image = Pixmap;

    fn size(&self) -> (f64, f64) {
        (f64::from(self.pixmap.width()), f64::from(self.pixmap.height()))
    }

    fn clear(&mut self) {
        let [r, g, b, a] = BACKGROUND.to_rgba8();
        self.pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn reset_transform(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    fn draw_image(&mut self, image: &Pixmap, width: f64, height: f64) {
        let sx = (width / f64::from(image.width())) as f32;
        let sy = (height / f64::from(image.height())) as f32;
        let transform = self.current().pre_scale(sx, sy);
        self.pixmap
            .draw_pixmap(0, 0, image.as_ref(), &PixmapPaint::default(), transform, None);
    }

    fn stroke_rect(&mut self, bounds: Bounds, color: Color, width: f64) {
        let Some(r) = rect(bounds) else {
            return;
        };
        let path = PathBuilder::from_rect(r);
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, self.current(), None);
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        if let Some(r) = rect(bounds) {
            self.pixmap.fill_rect(r, &paint(color), self.current(), None);
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, self.current(), None);
    }

    fn fill_text(&mut self, text: &str, position: Point, size: f64, color: Color) {
        if text.trim().is_empty() || size <= 0.0 {
            return;
        }
        let t = self.transform;
        let x = (position.x * t.scale + t.tx) as f32;
        let y = (position.y * t.scale + t.ty) as f32;
        let size = (size * t.scale) as f32;
        let glyphs = self.glyphs.get_or_insert_with(GlyphRasterizer::new);
        glyphs.draw(&mut self.pixmap, text, x, y, size, color);
    }
}
