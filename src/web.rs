//! Browser canvas target for the annotation canvas.

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};
use yolocam_view::{Affine, Bounds, Color, Point, Surface};

use crate::config::LogLevel;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(LogLevel::default().to_level()) {
        web_sys::console::warn_1(&format!("logger already set: {}", e).into());
    }
    log::info!("yolocam canvas ready");
}

fn report(result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("canvas call failed: {:?}", e);
    }
}

/// Draws onto a `<canvas>` 2D context.
pub struct WebCanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl WebCanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn font(size: f64) -> String {
        format!("{}px system-ui, sans-serif", size)
    }
}

impl Surface for WebCanvasSurface {
    type Image = HtmlImageElement;

    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn set_transform(&mut self, t: Affine) {
        report(self.ctx.set_transform(t.scale, 0.0, 0.0, t.scale, t.tx, t.ty));
    }

    fn reset_transform(&mut self) {
        report(self.ctx.reset_transform());
    }

    fn draw_image(&mut self, image: &HtmlImageElement, width: f64, height: f64) {
        report(
            self.ctx
                .draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, width, height),
        );
    }

    fn stroke_rect(&mut self, rect: Bounds, color: Color, width: f64) {
        self.ctx.set_stroke_style_str(&color.to_rgba_css(color.a));
        self.ctx.set_line_width(width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_rect(&mut self, rect: Bounds, color: Color) {
        self.ctx.set_fill_style_str(&color.to_rgba_css(color.a));
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.ctx.set_stroke_style_str(&color.to_rgba_css(color.a));
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, position: Point, size: f64, color: Color) {
        self.ctx.set_font(&Self::font(size));
        self.ctx.set_fill_style_str(&color.to_rgba_css(color.a));
        report(self.ctx.fill_text(text, position.x, position.y));
    }

    fn measure_text(&self, text: &str, size: f64) -> f64 {
        self.ctx.set_font(&Self::font(size));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(_) => text.chars().count() as f64 * size * yolocam_view::constants::CHAR_WIDTH_FACTOR,
        }
    }
}
