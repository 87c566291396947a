//! The annotation canvas state, owned in one place.
//!
//! [`AnnotationSession`] holds everything the canvas depends on: split and
//! image name, viewport, boxes, palette, the active gesture and the
//! filmstrip. Input handlers mutate it; every mutation that changes the
//! picture requests a coalesced redraw.

use yolocam_view::constants::ZOOM_STEP;
use yolocam_view::{Point, Surface, Viewport, ViewportController};

use super::box_store::BoxStore;
use super::gesture::{GestureOutcome, GestureTracker, Modifiers, PointerButton};
use crate::api::{ApiError, CaptureBackend, SaveRequest};
use crate::filmstrip::Filmstrip;
use crate::format::encode_labels;
use crate::image_loader::{ImageDimensions, LoadTicket, LoadedImage};
use crate::model::{denormalize_all, ClassIndex, NormalizedBox, PixelBox};
use crate::palette::{ClassPalette, PaletteError};
use crate::render::{hud_text, list_loaded_text, render_frame, CanvasStyle, FrameState, RedrawScheduler};

/// Why a save could not happen.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Carga una imagen.")]
    NoImage,

    #[error("No hay clases disponibles")]
    NoClasses,

    #[error("Error: {0}")]
    Rejected(String),

    #[error("Error: {0}")]
    Api(#[from] ApiError),
}

/// Status text shown after a save attempt.
pub fn save_status_text(result: &Result<u64, SessionError>) -> String {
    match result {
        Ok(saved) => format!("Etiquetas guardadas: {}", saved),
        Err(e) => e.to_string(),
    }
}

#[derive(Debug)]
pub struct AnnotationSession {
    split: String,
    image: Option<String>,
    image_size: Option<(f64, f64)>,
    generation: u64,
    canvas_size: (f64, f64),
    viewport: ViewportController,
    boxes: BoxStore,
    palette: ClassPalette,
    gesture: GestureTracker,
    pointer: Option<Point>,
    redraw: RedrawScheduler,
    style: CanvasStyle,
    filmstrip: Filmstrip,
}

impl AnnotationSession {
    pub fn new(split: &str, canvas_size: (f64, f64), palette: ClassPalette) -> Self {
        Self {
            split: split.to_string(),
            image: None,
            image_size: None,
            generation: 0,
            canvas_size,
            viewport: ViewportController::new(),
            boxes: BoxStore::new(),
            palette,
            gesture: GestureTracker::new(),
            pointer: None,
            redraw: RedrawScheduler::new(),
            style: CanvasStyle::default(),
            filmstrip: Filmstrip::default(),
        }
    }

    pub fn with_style(mut self, style: CanvasStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_filmstrip(mut self, filmstrip: Filmstrip) -> Self {
        self.filmstrip = filmstrip;
        self
    }

    // --- accessors --------------------------------------------------------

    pub fn split(&self) -> &str {
        &self.split
    }

    pub fn image_name(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// `true` once the current image has been decoded.
    pub fn is_loaded(&self) -> bool {
        self.image.is_some() && self.image_size.is_some()
    }

    pub fn image_size(&self) -> Option<(f64, f64)> {
        self.image_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.canvas_size
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn boxes(&self) -> &[PixelBox] {
        self.boxes.boxes()
    }

    pub fn palette(&self) -> &ClassPalette {
        &self.palette
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn filmstrip(&self) -> &Filmstrip {
        &self.filmstrip
    }

    pub fn filmstrip_mut(&mut self) -> &mut Filmstrip {
        &mut self.filmstrip
    }

    pub fn style(&self) -> &CanvasStyle {
        &self.style
    }

    // --- split and image list ---------------------------------------------

    /// Switch split. Drops the current image and invalidates any load in
    /// flight.
    pub fn set_split(&mut self, split: &str) {
        if self.split == split {
            return;
        }
        self.split = split.to_string();
        self.unload();
        self.filmstrip.load(Vec::new());
    }

    /// Install the image list of the current split. Returns the HUD text
    /// for the freshly loaded list.
    pub fn set_image_list(&mut self, names: Vec<String>) -> String {
        let count = names.len();
        self.filmstrip.load(names);
        list_loaded_text(&self.split, count)
    }

    /// Move through the filmstrip and start loading the image landed on.
    pub fn navigate(&mut self, step: isize) -> Option<LoadTicket> {
        self.filmstrip.go_relative(step)?;
        let name = self.filmstrip.current_name()?.to_string();
        Some(self.begin_load(&name))
    }

    fn unload(&mut self) {
        self.generation += 1;
        self.image = None;
        self.image_size = None;
        self.boxes.clear();
        self.gesture.cancel();
        self.viewport.reset();
        self.request_redraw();
    }

    // --- image loading ----------------------------------------------------

    /// Select `name` as the current image and issue the ticket its load must
    /// present. Boxes of the previous image are dropped right away.
    pub fn begin_load(&mut self, name: &str) -> LoadTicket {
        self.unload();
        self.image = Some(name.to_string());
        if let Some(index) = self.filmstrip.names().iter().position(|n| n == name) {
            self.filmstrip.set_active(index);
        }
        LoadTicket {
            generation: self.generation,
            name: name.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.image.as_deref() == Some(ticket.name.as_str())
    }

    /// Commit a finished load: fit the view and install the decoded labels.
    /// A stale ticket (the user moved on) is discarded and returns `false`.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        dimensions: ImageDimensions,
        labels: &[NormalizedBox],
    ) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "discarding stale load of '{}' (generation {}, current {})",
                ticket.name,
                ticket.generation,
                self.generation
            );
            return false;
        }
        if dimensions.is_empty() {
            log::debug!("'{}' has no pixels; nothing to show", ticket.name);
            return false;
        }
        let (w, h) = dimensions.as_f64();
        self.image_size = Some((w, h));
        self.viewport
            .fit_to_canvas(w, h, self.canvas_size.0, self.canvas_size.1);
        self.boxes.replace_all(denormalize_all(labels, w, h));
        self.request_redraw();
        true
    }

    pub fn commit_loaded(&mut self, loaded: &LoadedImage) -> bool {
        self.finish_load(&loaded.ticket, loaded.dimensions, &loaded.labels)
    }

    /// A load failed. If it was the current one, the session goes back to
    /// having no image.
    pub fn fail_load(&mut self, ticket: &LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        log::warn!("could not load '{}'", ticket.name);
        self.unload();
        true
    }

    // --- view -------------------------------------------------------------

    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        self.canvas_size = (width, height);
        if let Some((w, h)) = self.image_size {
            self.viewport.fit_to_canvas(w, h, width, height);
        }
        self.request_redraw();
    }

    /// Re-fit the image to the canvas.
    pub fn reset_view(&mut self) {
        if let Some((w, h)) = self.image_size {
            self.viewport
                .fit_to_canvas(w, h, self.canvas_size.0, self.canvas_size.1);
            self.request_redraw();
        }
    }

    fn canvas_center(&self) -> Point {
        Point::new(self.canvas_size.0 / 2.0, self.canvas_size.1 / 2.0)
    }

    pub fn zoom_in(&mut self) {
        let c = self.canvas_center();
        self.zoom_at(ZOOM_STEP, c);
    }

    pub fn zoom_out(&mut self) {
        let c = self.canvas_center();
        self.zoom_at(1.0 / ZOOM_STEP, c);
    }

    /// Wheel zoom anchored at the cursor (or the last pointer position).
    pub fn wheel(&mut self, delta_y: f64, cursor: Option<Point>) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let anchor = cursor.or(self.pointer).unwrap_or_else(|| self.canvas_center());
        let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        self.zoom_at(factor, anchor);
    }

    fn zoom_at(&mut self, factor: f64, anchor: Point) {
        self.viewport.zoom_at(factor, anchor.x, anchor.y);
        self.request_redraw();
    }

    // --- pointer ----------------------------------------------------------

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) {
        self.pointer = Some(screen);
        let can_draw = self.is_loaded();
        self.gesture
            .pointer_down(screen, button, modifiers, &self.viewport, can_draw);
        self.request_redraw();
    }

    pub fn pointer_move(&mut self, screen: Point) -> GestureOutcome {
        self.pointer = Some(screen);
        let outcome = self.gesture.pointer_move(screen, &mut self.viewport);
        // Crosshair follows the pointer even without a gesture
        self.request_redraw();
        outcome
    }

    /// Pointer released, anywhere on the page. A committed draw becomes a
    /// box of the class selected right now.
    pub fn pointer_up(&mut self, screen: Option<Point>) -> GestureOutcome {
        let outcome = self.gesture.pointer_up(screen, &mut self.viewport);
        if let GestureOutcome::Committed(rect) = outcome {
            self.boxes
                .append(PixelBox::from_bounds(rect, self.palette.selected()));
        }
        if outcome != GestureOutcome::None {
            self.request_redraw();
        }
        outcome
    }

    /// Pointer left the canvas: hide the crosshair. An active gesture keeps
    /// going until the global release.
    pub fn pointer_leave(&mut self) {
        self.pointer = None;
        self.request_redraw();
    }

    // --- boxes and classes ------------------------------------------------

    pub fn undo_last(&mut self) -> Option<PixelBox> {
        let removed = self.boxes.undo_last();
        if removed.is_some() {
            self.request_redraw();
        }
        removed
    }

    pub fn clear_boxes(&mut self) {
        self.boxes.clear();
        self.request_redraw();
    }

    /// Select the class for boxes drawn from now on.
    pub fn select_class(&mut self, cls: ClassIndex) -> Result<(), PaletteError> {
        self.palette.select(cls)
    }

    pub fn set_palette(&mut self, palette: ClassPalette) {
        self.palette = palette;
        self.request_redraw();
    }

    pub fn palette_mut(&mut self) -> &mut ClassPalette {
        self.request_redraw();
        &mut self.palette
    }

    /// Remove a class and renumber the boxes of the open image to match.
    /// Returns how many boxes were dropped with the class.
    pub fn remove_class(&mut self, cls: ClassIndex) -> Result<usize, PaletteError> {
        let migration = self.palette.remove_with_migration(cls)?;
        let dropped = self.boxes.apply_migration(&migration);
        if dropped > 0 {
            log::info!("dropped {} box(es) of removed class {}", dropped, cls);
        }
        self.request_redraw();
        Ok(dropped)
    }

    // --- output -----------------------------------------------------------

    pub fn save_request(&self) -> Result<SaveRequest, SessionError> {
        let (Some(image), true) = (self.image.as_ref(), self.is_loaded()) else {
            return Err(SessionError::NoImage);
        };
        if self.palette.is_empty() {
            return Err(SessionError::NoClasses);
        }
        let cls = self.palette.selected();
        Ok(SaveRequest {
            split: self.split.clone(),
            image: image.clone(),
            label: self.palette.name(cls),
            cls,
            boxes: self.boxes.boxes().to_vec(),
        })
    }

    /// Post the current boxes. Returns the saved count reported by the
    /// backend.
    pub async fn save<B: CaptureBackend>(&self, backend: &B) -> Result<u64, SessionError> {
        let request = self.save_request()?;
        let response = backend.save_annotations(&request).await?;
        let saved = response.into_result().map_err(SessionError::Rejected)?;
        log::info!("saved {} box(es) for {}/{}", saved, request.split, request.image);
        Ok(saved)
    }

    /// Current boxes as label file text.
    pub fn labels_text(&self) -> Option<String> {
        let (w, h) = self.image_size?;
        Some(encode_labels(self.boxes.boxes(), w, h))
    }

    pub fn hud_text(&self) -> String {
        hud_text(
            &self.split,
            self.image.as_deref(),
            &self.viewport.viewport(),
            self.boxes.len(),
        )
    }

    // --- drawing ----------------------------------------------------------

    pub fn request_redraw(&self) -> bool {
        self.redraw.request()
    }

    /// Called from the frame callback; `true` when a draw is due.
    pub fn take_redraw(&self) -> bool {
        self.redraw.take()
    }

    pub fn render<S: Surface>(&self, surface: &mut S, image: Option<&S::Image>) {
        let frame = FrameState {
            viewport: self.viewport.viewport(),
            image_size: self.image_size,
            boxes: self.boxes.boxes(),
            provisional: self.gesture.provisional(),
            pointer: self.pointer,
            palette: &self.palette,
        };
        render_frame(surface, image, &frame, &self.style);
    }
}
