//! Full-size image viewer with box overlay.
//!
//! Unlike the filmstrip, navigation wraps around at both ends.

use crate::model::{CaptureItem, NormalizedBox};
use crate::palette::ClassPalette;
use crate::render::OverlayLayer;

/// Keys the lightbox reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

impl LightboxKey {
    /// From a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" => Some(Self::Escape),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    items: Vec<CaptureItem>,
    open: Option<usize>,
    container: (f64, f64),
    /// Natural size of the image currently shown, once decoded.
    natural: Option<(f64, f64)>,
    overlay: OverlayLayer,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items. An open lightbox stays on the same index when it
    /// still exists, and closes otherwise.
    pub fn set_items(&mut self, items: Vec<CaptureItem>) {
        self.items = items;
        if self.open.is_some_and(|i| i >= self.items.len()) {
            self.close();
        }
    }

    pub fn items(&self) -> &[CaptureItem] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.open
    }

    pub fn current(&self) -> Option<&CaptureItem> {
        self.open.and_then(|i| self.items.get(i))
    }

    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.show(index);
        true
    }

    pub fn close(&mut self) {
        self.open = None;
        self.natural = None;
        self.overlay.clear();
    }

    pub fn next(&mut self) -> Option<usize> {
        let i = self.open?;
        let len = self.items.len();
        self.show((i + 1) % len);
        self.open
    }

    pub fn prev(&mut self) -> Option<usize> {
        let i = self.open?;
        let len = self.items.len();
        self.show((i + len - 1) % len);
        self.open
    }

    /// Returns `true` when the key was handled.
    pub fn handle_key(&mut self, key: LightboxKey) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            LightboxKey::Escape => self.close(),
            LightboxKey::ArrowLeft => {
                self.prev();
            }
            LightboxKey::ArrowRight => {
                self.next();
            }
        }
        true
    }

    fn show(&mut self, index: usize) {
        // The new image is not decoded yet; old boxes must not linger.
        self.open = Some(index);
        self.natural = None;
        self.overlay.clear();
    }

    /// Replace the labels of the open item (e.g. fetched from a label file).
    pub fn set_labels(&mut self, labels: Vec<NormalizedBox>, palette: &ClassPalette) {
        if let Some(item) = self.open.and_then(|i| self.items.get_mut(i)) {
            item.boxes = labels;
        }
        self.refresh(palette);
    }

    /// The open image finished decoding.
    pub fn image_loaded(&mut self, natural: (f64, f64), palette: &ClassPalette) -> bool {
        if !self.is_open() {
            return false;
        }
        self.natural = Some(natural);
        self.refresh(palette)
    }

    pub fn resize(&mut self, container: (f64, f64), palette: &ClassPalette) -> bool {
        self.container = container;
        self.refresh(palette)
    }

    fn refresh(&mut self, palette: &ClassPalette) -> bool {
        let (Some(natural), Some(item)) = (self.natural, self.open.and_then(|i| self.items.get(i))) else {
            self.overlay.clear();
            return false;
        };
        self.overlay.render_normalized(self.container, natural, &item.boxes, palette)
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }
}
