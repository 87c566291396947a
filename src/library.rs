//! Capture library: thumbnails of one layer (or all layers) with box
//! overlays, opening into a lightbox.

use crate::api::CaptureBackend;
use crate::lightbox::Lightbox;
use crate::model::CaptureItem;
use crate::palette::ClassPalette;
use crate::render::OverlayLayer;

/// Info line under the library.
pub fn library_info_text(count: usize, layer: u32) -> String {
    if layer > 0 {
        format!("Mostrando {} imágenes de capa {}.", count, layer)
    } else {
        format!("Mostrando {} imágenes de todas las capas.", count)
    }
}

#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub item: CaptureItem,
    pub overlay: OverlayLayer,
}

#[derive(Debug, Clone)]
pub struct LibraryView {
    thumbs: Vec<Thumbnail>,
    info: String,
    limit: usize,
    lightbox: Lightbox,
}

impl LibraryView {
    pub fn new(limit: usize) -> Self {
        Self {
            thumbs: Vec::new(),
            info: String::new(),
            limit,
            lightbox: Lightbox::new(),
        }
    }

    /// Fetch and show the captures of `layer` (0 = every layer). A failed
    /// fetch is logged and leaves an empty library.
    pub async fn load<B: CaptureBackend>(&mut self, backend: &B, layer: u32) -> usize {
        match backend.library(layer, self.limit).await {
            Ok(items) => {
                let count = items.len();
                self.render(items);
                self.info = library_info_text(count, layer);
                log::debug!("library: {} captures (layer {})", count, layer);
                count
            }
            Err(e) => {
                log::warn!("library error: {}", e);
                self.render(Vec::new());
                0
            }
        }
    }

    /// Replace every thumbnail.
    pub fn render(&mut self, items: Vec<CaptureItem>) {
        self.lightbox.set_items(items.clone());
        self.thumbs = items
            .into_iter()
            .map(|item| Thumbnail {
                item,
                overlay: OverlayLayer::new(),
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.render(Vec::new());
    }

    pub fn thumbs(&self) -> &[Thumbnail] {
        &self.thumbs
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    /// A thumbnail image decoded; place its boxes.
    pub fn thumb_image_loaded(
        &mut self,
        index: usize,
        container: (f64, f64),
        natural: (f64, f64),
        palette: &ClassPalette,
    ) -> bool {
        let Some(thumb) = self.thumbs.get_mut(index) else {
            return false;
        };
        thumb
            .overlay
            .render_normalized(container, natural, &thumb.item.boxes, palette)
    }

    pub fn open(&mut self, index: usize) -> bool {
        self.lightbox.open(index)
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut Lightbox {
        &mut self.lightbox
    }
}
