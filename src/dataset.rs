//! Dataset browser: image lists per split, multi-selection and a lightbox
//! that shows each image with its label file.

use std::collections::{BTreeSet, HashMap};

use crate::api::CaptureBackend;
use crate::constants::SPLITS;
use crate::format::image_path;
use crate::image_loader::{fetch_labels, ImageDimensions};
use crate::lightbox::Lightbox;
use crate::model::{denormalize_all, CaptureItem, NormalizedBox, PixelBox};
use crate::palette::ClassPalette;

/// Selection counter text.
pub fn selection_text(count: usize) -> String {
    if count == 1 {
        "1 seleccionada".to_string()
    } else {
        format!("{} seleccionadas", count)
    }
}

/// Label boxes in image pixels. Nothing can be placed before the natural
/// size is known.
pub fn pixel_boxes(labels: &[NormalizedBox], dimensions: ImageDimensions) -> Vec<PixelBox> {
    if dimensions.is_empty() {
        return Vec::new();
    }
    let (w, h) = dimensions.as_f64();
    denormalize_all(labels, w, h)
}

/// Label boxes of one dataset image, in pixels.
pub async fn labels_in_pixels<B: CaptureBackend>(
    backend: &B,
    split: &str,
    image: &str,
    dimensions: ImageDimensions,
) -> Vec<PixelBox> {
    let labels = fetch_labels(backend, split, image).await;
    pixel_boxes(&labels, dimensions)
}

#[derive(Debug, Clone, Default)]
pub struct DatasetBrowser {
    lists: HashMap<String, Vec<String>>,
    selections: HashMap<String, BTreeSet<String>>,
    /// Split whose images the lightbox is showing.
    lightbox_split: Option<String>,
    lightbox: Lightbox,
}

impl DatasetBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload every split. A split that fails to load shows no images.
    pub async fn refresh<B: CaptureBackend>(&mut self, backend: &B) -> usize {
        let mut total = 0;
        for split in SPLITS {
            total += self.refresh_split(backend, split).await;
        }
        total
    }

    pub async fn refresh_split<B: CaptureBackend>(&mut self, backend: &B, split: &str) -> usize {
        let names = match backend.images(split).await {
            Ok(names) => names,
            Err(e) => {
                log::warn!("dataset {}: {}", split, e);
                Vec::new()
            }
        };
        self.set_images(split, names)
    }

    /// Replace the list of `split`. Selected names that disappeared are
    /// dropped from the selection.
    pub fn set_images(&mut self, split: &str, names: Vec<String>) -> usize {
        if let Some(selection) = self.selections.get_mut(split) {
            selection.retain(|name| names.contains(name));
        }
        if self.lightbox_split.as_deref() == Some(split) {
            self.lightbox.set_items(lightbox_items(split, &names));
        }
        let count = names.len();
        log::debug!("dataset {}: {} images", split, count);
        self.lists.insert(split.to_string(), names);
        count
    }

    pub fn images(&self, split: &str) -> &[String] {
        self.lists.get(split).map(Vec::as_slice).unwrap_or_default()
    }

    /// Flip the selection of one image. Returns whether it is now selected;
    /// unknown names are never selected.
    pub fn toggle(&mut self, split: &str, name: &str) -> bool {
        if !self.images(split).iter().any(|n| n == name) {
            return false;
        }
        let selection = self.selections.entry(split.to_string()).or_default();
        if selection.remove(name) {
            false
        } else {
            selection.insert(name.to_string());
            true
        }
    }

    pub fn is_selected(&self, split: &str, name: &str) -> bool {
        self.selections.get(split).is_some_and(|s| s.contains(name))
    }

    pub fn select_all(&mut self, split: &str) {
        let names: BTreeSet<String> = self.images(split).iter().cloned().collect();
        self.selections.insert(split.to_string(), names);
    }

    pub fn clear_selection(&mut self, split: &str) {
        self.selections.remove(split);
    }

    pub fn selection_count(&self, split: &str) -> usize {
        self.selections.get(split).map_or(0, BTreeSet::len)
    }

    pub fn selection_text(&self, split: &str) -> String {
        selection_text(self.selection_count(split))
    }

    /// Selected names of `split`, in list order.
    pub fn selected(&self, split: &str) -> Vec<&str> {
        self.images(split)
            .iter()
            .filter(|name| self.is_selected(split, name))
            .map(String::as_str)
            .collect()
    }

    /// Open the lightbox on image `index` of `split`.
    pub fn open(&mut self, split: &str, index: usize) -> bool {
        if index >= self.images(split).len() {
            return false;
        }
        if self.lightbox_split.as_deref() != Some(split) {
            self.lightbox.set_items(lightbox_items(split, self.images(split)));
            self.lightbox_split = Some(split.to_string());
        }
        self.lightbox.open(index)
    }

    /// Name of the image shown in the lightbox.
    pub fn current_image(&self) -> Option<(&str, &str)> {
        let split = self.lightbox_split.as_deref()?;
        let name = self.images(split).get(self.lightbox.index()?)?;
        Some((split, name.as_str()))
    }

    /// Fetch the label file of the image shown in the lightbox. Call after
    /// every open or navigation.
    pub async fn load_lightbox_labels<B: CaptureBackend>(&mut self, backend: &B, palette: &ClassPalette) -> usize {
        let Some((split, name)) = self.current_image() else {
            return 0;
        };
        let (split, name) = (split.to_string(), name.to_string());
        let labels = fetch_labels(backend, &split, &name).await;
        let count = labels.len();
        self.lightbox.set_labels(labels, palette);
        count
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut Lightbox {
        &mut self.lightbox
    }
}

fn lightbox_items(split: &str, names: &[String]) -> Vec<CaptureItem> {
    names
        .iter()
        .map(|name| CaptureItem::bare(image_path(split, name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lightbox::LightboxKey;
    use crate::testing::FakeBackend;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn backend() -> FakeBackend {
        let backend = FakeBackend::new();
        backend
            .images
            .lock()
            .unwrap()
            .insert("train".into(), names(&["a.jpg", "b.jpg", "c.jpg"]));
        backend
            .labels
            .lock()
            .unwrap()
            .insert("train/b.jpg".into(), "1 0.5 0.5 0.2 0.4\n".into());
        backend
    }

    #[test]
    fn test_selection_text() {
        assert_eq!(selection_text(0), "0 seleccionadas");
        assert_eq!(selection_text(1), "1 seleccionada");
        assert_eq!(selection_text(3), "3 seleccionadas");
    }

    #[test]
    fn test_pixel_boxes_need_dimensions() {
        let labels = vec![NormalizedBox::new(0, 0.5, 0.5, 0.5, 0.5)];
        assert!(pixel_boxes(&labels, ImageDimensions::new(0, 100)).is_empty());
        let boxes = pixel_boxes(&labels, ImageDimensions::new(200, 100));
        assert_eq!(boxes, vec![PixelBox::new(50.0, 25.0, 100.0, 50.0, 0)]);
    }

    #[tokio::test]
    async fn test_refresh_and_selection() {
        let backend = backend();
        let mut ds = DatasetBrowser::new();
        assert_eq!(ds.refresh(&backend).await, 3);
        assert!(ds.images("valid").is_empty());

        assert!(ds.toggle("train", "b.jpg"));
        assert!(ds.toggle("train", "a.jpg"));
        assert!(!ds.toggle("train", "zzz.jpg"));
        assert_eq!(ds.selection_text("train"), "2 seleccionadas");
        assert_eq!(ds.selected("train"), vec!["a.jpg", "b.jpg"]);
        assert!(!ds.toggle("train", "a.jpg"));
        assert_eq!(ds.selection_text("train"), "1 seleccionada");

        ds.set_images("train", names(&["a.jpg", "c.jpg"]));
        assert_eq!(ds.selection_count("train"), 0);

        ds.select_all("train");
        assert_eq!(ds.selection_count("train"), 2);
        ds.clear_selection("train");
        assert_eq!(ds.selection_count("train"), 0);
    }

    #[tokio::test]
    async fn test_lightbox_labels() {
        let backend = backend();
        let palette = ClassPalette::fallback();
        let mut ds = DatasetBrowser::new();
        ds.refresh(&backend).await;

        assert!(ds.open("train", 1));
        assert_eq!(ds.current_image(), Some(("train", "b.jpg")));
        assert_eq!(ds.load_lightbox_labels(&backend, &palette).await, 1);
        ds.lightbox_mut().resize((400.0, 300.0), &palette);
        assert!(ds.lightbox_mut().image_loaded((800.0, 600.0), &palette));
        assert_eq!(ds.lightbox().overlay().box_count(), 1);

        ds.lightbox_mut().handle_key(LightboxKey::ArrowRight);
        assert_eq!(ds.current_image(), Some(("train", "c.jpg")));
        assert_eq!(ds.lightbox().overlay().box_count(), 0);
        assert_eq!(ds.load_lightbox_labels(&backend, &palette).await, 0);
    }

    #[tokio::test]
    async fn test_labels_in_pixels() {
        let backend = backend();
        let boxes = labels_in_pixels(&backend, "train", "b.jpg", ImageDimensions::new(100, 100)).await;
        assert_eq!(boxes.len(), 1);
        assert!((boxes[0].x - 40.0).abs() < 1e-6);
        assert!((boxes[0].h - 40.0).abs() < 1e-6);
    }
}
