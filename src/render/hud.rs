//! Status line under the annotation canvas.

use yolocam_view::Viewport;

/// HUD text: a pure function of the session state.
pub fn hud_text(split: &str, image: Option<&str>, viewport: &Viewport, box_count: usize) -> String {
    match image {
        Some(name) => format!(
            "img: {} | zoom {}% | cajas {}",
            name,
            viewport.zoom_percent(),
            box_count
        ),
        None => format!("({}) listo", split),
    }
}

/// HUD text after an image list was loaded for a split.
pub fn list_loaded_text(split: &str, count: usize) -> String {
    format!("({}) {} imágenes", split, count)
}
