//! JSON shapes exchanged with the capture backend.
//!
//! Responses with optional or legacy fields are deserialized into `Raw*`
//! structs and resolved once, here, into the canonical types the rest of
//! the crate consumes.

use serde::{Deserialize, Serialize};

use crate::model::{CaptureItem, ClassEntry, ClassIndex, PixelBox};
use crate::palette::ClassPalette;

/// Capture list as sent by `/state` and `/library`: `items` with boxes, or
/// the legacy bare `images` URL list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCaptureList {
    #[serde(default)]
    pub items: Option<Vec<CaptureItem>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

/// Which of the two capture list shapes the backend actually sent.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureSource {
    /// Items with detections.
    Items(Vec<CaptureItem>),
    /// Legacy URL list without detections.
    Urls(Vec<String>),
}

impl RawCaptureList {
    /// `items` wins when present and non-empty.
    pub fn resolve(self) -> CaptureSource {
        match self.items {
            Some(items) if !items.is_empty() => CaptureSource::Items(items),
            _ => CaptureSource::Urls(self.images.unwrap_or_default()),
        }
    }
}

impl CaptureSource {
    pub fn into_items(self) -> Vec<CaptureItem> {
        match self {
            CaptureSource::Items(items) => items,
            CaptureSource::Urls(urls) => urls.into_iter().map(CaptureItem::bare).collect(),
        }
    }
}

/// `GET /state` as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateResponse {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub stopped: bool,
    #[serde(flatten)]
    pub captures: RawCaptureList,
}

/// Live capture state in canonical form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveState {
    pub running: bool,
    pub stopped: bool,
    pub items: Vec<CaptureItem>,
}

impl From<StateResponse> for LiveState {
    fn from(raw: StateResponse) -> Self {
        Self {
            running: raw.running,
            stopped: raw.stopped,
            items: raw.captures.resolve().into_items(),
        }
    }
}

/// `GET /layers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayersInfo {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub total: u32,
}

/// `GET /library` as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryResponse {
    #[serde(flatten)]
    pub captures: RawCaptureList,
    #[serde(default)]
    pub layer: Option<u32>,
}

/// One class entry as sent; either field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// `GET /annotate/classes_meta` as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassesMeta {
    #[serde(default)]
    pub classes: Vec<RawClassEntry>,
}

impl RawClassesMeta {
    pub fn into_palette(self) -> ClassPalette {
        ClassPalette::from_raw(self.classes.into_iter().map(|c| (c.name, c.color)))
    }
}

/// `POST /annotate/classes_meta` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassesMeta {
    pub classes: Vec<ClassEntry>,
}

/// `GET /annotate/images`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageList {
    #[serde(default)]
    pub images: Vec<String>,
}

/// `POST /annotate/save` body. Boxes are in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub split: String,
    pub image: String,
    /// Name of the class selected when saving.
    pub label: String,
    /// Index of the class selected when saving.
    pub cls: ClassIndex,
    pub boxes: Vec<PixelBox>,
}

/// `POST /annotate/save` reply: `{saved}` or `{error}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub saved: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn into_result(self) -> Result<u64, String> {
        match (self.saved, self.error) {
            (_, Some(error)) => Err(error),
            (Some(saved), None) => Ok(saved),
            (None, None) => Err("respuesta sin 'saved'".to_string()),
        }
    }
}

/// Status-tagged reply of the one-shot capture actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub layer_current: Option<u32>,
    #[serde(default)]
    pub layer_total: Option<u32>,
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

impl StatusReply {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            ..Self::default()
        }
    }
}

/// `POST /library/delete_layer` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteLayerRequest {
    pub layer: u32,
    pub delete_files: bool,
}

/// `POST /library/delete_layer` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteLayerReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub deleted_db: u64,
    #[serde(default)]
    pub deleted_files: u64,
}
