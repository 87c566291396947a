//! In-memory backend for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::api::{
    ApiError, CaptureBackend, ClassesMeta, DeleteLayerReply, DeleteLayerRequest, LayersInfo, LiveState,
    RawClassesMeta, SaveRequest, SaveResponse, StatusReply,
};
use crate::model::CaptureItem;

fn fail(path: &str) -> ApiError {
    ApiError::Status {
        path: path.to_string(),
        status: 500,
    }
}

/// Scriptable backend. `None` in a reply slot makes that endpoint fail with
/// HTTP 500.
#[derive(Default)]
pub(crate) struct FakeBackend {
    /// Replies of successive `/state` calls; once drained, `/state` fails.
    pub states: Mutex<VecDeque<Option<LiveState>>>,
    pub layers: Mutex<Option<LayersInfo>>,
    pub library: Mutex<Option<Vec<CaptureItem>>>,
    pub classes: Mutex<Option<RawClassesMeta>>,
    pub images: Mutex<HashMap<String, Vec<String>>>,
    /// Label text per `split/image`.
    pub labels: Mutex<HashMap<String, String>>,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub save_reply: Mutex<Option<SaveResponse>>,
    pub start_reply: Mutex<Option<StatusReply>>,
    pub reset_reply: Mutex<Option<StatusReply>>,
    pub reset_layers_reply: Mutex<Option<StatusReply>>,
    pub delete_reply: Mutex<Option<DeleteLayerReply>>,
    /// Every call, in order, as `METHOD path`.
    pub calls: Mutex<Vec<String>>,
    pub saved: Mutex<Vec<SaveRequest>>,
    pub saved_classes: Mutex<Vec<ClassesMeta>>,
    pub deleted: Mutex<Vec<DeleteLayerRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_state(&self, state: Option<LiveState>) {
        self.states.lock().unwrap().push_back(state);
    }
}

impl CaptureBackend for FakeBackend {
    async fn state(&self) -> Result<LiveState, ApiError> {
        self.record("GET /state".into());
        self.states.lock().unwrap().pop_front().flatten().ok_or_else(|| fail("/state"))
    }

    async fn layers(&self) -> Result<LayersInfo, ApiError> {
        self.record("GET /layers".into());
        (*self.layers.lock().unwrap()).ok_or_else(|| fail("/layers"))
    }

    async fn library(&self, layer: u32, limit: usize) -> Result<Vec<CaptureItem>, ApiError> {
        self.record(format!("GET /library?layer={}&limit={}", layer, limit));
        self.library.lock().unwrap().clone().ok_or_else(|| fail("/library"))
    }

    async fn classes_meta(&self) -> Result<RawClassesMeta, ApiError> {
        self.record("GET /annotate/classes_meta".into());
        self.classes.lock().unwrap().clone().ok_or_else(|| fail("/annotate/classes_meta"))
    }

    async fn save_classes_meta(&self, meta: &ClassesMeta) -> Result<(), ApiError> {
        self.record("POST /annotate/classes_meta".into());
        self.saved_classes.lock().unwrap().push(meta.clone());
        Ok(())
    }

    async fn images(&self, split: &str) -> Result<Vec<String>, ApiError> {
        self.record(format!("GET /annotate/images?split={}", split));
        self.images
            .lock()
            .unwrap()
            .get(split)
            .cloned()
            .ok_or_else(|| fail("/annotate/images"))
    }

    async fn label_text(&self, split: &str, image: &str) -> Result<Option<String>, ApiError> {
        self.record(format!("GET labels {}/{}", split, image));
        Ok(self.labels.lock().unwrap().get(&format!("{}/{}", split, image)).cloned())
    }

    async fn image_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.record(format!("GET {}", url));
        self.files.lock().unwrap().get(url).cloned().ok_or_else(|| fail(url))
    }

    async fn save_annotations(&self, request: &SaveRequest) -> Result<SaveResponse, ApiError> {
        self.record("POST /annotate/save".into());
        self.saved.lock().unwrap().push(request.clone());
        self.save_reply.lock().unwrap().clone().ok_or_else(|| fail("/annotate/save"))
    }

    async fn start_capture(&self) -> Result<StatusReply, ApiError> {
        self.record("POST /start_capture".into());
        self.start_reply.lock().unwrap().clone().ok_or_else(|| fail("/start_capture"))
    }

    async fn reset_capture(&self) -> Result<StatusReply, ApiError> {
        self.record("POST /reset_capture".into());
        self.reset_reply.lock().unwrap().clone().ok_or_else(|| fail("/reset_capture"))
    }

    async fn reset_layers(&self) -> Result<StatusReply, ApiError> {
        self.record("POST /reset_layers".into());
        self.reset_layers_reply.lock().unwrap().clone().ok_or_else(|| fail("/reset_layers"))
    }

    async fn delete_layer(&self, request: DeleteLayerRequest) -> Result<DeleteLayerReply, ApiError> {
        self.record("POST /library/delete_layer".into());
        self.deleted.lock().unwrap().push(request);
        self.delete_reply.lock().unwrap().clone().ok_or_else(|| fail("/library/delete_layer"))
    }
}
