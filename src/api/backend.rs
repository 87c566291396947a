//! The backend seam.
//!
//! Every component that talks to the capture server goes through
//! [`CaptureBackend`]. The HTTP implementation lives in `client`; tests
//! plug in in-memory fakes.

use std::future::Future;

use super::contracts::{
    ClassesMeta, DeleteLayerReply, DeleteLayerRequest, LayersInfo, LiveState, RawClassesMeta,
    SaveRequest, SaveResponse, StatusReply,
};
use super::ApiError;
use crate::model::CaptureItem;

/// Capture and dataset endpoints, as consumed by the client.
pub trait CaptureBackend: Send + Sync {
    /// `GET /state`, resolved to canonical form.
    fn state(&self) -> impl Future<Output = Result<LiveState, ApiError>> + Send;

    /// `GET /layers`.
    fn layers(&self) -> impl Future<Output = Result<LayersInfo, ApiError>> + Send;

    /// `GET /library?layer=N&limit=L`; `layer == 0` means every layer.
    fn library(
        &self,
        layer: u32,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<CaptureItem>, ApiError>> + Send;

    /// `GET /annotate/classes_meta`.
    fn classes_meta(&self) -> impl Future<Output = Result<RawClassesMeta, ApiError>> + Send;

    /// `POST /annotate/classes_meta`.
    fn save_classes_meta(&self, meta: &ClassesMeta) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /annotate/images?split=S`.
    fn images(&self, split: &str) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;

    /// Label file text for a dataset image; `None` when there is no label
    /// file (the normal case for an unannotated image).
    fn label_text(
        &self,
        split: &str,
        image: &str,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;

    /// Raw bytes behind an image URL or server path.
    fn image_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;

    /// `POST /annotate/save`.
    fn save_annotations(
        &self,
        request: &SaveRequest,
    ) -> impl Future<Output = Result<SaveResponse, ApiError>> + Send;

    /// `POST /start_capture`.
    fn start_capture(&self) -> impl Future<Output = Result<StatusReply, ApiError>> + Send;

    /// `POST /reset_capture`.
    fn reset_capture(&self) -> impl Future<Output = Result<StatusReply, ApiError>> + Send;

    /// `POST /reset_layers`.
    fn reset_layers(&self) -> impl Future<Output = Result<StatusReply, ApiError>> + Send;

    /// `POST /library/delete_layer`.
    fn delete_layer(
        &self,
        request: DeleteLayerRequest,
    ) -> impl Future<Output = Result<DeleteLayerReply, ApiError>> + Send;
}
