//! Capture backend access: JSON contracts, the [`CaptureBackend`] trait and
//! its HTTP implementation.

mod backend;
#[cfg(not(target_arch = "wasm32"))]
mod client;
mod contracts;

pub use backend::CaptureBackend;
#[cfg(not(target_arch = "wasm32"))]
pub use client::HttpBackend;
pub use contracts::{
    CaptureSource, ClassesMeta, DeleteLayerReply, DeleteLayerRequest, ImageList, LayersInfo,
    LibraryResponse, LiveState, RawCaptureList, RawClassEntry, RawClassesMeta, SaveRequest,
    SaveResponse, StateResponse, StatusReply,
};

/// Errors talking to the capture backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure (connect, timeout, body read).
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response.
    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    /// Body was not the expected JSON.
    #[error("invalid JSON from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend could not be reached or configured.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
