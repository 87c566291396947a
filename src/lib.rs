//! yolocam - client engine for a camera capture and YOLO dataset annotation
//! server.
//!
//! | Module | Role |
//! |--------|------|
//! | [`annotation`] | Box store, drawing gestures and the annotation session |
//! | [`format`] | YOLO label files and dataset paths |
//! | [`palette`] | Class names and colors |
//! | [`render`] | Annotation canvas, box overlays, HUD and redraw coalescing |
//! | [`filmstrip`], [`lightbox`], [`dataset`] | Dataset browsing |
//! | [`api`] | Backend contracts and the HTTP client |
//! | [`poller`], [`grid`] | Live capture grid |
//! | [`actions`], [`library`] | Capture controls and the capture library |
//! | [`sheet`] | Layer sheet compositor and watcher |
//! | [`raster`] | tiny-skia drawing target |
//! | [`config`] | Configuration file |

pub mod actions;
pub mod annotation;
pub mod api;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod filmstrip;
pub mod format;
pub mod grid;
pub mod image_loader;
pub mod library;
pub mod lightbox;
pub mod model;
pub mod palette;
pub mod poller;
pub mod raster;
pub mod render;
pub mod sheet;

#[cfg(test)]
pub(crate) mod testing;

// Browser entry point and canvas surface
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use annotation::{AnnotationSession, SessionError};
pub use api::{ApiError, CaptureBackend};
pub use config::AppConfig;
pub use palette::ClassPalette;
