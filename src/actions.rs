//! One-shot capture actions (start, reset, layer reset, layer delete) and
//! the layer filter they drive.
//!
//! Each action disables its button while the request is in flight and
//! always leaves the page re-tryable: on failure the button comes back
//! enabled with an error label.

use std::sync::Arc;

use crate::api::{ApiError, CaptureBackend, DeleteLayerRequest, LayersInfo, StatusReply};
use crate::grid::GridGeometry;
use crate::library::LibraryView;
use crate::poller::LivePoller;

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Selecciona una capa concreta (no \"Todas\").")]
    NoLayerSelected,

    /// The user declined the confirmation; nothing was sent.
    #[error("acción cancelada")]
    Declined,

    /// The backend answered with an unexpected status tag.
    #[error("{action}: estado inesperado '{status}'")]
    UnexpectedStatus { action: &'static str, status: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A push button's visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub disabled: bool,
}

impl Button {
    const fn enabled(label: &'static str) -> Self {
        Self {
            label,
            disabled: false,
        }
    }

    const fn busy(label: &'static str) -> Self {
        Self {
            label,
            disabled: true,
        }
    }
}

pub const START_IDLE: &str = "▶️ Arrancar";
pub const START_BUSY: &str = "⏳ Iniciando...";
pub const START_RUNNING: &str = "✅ Captura en marcha";
pub const RESET_IDLE: &str = "🧹 Reset";
pub const RESET_BUSY: &str = "🧽 Limpiando...";
pub const DELETE_IDLE: &str = "🗑️ Borrar capa";
pub const DELETE_BUSY: &str = "⏳ Borrando...";
pub const BUTTON_ERROR: &str = "❌ Error";

/// Layer selector: `Todas` (0) plus one entry per layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerFilter {
    total: u32,
    selected: u32,
}

impl LayerFilter {
    /// Rebuild the options. The current layer is preselected when it
    /// exists; otherwise `Todas`.
    pub fn populate(&mut self, total: u32, current: u32) {
        self.total = total;
        self.selected = if current > 0 && current <= total { current } else { 0 };
    }

    pub fn options(&self) -> Vec<(u32, String)> {
        std::iter::once((0, "Todas".to_string()))
            .chain((1..=self.total).map(|i| (i, format!("Capa {}", i))))
            .collect()
    }

    pub fn selected(&self) -> u32 {
        self.selected
    }

    pub fn select(&mut self, layer: u32) -> bool {
        if layer > self.total {
            return false;
        }
        self.selected = layer;
        true
    }
}

pub fn delete_prompt(layer: u32, delete_files: bool) -> String {
    format!(
        "¿Borrar TODAS las capturas de la capa {}{}? Esta acción no se puede deshacer.",
        layer,
        if delete_files { " y sus archivos" } else { "" }
    )
}

pub fn delete_report(layer: u32, deleted_db: u64, deleted_files: Option<u64>) -> String {
    match deleted_files {
        Some(files) => format!(
            "Capa {} borrada. Registros eliminados: {} | archivos: {}.",
            layer, deleted_db, files
        ),
        None => format!("Capa {} borrada. Registros eliminados: {}.", layer, deleted_db),
    }
}

/// The capture control panel: buttons, layer counters, layer filter and
/// library, wired to one poller.
pub struct CaptureControls<B, G> {
    backend: Arc<B>,
    poller: Arc<LivePoller<B, G>>,
    pub layers: LayersInfo,
    pub filter: LayerFilter,
    pub library: LibraryView,
    pub start_button: Button,
    pub reset_button: Button,
    pub delete_button: Button,
    /// "Also delete files" checkbox.
    pub delete_files: bool,
}

impl<B, G> CaptureControls<B, G>
where
    B: CaptureBackend + 'static,
    G: GridGeometry + Send + Sync + 'static,
{
    pub fn new(backend: Arc<B>, poller: Arc<LivePoller<B, G>>, library: LibraryView) -> Self {
        Self {
            backend,
            poller,
            layers: LayersInfo::default(),
            filter: LayerFilter::default(),
            library,
            start_button: Button::enabled(START_IDLE),
            reset_button: Button::enabled(RESET_IDLE),
            delete_button: Button::enabled(DELETE_IDLE),
            delete_files: false,
        }
    }

    pub fn poller(&self) -> &Arc<LivePoller<B, G>> {
        &self.poller
    }

    /// Page start: layer counters, then the library of the selected layer.
    pub async fn init(&mut self) {
        // Failure is already logged; the library loads for "all layers" then
        let _ = self.refresh_layers().await;
        self.reload_library().await;
    }

    pub async fn refresh_layers(&mut self) -> Result<LayersInfo, ApiError> {
        match self.backend.layers().await {
            Ok(info) => {
                self.layers = info;
                self.filter.populate(info.total, info.current);
                Ok(info)
            }
            Err(e) => {
                log::warn!("layers: {}", e);
                Err(e)
            }
        }
    }

    pub async fn reload_library(&mut self) -> usize {
        let layer = self.filter.selected();
        self.library.load(self.backend.as_ref(), layer).await
    }

    pub async fn start_capture(&mut self) -> Result<StatusReply, ActionError> {
        self.start_button = Button::busy(START_BUSY);
        let result = self.backend.start_capture().await;
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("startCapture error: {}", e);
                self.start_button = Button::enabled(BUTTON_ERROR);
                return Err(e.into());
            }
        };

        if let Some(current) = reply.layer_current {
            self.layers.current = current;
        }
        if let Some(total) = reply.layer_total {
            self.layers.total = total;
        }

        match reply.status.as_str() {
            "started" | "already_running" => {
                self.start_button = Button::busy(START_RUNNING);
                self.poller.boot_if_needed();
                self.reload_library().await;
                Ok(reply)
            }
            other => {
                self.start_button = Button::enabled(BUTTON_ERROR);
                Err(ActionError::UnexpectedStatus {
                    action: "start_capture",
                    status: other.to_string(),
                })
            }
        }
    }

    pub async fn reset_capture(&mut self) -> Result<StatusReply, ActionError> {
        self.reset_button = Button::busy(RESET_BUSY);
        let result = match self.backend.reset_capture().await {
            Ok(reply) if reply.status == "reset_done" => {
                self.poller.stop();
                self.poller.clear_grid().await;
                self.library.clear();
                self.reload_library().await;
                self.start_button = Button::enabled(START_IDLE);
                self.reset_button.label = RESET_IDLE;
                Ok(reply)
            }
            Ok(reply) => {
                self.reset_button.label = BUTTON_ERROR;
                Err(ActionError::UnexpectedStatus {
                    action: "reset_capture",
                    status: reply.status,
                })
            }
            Err(e) => {
                log::error!("resetCapture error: {}", e);
                self.reset_button.label = BUTTON_ERROR;
                Err(e.into())
            }
        };
        self.reset_button.disabled = false;
        result
    }

    pub async fn reset_layers(&mut self) -> Result<StatusReply, ActionError> {
        let reply = self.backend.reset_layers().await.inspect_err(|e| {
            log::warn!("reset_layers: {}", e);
        })?;
        if reply.status != "layers_reset" {
            return Err(ActionError::UnexpectedStatus {
                action: "reset_layers",
                status: reply.status,
            });
        }
        self.layers = LayersInfo {
            current: reply.current.unwrap_or(0),
            total: reply.total.unwrap_or(0),
        };
        self.filter.populate(self.layers.total, self.layers.current);
        self.reload_library().await;
        Ok(reply)
    }

    /// Delete every capture of the selected layer after confirmation.
    /// Returns the report shown to the user.
    pub async fn delete_layer<C: Confirm + ?Sized>(&mut self, confirm: &C) -> Result<String, ActionError> {
        let layer = self.filter.selected();
        if layer == 0 {
            return Err(ActionError::NoLayerSelected);
        }
        let delete_files = self.delete_files;
        if !confirm.confirm(&delete_prompt(layer, delete_files)) {
            return Err(ActionError::Declined);
        }

        self.delete_button = Button::busy(DELETE_BUSY);
        let result = self
            .backend
            .delete_layer(DeleteLayerRequest { layer, delete_files })
            .await;
        let outcome = match result {
            Ok(reply) if reply.status == "ok" => {
                self.reload_library().await;
                let files = delete_files.then_some(reply.deleted_files);
                let report = delete_report(layer, reply.deleted_db, files);
                log::info!("{}", report);
                Ok(report)
            }
            Ok(reply) => Err(ActionError::UnexpectedStatus {
                action: "delete_layer",
                status: reply.status,
            }),
            Err(e) => {
                log::error!("deleteSelectedLayer error: {}", e);
                Err(e.into())
            }
        };
        self.delete_button = Button::enabled(DELETE_IDLE);
        outcome
    }
}

/// Message shown when a layer delete did not go through.
pub fn delete_error_text(error: &ActionError) -> String {
    match error {
        ActionError::UnexpectedStatus { .. } => "No se pudo borrar la capa.".to_string(),
        ActionError::Api(_) => "Error al borrar la capa.".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::{DeleteLayerReply, LiveState};
    use crate::grid::UniformGridGeometry;
    use crate::model::CaptureItem;
    use crate::testing::FakeBackend;

    type Controls = CaptureControls<FakeBackend, UniformGridGeometry>;

    fn controls(backend: FakeBackend) -> Controls {
        let backend = Arc::new(backend);
        let poller = LivePoller::new(
            Arc::clone(&backend),
            UniformGridGeometry::new(100.0, 80.0, 10.0),
            Duration::from_millis(1000),
            10,
        );
        CaptureControls::new(backend, poller, LibraryView::new(200))
    }

    #[test]
    fn test_layer_filter() {
        let mut f = LayerFilter::default();
        f.populate(3, 2);
        assert_eq!(f.selected(), 2);
        assert_eq!(f.options()[0], (0, "Todas".to_string()));
        assert_eq!(f.options()[3], (3, "Capa 3".to_string()));
        f.populate(3, 7);
        assert_eq!(f.selected(), 0);
        assert!(!f.select(4));
    }

    #[test]
    fn test_texts() {
        assert_eq!(
            delete_prompt(3, true),
            "¿Borrar TODAS las capturas de la capa 3 y sus archivos? Esta acción no se puede deshacer."
        );
        assert_eq!(delete_report(3, 12, Some(12)), "Capa 3 borrada. Registros eliminados: 12 | archivos: 12.");
        assert_eq!(delete_report(3, 5, None), "Capa 3 borrada. Registros eliminados: 5.");
    }

    #[tokio::test]
    async fn test_delete_layer_scenario() {
        let backend = FakeBackend::new();
        *backend.layers.lock().unwrap() = Some(LayersInfo { current: 3, total: 4 });
        *backend.library.lock().unwrap() = Some(vec![CaptureItem::bare("/c/1.jpg")]);
        *backend.delete_reply.lock().unwrap() = Some(DeleteLayerReply {
            status: "ok".into(),
            deleted_db: 12,
            deleted_files: 12,
        });
        let mut c = controls(backend);
        c.init().await;
        assert_eq!(c.filter.selected(), 3);
        c.delete_files = true;

        let report = c.delete_layer(&|_: &str| true).await.unwrap();
        assert!(report.contains("12 | archivos: 12"));
        assert_eq!(c.delete_button, Button::enabled(DELETE_IDLE));

        let b = &c.backend;
        assert_eq!(
            b.deleted.lock().unwrap()[0],
            DeleteLayerRequest {
                layer: 3,
                delete_files: true
            }
        );
        let library_calls = b.calls().iter().filter(|c| c.starts_with("GET /library")).count();
        assert_eq!(library_calls, 2);
    }

    #[tokio::test]
    async fn test_delete_declined_sends_nothing() {
        let backend = FakeBackend::new();
        *backend.layers.lock().unwrap() = Some(LayersInfo { current: 1, total: 1 });
        let mut c = controls(backend);
        c.refresh_layers().await.unwrap();
        let err = c.delete_layer(&|_: &str| false).await.unwrap_err();
        assert!(matches!(err, ActionError::Declined));
        assert!(c.backend.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_concrete_layer() {
        let mut c = controls(FakeBackend::new());
        let err = c.delete_layer(&|_: &str| true).await.unwrap_err();
        assert_eq!(err.to_string(), "Selecciona una capa concreta (no \"Todas\").");
    }

    #[tokio::test]
    async fn test_delete_failure_texts() {
        let backend = FakeBackend::new();
        *backend.layers.lock().unwrap() = Some(LayersInfo { current: 2, total: 2 });
        let mut c = controls(backend);
        c.refresh_layers().await.unwrap();
        let err = c.delete_layer(&|_: &str| true).await.unwrap_err();
        assert_eq!(delete_error_text(&err), "Error al borrar la capa.");
        assert!(!c.delete_button.disabled);

        *c.backend.delete_reply.lock().unwrap() = Some(DeleteLayerReply {
            status: "nope".into(),
            ..DeleteLayerReply::default()
        });
        let err = c.delete_layer(&|_: &str| true).await.unwrap_err();
        assert_eq!(delete_error_text(&err), "No se pudo borrar la capa.");
    }

    #[tokio::test]
    async fn test_start_capture_boots_poller() {
        let backend = FakeBackend::new();
        *backend.start_reply.lock().unwrap() = Some(StatusReply {
            layer_current: Some(2),
            layer_total: Some(5),
            ..StatusReply::new("started")
        });
        backend.push_state(Some(LiveState {
            running: true,
            ..LiveState::default()
        }));
        *backend.library.lock().unwrap() = Some(Vec::new());
        let mut c = controls(backend);
        c.start_capture().await.unwrap();
        assert_eq!(c.start_button.label, START_RUNNING);
        assert_eq!(c.layers, LayersInfo { current: 2, total: 5 });
        assert!(c.poller().is_watching());
        c.poller().stop();
    }

    #[tokio::test]
    async fn test_start_capture_failure_reenables() {
        let mut c = controls(FakeBackend::new());
        assert!(c.start_capture().await.is_err());
        assert_eq!(c.start_button, Button::enabled(BUTTON_ERROR));

        *c.backend.start_reply.lock().unwrap() = Some(StatusReply::new("busy"));
        assert!(matches!(
            c.start_capture().await,
            Err(ActionError::UnexpectedStatus { .. })
        ));
        assert!(!c.poller().is_watching());
    }

    #[tokio::test]
    async fn test_reset_capture() {
        let backend = FakeBackend::new();
        *backend.reset_reply.lock().unwrap() = Some(StatusReply::new("reset_done"));
        *backend.library.lock().unwrap() = Some(Vec::new());
        let mut c = controls(backend);
        c.reset_capture().await.unwrap();
        assert_eq!(c.reset_button, Button::enabled(RESET_IDLE));
        assert_eq!(c.start_button, Button::enabled(START_IDLE));
        assert!(c.poller().snapshot().await.cells.iter().all(|cell| cell.is_slot()));

        *c.backend.reset_reply.lock().unwrap() = None;
        assert!(c.reset_capture().await.is_err());
        assert_eq!(c.reset_button, Button::enabled(BUTTON_ERROR));
    }

    #[tokio::test]
    async fn test_reset_layers() {
        let backend = FakeBackend::new();
        *backend.reset_layers_reply.lock().unwrap() = Some(StatusReply {
            current: Some(1),
            total: Some(1),
            ..StatusReply::new("layers_reset")
        });
        *backend.library.lock().unwrap() = Some(Vec::new());
        let mut c = controls(backend);
        c.reset_layers().await.unwrap();
        assert_eq!(c.layers, LayersInfo { current: 1, total: 1 });
        assert_eq!(c.filter.selected(), 1);
        assert_eq!(c.library.info(), "Mostrando 0 imágenes de capa 1.");
    }
}
