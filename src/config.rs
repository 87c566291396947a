//! Configuration file support for yolocam.
//!
//! Settings are stored as versioned JSON. Every section and field has a
//! default, so a partial file (or none at all) is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use yolocam_view::Color;

use crate::constants::{
    BASE_STROKE_WIDTH, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, GRID_CELLS, LABEL_FONT_PX,
    LIBRARY_LIMIT, POLL_INTERVAL_MS, SHEET_COLUMNS, SHEET_TILE_HEIGHT, SHEET_TILE_WIDTH,
    SHEET_WATCH_INTERVAL_MS, THUMB_GAP, THUMB_WIDTH,
};
use crate::render::CanvasStyle;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Most verbose level that is still shown.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Root URL of the capture server.
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub interval_ms: u64,
    /// Cells in the live grid.
    pub cells: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: POLL_INTERVAL_MS,
            cells: GRID_CELLS,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub base_stroke_width: f64,
    pub label_font_px: f64,
    /// CSS hex color.
    pub crosshair_color: String,
    /// CSS hex color of the box being drawn.
    pub provisional_color: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            base_stroke_width: BASE_STROKE_WIDTH,
            label_font_px: LABEL_FONT_PX,
            crosshair_color: "#00ff00".to_string(),
            provisional_color: "#00ff00".to_string(),
        }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }

    /// Renderer style. Unparseable colors keep their default.
    pub fn style(&self) -> CanvasStyle {
        let defaults = CanvasStyle::default();
        let parse = |css: &str, fallback: Color| match Color::from_hex(css) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("canvas config: {}", e);
                fallback
            }
        };
        CanvasStyle {
            base_stroke_width: self.base_stroke_width,
            label_font_px: self.label_font_px,
            crosshair_color: parse(&self.crosshair_color, defaults.crosshair_color),
            provisional_color: parse(&self.provisional_color, defaults.provisional_color),
            ..defaults
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub limit: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { limit: LIBRARY_LIMIT }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilmstripConfig {
    pub thumb_width: f64,
    pub gap: f64,
}

impl Default for FilmstripConfig {
    fn default() -> Self {
        Self {
            thumb_width: THUMB_WIDTH,
            gap: THUMB_GAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub columns: usize,
    pub tile_width: u32,
    pub tile_height: u32,
    pub watch_interval_ms: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            columns: SHEET_COLUMNS,
            tile_width: SHEET_TILE_WIDTH,
            tile_height: SHEET_TILE_HEIGHT,
            watch_interval_ms: SHEET_WATCH_INTERVAL_MS,
        }
    }
}

impl SheetConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub filmstrip: FilmstripConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: BackendConfig::default(),
            poller: PollerConfig::default(),
            canvas: CanvasConfig::default(),
            library: LibraryConfig::default(),
            filmstrip: FilmstripConfig::default(),
            sheet: SheetConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    pub fn default_filename() -> &'static str {
        "yolocam-config.json"
    }

    /// `<config_dir>/yolocam/yolocam-config.json`, falling back to
    /// `~/.config`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("yolocam").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("yolocam")
                    .join(Self::default_filename())
            })
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }
        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to `path`, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
