//! Global constants for the yolocam application

// =============================================================================
// Annotation
// =============================================================================

/// Smallest committed box side, in image pixels.
pub const MIN_BOX_SIZE: f64 = 2.0;

/// Box outline width in screen pixels (divided by the zoom scale when drawn).
pub const BASE_STROKE_WIDTH: f64 = 2.0;

/// Class label font size in screen pixels.
pub const LABEL_FONT_PX: f64 = 12.0;

/// Alpha of the glow drawn around overlay boxes.
pub const GLOW_ALPHA: f32 = 0.35;

/// Default canvas size used by headless renders.
pub const DEFAULT_CANVAS_WIDTH: u32 = 960;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 640;

// =============================================================================
// Class palette
// =============================================================================

/// Suggested colors, assigned by class index modulo the palette length.
pub const SUGGESTED_PALETTE: [&str; 12] = [
    "#ff3b30", "#ff9500", "#ffcc00", "#34c759", "#00c7be", "#30b0ff", "#007aff", "#5856d6",
    "#af52de", "#ff2d55", "#64d2ff", "#ffd60a",
];

/// Single class used when the backend has no class metadata.
pub const FALLBACK_CLASS_NAME: &str = "defecto";
pub const FALLBACK_CLASS_COLOR: &str = "#ff3b30";

// =============================================================================
// Live capture
// =============================================================================

/// Number of cells in the live capture grid.
pub const GRID_CELLS: usize = 10;

/// Columns of the live capture grid (two rows of five).
pub const GRID_COLUMNS: usize = 5;

/// Delay between live state polls.
pub const POLL_INTERVAL_MS: u64 = 1000;

/// Default number of captures requested from the library endpoint.
pub const LIBRARY_LIMIT: usize = 200;

// =============================================================================
// Sheet
// =============================================================================

pub const SHEET_COLUMNS: usize = 5;
pub const SHEET_TILE_WIDTH: u32 = 320;
pub const SHEET_TILE_HEIGHT: u32 = 240;
pub const SHEET_WATCH_INTERVAL_MS: u64 = 2000;

// =============================================================================
// Filmstrip
// =============================================================================

pub const THUMB_WIDTH: f64 = 120.0;
pub const THUMB_GAP: f64 = 8.0;

/// Dataset splits served by the backend.
pub const SPLITS: [&str; 3] = ["train", "valid", "test"];
