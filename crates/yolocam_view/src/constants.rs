//! Centralized constants for yolocam_view.

// =============================================================================
// Zoom
// =============================================================================

/// Smallest viewport scale reachable through zooming.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest viewport scale reachable through zooming.
pub const ZOOM_MAX: f64 = 20.0;

/// Zoom factor applied per wheel notch or toolbar click.
pub const ZOOM_STEP: f64 = 1.1;

// =============================================================================
// Typography
// =============================================================================

/// Approximate character width as a ratio of font size.
/// Used when a surface cannot measure text itself.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Line height as a ratio of font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
