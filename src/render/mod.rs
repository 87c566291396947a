//! Drawing: the annotation canvas, DOM-style box overlays, the HUD line and
//! redraw coalescing.

mod canvas;
mod hud;
mod overlay;
mod scheduler;

pub use canvas::{label_rect, render_frame, CanvasStyle, FrameState};
pub use hud::{hud_text, list_loaded_text};
pub use overlay::{layout_overlay, OverlayBox, OverlayLayer, OverlayLayout};
pub use scheduler::RedrawScheduler;
