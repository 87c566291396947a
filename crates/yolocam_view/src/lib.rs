//! yolocam_view - view-layer primitives for the yolocam annotation engine.
//!
//! Everything in this crate is pure geometry and drawing state: it knows
//! nothing about the capture backend, label files or the class palette.
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | `Point` and `Bounds` |
//! | [`color`] | RGBA colors and CSS hex parsing |
//! | [`fit`] | Contain/cover fits (the coordinate mapper) |
//! | [`viewport`] | Pan/zoom viewport and its controller |
//! | [`surface`] | Drawing target trait and a recording display list |
//! | [`scroll`] | Horizontal strip scrolling (wheel, drag, range control) |

pub mod color;
pub mod constants;
pub mod fit;
pub mod geometry;
pub mod scroll;
pub mod surface;
pub mod viewport;

pub use color::{Color, ColorParseError};
pub use fit::{fit_contain, fit_cover, ContainFit, CoverFit};
pub use geometry::{Bounds, Point};
pub use scroll::{ScrollDragState, StripScroll};
pub use surface::{Affine, DisplayList, DrawCommand, Surface};
pub use viewport::{Viewport, ViewportController};
