//! Data models for the yolocam application.

mod boxes;
mod capture;
mod class;

pub use boxes::{denormalize_all, ClassIndex, NormalizedBox, PixelBox};
pub use capture::CaptureItem;
pub use class::ClassEntry;
