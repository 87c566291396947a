//! Label file formats.
//!
//! The backend stores annotations as YOLO text files next to the dataset
//! images; [`yolo`] reads and writes them and builds their server paths.

pub mod yolo;

pub use yolo::{encode_labels, image_path, label_path, parse_labels};

#[cfg(test)]
mod tests;
