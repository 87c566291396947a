//! YOLO label files.
//!
//! One `.txt` file per image, one box per line:
//! ```text
//! <class_id> <x_center> <y_center> <width> <height>
//! ```
//!
//! Coordinates are normalized to [0, 1] relative to image size. Fields may
//! be separated by whitespace, commas or both. Reading is lenient: blank and
//! malformed lines are skipped, and values are kept exactly as written.
//! Writing clamps every coordinate into [0, 1].

use crate::model::{ClassIndex, NormalizedBox, PixelBox};

/// Parse a label file. Never fails: a line that does not hold five numbers
/// with a non-negative integer class is skipped.
pub fn parse_labels(text: &str) -> Vec<NormalizedBox> {
    let mut boxes = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(b) => boxes.push(b),
            None => log::debug!("label line {}: skipping '{}'", line_num + 1, line),
        }
    }
    boxes
}

fn parse_line(line: &str) -> Option<NormalizedBox> {
    let mut fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()));

    let cls = parse_class(fields.next()??)?;
    let cx = fields.next()??;
    let cy = fields.next()??;
    let w = fields.next()??;
    let h = fields.next()??;
    Some(NormalizedBox::new(cls, cx, cy, w, h))
}

fn parse_class(v: f64) -> Option<ClassIndex> {
    if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as ClassIndex)
    } else {
        None
    }
}

/// Encode pixel boxes as label file text for an image of the given size.
///
/// Boxes are written in order, six decimals per coordinate. With an unknown
/// (zero) image size nothing can be normalized and the result is empty.
pub fn encode_labels(boxes: &[PixelBox], image_width: f64, image_height: f64) -> String {
    let lines: Vec<String> = boxes
        .iter()
        .filter_map(|b| b.to_normalized(image_width, image_height))
        .map(|n| format_line(&n))
        .collect();
    if lines.len() < boxes.len() {
        log::warn!(
            "Dropped {} boxes: image size {}x{} is not usable",
            boxes.len() - lines.len(),
            image_width,
            image_height
        );
    }
    lines.join("\n")
}

/// One label line, coordinates clamped into [0, 1].
pub fn format_line(n: &NormalizedBox) -> String {
    let unit = |v: f64| v.clamp(0.0, 1.0);
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        n.cls,
        unit(n.cx),
        unit(n.cy),
        unit(n.w),
        unit(n.h)
    )
}

/// Stem of an image file name: everything before the last extension.
pub fn image_stem(image_name: &str) -> &str {
    match image_name.rfind('.') {
        Some(dot) if dot + 1 < image_name.len() => &image_name[..dot],
        _ => image_name,
    }
}

/// Server path of the label file belonging to `image_name` in `split`.
/// Both segments are percent-encoded.
pub fn label_path(split: &str, image_name: &str) -> String {
    format!(
        "/static/dataset/{}/labels/{}.txt",
        urlencoding::encode(split),
        urlencoding::encode(image_stem(image_name))
    )
}

/// Server path of a dataset image.
pub fn image_path(split: &str, image_name: &str) -> String {
    format!(
        "/static/dataset/{}/images/{}",
        urlencoding::encode(split),
        urlencoding::encode(image_name)
    )
}
