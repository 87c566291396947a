//! Image decoding and dataset image loading.
//!
//! A load resolves to a value ([`LoadedImage`]) instead of mutating state
//! from a completion callback. The caller tags each load with a
//! [`LoadTicket`] and hands the result back to the session, which rejects
//! tickets that are no longer current.

use std::io::Cursor;

use image::{ImageReader, RgbaImage};

use crate::api::{ApiError, CaptureBackend};
use crate::format::{image_path, parse_labels};
use crate::model::NormalizedBox;

/// Errors that can occur while loading an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to read image '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// Decoded fine but has no pixels.
    #[error("image '{0}' has zero size")]
    Empty(String),
}

/// Natural pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_f64(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Identifies one image load. Only the ticket matching the session's
/// current generation and image name may commit its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub name: String,
}

/// A dataset image ready to be committed into a session.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub ticket: LoadTicket,
    pub dimensions: ImageDimensions,
    pub pixels: RgbaImage,
    /// Labels as read from the label file (zero boxes when there is none).
    pub labels: Vec<NormalizedBox>,
}

/// Read only the header to get the natural size.
pub fn decode_dimensions(name: &str, bytes: &[u8]) -> Result<ImageDimensions, ImageLoadError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|source| ImageLoadError::Io {
            name: name.to_string(),
            source,
        })?;
    let (width, height) = reader.into_dimensions().map_err(|source| ImageLoadError::Decode {
        name: name.to_string(),
        source,
    })?;
    Ok(ImageDimensions::new(width, height))
}

/// Fully decode to RGBA8.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<RgbaImage, ImageLoadError> {
    let img = image::load_from_memory(bytes).map_err(|source| ImageLoadError::Decode {
        name: name.to_string(),
        source,
    })?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ImageLoadError::Empty(name.to_string()));
    }
    Ok(rgba)
}

/// Labels for a dataset image. A missing or unreadable label file is not an
/// error: the image simply has no boxes yet.
pub async fn fetch_labels<B: CaptureBackend>(backend: &B, split: &str, image: &str) -> Vec<NormalizedBox> {
    match backend.label_text(split, image).await {
        Ok(Some(text)) => parse_labels(&text),
        Ok(None) => Vec::new(),
        Err(e) => {
            log::warn!("labels for {}/{} unavailable: {}", split, image, e);
            Vec::new()
        }
    }
}

/// Fetch, decode and read the labels of `ticket.name` from `split`.
pub async fn load_dataset_image<B: CaptureBackend>(
    backend: &B,
    split: &str,
    ticket: LoadTicket,
) -> Result<LoadedImage, ImageLoadError> {
    log::debug!("loading {}/{} (generation {})", split, ticket.name, ticket.generation);
    let bytes = backend.image_bytes(&image_path(split, &ticket.name)).await?;
    let pixels = decode_image(&ticket.name, &bytes)?;
    let dimensions = ImageDimensions::new(pixels.width(), pixels.height());
    let labels = fetch_labels(backend, split, &ticket.name).await;
    Ok(LoadedImage {
        ticket,
        dimensions,
        pixels,
        labels,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a solid PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn test_decode_dimensions() {
        let dims = decode_dimensions("a.png", &png_bytes(8, 6)).unwrap();
        assert_eq!(dims, ImageDimensions::new(8, 6));
        assert_eq!(dims.as_f64(), (8.0, 6.0));
    }

    #[test]
    fn test_decode_image() {
        let img = decode_image("a.png", &png_bytes(3, 2)).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(decode_image("x.jpg", b"not an image").is_err());
        assert!(decode_dimensions("x.jpg", b"not an image").is_err());
    }

    #[test]
    fn test_empty_dimensions() {
        assert!(ImageDimensions::new(0, 10).is_empty());
        assert!(!ImageDimensions::new(1, 1).is_empty());
    }
}
