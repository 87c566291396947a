//! Captured images as returned by the live state and library endpoints.

use serde::{Deserialize, Serialize};

use super::boxes::NormalizedBox;

/// One captured image with its detections. Read-only snapshot owned by the
/// backend; refreshed by polling or an explicit fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureItem {
    pub url: String,
    #[serde(default)]
    pub boxes: Vec<NormalizedBox>,
}

impl CaptureItem {
    pub fn new(url: impl Into<String>, boxes: Vec<NormalizedBox>) -> Self {
        Self {
            url: url.into(),
            boxes,
        }
    }

    /// Item from a bare URL (legacy `images` list): no detections.
    pub fn bare(url: impl Into<String>) -> Self {
        Self::new(url, Vec::new())
    }

    /// Last path segment of the URL, without query string.
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.rsplit('/').next().unwrap_or(path)
    }

    /// URL with a cache-busting `t` query parameter.
    pub fn cache_busted_url(&self, stamp: u128) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}t={}", self.url, sep, stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let item = CaptureItem::bare("/static/captures/layer_3/img_0007.jpg?x=1");
        assert_eq!(item.file_name(), "img_0007.jpg");
    }

    #[test]
    fn test_cache_busted_url() {
        assert_eq!(CaptureItem::bare("/a.jpg").cache_busted_url(42), "/a.jpg?t=42");
        assert_eq!(CaptureItem::bare("/a.jpg?v=2").cache_busted_url(42), "/a.jpg?v=2&t=42");
    }
}
