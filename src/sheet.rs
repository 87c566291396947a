//! Layer sheet: one composite image tiling every capture of a layer.
//!
//! Each capture fills its tile with a cover fit (cropped, never
//! letterboxed). [`SheetWatcher`] keeps a sheet current on its own timer,
//! independent from the live poller.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tokio::sync::{watch, Mutex};
use yolocam_view::fit_cover;

use crate::api::{ApiError, CaptureBackend};
use crate::image_loader::decode_image;

/// Background of tiles without a picture.
const BLANK: Rgba<u8> = Rgba([24, 24, 27, 255]);

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("layer has no captures")]
    NoCaptures,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("sheet image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("a {columns}x{rows} sheet of {tile_width}x{tile_height} tiles is too large")]
    TooLarge {
        columns: u32,
        rows: u32,
        tile_width: u32,
        tile_height: u32,
    },
}

/// Tile grid of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub columns: u32,
    pub rows: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl SheetLayout {
    /// Row-major layout for `count` tiles. Never wider than `count`.
    pub fn new(count: usize, columns: usize, tile_width: u32, tile_height: u32) -> Option<Self> {
        if count == 0 || tile_width == 0 || tile_height == 0 {
            return None;
        }
        let columns = columns.clamp(1, count);
        let rows = count.div_ceil(columns);
        Some(Self {
            columns: u32::try_from(columns).ok()?,
            rows: u32::try_from(rows).ok()?,
            tile_width,
            tile_height,
        })
    }

    /// Sheet size in pixels; `None` when it does not fit in an RGBA buffer.
    pub fn size(&self) -> Option<(u32, u32)> {
        let width = self.columns.checked_mul(self.tile_width)?;
        let height = self.rows.checked_mul(self.tile_height)?;
        let bytes = u64::from(width) * u64::from(height) * 4;
        usize::try_from(bytes).ok()?;
        Some((width, height))
    }

    /// Top-left corner of tile `index`.
    pub fn tile_origin(&self, index: u32) -> (u32, u32) {
        let (row, col) = (index / self.columns, index % self.columns);
        (col * self.tile_width, row * self.tile_height)
    }
}

/// Crop `image` to the tile aspect and scale it to exactly the tile size.
/// `None` for a zero-sized image.
pub fn cover_tile(image: &RgbaImage, tile_width: u32, tile_height: u32) -> Option<RgbaImage> {
    let (w, h) = image.dimensions();
    let fit = fit_cover(
        f64::from(tile_width),
        f64::from(tile_height),
        f64::from(w),
        f64::from(h),
    )?;
    let src = fit.source_rect();
    let x = (src.x.round() as u32).min(w - 1);
    let y = (src.y.round() as u32).min(h - 1);
    let cw = (src.width.round() as u32).clamp(1, w - x);
    let ch = (src.height.round() as u32).clamp(1, h - y);
    let cropped = imageops::crop_imm(image, x, y, cw, ch).to_image();
    Some(imageops::resize(&cropped, tile_width, tile_height, FilterType::Triangle))
}

/// Tile `images` row-major into one sheet. Zero-sized images (and `None`,
/// for captures that failed to load) leave their tile blank.
pub fn compose_sheet(
    images: &[Option<RgbaImage>],
    columns: usize,
    tile_width: u32,
    tile_height: u32,
) -> Result<RgbaImage, SheetError> {
    let layout = SheetLayout::new(images.len(), columns, tile_width, tile_height).ok_or(SheetError::NoCaptures)?;
    let (width, height) = layout.size().ok_or(SheetError::TooLarge {
        columns: layout.columns,
        rows: layout.rows,
        tile_width,
        tile_height,
    })?;
    let mut sheet = RgbaImage::from_pixel(width, height, BLANK);

    for (index, image) in (0u32..).zip(images) {
        let Some(tile) = image.as_ref().and_then(|img| cover_tile(img, tile_width, tile_height)) else {
            continue;
        };
        let (x, y) = layout.tile_origin(index);
        imageops::replace(&mut sheet, &tile, i64::from(x), i64::from(y));
    }
    Ok(sheet)
}

/// Sheet parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSpec {
    pub layer: u32,
    pub limit: usize,
    pub columns: usize,
    pub tile_width: u32,
    pub tile_height: u32,
}

/// Capture URLs of `layer`, in library order.
pub async fn layer_urls<B: CaptureBackend>(backend: &B, layer: u32, limit: usize) -> Result<Vec<String>, SheetError> {
    let items = backend.library(layer, limit).await?;
    Ok(items.into_iter().map(|item| item.url).collect())
}

/// Download and decode every capture, then compose. A capture that fails to
/// download or decode is logged and left blank.
pub async fn compose_from_urls<B: CaptureBackend>(
    backend: &B,
    urls: &[String],
    spec: &SheetSpec,
) -> Result<RgbaImage, SheetError> {
    if urls.is_empty() {
        return Err(SheetError::NoCaptures);
    }
    let mut images = Vec::with_capacity(urls.len());
    for url in urls {
        let image = match backend.image_bytes(url).await {
            Ok(bytes) => decode_image(url, &bytes)
                .inspect_err(|e| log::warn!("sheet: {}", e))
                .ok(),
            Err(e) => {
                log::warn!("sheet: {}", e);
                None
            }
        };
        images.push(image);
    }
    compose_sheet(&images, spec.columns, spec.tile_width, spec.tile_height)
}

/// One-shot sheet of a layer.
pub async fn compose_layer<B: CaptureBackend>(backend: &B, spec: &SheetSpec) -> Result<RgbaImage, SheetError> {
    let urls = layer_urls(backend, spec.layer, spec.limit).await?;
    compose_from_urls(backend, &urls, spec).await
}

/// Keeps the sheet of one layer current.
///
/// Recomposes only when the layer's URL list changed since the last
/// composition. Fetch failures are logged and retried on the next tick.
pub struct SheetWatcher<B> {
    backend: Arc<B>,
    spec: SheetSpec,
    interval: Duration,
    watching: AtomicBool,
    run_id: AtomicU64,
    last_urls: Mutex<Option<Vec<String>>>,
    sheets: watch::Sender<Option<Arc<RgbaImage>>>,
}

impl<B: CaptureBackend + 'static> SheetWatcher<B> {
    pub fn new(backend: Arc<B>, spec: SheetSpec, interval: Duration) -> Arc<Self> {
        let (sheets, _) = watch::channel(None);
        Arc::new(Self {
            backend,
            spec,
            interval,
            watching: AtomicBool::new(false),
            run_id: AtomicU64::new(0),
            last_urls: Mutex::new(None),
            sheets,
        })
    }

    /// Every newly composed sheet.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<RgbaImage>>> {
        self.sheets.subscribe()
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::Acquire)
    }

    pub fn start(self: &Arc<Self>) -> bool {
        if self.watching.swap(true, Ordering::AcqRel) {
            return false;
        }
        let run = self.run_id.fetch_add(1, Ordering::AcqRel) + 1;
        log::info!("sheet watcher started for layer {}", self.spec.layer);
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(run).await });
        true
    }

    pub fn stop(&self) {
        if self.watching.swap(false, Ordering::AcqRel) {
            self.run_id.fetch_add(1, Ordering::AcqRel);
            log::info!("sheet watcher stopped");
        }
    }

    async fn run(self: Arc<Self>, run: u64) {
        while self.run_id.load(Ordering::Acquire) == run {
            if let Err(e) = self.refresh().await {
                log::warn!("sheet refresh failed: {}", e);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Check the layer once. Returns `true` when a new sheet was composed.
    pub async fn refresh(&self) -> Result<bool, SheetError> {
        let urls = layer_urls(self.backend.as_ref(), self.spec.layer, self.spec.limit).await?;
        let mut last = self.last_urls.lock().await;
        if last.as_ref() == Some(&urls) {
            return Ok(false);
        }
        let sheet = compose_from_urls(self.backend.as_ref(), &urls, &self.spec).await?;
        log::info!(
            "sheet recomposed: layer {}, {} captures, {}x{}",
            self.spec.layer,
            urls.len(),
            sheet.width(),
            sheet.height()
        );
        *last = Some(urls);
        self.sheets.send_replace(Some(Arc::new(sheet)));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::tests::png_bytes;
    use crate::model::CaptureItem;
    use crate::testing::FakeBackend;

    fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    fn spec() -> SheetSpec {
        SheetSpec {
            layer: 2,
            limit: 200,
            columns: 2,
            tile_width: 20,
            tile_height: 10,
        }
    }

    #[test]
    fn test_layout() {
        let l = SheetLayout::new(5, 2, 20, 10).unwrap();
        assert_eq!((l.columns, l.rows), (2, 3));
        assert_eq!(l.size(), Some((40, 30)));
        assert_eq!(l.tile_origin(3), (20, 10));
        assert_eq!(SheetLayout::new(1, 5, 20, 10).unwrap().size(), Some((20, 10)));
        assert!(SheetLayout::new(0, 5, 20, 10).is_none());
    }

    #[test]
    fn test_cover_tile_crops_to_aspect() {
        let tile = cover_tile(&solid(100, 100, 200), 20, 10).unwrap();
        assert_eq!(tile.dimensions(), (20, 10));
        assert_eq!(tile.get_pixel(10, 5), &Rgba([200, 200, 200, 255]));
        assert!(cover_tile(&RgbaImage::new(0, 0), 20, 10).is_none());
    }

    #[test]
    fn test_compose_blank_tiles() {
        let images = vec![Some(solid(40, 20, 255)), None, Some(RgbaImage::new(0, 0))];
        let sheet = compose_sheet(&images, 2, 20, 10).unwrap();
        assert_eq!(sheet.dimensions(), (40, 20));
        assert_eq!(sheet.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(sheet.get_pixel(25, 5), &BLANK);
        assert_eq!(sheet.get_pixel(5, 15), &BLANK);
    }

    #[test]
    fn test_oversized_sheet_is_error() {
        assert_eq!(SheetLayout::new(3, 3, u32::MAX / 2, 10).unwrap().size(), None);
        let images = vec![Some(solid(4, 4, 10)), Some(solid(4, 4, 20))];
        assert!(matches!(
            compose_sheet(&images, 2, u32::MAX, 1),
            Err(SheetError::TooLarge { columns: 2, rows: 1, .. })
        ));
    }

    #[test]
    fn test_compose_empty_is_error() {
        assert!(matches!(compose_sheet(&[], 5, 20, 10), Err(SheetError::NoCaptures)));
    }

    #[tokio::test]
    async fn test_watcher_recomposes_only_on_change() {
        let backend = Arc::new(FakeBackend::new());
        *backend.library.lock().unwrap() = Some(vec![CaptureItem::bare("/c/1.png")]);
        backend.files.lock().unwrap().insert("/c/1.png".into(), png_bytes(8, 8));

        let watcher = SheetWatcher::new(Arc::clone(&backend), spec(), Duration::from_millis(2000));
        let rx = watcher.subscribe();
        assert!(watcher.refresh().await.unwrap());
        assert_eq!(rx.borrow().as_ref().map(|s| s.dimensions()), Some((20, 10)));
        assert!(!watcher.refresh().await.unwrap());

        backend.library.lock().unwrap().as_mut().unwrap().push(CaptureItem::bare("/c/missing.png"));
        assert!(watcher.refresh().await.unwrap());
        assert_eq!(rx.borrow().as_ref().map(|s| s.dimensions()), Some((40, 10)));
        assert!(backend.calls().contains(&"GET /library?layer=2&limit=200".to_string()));
    }

    #[tokio::test]
    async fn test_compose_layer_without_captures() {
        let backend = FakeBackend::new();
        *backend.library.lock().unwrap() = Some(Vec::new());
        assert!(matches!(compose_layer(&backend, &spec()).await, Err(SheetError::NoCaptures)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_keeps_running_after_errors() {
        let backend = Arc::new(FakeBackend::new());
        let watcher = SheetWatcher::new(Arc::clone(&backend), spec(), Duration::from_millis(2000));
        assert!(watcher.start());
        assert!(!watcher.start());
        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert!(watcher.is_watching());
        assert_eq!(backend.calls().len(), 3);
        watcher.stop();
        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(backend.calls().len(), 3);
    }
}
