//! Capture strategies and outcome reconciliation

use crate::{Canvas, ChartBoard, ChartElement, ChartSource, ElementSize, RasterImage, Result};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Tuning for element capture
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device pixels per logical pixel when rendering offscreen
    pub scale: f64,
    /// Wait before rendering so animations and late layout settle
    pub settle_delay: Duration,
    /// Ceiling for a single render
    pub timeout: Duration,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 4.0,
            settle_delay: Duration::from_millis(300),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Pixels captured from one chart
#[derive(Debug, Clone)]
pub struct ChartCapture {
    /// `data:image/png;base64,...`
    pub data_url: String,
    /// Bitmap size in device pixels
    pub width: u32,
    pub height: u32,
    /// Size of the source in logical pixels
    pub original_width: u32,
    pub original_height: u32,
    pub image: RasterImage,
}

impl ChartCapture {
    fn from_image(image: RasterImage, original: ElementSize) -> Result<Self> {
        Ok(Self {
            data_url: image.to_data_url()?,
            width: image.width(),
            height: image.height(),
            original_width: original.width.round() as u32,
            original_height: original.height.round() as u32,
            image,
        })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        crate::decode_data_url(&self.data_url)
    }
}

/// Why a chart could not be captured
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Unavailable {
    #[error("no chart mounted under this key")]
    NoSource,
    #[error("element has no visible area")]
    Empty,
    #[error("capture exceeded {0:?}")]
    TimedOut(Duration),
    #[error("render failed: {0}")]
    RenderFailed(String),
}

/// Result of one capture attempt; unavailability is not an error
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    Captured(ChartCapture),
    Unavailable(Unavailable),
}

impl CaptureOutcome {
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured(_))
    }

    pub fn capture(&self) -> Option<&ChartCapture> {
        match self {
            CaptureOutcome::Captured(capture) => Some(capture),
            CaptureOutcome::Unavailable(_) => None,
        }
    }

    pub fn into_capture(self) -> Option<ChartCapture> {
        match self {
            CaptureOutcome::Captured(capture) => Some(capture),
            CaptureOutcome::Unavailable(_) => None,
        }
    }
}

/// Crop the dimension that distorts the measured aspect ratio.
///
/// Rasterizers round each axis independently, so an element of W×H rendered
/// at scale s can come back a pixel or two off on either side. The bitmap is
/// never stretched; the overshooting axis is trimmed instead.
pub fn reconcile_aspect(image: &RasterImage, measured: ElementSize) -> Result<RasterImage> {
    let target = measured.aspect_ratio();
    let (width, height) = (image.width(), image.height());
    let ideal_width = ((height as f64 * target).round() as u32).max(1);
    let ideal_height = ((width as f64 / target).round() as u32).max(1);

    if ideal_width < width {
        image.crop(ideal_width, height)
    } else if ideal_height < height {
        image.crop(width, ideal_height)
    } else {
        Ok(image.clone())
    }
}

/// Runs captures one at a time with fixed options
#[derive(Debug, Clone, Default)]
pub struct ChartCapturer {
    options: CaptureOptions,
}

impl ChartCapturer {
    pub fn new(options: CaptureOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Direct synchronous read of a canvas surface
    pub fn read_canvas(&self, canvas: &Canvas) -> CaptureOutcome {
        let image = canvas.snapshot();
        let size = ElementSize::new(image.width() as f64, image.height() as f64);
        match ChartCapture::from_image(image, size) {
            Ok(capture) => CaptureOutcome::Captured(capture),
            Err(e) => CaptureOutcome::Unavailable(Unavailable::RenderFailed(e.to_string())),
        }
    }

    /// Offscreen render of an element at the configured scale
    pub async fn capture_element(&self, element: Arc<dyn ChartElement>) -> CaptureOutcome {
        let measured = element.measure();
        if measured.is_empty() {
            return CaptureOutcome::Unavailable(Unavailable::Empty);
        }

        tokio::time::sleep(self.options.settle_delay).await;

        let scale = self.options.scale;
        let render = tokio::task::spawn_blocking(move || element.rasterize(scale));
        let image = match tokio::time::timeout(self.options.timeout, render).await {
            Err(_) => {
                // The render thread cannot be interrupted; its result is dropped.
                return CaptureOutcome::Unavailable(Unavailable::TimedOut(self.options.timeout));
            }
            Ok(Err(join_error)) => {
                return CaptureOutcome::Unavailable(Unavailable::RenderFailed(join_error.to_string()))
            }
            Ok(Ok(Err(e))) => return CaptureOutcome::Unavailable(Unavailable::RenderFailed(e.to_string())),
            Ok(Ok(Ok(image))) => image,
        };

        match reconcile_aspect(&image, measured)
            .and_then(|image| ChartCapture::from_image(image, measured))
        {
            Ok(capture) => CaptureOutcome::Captured(capture),
            Err(e) => CaptureOutcome::Unavailable(Unavailable::RenderFailed(e.to_string())),
        }
    }

    pub async fn capture_source(&self, source: Option<&ChartSource>) -> CaptureOutcome {
        match source {
            None => CaptureOutcome::Unavailable(Unavailable::NoSource),
            Some(ChartSource::Canvas(canvas)) => self.read_canvas(canvas),
            Some(ChartSource::Element(element)) => self.capture_element(Arc::clone(element)).await,
        }
    }

    pub async fn capture_key(&self, board: &ChartBoard, key: &str) -> CaptureOutcome {
        let outcome = self.capture_source(board.get(key)).await;
        match &outcome {
            CaptureOutcome::Captured(capture) => {
                tracing::debug!("Captured chart '{}' at {}x{}", key, capture.width, capture.height)
            }
            CaptureOutcome::Unavailable(reason) => {
                tracing::warn!("Chart '{}' unavailable: {}", key, reason)
            }
        }
        outcome
    }

    /// Capture several keys strictly in the given order
    pub async fn capture_all<K: AsRef<str>>(
        &self,
        board: &ChartBoard,
        keys: &[K],
    ) -> Vec<(String, CaptureOutcome)> {
        let mut outcomes = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            outcomes.push((key.to_string(), self.capture_key(board, key).await));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureError;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Renders with a configurable rounding drift on each axis
    struct DriftingElement {
        size: ElementSize,
        drift: (u32, u32),
    }

    impl ChartElement for DriftingElement {
        fn measure(&self) -> ElementSize {
            self.size
        }

        fn rasterize(&self, scale: f64) -> Result<RasterImage> {
            let w = (self.size.width * scale).ceil() as u32 + self.drift.0;
            let h = (self.size.height * scale).floor() as u32 + self.drift.1;
            RasterImage::filled(w, h, [20, 40, 60, 255])
        }
    }

    struct SlowElement(Duration);

    impl ChartElement for SlowElement {
        fn measure(&self) -> ElementSize {
            ElementSize::new(10.0, 10.0)
        }

        fn rasterize(&self, _scale: f64) -> Result<RasterImage> {
            std::thread::sleep(self.0);
            RasterImage::filled(10, 10, [0, 0, 0, 255])
        }
    }

    struct BrokenElement;

    impl ChartElement for BrokenElement {
        fn measure(&self) -> ElementSize {
            ElementSize::new(10.0, 10.0)
        }

        fn rasterize(&self, _scale: f64) -> Result<RasterImage> {
            Err(CaptureError::Render("no context".to_string()))
        }
    }

    /// Records the order in which elements were rendered
    struct OrderedElement {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ChartElement for OrderedElement {
        fn measure(&self) -> ElementSize {
            ElementSize::new(4.0, 2.0)
        }

        fn rasterize(&self, scale: f64) -> Result<RasterImage> {
            self.log.lock().unwrap().push(self.name);
            RasterImage::filled((4.0 * scale) as u32, (2.0 * scale) as u32, [0, 0, 0, 255])
        }
    }

    fn fast_options() -> CaptureOptions {
        CaptureOptions {
            scale: 4.0,
            settle_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_default_options() {
        let options = CaptureOptions::default();
        assert_eq!(options.scale, 4.0);
        assert_eq!(options.settle_delay, Duration::from_millis(300));
        assert_eq!(options.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_reconcile_trims_wide_overshoot() {
        let image = RasterImage::filled(403, 200, [0, 0, 0, 255]).unwrap();
        let fixed = reconcile_aspect(&image, ElementSize::new(100.0, 50.0)).unwrap();
        assert_eq!((fixed.width(), fixed.height()), (400, 200));
    }

    #[test]
    fn test_reconcile_trims_tall_overshoot() {
        let image = RasterImage::filled(400, 203, [0, 0, 0, 255]).unwrap();
        let fixed = reconcile_aspect(&image, ElementSize::new(100.0, 50.0)).unwrap();
        assert_eq!((fixed.width(), fixed.height()), (400, 200));
    }

    #[test]
    fn test_reconcile_leaves_exact_bitmap() {
        let image = RasterImage::filled(400, 200, [0, 0, 0, 255]).unwrap();
        let fixed = reconcile_aspect(&image, ElementSize::new(100.0, 50.0)).unwrap();
        assert_eq!(fixed, image);
    }

    proptest! {
        #[test]
        fn test_reconciled_ratio_matches_measured(
            w in 20.0f64..300.0,
            h in 20.0f64..300.0,
            dw in 0u32..4,
            dh in 0u32..4,
        ) {
            let element = DriftingElement { size: ElementSize::new(w, h), drift: (dw, dh) };
            let raster = element.rasterize(4.0).unwrap();
            let fixed = reconcile_aspect(&raster, element.size).unwrap();

            let target = w / h;
            let ratio = fixed.aspect_ratio();
            let tolerance = 1.0 / fixed.width().min(fixed.height()) as f64;
            prop_assert!(((ratio - target) / target).abs() <= tolerance + 1e-9);
            prop_assert!(fixed.width() <= raster.width());
            prop_assert!(fixed.height() <= raster.height());
        }
    }

    #[tokio::test]
    async fn test_element_capture_preserves_ratio() {
        let capturer = ChartCapturer::new(fast_options());
        let element = Arc::new(DriftingElement {
            size: ElementSize::new(150.0, 90.0),
            drift: (2, 1),
        });
        let outcome = capturer.capture_element(element).await;
        let capture = outcome.capture().expect("captured");

        assert_eq!((capture.original_width, capture.original_height), (150, 90));
        assert!((capture.aspect_ratio() - 150.0 / 90.0).abs() < 0.01);
        assert!(capture.data_url.starts_with("data:image/png;base64,"));
        let decoded = RasterImage::decode_png(&capture.png_bytes().unwrap()).unwrap();
        assert_eq!(decoded.width(), capture.width);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let capturer = ChartCapturer::new(CaptureOptions {
            timeout: Duration::from_millis(20),
            ..fast_options()
        });
        let outcome = capturer
            .capture_element(Arc::new(SlowElement(Duration::from_millis(300))))
            .await;
        assert!(matches!(
            outcome,
            CaptureOutcome::Unavailable(Unavailable::TimedOut(_))
        ));
    }

    #[tokio::test]
    async fn test_render_failure_is_unavailable() {
        let capturer = ChartCapturer::new(fast_options());
        let outcome = capturer.capture_element(Arc::new(BrokenElement)).await;
        assert!(matches!(
            outcome,
            CaptureOutcome::Unavailable(Unavailable::RenderFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_element_is_unavailable() {
        let capturer = ChartCapturer::new(fast_options());
        let element = Arc::new(DriftingElement {
            size: ElementSize::new(0.0, 40.0),
            drift: (0, 0),
        });
        assert!(matches!(
            capturer.capture_element(element).await,
            CaptureOutcome::Unavailable(Unavailable::Empty)
        ));
    }

    #[tokio::test]
    async fn test_canvas_read_is_unscaled() {
        let capturer = ChartCapturer::new(fast_options());
        let mut board = ChartBoard::new();
        board.mount_canvas(
            "canvas",
            Arc::new(Canvas::new(RasterImage::filled(30, 20, [1, 2, 3, 255]).unwrap())),
        );
        let outcome = capturer.capture_key(&board, "canvas").await;
        let capture = outcome.into_capture().unwrap();
        assert_eq!((capture.width, capture.height), (30, 20));
        assert_eq!((capture.original_width, capture.original_height), (30, 20));
    }

    #[tokio::test]
    async fn test_capture_all_is_sequential_and_tolerant() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut board = ChartBoard::new();
        for name in ["first", "second", "third"] {
            board.mount_element(
                name,
                Arc::new(OrderedElement {
                    name,
                    log: Arc::clone(&log),
                }),
            );
        }

        let capturer = ChartCapturer::new(fast_options());
        let outcomes = capturer
            .capture_all(&board, &["third", "missing", "first", "second"])
            .await;

        assert_eq!(*log.lock().unwrap(), vec!["third", "first", "second"]);
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[1].0, "missing");
        assert!(matches!(
            outcomes[1].1,
            CaptureOutcome::Unavailable(Unavailable::NoSource)
        ));
        assert!(outcomes[3].1.is_captured());
    }
}
