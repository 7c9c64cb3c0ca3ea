//! Chart sources and the board they are mounted on

use crate::{RasterImage, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A live drawing surface whose pixels can be read at any time
#[derive(Debug)]
pub struct Canvas {
    surface: RwLock<RasterImage>,
}

impl Canvas {
    pub fn new(image: RasterImage) -> Self {
        Self {
            surface: RwLock::new(image),
        }
    }

    /// Swap in a freshly drawn frame
    pub fn redraw(&self, image: RasterImage) {
        let mut surface = self.surface.write().unwrap_or_else(|p| p.into_inner());
        *surface = image;
    }

    /// Copy of the current pixels
    pub fn snapshot(&self) -> RasterImage {
        self.surface
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let surface = self.surface.read().unwrap_or_else(|p| p.into_inner());
        (surface.width(), surface.height())
    }

    /// Current pixels as PNG
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.snapshot().encode_png()
    }
}

/// Laid-out size of an element in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
}

impl ElementSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// A mounted element that can be rendered offscreen
///
/// `rasterize` may be slow and is always called off the async runtime.
pub trait ChartElement: Send + Sync {
    fn measure(&self) -> ElementSize;

    /// Render at `scale` device pixels per logical pixel
    fn rasterize(&self, scale: f64) -> Result<RasterImage>;
}

/// Where a chart's pixels come from
#[derive(Clone)]
pub enum ChartSource {
    Canvas(Arc<Canvas>),
    Element(Arc<dyn ChartElement>),
}

impl std::fmt::Debug for ChartSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartSource::Canvas(canvas) => f.debug_tuple("Canvas").field(&canvas.dimensions()).finish(),
            ChartSource::Element(element) => {
                f.debug_tuple("Element").field(&element.measure()).finish()
            }
        }
    }
}

/// Charts currently mounted, keyed by their logical chart key
#[derive(Debug, Clone, Default)]
pub struct ChartBoard {
    charts: BTreeMap<String, ChartSource>,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a source under `key`, replacing any previous one
    pub fn mount(&mut self, key: impl Into<String>, source: ChartSource) -> Option<ChartSource> {
        self.charts.insert(key.into(), source)
    }

    pub fn mount_canvas(&mut self, key: impl Into<String>, canvas: Arc<Canvas>) {
        self.mount(key, ChartSource::Canvas(canvas));
    }

    pub fn mount_element(&mut self, key: impl Into<String>, element: Arc<dyn ChartElement>) {
        self.mount(key, ChartSource::Element(element));
    }

    pub fn unmount(&mut self, key: &str) -> Option<ChartSource> {
        self.charts.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ChartSource> {
        self.charts.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(ElementSize);

    impl ChartElement for Fixed {
        fn measure(&self) -> ElementSize {
            self.0
        }

        fn rasterize(&self, scale: f64) -> Result<RasterImage> {
            RasterImage::filled(
                (self.0.width * scale) as u32,
                (self.0.height * scale) as u32,
                [0, 0, 0, 255],
            )
        }
    }

    #[test]
    fn test_canvas_redraw() {
        let canvas = Canvas::new(RasterImage::filled(2, 2, [0, 0, 0, 255]).unwrap());
        canvas.redraw(RasterImage::filled(4, 3, [9, 9, 9, 255]).unwrap());
        assert_eq!(canvas.dimensions(), (4, 3));
        assert_eq!(&canvas.snapshot().pixels()[..4], &[9, 9, 9, 255]);
        assert!(canvas.to_png().is_ok());
    }

    #[test]
    fn test_board_mounting() {
        let mut board = ChartBoard::new();
        board.mount_element("a", Arc::new(Fixed(ElementSize::new(10.0, 5.0))));
        board.mount_canvas(
            "b",
            Arc::new(Canvas::new(RasterImage::filled(1, 1, [0; 4]).unwrap())),
        );
        assert_eq!(board.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        let previous = board.mount_element("a", Arc::new(Fixed(ElementSize::new(1.0, 1.0))));
        assert!(previous.is_some());
        assert_eq!(board.len(), 2);

        assert!(board.unmount("b").is_some());
        assert!(board.get("b").is_none());
    }

    #[test]
    fn test_empty_size() {
        assert!(ElementSize::new(0.0, 10.0).is_empty());
        assert!(ElementSize::new(f64::NAN, 10.0).is_empty());
        assert!(!ElementSize::new(3.0, 2.0).is_empty());
        assert_eq!(ElementSize::new(3.0, 2.0).aspect_ratio(), 1.5);
    }
}
