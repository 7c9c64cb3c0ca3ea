//! Chart scenes
//!
//! A scene is a flat list of drawing primitives in logical pixels. It is
//! resolution independent; rasterization picks the device scale.

use capture::{ChartElement, ElementSize, RasterImage};
use std::f64::consts::PI;

/// Straight-alpha RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const GRID: Rgba = Rgba::opaque(229, 231, 235);
    pub const AXIS: Rgba = Rgba::opaque(156, 163, 175);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self::opaque(rgb[0], rgb[1], rgb[2])
    }
}

/// A single drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned filled rectangle
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgba,
    },
    /// Straight segment
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Rgba,
        width: f64,
    },
    /// Closed polygon with optional fill and outline
    Polygon {
        points: Vec<(f64, f64)>,
        fill: Option<Rgba>,
        stroke: Option<(Rgba, f64)>,
    },
    /// Ring segment; angles in radians, clockwise from twelve o'clock
    Wedge {
        center: (f64, f64),
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        sweep: f64,
        fill: Rgba,
    },
}

impl Primitive {
    /// Outline of a wedge as a polygon
    pub fn wedge_outline(
        center: (f64, f64),
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        sweep: f64,
    ) -> Vec<(f64, f64)> {
        let steps = ((sweep.abs() / (2.0 * PI)) * 96.0).ceil().max(2.0) as usize;
        let point = |radius: f64, angle: f64| {
            (
                center.0 + radius * angle.sin(),
                center.1 - radius * angle.cos(),
            )
        };
        let mut points = Vec::with_capacity(steps * 2 + 2);
        for i in 0..=steps {
            let angle = start_angle + sweep * i as f64 / steps as f64;
            points.push(point(outer_radius, angle));
        }
        for i in (0..=steps).rev() {
            let angle = start_angle + sweep * i as f64 / steps as f64;
            points.push(point(inner_radius, angle));
        }
        points
    }
}

/// Drawable chart with a fixed logical size
#[derive(Debug, Clone, PartialEq)]
pub struct ChartScene {
    pub width: f64,
    pub height: f64,
    pub background: Rgba,
    pub primitives: Vec<Primitive>,
}

impl ChartScene {
    pub fn new(size: ElementSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            background: Rgba::WHITE,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn size(&self) -> ElementSize {
        ElementSize::new(self.width, self.height)
    }
}

impl ChartElement for ChartScene {
    fn measure(&self) -> ElementSize {
        self.size()
    }

    fn rasterize(&self, scale: f64) -> capture::Result<RasterImage> {
        Ok(crate::render_scene(self, scale)?)
    }
}
