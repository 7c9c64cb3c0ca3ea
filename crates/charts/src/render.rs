//! Scene rasterization

use crate::{ChartError, ChartResult, ChartScene, Primitive, Rgba};
use capture::RasterImage;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Largest surface edge accepted, in device pixels
const MAX_EDGE: u32 = 16_384;

fn paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn polygon_path(points: &[(f64, f64)]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.0 as f32, first.1 as f32);
    for (x, y) in rest {
        builder.line_to(*x as f32, *y as f32);
    }
    builder.close();
    builder.finish()
}

/// Rasterize `scene` at `scale` device pixels per logical pixel
pub fn render_scene(scene: &ChartScene, scale: f64) -> ChartResult<RasterImage> {
    let width = (scene.width * scale).round() as u32;
    let height = (scene.height * scale).round() as u32;
    if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
        return Err(ChartError::InvalidSize(width, height));
    }
    let mut pixmap = Pixmap::new(width, height).ok_or(ChartError::InvalidSize(width, height))?;

    let bg = scene.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

    let transform = Transform::from_scale(scale as f32, scale as f32);
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                // zero-height bars are legal and simply not drawn
                if let Some(rect) =
                    Rect::from_xywh(*x as f32, *y as f32, *width as f32, *height as f32)
                {
                    pixmap.fill_rect(rect, &paint(*fill), transform, None);
                }
            }
            Primitive::Line {
                from,
                to,
                color,
                width,
            } => {
                let mut builder = PathBuilder::new();
                builder.move_to(from.0 as f32, from.1 as f32);
                builder.line_to(to.0 as f32, to.1 as f32);
                if let Some(path) = builder.finish() {
                    let stroke = Stroke {
                        width: *width as f32,
                        ..Stroke::default()
                    };
                    pixmap.stroke_path(&path, &paint(*color), &stroke, transform, None);
                }
            }
            Primitive::Polygon {
                points,
                fill,
                stroke,
            } => {
                let Some(path) = polygon_path(points) else {
                    continue;
                };
                if let Some(fill) = fill {
                    pixmap.fill_path(&path, &paint(*fill), FillRule::Winding, transform, None);
                }
                if let Some((color, width)) = stroke {
                    let stroke = Stroke {
                        width: *width as f32,
                        ..Stroke::default()
                    };
                    pixmap.stroke_path(&path, &paint(*color), &stroke, transform, None);
                }
            }
            Primitive::Wedge {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                sweep,
                fill,
            } => {
                let outline = Primitive::wedge_outline(
                    *center,
                    *inner_radius,
                    *outer_radius,
                    *start_angle,
                    *sweep,
                );
                if let Some(path) = polygon_path(&outline) {
                    pixmap.fill_path(&path, &paint(*fill), FillRule::EvenOdd, transform, None);
                }
            }
        }
    }

    // tiny-skia stores premultiplied pixels
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(RasterImage::new(width, height, rgba)?)
}
