//! Page to content stream conversion
//!
//! Layout coordinates are top-down, in points from the top-left corner of
//! the page. They flip to PDF's bottom-up space here and nowhere else.

use super::content::ContentStream;
use super::fonts::{FontManager, StandardFont};

/// A color in RGB format (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbColor {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Text run
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderInfo {
    pub text: String,
    pub x: f64,
    /// Baseline, from the top of the page
    pub y: f64,
    pub font_size: f64,
    pub bold: bool,
    pub color: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRenderInfo {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: RgbColor,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectRenderInfo {
    pub x: f64,
    /// Top edge, from the top of the page
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Option<RgbColor>,
    pub stroke: Option<RgbColor>,
    pub stroke_width: f64,
}

/// Placement of a document image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRenderInfo {
    /// Index into the document's image list
    pub image: usize,
    pub x: f64,
    /// Top edge, from the top of the page
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PdfRenderItem {
    Text(TextRenderInfo),
    Line(LineRenderInfo),
    Rectangle(RectRenderInfo),
    Image(ImageRenderInfo),
}

/// One laid-out page
#[derive(Debug, Clone, PartialEq)]
pub struct PageRenderInfo {
    pub width: f64,
    pub height: f64,
    pub items: Vec<PdfRenderItem>,
}

impl PageRenderInfo {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: PdfRenderItem) {
        self.items.push(item);
    }

    /// Distinct image indices placed on this page, in first-use order
    pub fn images(&self) -> Vec<usize> {
        let mut used = Vec::new();
        for item in &self.items {
            if let PdfRenderItem::Image(image) = item {
                if !used.contains(&image.image) {
                    used.push(image.image);
                }
            }
        }
        used
    }

    /// Every text run on the page, in paint order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PdfRenderItem::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
    }
}

/// Resource name of document image `index`
pub fn image_resource_name(index: usize) -> String {
    format!("Im{}", index)
}

/// PDF page renderer
#[derive(Debug, Default)]
pub struct PdfRenderer {
    font_manager: FontManager,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_manager(&self) -> &FontManager {
        &self.font_manager
    }

    /// Render a page to a content stream
    pub fn render_page(&mut self, page: &PageRenderInfo) -> ContentStream {
        let mut content = ContentStream::new();
        let page_height = page.height;

        // Graphics first so text always sits on top
        for item in &page.items {
            match item {
                PdfRenderItem::Rectangle(rect) => render_rectangle(&mut content, rect, page_height),
                PdfRenderItem::Line(line) => render_line(&mut content, line, page_height),
                PdfRenderItem::Image(image) => render_image(&mut content, image, page_height),
                PdfRenderItem::Text(_) => {}
            }
        }

        let texts: Vec<&TextRenderInfo> = page
            .items
            .iter()
            .filter_map(|item| match item {
                PdfRenderItem::Text(text) => Some(text),
                _ => None,
            })
            .collect();

        if !texts.is_empty() {
            content.begin_text();

            let mut current_font: Option<(String, f64)> = None;
            let mut current_color: Option<RgbColor> = None;

            for text in texts {
                let font_name = self
                    .font_manager
                    .resource_name(StandardFont::for_weight(text.bold));

                let should_update_font = match &current_font {
                    Some((name, size)) => name != &font_name || *size != text.font_size,
                    None => true,
                };
                if should_update_font {
                    content.set_font(&font_name, text.font_size);
                    current_font = Some((font_name, text.font_size));
                }

                if current_color != Some(text.color) {
                    content.set_fill_rgb(text.color.r, text.color.g, text.color.b);
                    current_color = Some(text.color);
                }

                content.set_text_matrix(1.0, 0.0, 0.0, 1.0, text.x, page_height - text.y);
                content.show_text(&text.text);
            }

            content.end_text();
        }

        content
    }
}

fn render_rectangle(content: &mut ContentStream, rect: &RectRenderInfo, page_height: f64) {
    content.save_state();

    if let Some(fill) = rect.fill {
        content.set_fill_rgb(fill.r, fill.g, fill.b);
    }
    if let Some(stroke) = rect.stroke {
        content.set_stroke_rgb(stroke.r, stroke.g, stroke.b);
        content.set_line_width(rect.stroke_width);
    }

    content.rect(rect.x, page_height - rect.y - rect.height, rect.width, rect.height);

    match (rect.fill.is_some(), rect.stroke.is_some()) {
        (true, true) => content.fill_and_stroke(),
        (true, false) => content.fill(),
        (false, true) => content.stroke(),
        (false, false) => content.end_path(),
    };

    content.restore_state();
}

fn render_line(content: &mut ContentStream, line: &LineRenderInfo, page_height: f64) {
    content
        .save_state()
        .set_stroke_rgb(line.color.r, line.color.g, line.color.b)
        .set_line_width(line.width)
        .move_to(line.x1, page_height - line.y1)
        .line_to(line.x2, page_height - line.y2)
        .stroke()
        .restore_state();
}

fn render_image(content: &mut ContentStream, image: &ImageRenderInfo, page_height: f64) {
    // image space is the unit square; scale it onto the target box
    content
        .save_state()
        .transform(
            image.width,
            0.0,
            0.0,
            image.height,
            image.x,
            page_height - image.y - image.height,
        )
        .draw_xobject(&image_resource_name(image.image))
        .restore_state();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str, bold: bool) -> PdfRenderItem {
        PdfRenderItem::Text(TextRenderInfo {
            text: s.to_string(),
            x: 40.0,
            y: 100.0,
            font_size: 12.0,
            bold,
            color: RgbColor::black(),
        })
    }

    #[test]
    fn test_text_flips_to_bottom_up() {
        let mut page = PageRenderInfo::new(600.0, 800.0);
        page.add_item(text("Peso", false));
        let content = String::from_utf8(PdfRenderer::new().render_page(&page).into_bytes()).unwrap();
        assert!(content.contains("1 0 0 1 40 700 Tm"));
        assert!(content.contains("(Peso) Tj"));
    }

    #[test]
    fn test_fonts_switch_by_weight() {
        let mut page = PageRenderInfo::new(600.0, 800.0);
        page.add_item(text("Título", true));
        page.add_item(text("Valor", false));
        let mut renderer = PdfRenderer::new();
        let content = String::from_utf8_lossy(&renderer.render_page(&page).into_bytes()).to_string();
        assert!(content.contains("/F1 12 Tf"));
        assert!(content.contains("/F2 12 Tf"));
        assert_eq!(renderer.font_manager().font_count(), 2);
    }

    #[test]
    fn test_image_placement() {
        let mut page = PageRenderInfo::new(600.0, 800.0);
        let placement = ImageRenderInfo {
            image: 3,
            x: 50.0,
            y: 100.0,
            width: 200.0,
            height: 125.0,
        };
        page.add_item(PdfRenderItem::Image(placement));
        page.add_item(PdfRenderItem::Image(placement));
        assert_eq!(page.images(), vec![3]);

        let content = String::from_utf8(PdfRenderer::new().render_page(&page).into_bytes()).unwrap();
        assert!(content.contains("200 0 0 125 50 575 cm"));
        assert!(content.contains("/Im3 Do"));
    }
}
