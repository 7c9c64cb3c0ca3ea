//! Single-column flow layout
//!
//! Blocks are placed top to bottom with a running cursor. Before a block is
//! placed, if it would cross the bottom margin a new page starts and the
//! cursor returns to the top margin. Nothing else moves content between
//! pages.

use crate::pdf::{
    text_width, ImageRenderInfo, LineRenderInfo, MediaBox, PageRenderInfo, PdfRenderItem,
    RgbColor, StandardFont, TextRenderInfo,
};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Space kept clear at the right of every column but the last
pub const COLUMN_GUTTER: f64 = 8.0;

/// Page size and margins, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl PageGeometry {
    pub fn new(media_box: MediaBox, margin: f64) -> Self {
        Self {
            width: media_box.width,
            height: media_box.height,
            margin_top: margin,
            margin_bottom: margin,
            margin_left: margin,
            margin_right: margin,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    /// Lowest y a block may reach
    pub fn bottom_limit(&self) -> f64 {
        self.height - self.margin_bottom
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(MediaBox::a4(), 40.0)
    }
}

/// Font and color for a run of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub color: RgbColor,
}

impl TextStyle {
    pub const fn regular(size: f64) -> Self {
        Self {
            size,
            bold: false,
            color: RgbColor {
                r: 0.0,
                g: 0.0,
                b: 0.0,
            },
        }
    }

    pub const fn bold(size: f64) -> Self {
        Self {
            bold: true,
            ..Self::regular(size)
        }
    }

    pub const fn with_color(self, color: RgbColor) -> Self {
        Self { color, ..self }
    }

    pub fn font(&self) -> StandardFont {
        StandardFont::for_weight(self.bold)
    }

    pub fn line_height(&self) -> f64 {
        self.size * 1.3
    }
}

/// Break `text` into lines no wider than `max_width`
///
/// Breaks at Unicode line break opportunities; a single word wider than the
/// line is split between characters. Hard line breaks are kept. Always
/// returns at least one line.
pub fn wrap_text(text: &str, style: TextStyle, max_width: f64) -> Vec<String> {
    let font = style.font();
    let fits = |s: &str| text_width(s.trim_end(), font, style.size) <= max_width;

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut start = 0;

    for (end, opportunity) in linebreaks(text) {
        let segment = &text[start..end];
        start = end;

        if !line.is_empty() && !fits(&format!("{line}{segment}")) {
            lines.push(line.trim_end().to_string());
            line.clear();
        }

        if line.is_empty() && !fits(segment) {
            for c in segment.chars().filter(|c| *c != '\n' && *c != '\r') {
                line.push(c);
                if line.chars().count() > 1 && !fits(&line) {
                    line.pop();
                    lines.push(line.trim_end().to_string());
                    line.clear();
                    line.push(c);
                }
            }
        } else {
            line.push_str(segment);
        }

        if opportunity == BreakOpportunity::Mandatory {
            lines.push(line.trim_end().to_string());
            line.clear();
        }
    }

    if !line.trim().is_empty() {
        lines.push(line.trim_end().to_string());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Running-cursor page builder
#[derive(Debug)]
pub struct FlowLayout {
    geometry: PageGeometry,
    pages: Vec<PageRenderInfo>,
    y: f64,
}

impl FlowLayout {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![PageRenderInfo::new(geometry.width, geometry.height)],
            y: geometry.margin_top,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> f64 {
        self.y
    }

    /// Zero-based index of the page currently being filled
    pub fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    /// Start a new page when a block of `height` would cross the bottom margin
    ///
    /// A block that is already at the top of a page stays there even if it
    /// is taller than the page; breaking again would only add a blank page.
    pub fn reserve(&mut self, height: f64) -> bool {
        let at_top = self.y <= self.geometry.margin_top;
        if self.y + height > self.geometry.bottom_limit() && !at_top {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn new_page(&mut self) {
        self.pages
            .push(PageRenderInfo::new(self.geometry.width, self.geometry.height));
        self.y = self.geometry.margin_top;
    }

    pub fn advance(&mut self, dy: f64) {
        self.y += dy;
    }

    fn push(&mut self, item: PdfRenderItem) {
        if let Some(page) = self.pages.last_mut() {
            page.add_item(item);
        }
    }

    fn text_at(&mut self, text: &str, x: f64, top: f64, style: TextStyle) {
        self.push(PdfRenderItem::Text(TextRenderInfo {
            text: text.to_string(),
            x,
            // baseline sits one font size below the line top
            y: top + style.size,
            font_size: style.size,
            bold: style.bold,
            color: style.color,
        }));
    }

    /// Wrapped text across the full content width
    pub fn paragraph(&mut self, text: &str, style: TextStyle, spacing: f64) {
        let x = self.geometry.margin_left;
        let lines = wrap_text(text, style, self.geometry.content_width());
        for line in lines {
            self.reserve(style.line_height());
            let top = self.y;
            self.text_at(&line, x, top, style);
            self.advance(style.line_height());
        }
        self.advance(spacing);
    }

    /// One row of cells at fixed column offsets
    ///
    /// `offsets` are measured from the left margin, one per column. Each cell
    /// wraps inside its column; the row advances by the tallest cell plus
    /// `row_spacing`.
    pub fn row(&mut self, cells: &[String], offsets: &[f64], style: TextStyle, row_spacing: f64) {
        let offsets = if offsets.is_empty() { &[0.0][..] } else { offsets };
        let gutter = if offsets.len() > 1 { COLUMN_GUTTER } else { 0.0 };

        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(offsets)
            .enumerate()
            .map(|(column, (cell, offset))| {
                let end = offsets
                    .get(column + 1)
                    .copied()
                    .unwrap_or_else(|| self.geometry.content_width());
                wrap_text(cell, style, (end - offset - gutter).max(1.0))
            })
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let height = line_count as f64 * style.line_height() + row_spacing;

        self.reserve(height);
        let top = self.y;
        for (lines, offset) in wrapped.iter().zip(offsets) {
            let x = self.geometry.margin_left + offset;
            for (i, line) in lines.iter().enumerate() {
                self.text_at(line, x, top + i as f64 * style.line_height(), style);
            }
        }
        self.advance(height);
    }

    /// Label/value cells laid out one per offset, row after row
    pub fn grid(&mut self, cells: &[String], offsets: &[f64], style: TextStyle, row_spacing: f64) {
        for chunk in cells.chunks(offsets.len().max(1)) {
            self.row(chunk, offsets, style, row_spacing);
        }
    }

    /// Horizontal rule across the content width
    pub fn rule(&mut self, color: RgbColor, spacing: f64) {
        let x1 = self.geometry.margin_left;
        let x2 = self.geometry.width - self.geometry.margin_right;
        let y = self.y;
        self.push(PdfRenderItem::Line(LineRenderInfo {
            x1,
            y1: y,
            x2,
            y2: y,
            color,
            width: 0.75,
        }));
        self.advance(spacing);
    }

    /// Place image `index` at the cursor, horizontally centered
    ///
    /// The caller reserves space; the cursor moves past the image.
    pub fn image(&mut self, index: usize, width: f64, height: f64) {
        let x = self.geometry.margin_left + (self.geometry.content_width() - width).max(0.0) / 2.0;
        let y = self.y;
        self.push(PdfRenderItem::Image(ImageRenderInfo {
            image: index,
            x,
            y,
            width,
            height,
        }));
        self.advance(height);
    }

    /// Single text line at the cursor without wrapping
    pub fn line(&mut self, text: &str, style: TextStyle) {
        let x = self.geometry.margin_left;
        let top = self.y;
        self.text_at(text, x, top, style);
        self.advance(style.line_height());
    }

    pub fn finish(self) -> Vec<PageRenderInfo> {
        self.pages
    }
}

/// Shrink a `box_width` x `box_height` target to the bitmap's aspect ratio
///
/// Only one axis changes: whichever would otherwise stretch the image.
pub fn fit_aspect(box_width: f64, box_height: f64, aspect_ratio: f64) -> (f64, f64) {
    if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
        return (box_width, box_height);
    }
    if box_width / box_height > aspect_ratio {
        (box_height * aspect_ratio, box_height)
    } else {
        (box_width, box_width / aspect_ratio)
    }
}
