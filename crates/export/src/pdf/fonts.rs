//! PDF Font Handling
//!
//! Reports use the standard Helvetica faces, which every viewer ships, so
//! nothing is embedded. Text is encoded with WinAnsiEncoding and measured
//! with the published Helvetica advance widths.

use super::objects::{PdfDictionary, PdfObject};

/// Standard Type1 fonts used by the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn encoding(&self) -> &'static str {
        "WinAnsiEncoding"
    }

    pub fn for_weight(bold: bool) -> Self {
        if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }

    /// Advance widths for 0x20..=0x7E, in thousandths of an em
    fn ascii_widths(&self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of one character in thousandths of an em
    pub fn char_width(&self, c: char) -> u16 {
        match c {
            ' '..='~' => self.ascii_widths()[c as usize - 0x20],
            // accented Latin letters share their base letter's width closely
            // enough for wrapping purposes
            _ => 556,
        }
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width of `text` in points at `font_size`
pub fn text_width(text: &str, font: StandardFont, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| font.char_width(c) as u32).sum();
    units as f64 * font_size / 1000.0
}

/// Encode text for a WinAnsiEncoding font
///
/// Latin-1 maps straight through; the handful of typographic characters
/// WinAnsi places in 0x80..0x9F are translated; anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x00..=0x7F | 0xA0..=0xFF => c as u8,
            _ => match c {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8A,
                '‹' => 0x8B,
                'Œ' => 0x8C,
                'Ž' => 0x8E,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9A,
                '›' => 0x9B,
                'œ' => 0x9C,
                'ž' => 0x9E,
                'Ÿ' => 0x9F,
                _ => b'?',
            },
        })
        .collect()
}

/// Font registered in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontInfo {
    /// Resource name (e.g., "F1")
    pub name: String,
    pub standard_font: StandardFont,
}

/// Assigns resource names to fonts in first-use order
#[derive(Debug, Default)]
pub struct FontManager {
    fonts: Vec<FontInfo>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource name for `font`, registering it on first use
    pub fn resource_name(&mut self, font: StandardFont) -> String {
        if let Some(info) = self.fonts.iter().find(|f| f.standard_font == font) {
            return info.name.clone();
        }
        let name = format!("F{}", self.fonts.len() + 1);
        self.fonts.push(FontInfo {
            name: name.clone(),
            standard_font: font,
        });
        name
    }

    pub fn fonts(&self) -> impl Iterator<Item = &FontInfo> {
        self.fonts.iter()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}

/// Font dictionary for a standard font
pub fn create_standard_font_dict(font: StandardFont) -> PdfDictionary {
    let mut dict = PdfDictionary::new().with_type("Font");
    dict.insert("Subtype", PdfObject::name("Type1"));
    dict.insert("BaseFont", PdfObject::name(font.pdf_name()));
    dict.insert("Encoding", PdfObject::name(font.encoding()));
    dict
}
