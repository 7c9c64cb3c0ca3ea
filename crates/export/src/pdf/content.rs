//! PDF Content Stream Generation
//!
//! Builder for the operators that paint a page.
//!
//! - q/Q, cm: graphics state and transforms
//! - rg/RG, w: colors and line width
//! - m, l, re, S, f, B, n: path construction and painting
//! - BT/ET, Tf, Tm, Tj: text
//! - Do: XObjects (images)

use super::fonts::encode_win_ansi;
use std::io::Write;

/// Content stream builder
#[derive(Debug, Default)]
pub struct ContentStream {
    data: Vec<u8>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // =========================================================================
    // Graphics State Operators
    // =========================================================================

    /// Save the current graphics state (q)
    pub fn save_state(&mut self) -> &mut Self {
        self.write_line("q");
        self
    }

    /// Restore the graphics state (Q)
    pub fn restore_state(&mut self) -> &mut Self {
        self.write_line("Q");
        self
    }

    /// Concatenate the transformation matrix (cm)
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} {} {} {} cm\n",
            Self::fmt_num(a),
            Self::fmt_num(b),
            Self::fmt_num(c),
            Self::fmt_num(d),
            Self::fmt_num(e),
            Self::fmt_num(f)
        ));
        self
    }

    /// Set the line width (w)
    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.write_fmt(format_args!("{} w\n", Self::fmt_num(width)));
        self
    }

    // =========================================================================
    // Color Operators
    // =========================================================================

    /// Set the fill color to RGB (rg)
    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} rg\n",
            Self::fmt_num(r),
            Self::fmt_num(g),
            Self::fmt_num(b)
        ));
        self
    }

    /// Set the stroke color to RGB (RG)
    pub fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} RG\n",
            Self::fmt_num(r),
            Self::fmt_num(g),
            Self::fmt_num(b)
        ));
        self
    }

    // =========================================================================
    // Path Operators
    // =========================================================================

    /// Move to a point (m)
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.write_fmt(format_args!("{} {} m\n", Self::fmt_num(x), Self::fmt_num(y)));
        self
    }

    /// Line to a point (l)
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.write_fmt(format_args!("{} {} l\n", Self::fmt_num(x), Self::fmt_num(y)));
        self
    }

    /// Rectangle (re)
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} {} re\n",
            Self::fmt_num(x),
            Self::fmt_num(y),
            Self::fmt_num(width),
            Self::fmt_num(height)
        ));
        self
    }

    /// Stroke the current path (S)
    pub fn stroke(&mut self) -> &mut Self {
        self.write_line("S");
        self
    }

    /// Fill the current path, non-zero winding (f)
    pub fn fill(&mut self) -> &mut Self {
        self.write_line("f");
        self
    }

    /// Fill and stroke the current path (B)
    pub fn fill_and_stroke(&mut self) -> &mut Self {
        self.write_line("B");
        self
    }

    /// End path without filling or stroking (n)
    pub fn end_path(&mut self) -> &mut Self {
        self.write_line("n");
        self
    }

    // =========================================================================
    // Text Operators
    // =========================================================================

    /// Begin a text object (BT)
    pub fn begin_text(&mut self) -> &mut Self {
        self.write_line("BT");
        self
    }

    /// End a text object (ET)
    pub fn end_text(&mut self) -> &mut Self {
        self.write_line("ET");
        self
    }

    /// Set the font and size (Tf)
    pub fn set_font(&mut self, font_name: &str, size: f64) -> &mut Self {
        self.write_fmt(format_args!("/{} {} Tf\n", font_name, Self::fmt_num(size)));
        self
    }

    /// Set the text matrix (Tm)
    pub fn set_text_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.write_fmt(format_args!(
            "{} {} {} {} {} {} Tm\n",
            Self::fmt_num(a),
            Self::fmt_num(b),
            Self::fmt_num(c),
            Self::fmt_num(d),
            Self::fmt_num(e),
            Self::fmt_num(f)
        ));
        self
    }

    /// Show a text string (Tj), encoded for WinAnsi fonts
    pub fn show_text(&mut self, text: &str) -> &mut Self {
        self.write_pdf_string(text);
        self.write_line(" Tj");
        self
    }

    // =========================================================================
    // XObject Operators
    // =========================================================================

    /// Paint an XObject (Do)
    pub fn draw_xobject(&mut self, name: &str) -> &mut Self {
        self.write_fmt(format_args!("/{} Do\n", name));
        self
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn write_line(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(b'\n');
    }

    fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        // writing into a Vec cannot fail
        let _ = self.data.write_fmt(args);
    }

    fn write_pdf_string(&mut self, s: &str) {
        self.data.push(b'(');
        for byte in encode_win_ansi(s) {
            match byte {
                b'(' | b')' | b'\\' => {
                    self.data.push(b'\\');
                    self.data.push(byte);
                }
                0x0A => self.data.extend_from_slice(b"\\n"),
                0x0D => self.data.extend_from_slice(b"\\r"),
                0x09 => self.data.extend_from_slice(b"\\t"),
                _ => self.data.push(byte),
            }
        }
        self.data.push(b')');
    }

    fn fmt_num(n: f64) -> String {
        if n.fract() == 0.0 {
            format!("{:.0}", n)
        } else {
            let s = format!("{:.4}", n);
            let s = s.trim_end_matches('0').trim_end_matches('.');
            // -0.00001 would otherwise print as "-0"
            if s == "-0" {
                "0".to_string()
            } else {
                s.to_string()
            }
        }
    }
}
