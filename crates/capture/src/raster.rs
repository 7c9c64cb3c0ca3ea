//! RGBA raster buffers and PNG/data-URL encoding

use crate::{CaptureError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// 8-bit RGBA pixels, row-major, straight (non-premultiplied) alpha
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptyRaster(width, height));
        }
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(CaptureError::BufferSize {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Opaque raster filled with one color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * 4).collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// True when every pixel is fully transparent
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks_exact(4).any(|px| px[3] != 255)
    }

    /// Keep the top-left `width`x`height` region
    pub fn crop(&self, width: u32, height: u32) -> Result<Self> {
        let width = width.min(self.width);
        let height = height.min(self.height);
        let row_len = width as usize * 4;
        let stride = self.width as usize * 4;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in self.pixels.chunks_exact(stride).take(height as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }
        Self::new(width, height, pixels)
    }

    /// Split into packed RGB samples and an 8-bit alpha plane
    pub fn split_alpha(&self) -> (Vec<u8>, Vec<u8>) {
        let count = self.width as usize * self.height as usize;
        let mut rgb = Vec::with_capacity(count * 3);
        let mut alpha = Vec::with_capacity(count);
        for px in self.pixels.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        (rgb, alpha)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(buffer)
    }

    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        if info.bit_depth != png::BitDepth::Eight {
            return Err(CaptureError::UnsupportedPng(format!("{:?}", info.bit_depth)));
        }
        let pixels = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|g| [*g, *g, *g, 255]).collect(),
            other => return Err(CaptureError::UnsupportedPng(format!("{other:?}"))),
        };
        Self::new(info.width, info.height, pixels)
    }

    pub fn to_data_url(&self) -> Result<String> {
        Ok(encode_data_url(&self.encode_png()?))
    }
}

/// `data:image/png;base64,...` for encoded PNG bytes
pub fn encode_data_url(png: &[u8]) -> String {
    format!("{DATA_URL_PREFIX}{}", STANDARD.encode(png))
}

/// PNG bytes carried by a `data:image/png;base64,` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| CaptureError::DataUrl("expected a base64 PNG data URL".to_string()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| CaptureError::DataUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        RasterImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        assert!(matches!(
            RasterImage::new(2, 2, vec![0; 15]),
            Err(CaptureError::BufferSize { .. })
        ));
        assert!(matches!(
            RasterImage::new(0, 2, vec![]),
            Err(CaptureError::EmptyRaster(0, 2))
        ));
    }

    #[test]
    fn test_png_encoding_keeps_pixels() {
        let image = gradient(7, 3);
        let png = image.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = RasterImage::decode_png(&png).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_data_url() {
        let image = RasterImage::filled(2, 2, [255, 0, 0, 255]).unwrap();
        let url = image.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let png = decode_data_url(&url).unwrap();
        assert_eq!(RasterImage::decode_png(&png).unwrap(), image);
        assert!(decode_data_url("data:text/plain,hi").is_err());
    }

    #[test]
    fn test_crop_keeps_top_left() {
        let image = gradient(6, 4);
        let cropped = image.crop(4, 2).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (4, 2));
        assert_eq!(&cropped.pixels()[..4], &[0, 0, 0, 255]);
        // last pixel of the second row
        let last = &cropped.pixels()[cropped.pixels().len() - 4..];
        assert_eq!(last, &[3, 1, 0, 255]);
    }

    #[test]
    fn test_alpha_inspection() {
        let clear = RasterImage::filled(3, 3, [0, 0, 0, 0]).unwrap();
        assert!(clear.is_blank());
        assert!(clear.has_transparency());

        let solid = RasterImage::filled(3, 3, [10, 20, 30, 255]).unwrap();
        assert!(!solid.is_blank());
        assert!(!solid.has_transparency());

        let (rgb, alpha) = solid.split_alpha();
        assert_eq!(rgb.len(), 27);
        assert_eq!(&rgb[..3], &[10, 20, 30]);
        assert!(alpha.iter().all(|a| *a == 255));
    }
}
