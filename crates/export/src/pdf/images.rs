//! PDF Image Handling
//!
//! Chart bitmaps are embedded as raw DeviceRGB image XObjects. Transparent
//! pixels travel in a separate DeviceGray soft mask. Compression is applied
//! by the writer like any other stream.

use super::objects::{PdfDictionary, PdfObject, PdfStream};
use capture::RasterImage;

/// Color space for images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }

    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
        }
    }
}

/// Image data ready for embedding
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    /// Uncompressed samples, 8 bits per component
    pub data: Vec<u8>,
    /// Alpha samples, present only when some pixel is not opaque
    pub alpha: Option<Vec<u8>>,
}

impl ImageData {
    pub fn from_raw_rgb(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_space: ColorSpace::DeviceRGB,
            data,
            alpha: None,
        }
    }

    /// Split a straight-alpha raster into color samples and a soft mask
    pub fn from_raster(image: &RasterImage) -> Self {
        let (rgb, alpha) = image.split_alpha();
        let mut data = Self::from_raw_rgb(rgb, image.width(), image.height());
        if image.has_transparency() {
            data.alpha = Some(alpha);
        }
        data
    }

    /// Image XObject; `soft_mask_ref` points at the stream from [`create_soft_mask`]
    pub fn to_xobject(&self, soft_mask_ref: Option<u32>) -> PdfStream {
        let mut dict = PdfDictionary::new().with_type("XObject");
        dict.insert("Subtype", PdfObject::name("Image"));
        dict.insert("Width", PdfObject::Integer(self.width as i64));
        dict.insert("Height", PdfObject::Integer(self.height as i64));
        dict.insert("BitsPerComponent", PdfObject::Integer(8));
        dict.insert("ColorSpace", PdfObject::name(self.color_space.pdf_name()));

        if let Some(mask_ref) = soft_mask_ref {
            dict.insert("SMask", PdfObject::reference(mask_ref));
        }

        PdfStream::new(self.data.clone()).with_dict(dict)
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.color_space.components() as usize
    }
}

/// Soft mask (alpha channel) XObject
pub fn create_soft_mask(alpha: Vec<u8>, width: u32, height: u32) -> PdfStream {
    let mut dict = PdfDictionary::new().with_type("XObject");
    dict.insert("Subtype", PdfObject::name("Image"));
    dict.insert("Width", PdfObject::Integer(width as i64));
    dict.insert("Height", PdfObject::Integer(height as i64));
    dict.insert("BitsPerComponent", PdfObject::Integer(8));
    dict.insert("ColorSpace", PdfObject::name("DeviceGray"));
    PdfStream::new(alpha).with_dict(dict)
}
