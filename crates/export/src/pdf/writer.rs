//! PDF Writer
//!
//! Object numbering, the cross-reference table, the trailer, and stream
//! compression.

use super::document::{create_catalog, create_pages, DocumentInfo, MediaBox, PdfVersion};
use super::fonts::create_standard_font_dict;
use super::images::{create_soft_mask, ImageData};
use super::objects::{PdfDictionary, PdfObject, PdfSerializer, PdfStream};
use super::options::PdfExportOptions;
use super::renderer::{image_resource_name, PageRenderInfo, PdfRenderer};
use std::io::{self, Write};
use thiserror::Error;

/// Error type for PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Invalid document structure
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Byte offset of a written object
#[derive(Debug)]
struct ObjectEntry {
    obj_num: u32,
    offset: u64,
}

/// Low-level PDF file writer
pub struct PdfWriter<W: Write> {
    writer: W,
    position: u64,
    objects: Vec<ObjectEntry>,
    next_obj_num: u32,
    version: PdfVersion,
    compress: bool,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W, version: PdfVersion) -> Self {
        Self {
            writer,
            position: 0,
            objects: Vec::new(),
            next_obj_num: 1,
            version,
            compress: true,
        }
    }

    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    pub fn allocate_object(&mut self) -> u32 {
        let num = self.next_obj_num;
        self.next_obj_num += 1;
        num
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.write_str(&format!("%PDF-{}\n", self.version.as_str()))?;
        // binary marker so transfer tools treat the file as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    /// Write an indirect object
    pub fn write_object(&mut self, obj_num: u32, object: PdfObject) -> Result<()> {
        let offset = self.position;
        self.write_str(&format!("{} 0 obj\n", obj_num))?;

        let mut serializer = PdfSerializer::new(Vec::new());
        serializer.write_object(&object)?;
        self.write_bytes(&serializer.into_inner())?;

        self.write_str("\nendobj\n")?;
        self.objects.push(ObjectEntry { obj_num, offset });
        Ok(())
    }

    /// Write a stream object, compressing it first when enabled
    pub fn write_stream_object(&mut self, obj_num: u32, mut stream: PdfStream) -> Result<()> {
        if self.compress && !stream.compressed {
            stream = compress_stream(stream)?;
        }
        stream
            .dict
            .insert("Length", PdfObject::Integer(stream.data.len() as i64));
        self.write_object(obj_num, PdfObject::Stream(stream))
    }

    pub fn write_xref_and_trailer(&mut self, catalog_ref: u32, info_ref: Option<u32>) -> Result<()> {
        let xref_offset = self.position;

        self.objects.sort_by_key(|e| e.obj_num);
        let entries: Vec<(u32, u64)> = self.objects.iter().map(|e| (e.obj_num, e.offset)).collect();
        let size = self.next_obj_num;

        self.write_str("xref\n")?;
        self.write_str(&format!("0 {}\n", size))?;
        self.write_str("0000000000 65535 f \n")?;

        let mut expected = 1u32;
        for (obj_num, offset) in entries {
            while expected < obj_num {
                self.write_str("0000000000 65535 f \n")?;
                expected += 1;
            }
            self.write_str(&format!("{:010} 00000 n \n", offset))?;
            expected = obj_num + 1;
        }
        // allocated but never written
        while expected < size {
            self.write_str("0000000000 65535 f \n")?;
            expected += 1;
        }

        self.write_str("trailer\n")?;
        let mut trailer = PdfDictionary::new();
        trailer.insert("Size", PdfObject::Integer(size as i64));
        trailer.insert("Root", PdfObject::reference(catalog_ref));
        if let Some(info) = info_ref {
            trailer.insert("Info", PdfObject::reference(info));
        }
        let mut serializer = PdfSerializer::new(Vec::new());
        serializer.write_object(&PdfObject::Dictionary(trailer))?;
        self.write_bytes(&serializer.into_inner())?;
        self.write_str("\n")?;

        self.write_str("startxref\n")?;
        self.write_str(&format!("{}\n", xref_offset))?;
        self.write_str("%%EOF\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn compress_stream(mut stream: PdfStream) -> Result<PdfStream> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&stream.data)?;
    stream.data = encoder.finish()?;
    stream.compressed = true;
    stream.dict.insert("Filter", PdfObject::name("FlateDecode"));
    Ok(stream)
}

/// Writes whole documents: pages plus the images they place
pub struct PdfDocumentWriter {
    options: PdfExportOptions,
}

impl PdfDocumentWriter {
    pub fn new(options: PdfExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PdfExportOptions {
        &self.options
    }

    pub fn write<W: Write>(&self, pages: &[PageRenderInfo], images: &[ImageData], writer: W) -> Result<()> {
        if pages.is_empty() {
            return Err(PdfError::InvalidDocument("No pages to export".to_string()));
        }
        for (index, image) in images.iter().enumerate() {
            if image.data.len() != image.expected_len() {
                return Err(PdfError::InvalidDocument(format!(
                    "Image {} has {} bytes, expected {}",
                    index,
                    image.data.len(),
                    image.expected_len()
                )));
            }
        }
        for page in pages {
            if let Some(missing) = page.images().into_iter().find(|&i| i >= images.len()) {
                return Err(PdfError::InvalidDocument(format!(
                    "Page places unknown image {}",
                    missing
                )));
            }
        }

        let mut pdf = PdfWriter::new(writer, PdfVersion::default());
        pdf.set_compression(self.options.compress);
        pdf.write_header()?;

        let catalog_ref = pdf.allocate_object();
        let pages_ref = pdf.allocate_object();
        let info_ref = pdf.allocate_object();

        // First pass: render every page so the font set is known
        let mut renderer = PdfRenderer::new();
        let contents: Vec<_> = pages.iter().map(|page| renderer.render_page(page)).collect();

        let font_refs: Vec<_> = renderer
            .font_manager()
            .fonts()
            .map(|font| (font.name.clone(), font.standard_font))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|(name, font)| (name, font, pdf.allocate_object()))
            .collect();

        let mut image_refs = Vec::with_capacity(images.len());
        for image in images {
            let image_ref = pdf.allocate_object();
            let mask_ref = image.alpha.as_ref().map(|_| pdf.allocate_object());
            image_refs.push((image_ref, mask_ref));
        }

        let page_refs: Vec<(u32, u32)> = pages
            .iter()
            .map(|_| (pdf.allocate_object(), pdf.allocate_object()))
            .collect();

        pdf.write_object(catalog_ref, create_catalog(pages_ref).into())?;
        let kids: Vec<u32> = page_refs.iter().map(|(page, _)| *page).collect();
        pdf.write_object(pages_ref, create_pages(&kids).into())?;

        let mut info = DocumentInfo::new();
        info.title = self.options.title.clone();
        info.author = self.options.author.clone();
        info.subject = self.options.subject.clone();
        pdf.write_object(info_ref, info.to_dictionary().into())?;

        for (_, font, font_ref) in &font_refs {
            pdf.write_object(*font_ref, create_standard_font_dict(*font).into())?;
        }

        for (image, (image_ref, mask_ref)) in images.iter().zip(&image_refs) {
            if let (Some(alpha), Some(mask_ref)) = (&image.alpha, mask_ref) {
                let mask = create_soft_mask(alpha.clone(), image.width, image.height);
                pdf.write_stream_object(*mask_ref, mask)?;
            }
            pdf.write_stream_object(*image_ref, image.to_xobject(*mask_ref))?;
        }

        for ((page, content), (page_ref, content_ref)) in pages.iter().zip(contents).zip(&page_refs) {
            pdf.write_stream_object(*content_ref, PdfStream::new(content.into_bytes()))?;

            let mut page_dict = PdfDictionary::new().with_type("Page");
            page_dict.insert("Parent", PdfObject::reference(pages_ref));
            page_dict.insert(
                "MediaBox",
                MediaBox::from_dimensions(page.width, page.height).to_array(),
            );
            page_dict.insert("Contents", PdfObject::reference(*content_ref));

            let mut resources = PdfDictionary::new();
            if !font_refs.is_empty() {
                let mut font_dict = PdfDictionary::new();
                for (name, _, font_ref) in &font_refs {
                    font_dict.insert(name.clone(), PdfObject::reference(*font_ref));
                }
                resources.insert("Font", font_dict.into());
            }

            let placed = page.images();
            if !placed.is_empty() {
                let mut xobjects = PdfDictionary::new();
                for index in placed {
                    xobjects.insert(image_resource_name(index), PdfObject::reference(image_refs[index].0));
                }
                resources.insert("XObject", xobjects.into());
            }

            resources.insert(
                "ProcSet",
                PdfObject::Array(vec![
                    PdfObject::name("PDF"),
                    PdfObject::name("Text"),
                    PdfObject::name("ImageC"),
                ]),
            );
            page_dict.insert("Resources", resources.into());

            pdf.write_object(*page_ref, page_dict.into())?;
        }

        pdf.write_xref_and_trailer(catalog_ref, Some(info_ref))?;
        pdf.finish()?;
        Ok(())
    }

    pub fn write_to_bytes(&self, pages: &[PageRenderInfo], images: &[ImageData]) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(pages, images, &mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::renderer::{ImageRenderInfo, PdfRenderItem, RgbColor, TextRenderInfo};

    fn create_test_page() -> PageRenderInfo {
        let mut page = PageRenderInfo::new(595.28, 841.89);
        page.add_item(PdfRenderItem::Text(TextRenderInfo {
            text: "Relatório de Avaliação".to_string(),
            x: 40.0,
            y: 60.0,
            font_size: 18.0,
            bold: true,
            color: RgbColor::black(),
        }));
        page
    }

    #[test]
    fn test_pdf_writer_header() {
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer, PdfVersion::V1_4);
        writer.write_header().unwrap();
        assert!(String::from_utf8_lossy(&buffer).starts_with("%PDF-1.4"));
    }

    #[test]
    fn test_pdf_document_writer() {
        let writer = PdfDocumentWriter::new(PdfExportOptions::default());
        let pdf_bytes = writer.write_to_bytes(&[create_test_page()], &[]).unwrap();

        let pdf_str = String::from_utf8_lossy(&pdf_bytes);
        assert!(pdf_str.starts_with("%PDF-"));
        assert!(pdf_str.contains("/Type /Catalog"));
        assert!(pdf_str.contains("/Type /Pages"));
        assert!(pdf_str.contains("/BaseFont /Helvetica-Bold"));
        assert!(pdf_str.contains("/Filter /FlateDecode"));
        assert!(pdf_str.contains("startxref"));
        assert!(pdf_str.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_pdf_with_metadata() {
        let options = PdfExportOptions::new()
            .with_title("Evaluation")
            .with_author("Gym Staff");
        let pdf_bytes = PdfDocumentWriter::new(options)
            .write_to_bytes(&[create_test_page()], &[])
            .unwrap();
        let pdf_str = String::from_utf8_lossy(&pdf_bytes);
        assert!(pdf_str.contains("(Evaluation)"));
        assert!(pdf_str.contains("(Gym Staff)"));
    }

    #[test]
    fn test_uncompressed_content_is_readable() {
        let options = PdfExportOptions::new().with_compression(false);
        let pdf_bytes = PdfDocumentWriter::new(options)
            .write_to_bytes(&[create_test_page()], &[])
            .unwrap();
        let pdf_str = String::from_utf8_lossy(&pdf_bytes);
        assert!(pdf_str.contains("BT"));
        assert!(pdf_str.contains("ET"));
        assert!(!pdf_str.contains("FlateDecode"));
    }

    #[test]
    fn test_images_with_soft_mask() {
        let mut page = create_test_page();
        page.add_item(PdfRenderItem::Image(ImageRenderInfo {
            image: 0,
            x: 40.0,
            y: 100.0,
            width: 100.0,
            height: 50.0,
        }));
        let mut image = ImageData::from_raw_rgb(vec![255; 2 * 1 * 3], 2, 1);
        image.alpha = Some(vec![0, 255]);

        let options = PdfExportOptions::new().with_compression(false);
        let pdf_bytes = PdfDocumentWriter::new(options)
            .write_to_bytes(&[page], &[image])
            .unwrap();
        let pdf_str = String::from_utf8_lossy(&pdf_bytes);
        assert!(pdf_str.contains("/Subtype /Image"));
        assert!(pdf_str.contains("/SMask"));
        assert!(pdf_str.contains("/XObject << /Im0"));
        assert!(pdf_str.contains("/Im0 Do"));
    }

    #[test]
    fn test_unknown_image_is_rejected() {
        let mut page = create_test_page();
        page.add_item(PdfRenderItem::Image(ImageRenderInfo {
            image: 4,
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }));
        let result = PdfDocumentWriter::new(PdfExportOptions::default()).write_to_bytes(&[page], &[]);
        assert!(matches!(result, Err(PdfError::InvalidDocument(_))));
    }

    #[test]
    fn test_empty_pages_error() {
        let result = PdfDocumentWriter::new(PdfExportOptions::default()).write_to_bytes(&[], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_multiple_pages() {
        let pages = vec![create_test_page(), create_test_page(), create_test_page()];
        let pdf_bytes = PdfDocumentWriter::new(PdfExportOptions::default())
            .write_to_bytes(&pages, &[])
            .unwrap();
        assert!(String::from_utf8_lossy(&pdf_bytes).contains("/Count 3"));
    }
}
