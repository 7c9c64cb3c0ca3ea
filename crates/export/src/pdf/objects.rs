//! PDF Object Model
//!
//! The small set of basic object types every PDF is built from, and their
//! serialization.

use std::collections::BTreeMap;
use std::io::{self, Write};

/// PDF object types
#[derive(Debug, Clone)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    /// Name object (starts with /)
    Name(String),
    Array(Vec<PdfObject>),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    /// Indirect reference (object number, generation number)
    Reference(u32, u16),
}

/// PDF string encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfString {
    /// Literal string enclosed in parentheses
    Literal(Vec<u8>),
    /// Hexadecimal string enclosed in angle brackets
    Hex(Vec<u8>),
}

impl PdfString {
    pub fn literal(data: impl Into<Vec<u8>>) -> Self {
        PdfString::Literal(data.into())
    }

    /// Text string for document-level metadata
    ///
    /// ASCII stays literal; anything else becomes UTF-16BE with a byte order
    /// mark, which every reader decodes for Info entries.
    pub fn text(s: &str) -> Self {
        if s.is_ascii() {
            return PdfString::Literal(s.as_bytes().to_vec());
        }
        let mut data = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            data.extend_from_slice(&unit.to_be_bytes());
        }
        PdfString::Hex(data)
    }
}

/// PDF dictionary (ordered key-value pairs)
#[derive(Debug, Clone, Default)]
pub struct PdfDictionary {
    entries: BTreeMap<String, PdfObject>,
}

impl PdfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PdfObject) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PdfObject)> {
        self.entries.iter()
    }

    /// Set the Type entry
    pub fn with_type(mut self, type_name: &str) -> Self {
        self.insert("Type", PdfObject::Name(type_name.to_string()));
        self
    }
}

/// PDF stream (dictionary + data)
#[derive(Debug, Clone)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    pub data: Vec<u8>,
    /// Whether `data` already carries a filter
    pub compressed: bool,
}

impl PdfStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            dict: PdfDictionary::new(),
            data,
            compressed: false,
        }
    }

    pub fn with_dict(mut self, dict: PdfDictionary) -> Self {
        for (key, value) in dict.entries {
            self.dict.insert(key, value);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Serializer for PDF objects
pub struct PdfSerializer<W: Write> {
    writer: W,
}

impl<W: Write> PdfSerializer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_object(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Null => write!(self.writer, "null"),
            PdfObject::Boolean(b) => {
                write!(self.writer, "{}", if *b { "true" } else { "false" })
            }
            PdfObject::Integer(n) => write!(self.writer, "{}", n),
            PdfObject::Real(n) => {
                if n.fract() == 0.0 {
                    write!(self.writer, "{:.1}", n)
                } else {
                    let s = format!("{:.6}", n);
                    let s = s.trim_end_matches('0').trim_end_matches('.');
                    write!(self.writer, "{}", s)
                }
            }
            PdfObject::String(s) => self.write_string(s),
            PdfObject::Name(name) => self.write_name(name),
            PdfObject::Array(arr) => self.write_array(arr),
            PdfObject::Dictionary(dict) => self.write_dictionary(dict),
            PdfObject::Stream(stream) => self.write_stream(stream),
            PdfObject::Reference(obj_num, gen_num) => {
                write!(self.writer, "{} {} R", obj_num, gen_num)
            }
        }
    }

    fn write_string(&mut self, s: &PdfString) -> io::Result<()> {
        match s {
            PdfString::Literal(data) => {
                write!(self.writer, "(")?;
                for &byte in data {
                    match byte {
                        b'(' | b')' | b'\\' => write!(self.writer, "\\{}", byte as char)?,
                        0x0A => write!(self.writer, "\\n")?,
                        0x0D => write!(self.writer, "\\r")?,
                        0x09 => write!(self.writer, "\\t")?,
                        0x20..=0x7E => write!(self.writer, "{}", byte as char)?,
                        _ => write!(self.writer, "\\{:03o}", byte)?,
                    }
                }
                write!(self.writer, ")")
            }
            PdfString::Hex(data) => {
                write!(self.writer, "<")?;
                for byte in data {
                    write!(self.writer, "{:02X}", byte)?;
                }
                write!(self.writer, ">")
            }
        }
    }

    fn write_name(&mut self, name: &str) -> io::Result<()> {
        write!(self.writer, "/")?;
        for byte in name.bytes() {
            match byte {
                b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' => {
                    write!(self.writer, "#{:02X}", byte)?
                }
                0x21..=0x7E => write!(self.writer, "{}", byte as char)?,
                _ => write!(self.writer, "#{:02X}", byte)?,
            }
        }
        Ok(())
    }

    fn write_array(&mut self, arr: &[PdfObject]) -> io::Result<()> {
        write!(self.writer, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(self.writer, " ")?;
            }
            self.write_object(obj)?;
        }
        write!(self.writer, "]")
    }

    fn write_dictionary(&mut self, dict: &PdfDictionary) -> io::Result<()> {
        write!(self.writer, "<<")?;
        for (key, value) in dict.iter() {
            write!(self.writer, " ")?;
            self.write_name(key)?;
            write!(self.writer, " ")?;
            self.write_object(value)?;
        }
        write!(self.writer, " >>")
    }

    fn write_stream(&mut self, stream: &PdfStream) -> io::Result<()> {
        self.write_dictionary(&stream.dict)?;
        write!(self.writer, "\nstream\n")?;
        self.writer.write_all(&stream.data)?;
        write!(self.writer, "\nendstream")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl PdfObject {
    pub fn name(s: impl Into<String>) -> Self {
        PdfObject::Name(s.into())
    }

    pub fn reference(obj_num: u32) -> Self {
        PdfObject::Reference(obj_num, 0)
    }
}

impl From<i64> for PdfObject {
    fn from(n: i64) -> Self {
        PdfObject::Integer(n)
    }
}

impl From<f64> for PdfObject {
    fn from(n: f64) -> Self {
        PdfObject::Real(n)
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(dict: PdfDictionary) -> Self {
        PdfObject::Dictionary(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(obj: &PdfObject) -> String {
        let mut buf = Vec::new();
        PdfSerializer::new(&mut buf).write_object(obj).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(serialize(&PdfObject::Null), "null");
        assert_eq!(serialize(&PdfObject::Integer(42)), "42");
        assert_eq!(serialize(&PdfObject::Real(595.28)), "595.28");
        assert_eq!(serialize(&PdfObject::Real(842.0)), "842.0");
        assert_eq!(serialize(&PdfObject::reference(7)), "7 0 R");
    }

    #[test]
    fn test_literal_string_escapes() {
        let s = PdfObject::String(PdfString::literal("a(b)\\c"));
        assert_eq!(serialize(&s), "(a\\(b\\)\\\\c)");
    }

    #[test]
    fn test_text_string_uses_utf16_for_accents() {
        assert_eq!(PdfString::text("Report"), PdfString::Literal(b"Report".to_vec()));
        let s = serialize(&PdfObject::String(PdfString::text("Relatório")));
        assert!(s.starts_with("<FEFF0052"));
        assert!(s.contains("00F3"));
    }

    #[test]
    fn test_name_escapes_delimiters() {
        assert_eq!(serialize(&PdfObject::name("Type")), "/Type");
        assert_eq!(serialize(&PdfObject::name("A B")), "/A#20B");
    }

    #[test]
    fn test_serialize_dictionary() {
        let mut dict = PdfDictionary::new().with_type("Page");
        dict.insert("Count", PdfObject::Integer(3));
        assert_eq!(serialize(&dict.into()), "<< /Count 3 /Type /Page >>");
    }
}
