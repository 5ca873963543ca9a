use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::PdfError;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Font resource entry of a page: the `/F1`-style key plus its base font.
#[derive(Debug, Clone)]
pub struct FontResource {
    pub key: Vec<u8>,
    pub base_font: Option<String>,
    pub encoding: Option<String>,
}

/// Operand values of a content-stream operator, detached from `lopdf`.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric view of the operand; integers and reals are both accepted.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(f) => Some(*f),
            _ => None,
        }
    }
}

/// One content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl From<&lopdf::Object> for PdfValue {
    fn from(obj: &lopdf::Object) -> Self {
        match obj {
            lopdf::Object::Null => PdfValue::Null,
            lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
            lopdf::Object::Integer(i) => PdfValue::Integer(*i),
            lopdf::Object::Real(f) => PdfValue::Real(*f),
            lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
            lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
            lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(PdfValue::from).collect()),
            // Text operators never carry dictionaries, streams or references.
            _ => PdfValue::Other,
        }
    }
}

/// Decode string bytes that carry no usable font encoding.
///
/// UTF-16BE with a BOM first, then UTF-8, then Latin-1 byte-for-codepoint.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE_u8, 0xFF]) {
        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// The decode capability the fragment extractor needs from a PDF library.
///
/// Kept as a trait so the content-stream walker can be driven by canned
/// operations in tests.
pub trait PdfBackend {
    /// 1-based page number to page object id, in page order.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Font resources visible from the page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError>;

    /// Decoded content-stream operations of the page.
    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError>;

    /// Turn the raw bytes of a text-showing operand into text.
    fn decode_text(&self, font: Option<&FontResource>, bytes: &[u8]) -> String;
}

/// [`PdfBackend`] over an in-memory [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let name_of = |dict: &lopdf::Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        Ok(fonts
            .iter()
            .map(|(key, dict)| {
                let dict: &lopdf::Dictionary = dict;
                FontResource {
                    key: key.clone(),
                    base_font: name_of(dict, b"BaseFont"),
                    encoding: name_of(dict, b"Encoding"),
                }
            })
            .collect())
    }

    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError> {
        let data = self
            .doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))?;
        let content = Content::decode(&data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(PdfValue::from).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn decode_text(&self, font: Option<&FontResource>, bytes: &[u8]) -> String {
        // Identity-H/V fonts carry two-byte codes that are usually UTF-16BE.
        let identity = font
            .and_then(|f| f.encoding.as_deref())
            .is_some_and(|enc| enc.contains("Identity"));

        if identity && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&units);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }

        decode_text_simple(bytes)
    }
}
