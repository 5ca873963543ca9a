//! Text extraction for exported reading-test PDFs.
//!
//! The crate turns a PDF byte buffer into ordered lines of text:
//!
//! 1. [`parser::fragments`] walks each page's content stream and yields
//!    positioned [`TextFragment`]s.
//! 2. [`layout`] clusters fragments into [`Line`]s by row proximity and closes
//!    every page with a sentinel line.
//! 3. The lines are joined into one plain-text string.
//!
//! All decoding goes through the [`parser::backend::PdfBackend`] trait; the
//! production implementation wraps `lopdf`.

use thiserror::Error;

use parser::backend::LopdfBackend;

pub mod layout;
pub mod normalize;
pub mod parser;
pub mod types;

pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Construction parameters for an [`Extractor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorOptions {
    /// Maximum y distance between fragments of one line.
    pub row_tolerance: f32,
    /// Apply [`normalize::normalize_fragment_text`] to every fragment.
    pub normalize_text: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            row_tolerance: layout::ROW_TOLERANCE,
            normalize_text: true,
        }
    }
}

/// Reusable extraction pipeline configured once at construction.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractorOptions,
}

impl Extractor {
    pub fn new(options: ExtractorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Decode `bytes` and rebuild its lines and plain text.
    ///
    /// Decode failures are returned unchanged; nothing is recovered here.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, PdfError> {
        let backend = LopdfBackend::load_bytes(bytes)?;
        let pages = parser::fragments::extract_all_fragments(&backend, self.options.normalize_text)?;
        let lines = layout::build_lines(pages, self.options.row_tolerance);
        let text = layout::lines_to_text(&lines);

        log::debug!(
            "extracted {} lines ({} chars) from {} pages",
            lines.len(),
            text.len(),
            backend.page_count()
        );

        Ok(ExtractedText {
            page_count: backend.page_count(),
            lines,
            text,
        })
    }

    pub fn extract_file(&self, path: impl AsRef<std::path::Path>) -> Result<ExtractedText, PdfError> {
        let bytes = std::fs::read(path)?;
        self.extract(&bytes)
    }
}

/// Plain text of a PDF using default [`ExtractorOptions`].
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    Ok(Extractor::default().extract(bytes)?.text)
}
