//! PDF text extraction
//!
//! Extracts text page by page with line-level granularity.
//!
//! # Example
//! ```no_run
//! use shipment_pdf::{PdfTextExtractor, PdfTextError};
//!
//! fn read_invoice(pdf_bytes: &[u8]) -> Result<(), PdfTextError> {
//!     let document = PdfTextExtractor::extract(pdf_bytes)?;
//!     println!("Extracted {} pages", document.pages.len());
//!     Ok(())
//! }
//! ```

use lopdf::Document;
use serde::{Deserialize, Serialize};

use crate::error::PdfTextError;

/// Fewer non-whitespace characters than this and the document is treated as scanned
const MIN_TEXT_CHARS: usize = 10;

/// Page separator used when joining per-page text
const PAGE_BREAK: char = '\x0C';

/// Which parser produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBackend {
    Lopdf,
    PdfExtract,
}

/// Text of a whole PDF document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    /// All pages joined with form feeds
    pub raw_text: String,

    pub pages: Vec<PageContent>,

    pub backend: TextBackend,
}

impl ExtractedText {
    /// Every non-blank line across all pages, in reading order
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter(|l| !l.text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: usize,

    pub text: String,

    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,

    /// Line number within the page (1-indexed)
    pub line_number: usize,
}

pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Extract text from PDF bytes
    ///
    /// # Errors
    /// - `PdfTextError::InvalidPdf` - not a PDF, or malformed beyond repair
    /// - `PdfTextError::PasswordProtected` - the PDF is encrypted
    /// - `PdfTextError::ScannedPdfNeedsOcr` - no usable text layer
    /// - `PdfTextError::ExtractionError` - other extraction failures
    pub fn extract(pdf_bytes: &[u8]) -> Result<ExtractedText, PdfTextError> {
        if pdf_bytes.len() < 5 || &pdf_bytes[0..5] != b"%PDF-" {
            return Err(PdfTextError::InvalidPdf("missing %PDF- header".to_string()));
        }

        let doc =
            Document::load_mem(pdf_bytes).map_err(|e| classify_load_error(&e.to_string()))?;
        if doc.is_encrypted() {
            return Err(PdfTextError::PasswordProtected);
        }

        let (raw_text, backend) = match lopdf_text(&doc) {
            Some(text) if has_enough_text(&text) => (text, TextBackend::Lopdf),
            _ => {
                tracing::debug!("lopdf produced no usable text, falling back to pdf-extract");
                let text = pdf_extract::extract_text_from_mem(pdf_bytes)
                    .map_err(|e| classify_load_error(&e.to_string()))?;
                (text, TextBackend::PdfExtract)
            }
        };

        if !has_enough_text(&raw_text) {
            return Err(PdfTextError::ScannedPdfNeedsOcr);
        }

        let pages = Self::split_pages(&raw_text)?;

        Ok(ExtractedText {
            raw_text,
            pages,
            backend,
        })
    }

    /// Split joined text into pages on form feeds
    pub(crate) fn split_pages(text: &str) -> Result<Vec<PageContent>, PdfTextError> {
        let pages: Vec<PageContent> = text
            .split(PAGE_BREAK)
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(idx, page_text)| Self::create_page_content(idx + 1, page_text))
            .collect();

        if pages.is_empty() {
            return Err(PdfTextError::ExtractionError(
                "No pages could be extracted from PDF".to_string(),
            ));
        }

        Ok(pages)
    }

    fn create_page_content(page_number: usize, text: &str) -> PageContent {
        let lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| TextLine {
                text: line.to_string(),
                line_number: idx + 1,
            })
            .collect();

        PageContent {
            page_number,
            text: text.to_string(),
            lines,
        }
    }
}

/// Per-page text from lopdf, joined with form feeds. `None` if every page failed.
fn lopdf_text(doc: &Document) -> Option<String> {
    let mut pages = Vec::new();
    let mut any_ok = false;

    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => {
                any_ok = true;
                pages.push(text);
            }
            Err(e) => {
                tracing::debug!("lopdf could not extract page {}: {}", page_number, e);
                pages.push(String::new());
            }
        }
    }

    any_ok.then(|| pages.join(&PAGE_BREAK.to_string()))
}

fn has_enough_text(text: &str) -> bool {
    text.chars().filter(|c| !c.is_whitespace()).count() >= MIN_TEXT_CHARS
}

fn classify_load_error(message: &str) -> PdfTextError {
    let lower = message.to_lowercase();
    if lower.contains("encrypt") || lower.contains("password") {
        PdfTextError::PasswordProtected
    } else if lower.contains("invalid")
        || lower.contains("malformed")
        || lower.contains("corrupt")
        || lower.contains("parse")
        || lower.contains("header")
        || lower.contains("xref")
        || lower.contains("trailer")
    {
        PdfTextError::InvalidPdf(message.to_string())
    } else {
        PdfTextError::ExtractionError(message.to_string())
    }
}
