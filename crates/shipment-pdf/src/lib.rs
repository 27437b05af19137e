//! PDF text extraction for shipment documents
//!
//! Turns raw PDF bytes into page/line structured text. Parsing uses lopdf,
//! with pdf-extract as a fallback for content streams lopdf cannot decode.
//! `extract_batch` runs one worker per document under a shared deadline.

pub mod batch;
pub mod error;
pub mod extract;

pub use batch::{extract_batch, BatchOutcome};
pub use error::PdfTextError;
pub use extract::{ExtractedText, PageContent, PdfTextExtractor, TextBackend, TextLine};
