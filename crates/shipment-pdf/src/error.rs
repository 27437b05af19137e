use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfTextError {
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Password-protected PDF")]
    PasswordProtected,

    #[error("Scanned PDF detected - OCR required")]
    ScannedPdfNeedsOcr,

    #[error("PDF text extraction failed: {0}")]
    ExtractionError(String),

    #[error("Text extraction did not finish within {0}ms")]
    Timeout(u64),
}
