//! Document classification
//!
//! Decides whether a document is the Goods Receipt or an Invoice. Content
//! markers win over the filename; the filename is only consulted when the
//! text carries no marker at all.

use std::collections::BTreeMap;

use shipment_types::DocumentKind;

use crate::error::{ReconcileError, Result};
use crate::patterns::{
    GR_CONTENT_PATTERN, GR_FILENAME_TOKENS, INVOICE_CONTENT_PATTERN, INVOICE_FILENAME_TOKENS,
};

/// Classify one document from its filename and extracted text
pub fn classify_document(filename: &str, text: &str) -> DocumentKind {
    if GR_CONTENT_PATTERN.is_match(text) {
        DocumentKind::GoodsReceipt
    } else if INVOICE_CONTENT_PATTERN.is_match(text) {
        DocumentKind::Invoice
    } else {
        classify_by_filename(filename)
    }
}

/// Filename-only classification: `GR_4500012.pdf`, `inv-001.pdf`, `CI 2024-07.pdf`
pub fn classify_by_filename(filename: &str) -> DocumentKind {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _ext)| stem)
        .unwrap_or(filename)
        .to_lowercase();

    let tokens: Vec<&str> = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(|t| t.trim_end_matches(|c: char| c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| GR_FILENAME_TOKENS.contains(t)) {
        DocumentKind::GoodsReceipt
    } else if tokens.iter().any(|t| INVOICE_FILENAME_TOKENS.contains(t)) {
        DocumentKind::Invoice
    } else {
        DocumentKind::Unknown
    }
}

/// A document's name and text, borrowed from the caller's map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceText<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

/// A document set split by kind
#[derive(Debug, Clone)]
pub struct ClassifiedSet<'a> {
    pub goods_receipt: SourceText<'a>,
    /// Sorted by filename
    pub invoices: Vec<SourceText<'a>>,
    /// Documents that were neither; ignored by the analysis
    pub skipped: Vec<&'a str>,
}

/// Classify every document and enforce exactly one GR and at least one invoice
pub fn classify_set(texts: &BTreeMap<String, String>) -> Result<ClassifiedSet<'_>> {
    let mut receipts = Vec::new();
    let mut invoices = Vec::new();
    let mut skipped = Vec::new();

    for (name, text) in texts {
        let kind = classify_document(name, text);
        tracing::debug!(document = %name, %kind, "classified document");

        let source = SourceText { name, text };
        match kind {
            DocumentKind::GoodsReceipt => receipts.push(source),
            DocumentKind::Invoice => invoices.push(source),
            DocumentKind::Unknown => {
                tracing::warn!(document = %name, "could not classify document, skipping it");
                skipped.push(name.as_str());
            }
        }
    }

    let goods_receipt = match receipts.as_slice() {
        [single] => *single,
        [] => {
            return Err(ReconcileError::Classification(format!(
                "no Goods-Receipt document found among: {}",
                join_names(texts.keys().map(String::as_str))
            )))
        }
        many => {
            return Err(ReconcileError::Classification(format!(
                "expected exactly one Goods-Receipt document, found {}: {}",
                many.len(),
                join_names(many.iter().map(|s| s.name))
            )))
        }
    };

    if invoices.is_empty() {
        return Err(ReconcileError::Classification(format!(
            "no Invoice document found among: {}",
            join_names(texts.keys().map(String::as_str))
        )));
    }

    Ok(ClassifiedSet {
        goods_receipt,
        invoices,
        skipped,
    })
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
