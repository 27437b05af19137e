//! Deadline-bounded text extraction over a whole document set
//!
//! Each document is parsed on its own worker thread. Results are keyed by
//! filename, so the outcome does not depend on completion order. Workers
//! still running at the deadline are abandoned and reported as timeouts.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use shipment_types::ShipmentDocumentSet;

use crate::error::PdfTextError;
use crate::extract::{ExtractedText, PdfTextExtractor};

/// Per-document extraction result, keyed by filename
pub type BatchOutcome = BTreeMap<String, Result<ExtractedText, PdfTextError>>;

type ExtractFn = fn(&[u8]) -> Result<ExtractedText, PdfTextError>;

/// Extract text from every document, giving up on any not done within `timeout`
pub fn extract_batch(documents: &ShipmentDocumentSet, timeout: Duration) -> BatchOutcome {
    extract_batch_with(documents, timeout, PdfTextExtractor::extract)
}

fn extract_batch_with(
    documents: &ShipmentDocumentSet,
    timeout: Duration,
    extract: ExtractFn,
) -> BatchOutcome {
    let timeout_ms = timeout.as_millis() as u64;
    let deadline = Instant::now() + timeout;
    let (tx, rx) = mpsc::channel();
    let mut outcome = BatchOutcome::new();

    for (idx, (name, bytes)) in documents.iter().enumerate() {
        let tx = tx.clone();
        let worker_name = name.clone();
        let bytes = bytes.clone();
        let spawned = thread::Builder::new()
            .name(format!("pdf-text-{idx}"))
            .spawn(move || {
                let result = extract(&bytes);
                // Receiver is gone once the deadline passed
                let _ = tx.send((worker_name, result));
            });

        if let Err(e) = spawned {
            outcome.insert(
                name.clone(),
                Err(PdfTextError::ExtractionError(format!(
                    "could not start extraction worker: {e}"
                ))),
            );
        }
    }
    drop(tx);

    while outcome.len() < documents.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((name, result)) => {
                tracing::debug!(document = %name, ok = result.is_ok(), "text extraction finished");
                outcome.insert(name, result);
            }
            Err(RecvTimeoutError::Timeout) => {
                for name in documents.keys() {
                    if !outcome.contains_key(name) {
                        tracing::warn!(document = %name, timeout_ms, "text extraction timed out");
                        outcome.insert(name.clone(), Err(PdfTextError::Timeout(timeout_ms)));
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                for name in documents.keys() {
                    if !outcome.contains_key(name) {
                        outcome.insert(
                            name.clone(),
                            Err(PdfTextError::ExtractionError(
                                "extraction worker panicked".to_string(),
                            )),
                        );
                    }
                }
            }
        }
    }

    outcome
}
