//! The reconciliation pipeline: classify, extract, check, redistribute, assemble
//!
//! Any failing step aborts the whole run with a single error. No partial
//! tables are returned.

use std::collections::BTreeMap;

use serde::Serialize;
use shipment_pdf::{extract_batch, PdfTextError};
use shipment_types::{LineItem, ShipmentDocumentSet, Table, WeightPair};

use crate::allocate::redistribute;
use crate::band::{check_weights, ensure_tolerance};
use crate::classify::classify_set;
use crate::config::AnalysisConfig;
use crate::error::{ReconcileError, Result};
use crate::extract::{parse_goods_receipt, parse_invoice, InvoiceDocument};
use crate::tables::{validation_rows, LineRow, LineTotals, SummaryRow, ValidationRow};

/// Mismatch between a declared invoice total and its line sum worth a warning, kg
const DECLARED_MISMATCH_KG: f64 = 0.01;

/// Everything a reconciliation run produces
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    pub summary: Table<SummaryRow>,
    pub full_table: Table<LineRow>,
    pub adjusted_table: Table<LineRow>,
    pub validation_table: Option<Table<ValidationRow>>,
    /// Non-fatal findings: skipped documents, totals that disagree with lines
    pub warnings: Vec<String>,
}

impl ReconciliationResult {
    pub fn in_tolerance(&self) -> bool {
        self.summary.rows.first().is_some_and(|s| s.in_tolerance)
    }

    /// Column sums of the full table
    pub fn totals(&self) -> LineTotals {
        LineTotals::of(&self.full_table.rows)
    }

    /// The four tables in summary, full, adjusted, validation order
    pub fn into_tuple(
        self,
    ) -> (
        Table<SummaryRow>,
        Table<LineRow>,
        Table<LineRow>,
        Option<Table<ValidationRow>>,
    ) {
        (
            self.summary,
            self.full_table,
            self.adjusted_table,
            self.validation_table,
        )
    }
}

/// Reconcile a set of PDFs at the given tolerance, defaults for the rest
///
/// A tolerance outside (0, 1) is `InvalidInput`, as for the band functions.
pub fn run_analysis_with_tolerance(
    files: &ShipmentDocumentSet,
    tolerance: f64,
) -> Result<ReconciliationResult> {
    let tolerance = ensure_tolerance(tolerance)?;
    run_analysis(files, &AnalysisConfig::with_tolerance(tolerance))
}

/// Reconcile a set of PDFs: one Goods Receipt and one or more invoices
///
/// # Errors
///
/// - `InvalidInput` for fewer than two files
/// - `Config` when `config` fails validation (tolerance, epsilon, timeout)
/// - `Timeout` / `Extraction` when a document's text cannot be read in time
/// - `Classification` unless there is exactly one GR and at least one invoice
/// - `Extraction` when a required field is missing from a document
pub fn run_analysis(
    files: &ShipmentDocumentSet,
    config: &AnalysisConfig,
) -> Result<ReconciliationResult> {
    if files.len() < 2 {
        return Err(ReconcileError::InvalidInput(format!(
            "at least 2 PDFs are required: 1 GR and 1 or more invoices (got {})",
            files.len()
        )));
    }
    config.validate()?;

    tracing::info!(documents = files.len(), "extracting document text");
    let mut texts = BTreeMap::new();
    for (name, outcome) in extract_batch(files, config.parse_timeout()) {
        match outcome {
            Ok(extracted) => {
                tracing::debug!(
                    document = %name,
                    backend = ?extracted.backend,
                    pages = extracted.pages.len(),
                    "document text extracted"
                );
                let text = extracted
                    .lines()
                    .map(|line| line.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                texts.insert(name, text);
            }
            Err(PdfTextError::Timeout(timeout_ms)) => {
                return Err(ReconcileError::Timeout {
                    document: name,
                    timeout_ms,
                });
            }
            Err(e) => {
                return Err(ReconcileError::extraction(name, "text", e.to_string()));
            }
        }
    }

    analyze_texts(&texts, config)
}

/// Run the pipeline over already extracted text, filename -> text
pub fn analyze_texts(
    texts: &BTreeMap<String, String>,
    config: &AnalysisConfig,
) -> Result<ReconciliationResult> {
    config.validate()?;
    let mut warnings = Vec::new();

    let classified = classify_set(texts)?;
    for name in &classified.skipped {
        warnings.push(format!("'{name}' is neither a GR nor an invoice and was ignored"));
    }

    let receipt = parse_goods_receipt(classified.goods_receipt, config.default_gr_unit)?;
    let invoices = classified
        .invoices
        .iter()
        .map(|source| parse_invoice(*source))
        .collect::<Result<Vec<InvoiceDocument>>>()?;

    for invoice in &invoices {
        match invoice.declared_total_kg() {
            Some(declared) => {
                let lines = invoice.line_items_kg();
                if (declared - lines).abs() > DECLARED_MISMATCH_KG {
                    tracing::warn!(
                        document = %invoice.document,
                        declared,
                        lines,
                        "declared invoice total differs from line-item sum"
                    );
                    warnings.push(format!(
                        "'{}': declared total {:.3} kg differs from line items {:.3} kg",
                        invoice.document, declared, lines
                    ));
                }
            }
            None => warnings.push(format!(
                "'{}': no declared total weight, using the line-item sum",
                invoice.document
            )),
        }
    }

    let gr_kg = receipt.total_kg();
    let invoice_kg: f64 = invoices.iter().map(InvoiceDocument::total_kg).sum();
    let check = check_weights(WeightPair::new(gr_kg, invoice_kg)?, config.tolerance)?;

    let mut items: Vec<LineItem> = invoices
        .iter()
        .flat_map(|invoice| invoice.line_items.iter().cloned())
        .collect();
    items.sort_by(|a, b| {
        a.document
            .cmp(&b.document)
            .then(a.sequence.cmp(&b.sequence))
    });

    let lines = redistribute(gr_kg, &items)?;
    let full_rows: Vec<LineRow> = lines
        .iter()
        .map(|line| LineRow::from_allocated(line, config.adjustment_epsilon_kg))
        .collect();
    let adjusted_rows: Vec<LineRow> = full_rows.iter().filter(|r| r.adjusted).cloned().collect();

    tracing::info!(
        gr_kg,
        invoice_kg,
        in_tolerance = check.in_tolerance,
        line_items = full_rows.len(),
        adjusted = adjusted_rows.len(),
        "reconciliation complete"
    );

    Ok(ReconciliationResult {
        summary: Table::new(
            "Summary",
            vec![SummaryRow::new(&check, invoices.len(), full_rows.len())],
        ),
        full_table: Table::new("Full table", full_rows),
        adjusted_table: Table::new("Adjusted lines", adjusted_rows),
        validation_table: validation_rows(&invoices, &lines, gr_kg)
            .map(|rows| Table::new("Validation", rows)),
        warnings,
    })
}
