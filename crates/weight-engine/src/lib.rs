//! Weight discrepancy engine
//!
//! Checks a Goods-Receipt weight against invoice weights with a ±tolerance
//! band and, from the source PDFs, redistributes the GR weight over the
//! invoice line items in proportion to their declared weights.
//!
//! Two entry points:
//! - [`check_weights`] and the band functions for a manual pre-check
//! - [`run_analysis`] for the full document reconciliation

pub mod allocate;
pub mod analysis;
pub mod band;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod numeric;
pub mod patterns;
pub mod tables;

pub use allocate::{redistribute, AllocatedLine};
pub use analysis::{analyze_texts, run_analysis, run_analysis_with_tolerance, ReconciliationResult};
pub use band::{
    check_weights, invoice_allowed_band, invoice_allowed_band_default, is_within_tolerance,
    target_band_default, target_band_for_new_invoice_from_gr, DiscrepancyCheck, DEFAULT_TOLERANCE,
};
pub use classify::{classify_by_filename, classify_document, classify_set, ClassifiedSet, SourceText};
pub use config::{AnalysisConfig, ConfigFile};
pub use error::{ReconcileError, Result};
pub use extract::{parse_goods_receipt, parse_invoice, GoodsReceipt, InvoiceDocument};
pub use tables::{LineRow, LineTotals, SummaryRow, ValidationRow};
