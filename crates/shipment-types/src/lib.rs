//! Shared shipment data model
//!
//! Types used by the PDF extraction layer, the reconciliation engine and
//! the command-line front-end.

pub mod table;
pub mod types;

pub use table::{Table, TableRow};
pub use types::{
    ensure_positive, DocumentKind, InvalidWeight, LineItem, ShipmentDocumentSet, ToleranceBand,
    WeightPair, WeightUnit, LB_PER_KG,
};
