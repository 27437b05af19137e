//! Result tables: summary, per-line, and validation rows
//!
//! Weights are kept as numbers in the row structs (that is what JSON output
//! carries); `TableRow::cells` formats them for the text grid.

use serde::Serialize;
use shipment_types::{TableRow, LB_PER_KG};

use crate::allocate::AllocatedLine;
use crate::band::DiscrepancyCheck;
use crate::extract::InvoiceDocument;

/// Scope label of the aggregate validation row
pub const TOTAL_SCOPE: &str = "TOTAL";

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "NO" }.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub gr_kg: f64,
    pub gr_lb: f64,
    pub invoice_kg: f64,
    pub invoice_lb: f64,
    pub delta_kg: f64,
    pub delta_pct: f64,
    pub tolerance: f64,
    pub allowed_low_kg: f64,
    pub allowed_high_kg: f64,
    pub in_tolerance: bool,
    pub target_low_kg: f64,
    pub target_high_kg: f64,
    pub invoice_documents: usize,
    pub line_items: usize,
}

impl SummaryRow {
    pub fn new(check: &DiscrepancyCheck, invoice_documents: usize, line_items: usize) -> Self {
        Self {
            gr_kg: check.gr_weight,
            gr_lb: check.gr_weight * LB_PER_KG,
            invoice_kg: check.invoice_weight,
            invoice_lb: check.invoice_weight * LB_PER_KG,
            delta_kg: check.delta_kg,
            delta_pct: check.delta_pct,
            tolerance: check.tolerance,
            allowed_low_kg: check.allowed.low,
            allowed_high_kg: check.allowed.high,
            in_tolerance: check.in_tolerance,
            target_low_kg: check.target.low,
            target_high_kg: check.target.high,
            invoice_documents,
            line_items,
        }
    }
}

impl TableRow for SummaryRow {
    fn columns() -> &'static [&'static str] {
        &[
            "GR kgs",
            "GR lbs",
            "Invoice kgs",
            "Invoice lbs",
            "Delta kgs",
            "Delta %",
            "Tolerance",
            "Allowed LOW kgs",
            "Allowed HIGH kgs",
            "In tolerance",
            "Target NEW invoice LOW kgs",
            "Target NEW invoice HIGH kgs",
            "Invoices",
            "Line items",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{:.2}", self.gr_kg),
            format!("{:.2}", self.gr_lb),
            format!("{:.2}", self.invoice_kg),
            format!("{:.2}", self.invoice_lb),
            format!("{:+.3}", self.delta_kg),
            format!("{:+.2}", self.delta_pct),
            format!("±{:.0}%", self.tolerance * 100.0),
            format!("{:.3}", self.allowed_low_kg),
            format!("{:.3}", self.allowed_high_kg),
            yes_no(self.in_tolerance),
            format!("{:.3}", self.target_low_kg),
            format!("{:.3}", self.target_high_kg),
            self.invoice_documents.to_string(),
            self.line_items.to_string(),
        ]
    }
}

/// One invoice line with its declared and redistributed weights
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRow {
    pub document: String,
    pub piece: String,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub weight_lb: f64,
    pub weight_kg: f64,
    pub new_weight_lb: f64,
    pub new_weight_kg: f64,
    pub delta_kg: f64,
    pub adjusted: bool,
}

impl LineRow {
    pub fn from_allocated(line: &AllocatedLine, epsilon_kg: f64) -> Self {
        Self {
            document: line.item.document.clone(),
            piece: line.item.piece.clone(),
            description: line.item.description.clone(),
            value: line.item.value,
            weight_lb: line.original_lb(),
            weight_kg: line.original_kg,
            new_weight_lb: line.new_lb,
            new_weight_kg: line.new_kg,
            delta_kg: line.delta_kg(),
            adjusted: line.is_adjusted(epsilon_kg),
        }
    }
}

impl TableRow for LineRow {
    fn columns() -> &'static [&'static str] {
        &[
            "Document",
            "Piece",
            "Description",
            "Value",
            "WEIGHT lbs",
            "WEIGHT kgs",
            "NEW WEIGHT lbs",
            "NEW WEIGHT kgs",
            "Delta kgs",
            "Adjusted",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.document.clone(),
            self.piece.clone(),
            self.description.clone().unwrap_or_default(),
            self.value.map(|v| format!("{v:.2}")).unwrap_or_default(),
            format!("{:.2}", self.weight_lb),
            format!("{:.3}", self.weight_kg),
            format!("{:.2}", self.new_weight_lb),
            format!("{:.3}", self.new_weight_kg),
            format!("{:+.3}", self.delta_kg),
            yes_no(self.adjusted),
        ]
    }
}

/// Column sums over a set of line rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LineTotals {
    pub weight_lb: f64,
    pub weight_kg: f64,
    pub new_weight_lb: f64,
    pub new_weight_kg: f64,
}

impl LineTotals {
    pub fn of(rows: &[LineRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| Self {
            weight_lb: acc.weight_lb + row.weight_lb,
            weight_kg: acc.weight_kg + row.weight_kg,
            new_weight_lb: acc.new_weight_lb + row.new_weight_lb,
            new_weight_kg: acc.new_weight_kg + row.new_weight_kg,
        })
    }
}

/// Cross-check of declared, line-level and allocated weights.
/// One row per invoice, then a `TOTAL` row that also carries the GR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRow {
    pub scope: String,
    pub declared_kg: Option<f64>,
    pub line_items_kg: f64,
    pub gr_kg: Option<f64>,
    pub new_weight_kg: f64,
    /// Declared total minus line-item sum, when a total was declared
    pub declared_minus_lines_kg: Option<f64>,
}

impl TableRow for ValidationRow {
    fn columns() -> &'static [&'static str] {
        &[
            "Scope",
            "Invoice declared kgs",
            "Line items kgs",
            "GR kgs",
            "NEW WEIGHT kgs",
            "Declared - lines kgs",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.scope.clone(),
            fmt_opt(self.declared_kg),
            format!("{:.3}", self.line_items_kg),
            fmt_opt(self.gr_kg),
            format!("{:.3}", self.new_weight_kg),
            self.declared_minus_lines_kg
                .map(|v| format!("{v:+.3}"))
                .unwrap_or_default(),
        ]
    }
}

/// Build the validation rows, or `None` when there are fewer than two line
/// items and the cross-check would only repeat the summary.
pub fn validation_rows(
    invoices: &[InvoiceDocument],
    lines: &[AllocatedLine],
    gr_kg: f64,
) -> Option<Vec<ValidationRow>> {
    if lines.len() < 2 {
        return None;
    }

    let mut rows: Vec<ValidationRow> = invoices
        .iter()
        .map(|invoice| {
            let line_items_kg = invoice.line_items_kg();
            let declared_kg = invoice.declared_total_kg();
            let new_weight_kg = lines
                .iter()
                .filter(|l| l.item.document == invoice.document)
                .map(|l| l.new_kg)
                .sum();
            ValidationRow {
                scope: invoice.document.clone(),
                declared_kg,
                line_items_kg,
                gr_kg: None,
                new_weight_kg,
                declared_minus_lines_kg: declared_kg.map(|d| d - line_items_kg),
            }
        })
        .collect();

    let line_items_kg = rows.iter().map(|r| r.line_items_kg).sum();
    let declared_kg = rows
        .iter()
        .map(|r| r.declared_kg)
        .sum::<Option<f64>>();
    rows.push(ValidationRow {
        scope: TOTAL_SCOPE.to_string(),
        declared_kg,
        line_items_kg,
        gr_kg: Some(gr_kg),
        new_weight_kg: lines.iter().map(|l| l.new_kg).sum(),
        declared_minus_lines_kg: declared_kg.map(|d| d - line_items_kg),
    });

    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::redistribute;
    use crate::band::check_weights;
    use pretty_assertions::assert_eq;
    use shipment_types::{LineItem, WeightPair, WeightUnit};

    fn invoice(name: &str, declared: Option<f64>, weights: &[f64]) -> InvoiceDocument {
        InvoiceDocument {
            document: name.to_string(),
            declared_total: declared.map(|d| (d, WeightUnit::Kg)),
            line_items: weights
                .iter()
                .enumerate()
                .map(|(i, w)| LineItem {
                    document: name.to_string(),
                    sequence: i + 1,
                    piece: (i + 1).to_string(),
                    description: None,
                    weight: *w,
                    unit: WeightUnit::Kg,
                    value: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary_row_cells() {
        let check = check_weights(WeightPair::new(190.0, 200.0).unwrap(), 0.10).unwrap();
        let row = SummaryRow::new(&check, 1, 2);
        let cells = row.cells();

        assert_eq!(cells.len(), SummaryRow::columns().len());
        assert_eq!(cells[0], "190.00");
        assert_eq!(cells[2], "200.00");
        assert_eq!(cells[4], "-10.000");
        assert_eq!(cells[6], "±10%");
        assert_eq!(cells[9], "yes");
    }

    #[test]
    fn test_line_rows_and_totals() {
        let inv = invoice("inv.pdf", None, &[100.0, 100.0]);
        let lines = redistribute(190.0, &inv.line_items).unwrap();
        let rows: Vec<LineRow> = lines
            .iter()
            .map(|l| LineRow::from_allocated(l, 0.001))
            .collect();

        assert_eq!(rows[0].cells()[7], "95.000");
        assert_eq!(rows[0].cells()[9], "yes");

        let totals = LineTotals::of(&rows);
        assert!((totals.new_weight_kg - 190.0).abs() < 1e-9);
        assert!((totals.weight_kg - 200.0).abs() < 1e-9);
        assert!((totals.new_weight_lb - 190.0 * LB_PER_KG).abs() < 1e-6);
    }

    #[test]
    fn test_validation_rows_per_invoice_and_total() {
        let a = invoice("a.pdf", Some(60.0), &[30.0, 30.0]);
        let b = invoice("b.pdf", None, &[40.0]);
        let items: Vec<LineItem> = a
            .line_items
            .iter()
            .chain(&b.line_items)
            .cloned()
            .collect();
        let lines = redistribute(110.0, &items).unwrap();

        let rows = validation_rows(&[a, b], &lines, 110.0).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].declared_minus_lines_kg, Some(0.0));
        assert_eq!(rows[1].declared_kg, None);
        assert!((rows[1].new_weight_kg - 44.0).abs() < 1e-9);

        let total = &rows[2];
        assert_eq!(total.scope, TOTAL_SCOPE);
        assert_eq!(total.gr_kg, Some(110.0));
        // one invoice has no declared total, so neither does the aggregate
        assert_eq!(total.declared_kg, None);
        assert!((total.new_weight_kg - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_validation_needs_two_lines() {
        let inv = invoice("inv.pdf", Some(50.0), &[50.0]);
        let lines = redistribute(45.0, &inv.line_items).unwrap();
        assert!(validation_rows(&[inv], &lines, 45.0).is_none());
    }
}
