//! Proportional redistribution of the GR total over invoice line items

use serde::Serialize;
use shipment_types::{LineItem, LB_PER_KG};

use crate::error::{ReconcileError, Result};

/// A line item with its share of the GR total attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocatedLine {
    pub item: LineItem,
    pub original_kg: f64,
    pub new_kg: f64,
    pub new_lb: f64,
}

impl AllocatedLine {
    /// Declared weight in lb, exact when the invoice printed pounds
    pub fn original_lb(&self) -> f64 {
        self.item.weight_lb()
    }

    /// New minus declared weight, kg
    pub fn delta_kg(&self) -> f64 {
        self.new_kg - self.original_kg
    }

    pub fn is_adjusted(&self, epsilon_kg: f64) -> bool {
        self.delta_kg().abs() > epsilon_kg
    }
}

/// Spread `gr_total_kg` over `items` in proportion to their declared weights.
///
/// `new_i = gr_total * w_i / sum(w)`. The floating-point residual is added to
/// the heaviest line so the new weights sum back to `gr_total_kg`.
pub fn redistribute(gr_total_kg: f64, items: &[LineItem]) -> Result<Vec<AllocatedLine>> {
    if !gr_total_kg.is_finite() || gr_total_kg <= 0.0 {
        return Err(ReconcileError::InvalidInput(format!(
            "GR total must be > 0 kg (got {gr_total_kg})"
        )));
    }

    let originals: Vec<f64> = items.iter().map(LineItem::weight_kg).collect();
    let declared: f64 = originals.iter().sum();
    if !declared.is_finite() || declared <= 0.0 {
        return Err(ReconcileError::InvalidInput(format!(
            "declared line-item weights must sum to > 0 kg (got {declared})"
        )));
    }

    let mut lines: Vec<AllocatedLine> = items
        .iter()
        .zip(&originals)
        .map(|(item, &original_kg)| AllocatedLine {
            item: item.clone(),
            original_kg,
            new_kg: gr_total_kg * (original_kg / declared),
            new_lb: 0.0,
        })
        .collect();

    let allocated: f64 = lines.iter().map(|l| l.new_kg).sum();
    let heaviest = lines
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.original_kg.total_cmp(&b.original_kg))
        .map(|(idx, _)| idx);
    if let Some(idx) = heaviest {
        lines[idx].new_kg += gr_total_kg - allocated;
    }

    for line in &mut lines {
        line.new_lb = line.new_kg * LB_PER_KG;
    }

    Ok(lines)
}
