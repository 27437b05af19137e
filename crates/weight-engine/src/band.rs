//! Tolerance band arithmetic
//!
//! Two bands are in play. The invoice-anchored band says which GR weights
//! are consistent with a given invoice total. The GR-anchored target band
//! inverts that: it is the range a corrected invoice total must land in so
//! that the GR falls inside the corrected invoice's own band.

use serde::Serialize;
use shipment_types::{ensure_positive, Table, TableRow, ToleranceBand, WeightPair};

use crate::error::{ReconcileError, Result};

/// ±10%
pub const DEFAULT_TOLERANCE: f64 = 0.10;

pub(crate) fn ensure_tolerance(tol: f64) -> Result<f64> {
    if tol.is_finite() && tol > 0.0 && tol < 1.0 {
        Ok(tol)
    } else {
        Err(ReconcileError::InvalidInput(format!(
            "tolerance must be a fraction in (0, 1) (got {tol})"
        )))
    }
}

/// Band of GR weights accepted against `invoice_weight`:
/// `[invoice * (1 - tol), invoice * (1 + tol)]`
pub fn invoice_allowed_band(invoice_weight: f64, tol: f64) -> Result<ToleranceBand> {
    let invoice_weight = ensure_positive("invoice_weight", invoice_weight)?;
    let tol = ensure_tolerance(tol)?;

    Ok(ToleranceBand {
        low: invoice_weight * (1.0 - tol),
        high: invoice_weight * (1.0 + tol),
    })
}

/// Range a new invoice total must fall into to be in tolerance with `gr_weight`:
/// `[gr / (1 + tol), gr / (1 - tol)]`
pub fn target_band_for_new_invoice_from_gr(gr_weight: f64, tol: f64) -> Result<ToleranceBand> {
    let gr_weight = ensure_positive("gr_weight", gr_weight)?;
    let tol = ensure_tolerance(tol)?;

    Ok(ToleranceBand {
        low: gr_weight / (1.0 + tol),
        high: gr_weight / (1.0 - tol),
    })
}

/// `invoice_allowed_band` at [`DEFAULT_TOLERANCE`]
pub fn invoice_allowed_band_default(invoice_weight: f64) -> Result<ToleranceBand> {
    invoice_allowed_band(invoice_weight, DEFAULT_TOLERANCE)
}

/// `target_band_for_new_invoice_from_gr` at [`DEFAULT_TOLERANCE`]
pub fn target_band_default(gr_weight: f64) -> Result<ToleranceBand> {
    target_band_for_new_invoice_from_gr(gr_weight, DEFAULT_TOLERANCE)
}

/// The single go/no-go gate: is the GR inside the invoice-anchored band?
pub fn is_within_tolerance(gr_weight: f64, invoice_weight: f64, tol: f64) -> Result<bool> {
    let gr_weight = ensure_positive("gr_weight", gr_weight)?;
    Ok(invoice_allowed_band(invoice_weight, tol)?.contains(gr_weight))
}

/// Outcome of a manual GR vs invoice pre-check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancyCheck {
    pub gr_weight: f64,
    pub invoice_weight: f64,
    pub tolerance: f64,
    pub allowed: ToleranceBand,
    pub target: ToleranceBand,
    pub in_tolerance: bool,
    /// GR minus invoice, kg
    pub delta_kg: f64,
    /// `delta_kg` as a percentage of the invoice weight
    pub delta_pct: f64,
}

impl DiscrepancyCheck {
    /// Documents only need to be reconciled when the weights disagree
    pub fn needs_documents(&self) -> bool {
        !self.in_tolerance
    }

    pub fn to_table(&self) -> Table<DiscrepancyCheck> {
        Table::new("Weight discrepancy", vec![self.clone()])
    }
}

impl TableRow for DiscrepancyCheck {
    fn columns() -> &'static [&'static str] {
        &[
            "Allowed LOW kg",
            "Commercial invoice kg",
            "Allowed HIGH kg",
            "GR kg",
            "Target NEW invoice LOW kg",
            "Target NEW invoice HIGH kg",
            "Delta %",
            "In tolerance",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{:.3}", self.allowed.low),
            format!("{:.2}", self.invoice_weight),
            format!("{:.3}", self.allowed.high),
            format!("{:.2}", self.gr_weight),
            format!("{:.3}", self.target.low),
            format!("{:.3}", self.target.high),
            format!("{:+.2}", self.delta_pct),
            if self.in_tolerance { "yes" } else { "NO" }.to_string(),
        ]
    }
}

/// Run the manual pre-check over a validated weight pair
pub fn check_weights(pair: WeightPair, tol: f64) -> Result<DiscrepancyCheck> {
    let allowed = invoice_allowed_band(pair.invoice_weight, tol)?;
    let target = target_band_for_new_invoice_from_gr(pair.gr_weight, tol)?;
    let delta_kg = pair.gr_weight - pair.invoice_weight;

    Ok(DiscrepancyCheck {
        gr_weight: pair.gr_weight,
        invoice_weight: pair.invoice_weight,
        tolerance: tol,
        allowed,
        target,
        in_tolerance: allowed.contains(pair.gr_weight),
        delta_kg,
        delta_pct: delta_kg / pair.invoice_weight * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_invoice_band_scenario() {
        let band = invoice_allowed_band(100.0, 0.10).unwrap();
        assert!(close(band.low, 90.0));
        assert!(close(band.high, 110.0));
    }

    #[test]
    fn test_target_band_scenario() {
        let band = target_band_for_new_invoice_from_gr(95.0, 0.10).unwrap();
        assert!(close(band.low, 86.363_636_363_636_36));
        assert!(close(band.high, 105.555_555_555_555_56));
    }

    #[test]
    fn test_default_tolerance_helpers() {
        assert_eq!(
            invoice_allowed_band_default(100.0).unwrap(),
            invoice_allowed_band(100.0, 0.10).unwrap()
        );
        assert_eq!(
            target_band_default(95.0).unwrap(),
            target_band_for_new_invoice_from_gr(95.0, 0.10).unwrap()
        );
    }

    #[test]
    fn test_gr_95_invoice_100_is_in_tolerance() {
        assert!(is_within_tolerance(95.0, 100.0, DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn test_gr_80_invoice_100_is_out_of_tolerance() {
        assert!(!is_within_tolerance(80.0, 100.0, DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn test_band_edges_are_in_tolerance() {
        assert!(is_within_tolerance(90.0, 100.0, 0.10).unwrap());
        assert!(is_within_tolerance(110.0, 100.0, 0.10).unwrap());
    }

    #[test]
    fn test_rejects_non_positive_weights() {
        assert!(matches!(
            invoice_allowed_band(0.0, 0.10),
            Err(ReconcileError::InvalidInput(_))
        ));
        assert!(matches!(
            target_band_for_new_invoice_from_gr(-5.0, 0.10),
            Err(ReconcileError::InvalidInput(_))
        ));
        assert!(invoice_allowed_band(f64::INFINITY, 0.10).is_err());
    }

    #[test]
    fn test_rejects_tolerance_outside_unit_interval() {
        assert!(invoice_allowed_band(100.0, 0.0).is_err());
        assert!(invoice_allowed_band(100.0, 1.0).is_err());
        assert!(target_band_for_new_invoice_from_gr(100.0, -0.1).is_err());
        assert!(target_band_for_new_invoice_from_gr(100.0, f64::NAN).is_err());
    }

    #[test]
    fn test_check_weights_out_of_tolerance() {
        let pair = WeightPair::new(80.0, 100.0).unwrap();
        let check = check_weights(pair, DEFAULT_TOLERANCE).unwrap();

        assert!(!check.in_tolerance);
        assert!(check.needs_documents());
        assert!(close(check.delta_kg, -20.0));
        assert!(close(check.delta_pct, -20.0));
        assert!(close(check.target.low, 80.0 / 1.1));
    }

    #[test]
    fn test_check_table_cells() {
        let pair = WeightPair::new(95.0, 100.0).unwrap();
        let check = check_weights(pair, DEFAULT_TOLERANCE).unwrap();
        let cells = check.cells();

        assert_eq!(cells.len(), DiscrepancyCheck::columns().len());
        assert_eq!(cells[0], "90.000");
        assert_eq!(cells[2], "110.000");
        assert_eq!(cells[4], "86.364");
        assert_eq!(cells[5], "105.556");
        assert_eq!(cells[6], "-5.00");
        assert_eq!(cells[7], "yes");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn invoice_band_brackets_reference(w in 0.001f64..1_000_000.0, tol in 0.001f64..0.999) {
            let band = invoice_allowed_band(w, tol).unwrap();
            prop_assert!(band.low < w && w < band.high);
            prop_assert!(close(band.width(), 2.0 * tol * w));
        }

        #[test]
        fn invoice_band_is_pure(w in 0.001f64..1_000_000.0, tol in 0.001f64..0.999) {
            prop_assert_eq!(invoice_allowed_band(w, tol).unwrap(), invoice_allowed_band(w, tol).unwrap());
        }

        #[test]
        fn target_band_round_trips_through_invoice_band(
            gr in 0.001f64..1_000_000.0,
            tol in 0.001f64..0.9,
            t in 0.0f64..=1.0,
        ) {
            let target = target_band_for_new_invoice_from_gr(gr, tol).unwrap();
            prop_assert!(close(target.low, gr / (1.0 + tol)));
            prop_assert!(close(target.high, gr / (1.0 - tol)));

            let new_total = target.low + t * target.width();
            let band = invoice_allowed_band(new_total, tol).unwrap();
            let slack = gr * 1e-12;
            prop_assert!(band.low <= gr + slack && gr - slack <= band.high);
        }
    }
}
