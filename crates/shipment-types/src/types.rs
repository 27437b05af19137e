use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pounds per kilogram. Every kg/lb conversion in the workspace goes through this.
pub const LB_PER_KG: f64 = 2.20462;

/// Filename -> raw PDF bytes. Ordered so iteration is deterministic.
pub type ShipmentDocumentSet = BTreeMap<String, Vec<u8>>;

/// A weight supplied by a caller that cannot be used for band math
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field} must be a finite number > 0 (got {value})")]
pub struct InvalidWeight {
    pub field: &'static str,
    pub value: f64,
}

/// Check that `value` is a usable weight
pub fn ensure_positive(field: &'static str, value: f64) -> Result<f64, InvalidWeight> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(InvalidWeight { field, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    /// Parse a unit token as it appears on shipping documents ("KGS", "Lbs.", "pounds")
    pub fn from_token(token: &str) -> Option<Self> {
        let t = token.trim().trim_end_matches('.').to_ascii_lowercase();
        match t.as_str() {
            "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => Some(Self::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Some(Self::Lb),
            _ => None,
        }
    }

    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Lb => value / LB_PER_KG,
        }
    }

    pub fn to_lb(self, value: f64) -> f64 {
        match self {
            Self::Kg => value * LB_PER_KG,
            Self::Lb => value,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kg => write!(f, "kg"),
            Self::Lb => write!(f, "lb"),
        }
    }
}

/// GR and Invoice weights entered by hand, both in kg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPair {
    pub gr_weight: f64,
    pub invoice_weight: f64,
}

impl WeightPair {
    pub fn new(gr_weight: f64, invoice_weight: f64) -> Result<Self, InvalidWeight> {
        Ok(Self {
            gr_weight: ensure_positive("gr_weight", gr_weight)?,
            invoice_weight: ensure_positive("invoice_weight", invoice_weight)?,
        })
    }
}

/// Closed interval `[low, high]` a second weight must fall into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    pub low: f64,
    pub high: f64,
}

impl ToleranceBand {
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// What a shipment document turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    GoodsReceipt,
    Invoice,
    Unknown,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoodsReceipt => write!(f, "GR"),
            Self::Invoice => write!(f, "Invoice"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One physical piece/carton declared on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Source document filename
    pub document: String,
    /// 1-based position of the line within its document
    pub sequence: usize,
    /// Piece / carton number as printed
    pub piece: String,
    pub description: Option<String>,
    /// Declared weight in `unit`
    pub weight: f64,
    pub unit: WeightUnit,
    /// Declared value, currency as printed on the document
    pub value: Option<f64>,
}

impl LineItem {
    pub fn weight_kg(&self) -> f64 {
        self.unit.to_kg(self.weight)
    }

    pub fn weight_lb(&self) -> f64 {
        self.unit.to_lb(self.weight)
    }
}
