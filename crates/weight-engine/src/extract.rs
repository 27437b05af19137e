//! Field extraction from document text
//!
//! Turns the text of a classified document into typed fields. A required
//! field that is missing or unparseable is an `Extraction` error naming the
//! document and the field; nothing is silently defaulted except where noted.

use regex::Captures;
use serde::Serialize;
use shipment_types::{LineItem, WeightUnit};

use crate::classify::SourceText;
use crate::error::{ReconcileError, Result};
use crate::numeric::parse_quantity;
use crate::patterns::{
    HEADER_UNIT, LINE_ITEM, NUMBER_TOKEN, TOTAL_MARKER, UNIT_TOKEN, VALUE, WEIGHT_LINE,
    WEIGHT_WITH_UNIT,
};

/// The measured total from the Goods-Receipt document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoodsReceipt {
    pub document: String,
    pub total_weight: f64,
    pub unit: WeightUnit,
}

impl GoodsReceipt {
    pub fn total_kg(&self) -> f64 {
        self.unit.to_kg(self.total_weight)
    }
}

/// Everything read from one invoice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocument {
    pub document: String,
    /// Document-level total as printed, if the invoice states one
    pub declared_total: Option<(f64, WeightUnit)>,
    pub line_items: Vec<LineItem>,
}

impl InvoiceDocument {
    pub fn line_items_kg(&self) -> f64 {
        self.line_items.iter().map(LineItem::weight_kg).sum()
    }

    pub fn declared_total_kg(&self) -> Option<f64> {
        self.declared_total.map(|(w, unit)| unit.to_kg(w))
    }

    /// Total used for the tolerance check: the declared total, or the line sum
    pub fn total_kg(&self) -> f64 {
        self.declared_total_kg().unwrap_or_else(|| self.line_items_kg())
    }
}

/// Read the total weight off the Goods-Receipt text
///
/// Lines mentioning "total" are preferred over any other weight line. A
/// total printed without a unit is read in `default_unit`.
pub fn parse_goods_receipt(
    source: SourceText<'_>,
    default_unit: WeightUnit,
) -> Result<GoodsReceipt> {
    let mut fallback = None;

    for line in source.text.lines() {
        let Some(caps) = WEIGHT_LINE.captures(line) else {
            continue;
        };
        if TOTAL_MARKER.is_match(line) {
            return weight_from_line_caps(source.name, "total weight", &caps, default_unit)
                .map(|(total_weight, unit)| GoodsReceipt {
                    document: source.name.to_string(),
                    total_weight,
                    unit,
                });
        }
        if fallback.is_none() {
            fallback = Some(weight_from_line_caps(
                source.name,
                "total weight",
                &caps,
                default_unit,
            ));
        }
    }

    let (total_weight, unit) = fallback.ok_or_else(|| {
        ReconcileError::extraction(source.name, "total weight", "no weight line found")
    })??;

    Ok(GoodsReceipt {
        document: source.name.to_string(),
        total_weight,
        unit,
    })
}

/// Unit and horizontal position of the weight column, from the table header
#[derive(Debug, Clone, Copy, PartialEq)]
struct WeightColumn {
    unit: WeightUnit,
    /// Byte offset of the `WEIGHT (..)` label within its header line
    offset: Option<usize>,
}

fn weight_column(text: &str) -> Option<WeightColumn> {
    text.lines().find_map(|line| {
        let caps = HEADER_UNIT.captures(line)?;
        match (caps.name("a"), caps.name("b")) {
            (Some(a), _) => Some(WeightColumn {
                unit: WeightUnit::from_token(a.as_str())?,
                offset: caps.get(0).map(|m| m.start()),
            }),
            (None, Some(b)) => Some(WeightColumn {
                unit: WeightUnit::from_token(b.as_str())?,
                offset: None,
            }),
            (None, None) => None,
        }
    })
}

/// Read line items and the optional declared total off an invoice
///
/// A piece-keyword line that carries a total or gross/net weight label
/// (`PACKAGES: 2   GROSS WEIGHT: 200 KG`) is a summary, not a line item.
pub fn parse_invoice(source: SourceText<'_>) -> Result<InvoiceDocument> {
    let column = weight_column(source.text);

    let mut line_items = Vec::new();
    let mut declared_total = None;

    for line in source.text.lines() {
        let summary = TOTAL_MARKER.is_match(line);

        if let Some(caps) = LINE_ITEM.captures(line).filter(|_| !summary) {
            let piece = caps["id"].to_string();
            let (rest, rest_offset) = caps
                .name("rest")
                .map(|m| (m.as_str(), m.start()))
                .unwrap_or(("", line.len()));
            let rest_column = column.map(|c| WeightColumn {
                unit: c.unit,
                offset: c.offset.map(|o| o.saturating_sub(rest_offset)),
            });
            match parse_line_rest(source.name, &piece, rest, rest_column)? {
                Some(parsed) => line_items.push(LineItem {
                    document: source.name.to_string(),
                    sequence: line_items.len() + 1,
                    piece,
                    description: parsed.description,
                    weight: parsed.weight,
                    unit: parsed.unit,
                    value: parsed.value,
                }),
                None => tracing::debug!(
                    document = source.name,
                    line,
                    "piece line without a weight, not a line item"
                ),
            }
            continue;
        }

        if declared_total.is_none() && summary {
            if let Some(caps) = WEIGHT_LINE.captures(line) {
                let fallback_unit = column.map(|c| c.unit).unwrap_or_default();
                declared_total = Some(weight_from_line_caps(
                    source.name,
                    "total weight",
                    &caps,
                    fallback_unit,
                )?);
            }
        }
    }

    if line_items.is_empty() {
        return Err(ReconcileError::extraction(
            source.name,
            "line items",
            "no piece/carton lines with a weight found",
        ));
    }

    Ok(InvoiceDocument {
        document: source.name.to_string(),
        declared_total,
        line_items,
    })
}

struct ParsedRest {
    description: Option<String>,
    weight: f64,
    unit: WeightUnit,
    value: Option<f64>,
}

/// Split what follows the piece number into description, weight and value.
/// `Ok(None)` when there is no weight on the line at all.
///
/// A weight with a unit wins. Otherwise, under a `WEIGHT (..)` header, the
/// standalone number closest to the header's column is the weight, or the
/// last one when the column position is unknown.
fn parse_line_rest(
    document: &str,
    piece: &str,
    rest: &str,
    column: Option<WeightColumn>,
) -> Result<Option<ParsedRest>> {
    let value_match = VALUE.captures(rest).and_then(|caps| {
        caps.name("pre")
            .or_else(|| caps.name("post"))
            .map(|num| (caps.get(0).map(|m| m.range()).unwrap_or(num.range()), num))
    });
    let value_span = value_match.as_ref().map(|(span, _)| span.clone());

    let (num, unit, weight_start) = if let Some(caps) = WEIGHT_WITH_UNIT
        .captures_iter(rest)
        .find(|caps| !overlaps(&value_span, caps.get(0).map(|m| m.start()).unwrap_or(0)))
    {
        let unit_text = &caps["unit"];
        let unit = WeightUnit::from_token(unit_text).ok_or_else(|| {
            ReconcileError::extraction(
                document,
                format!("piece {piece} weight unit"),
                format!("unknown unit '{unit_text}'"),
            )
        })?;
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        (caps["num"].to_string(), unit, start)
    } else if let Some(column) = column {
        let candidates = NUMBER_TOKEN
            .find_iter(rest)
            .filter(|m| !overlaps(&value_span, m.start()));
        let chosen = match column.offset {
            Some(offset) => candidates.min_by_key(|m| m.start().abs_diff(offset)),
            None => candidates.last(),
        };
        match chosen {
            Some(m) => (m.as_str().to_string(), column.unit, m.start()),
            None => return Ok(None),
        }
    } else {
        return Ok(None);
    };

    let weight = parse_quantity(&num).ok_or_else(|| {
        ReconcileError::extraction(
            document,
            format!("piece {piece} weight"),
            format!("unparseable number '{num}'"),
        )
    })?;
    if weight <= 0.0 {
        return Err(ReconcileError::extraction(
            document,
            format!("piece {piece} weight"),
            format!("weight must be > 0 (got {num})"),
        ));
    }

    let value = match value_match {
        Some((_, num)) => Some(parse_quantity(num.as_str()).ok_or_else(|| {
            ReconcileError::extraction(
                document,
                format!("piece {piece} value"),
                format!("unparseable number '{}'", num.as_str()),
            )
        })?),
        None => None,
    };

    let description_end = match &value_span {
        Some(span) if span.start < weight_start => span.start,
        _ => weight_start,
    };
    let description = rest[..description_end]
        .trim()
        .trim_end_matches(['-', ':', '|'])
        .trim();
    let description = (!description.is_empty()).then(|| description.to_string());

    Ok(Some(ParsedRest {
        description,
        weight,
        unit,
        value,
    }))
}

fn overlaps(span: &Option<std::ops::Range<usize>>, pos: usize) -> bool {
    span.as_ref().is_some_and(|s| s.contains(&pos))
}

/// Weight and unit from a `WEIGHT_LINE` match. The unit may trail the number
/// or sit between "weight" and the number (`WEIGHT (KG): 190`).
fn weight_from_line_caps(
    document: &str,
    field: &str,
    caps: &Captures<'_>,
    default_unit: WeightUnit,
) -> Result<(f64, WeightUnit)> {
    let num = &caps["num"];
    let weight = parse_quantity(num).ok_or_else(|| {
        ReconcileError::extraction(document, field, format!("unparseable number '{num}'"))
    })?;
    if weight <= 0.0 {
        return Err(ReconcileError::extraction(
            document,
            field,
            format!("weight must be > 0 (got {num})"),
        ));
    }

    let unit = caps
        .name("unit")
        .and_then(|m| WeightUnit::from_token(m.as_str()))
        .or_else(|| {
            UNIT_TOKEN
                .find(&caps["mid"])
                .and_then(|m| WeightUnit::from_token(m.as_str()))
        })
        .unwrap_or(default_unit);

    Ok((weight, unit))
}
