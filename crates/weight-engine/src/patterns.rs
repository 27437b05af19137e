//! Regex patterns and keyword lists for shipment documents

use lazy_static::lazy_static;
use regex::Regex;

/// Filename tokens that mark a Goods-Receipt document
pub const GR_FILENAME_TOKENS: &[&str] = &["gr", "gxd", "receipt", "goodsreceipt", "receiving"];

/// Filename tokens that mark an invoice
pub const INVOICE_FILENAME_TOKENS: &[&str] = &["inv", "invoice", "ci", "commercial", "packinglist"];

lazy_static! {
    /// Content markers of a Goods-Receipt document. Checked before invoice
    /// markers since receipts usually quote the invoice number they match.
    pub static ref GR_CONTENT_PATTERN: Regex = Regex::new(
        r"(?i)\b(goods\s+receipt|gr\s*(?:no\.?|number|#)|receiving\s+report|warehouse\s+receipt|delivery\s+receipt|gxd)\b"
    )
    .unwrap();

    pub static ref INVOICE_CONTENT_PATTERN: Regex = Regex::new(
        r"(?i)\b(commercial\s+invoice|proforma\s+invoice|invoice\s*(?:no\.?|number|#)|packing\s+list|invoice)\b"
    )
    .unwrap();

    /// A standalone number as printed: digits with optional thousands/decimal
    /// separators, not glued to letters (`X200`, `2mm` do not match).
    /// Validation of the separators happens in `numeric::parse_quantity`.
    pub static ref NUMBER_TOKEN: Regex =
        Regex::new(r"\b(?:\d[\d,.\x{a0}\x{202f}]*\d|\d)\b").unwrap();

    /// `190.00 KG`, `440,9 lbs`, `1,234.5kgs`
    pub static ref WEIGHT_WITH_UNIT: Regex = Regex::new(
        r"(?i)\b(?P<num>\d[\d,.\x{a0}\x{202f}]*\d|\d)\s*(?P<unit>kgs?|kilograms?|kilos?|lbs?|pounds?)\b\.?"
    )
    .unwrap();

    /// `TOTAL WEIGHT: 190.00 KG`, `Gross weight (LBS) 440.92`, `TOTAL WEIGHT KG 190`
    pub static ref WEIGHT_LINE: Regex = Regex::new(
        r"(?i)\bweight\b(?P<mid>[^\d\n]{0,30}?)(?P<num>\d[\d,.\x{a0}\x{202f}]*\d|\d)\s*(?:(?P<unit>kgs?|kilograms?|kilos?|lbs?|pounds?)\b)?"
    )
    .unwrap();

    /// A bare unit token, used on the text between "weight" and the number
    pub static ref UNIT_TOKEN: Regex =
        Regex::new(r"(?i)\b(kgs?|kilograms?|kilos?|lbs?|pounds?)\b").unwrap();

    /// Column header unit for invoice tables: `WEIGHT (KG)`, `Weight unit: LBS`
    pub static ref HEADER_UNIT: Regex = Regex::new(
        r"(?i)weight\s*\(\s*(?P<a>kgs?|lbs?)\s*\)|\bunit\s*[:=]\s*(?P<b>kgs?|lbs?)\b"
    )
    .unwrap();

    /// One piece/carton row. `rest` holds description, weight and value.
    pub static ref LINE_ITEM: Regex = Regex::new(
        r"(?i)^\s*(?:pieces?|pcs?|pkgs?|packages?|cartons?|ctns?|box(?:es)?|bundles?|pallets?|plts?)\.?\s*(?:no\.?|#)?\s*[:#]?\s*(?P<id>[A-Za-z]*\d[A-Za-z0-9\-/]*)(?:[:\s]+(?P<rest>.*))?$"
    )
    .unwrap();

    /// Declared value: `$1,234.50`, `USD 99.00`, `150,00 EUR`
    pub static ref VALUE: Regex = Regex::new(
        r"(?i)(?:\$|\bus\$|\busd\b|\beur\b|€)\s*(?P<pre>\d[\d,.\x{a0}\x{202f}]*\d|\d)|(?P<post>\d[\d,.\x{a0}\x{202f}]*\d|\d)\s*(?:usd|eur)\b"
    )
    .unwrap();

    /// Lines that state a document-level total: `TOTAL WEIGHT`, `GROSS WEIGHT`
    pub static ref TOTAL_MARKER: Regex =
        Regex::new(r"(?i)\btotal\b|\b(?:gross|net)\s+weight\b").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gr_markers() {
        assert!(GR_CONTENT_PATTERN.is_match("GOODS RECEIPT"));
        assert!(GR_CONTENT_PATTERN.is_match("GR No. 4500012"));
        assert!(GR_CONTENT_PATTERN.is_match("Warehouse receipt for inbound"));
        assert!(!GR_CONTENT_PATTERN.is_match("Grand total"));
    }

    #[test]
    fn test_invoice_markers() {
        assert!(INVOICE_CONTENT_PATTERN.is_match("COMMERCIAL INVOICE"));
        assert!(INVOICE_CONTENT_PATTERN.is_match("Invoice No: 77"));
        assert!(!INVOICE_CONTENT_PATTERN.is_match("invoiced separately"));
    }

    #[test]
    fn test_weight_with_unit() {
        let caps = WEIGHT_WITH_UNIT.captures("Widgets 1,234.50 KGS $10").unwrap();
        assert_eq!(&caps["num"], "1,234.50");
        assert_eq!(&caps["unit"], "KGS");

        let caps = WEIGHT_WITH_UNIT.captures("bolts 440.9lbs").unwrap();
        assert_eq!(&caps["num"], "440.9");
        assert_eq!(&caps["unit"], "lbs");
    }

    #[test]
    fn test_weight_line_unit_positions() {
        let caps = WEIGHT_LINE.captures("TOTAL WEIGHT: 190.00 KG").unwrap();
        assert_eq!(&caps["num"], "190.00");
        assert_eq!(&caps["unit"], "KG");

        let caps = WEIGHT_LINE.captures("Gross Weight (LBS): 418.88").unwrap();
        assert_eq!(&caps["num"], "418.88");
        assert!(caps.name("unit").is_none());
        assert!(UNIT_TOKEN.is_match(&caps["mid"]));
    }

    #[test]
    fn test_line_item_shapes() {
        let caps = LINE_ITEM.captures("PIECE 1  Steel brackets  100.00 KG  $1,200.00").unwrap();
        assert_eq!(&caps["id"], "1");
        assert_eq!(&caps["rest"], "Steel brackets  100.00 KG  $1,200.00");

        let caps = LINE_ITEM.captures("Carton No. A12: 55 lbs").unwrap();
        assert_eq!(&caps["id"], "A12");

        let caps = LINE_ITEM.captures("CTN#3 20 KG").unwrap();
        assert_eq!(&caps["id"], "3");

        assert!(LINE_ITEM.captures("PIECE DESCRIPTION WEIGHT VALUE").is_none());
        assert!(LINE_ITEM.captures("TOTAL WEIGHT 200 KG").is_none());
    }

    #[test]
    fn test_number_token_skips_glued_digits() {
        let found: Vec<&str> = NUMBER_TOKEN
            .find_iter("Pump model X200 2mm plate  50.5  1,200.00")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["50.5", "1,200.00"]);
    }

    #[test]
    fn test_total_marker_forms() {
        assert!(TOTAL_MARKER.is_match("TOTAL WEIGHT: 200 KG"));
        assert!(TOTAL_MARKER.is_match("PACKAGES: 2   GROSS WEIGHT: 200 KG"));
        assert!(TOTAL_MARKER.is_match("Net weight 180 kg"));
        assert!(!TOTAL_MARKER.is_match("PIECE 1  Counterweight  20 KG"));
    }

    #[test]
    fn test_value_forms() {
        let caps = VALUE.captures("100 KG $1,200.00").unwrap();
        assert_eq!(&caps["pre"], "1,200.00");

        let caps = VALUE.captures("20 KG 150,00 EUR").unwrap();
        assert_eq!(&caps["post"], "150,00");
    }

    #[test]
    fn test_header_unit() {
        let caps = HEADER_UNIT.captures("PIECE  DESCRIPTION  WEIGHT (LBS)  VALUE").unwrap();
        assert_eq!(&caps["a"], "LBS");

        let caps = HEADER_UNIT.captures("Weight unit: kg").unwrap();
        assert_eq!(&caps["b"], "kg");
    }
}
