//! Builds small text PDFs in memory for pipeline tests

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use shipment_types::ShipmentDocumentSet;

/// A single-page PDF with one text line per entry
pub fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(10)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(40), Object::Integer(750 - 14 * idx as i64)],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn document_set(entries: Vec<(&str, Vec<u8>)>) -> ShipmentDocumentSet {
    entries
        .into_iter()
        .map(|(name, bytes)| (name.to_string(), bytes))
        .collect()
}

pub fn goods_receipt_pdf(total: &str) -> Vec<u8> {
    text_pdf(&[
        "GOODS RECEIPT",
        "GR No. 4500012",
        "Vendor: Example Metals Ltd",
        &format!("TOTAL WEIGHT: {total}"),
    ])
}
