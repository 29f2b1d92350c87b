//! Integration tests for spreadsheet output.

mod common;

use reportkit::model::{Composition, Document, DocumentCase, Paragraph};
use reportkit::render::spreadsheet::{sanitize_sheet_name, MAX_SHEET_NAME_LEN};
use reportkit::render::{FormatterContext, SpreadsheetFormatter};

fn xlsx(doc: &Document) -> Vec<u8> {
    let mut formatter = SpreadsheetFormatter::xlsx(FormatterContext::default()).unwrap();
    common::render_bytes(&mut formatter, doc)
}

#[test]
fn test_xlsx_package_structure() {
    let bytes = xlsx(&common::full_document());
    assert!(bytes.starts_with(b"PK"));

    let names = common::zip_names(&bytes);
    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/core.xml",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/styles.xml",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/sheet2.xml",
    ] {
        assert!(names.iter().any(|n| n == part), "missing {}", part);
    }

    let workbook = common::zip_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains("name=\"Summary\""));
    assert!(workbook.contains("name=\"Detail\""));

    let summary = common::zip_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(summary.contains("Monthly report"));
    assert!(summary.contains("Cell 2.2"));

    let detail = common::zip_part(&bytes, "xl/worksheets/sheet2.xml");
    assert!(detail.contains(">16<"));

    let core = common::zip_part(&bytes, "docProps/core.xml");
    assert!(core.contains("Monthly report"));
    assert!(core.contains("Finance"));
}

#[test]
fn test_empty_document_has_one_sheet() {
    let bytes = xlsx(&Document::new());
    let workbook = common::zip_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains("name=\"Sheet\""));
    assert!(!common::zip_names(&bytes).iter().any(|n| n == "xl/worksheets/sheet2.xml"));
}

#[test]
fn test_sheet_names_sanitized_and_unique() {
    let long = "A very long sheet name that keeps on going";
    let doc = Document::new()
        .add_part(DocumentCase::new("Q1/Q2: [draft]").add_part(Paragraph::new("a")))
        .add_part(DocumentCase::new(long).add_part(Paragraph::new("b")))
        .add_part(DocumentCase::new("Data").add_part(Paragraph::new("c")))
        .add_part(DocumentCase::new("data").add_part(Paragraph::new("d")));
    let workbook = common::zip_part(&xlsx(&doc), "xl/workbook.xml");

    assert!(workbook.contains("name=\"Q1 Q2   draft \""));
    let truncated: String = long.chars().take(MAX_SHEET_NAME_LEN).collect();
    assert!(workbook.contains(&format!("name=\"{}\"", truncated)));
    assert!(workbook.contains("name=\"Data\""));
    assert!(workbook.contains("name=\"data (2)\""));
}

#[test]
fn test_sanitize_sheet_name() {
    assert_eq!(sanitize_sheet_name("a*b?c"), "a b c");
    assert_eq!(sanitize_sheet_name("  "), "Sheet");
    assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME_LEN);
}

#[test]
fn test_xls_is_spreadsheet_ml() {
    let mut formatter = SpreadsheetFormatter::xls(FormatterContext::default()).unwrap();
    let bytes = common::render_bytes(&mut formatter, &common::full_document());
    let xml = String::from_utf8(bytes).unwrap();

    assert!(xml.contains("<?mso-application progid=\"Excel.Sheet\"?>"));
    assert!(xml.contains("<Worksheet ss:Name=\"Summary\">"));
    assert!(xml.contains("<Worksheet ss:Name=\"Detail\">"));
    assert!(xml.contains("Cell 1.2"));
}
