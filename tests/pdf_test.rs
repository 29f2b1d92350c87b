//! Integration tests for PDF output.

mod common;

use reportkit::model::{Composition, Document, Heading, Paragraph, Table, TableRow, Title};
use reportkit::render::{Formatter, FormatterContext, FormatterState, OutputSink, PdfFormatter};
use reportkit::Error;

#[test]
fn test_full_document_renders() {
    let mut formatter = PdfFormatter::new(FormatterContext::default()).unwrap();
    let bytes = common::render_bytes(&mut formatter, &common::full_document());

    assert!(bytes.starts_with(b"%PDF-1.7"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Monthly report"));
    assert!(text.contains("Finance"));
    assert!(text.contains("Helvetica") || text.contains("Times-Roman"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn test_table_without_header_is_rejected() {
    let mut formatter = PdfFormatter::new(FormatterContext::default()).unwrap();
    formatter.set_output(OutputSink::Memory).unwrap();
    let doc = Document::new()
        .add_part(Title::new("Report"))
        .add_part(Table::new().with_label("Totals").add_part(TableRow::from_texts(["1", "2"])));

    let err = formatter.handle(&doc).unwrap_err();
    assert!(matches!(err, Error::MissingHeaderRow { ref table } if table == "Totals"));
    assert_eq!(err.to_string(), "There is no header row in table Totals");
    assert_eq!(formatter.state(), FormatterState::Finalized);
    assert_eq!(formatter.page_count(), 0);
}

#[test]
fn test_unlabeled_table_named_by_position() {
    let mut formatter = PdfFormatter::new(FormatterContext::default()).unwrap();
    formatter.set_output(OutputSink::Memory).unwrap();
    let doc = Document::new()
        .add_part(common::scenario_table())
        .add_part(Table::new().add_part(TableRow::from_texts(["x"])));

    let err = formatter.handle(&doc).unwrap_err();
    assert!(matches!(err, Error::MissingHeaderRow { ref table } if table == "#2"));
}

#[test]
fn test_locale_outside_standard_fonts_fails() {
    let context = FormatterContext::new().with_locale("ru");
    let mut formatter = PdfFormatter::new(context).unwrap();
    formatter.set_output(OutputSink::Memory).unwrap();

    let err = formatter
        .handle(&Document::new().add_part(Paragraph::new("text")))
        .unwrap_err();
    assert!(matches!(err, Error::GlyphNotDisplayable { .. }));
}

#[test]
fn test_empty_document_has_a_page() {
    let mut formatter = PdfFormatter::new(FormatterContext::default()).unwrap();
    let bytes = common::render_bytes(&mut formatter, &Document::new());
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(String::from_utf8_lossy(&bytes).contains("MediaBox"));
}

#[test]
fn test_heading_depth_limit() {
    let mut formatter = PdfFormatter::new(FormatterContext::default()).unwrap();
    formatter.set_output(OutputSink::Memory).unwrap();
    let doc = Document::new().add_part(Heading::new("too deep", 200));
    let err = formatter.handle(&doc).unwrap_err();
    assert!(matches!(err, Error::InvalidHeadingDepth { depth: 200, max: 9 }));

    let mut formatter = PdfFormatter::new(FormatterContext::default()).unwrap();
    let bytes = common::render_bytes(
        &mut formatter,
        &Document::new().add_part(Heading::new("deepest", 9)),
    );
    assert!(bytes.starts_with(b"%PDF-"));
}
