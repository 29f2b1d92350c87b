//! Integration tests for delimited-text output.

mod common;

use reportkit::model::{Composition, Document, Paragraph, Table, TableHeaderRow, TableRow};
use reportkit::render::{CsvFormatter, FormatterContext};

fn render(doc: &Document, context: FormatterContext) -> Vec<u8> {
    let mut formatter = CsvFormatter::new(context).unwrap();
    common::render_bytes(&mut formatter, doc)
}

#[test]
fn test_two_column_scenario() {
    let doc = Document::new().add_part(common::scenario_table());
    let out = render(&doc, FormatterContext::default());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Column 1;Column 2\nCell 1.1;Cell 1.2\nCell 2.1;Cell 2.2\n"
    );
}

#[test]
fn test_read_back_with_csv_reader() {
    let texts = [
        ["plain", "with;delimiter"],
        ["with \"quote\"", "line\nbreak"],
        ["trailing space ", "caf\u{e9}"],
    ];
    let table = Table::new()
        .with_header_row(TableHeaderRow::from_texts(["A", "B"]))
        .add_parts(texts.iter().map(|row| TableRow::from_texts(row.iter().copied())));
    let doc = Document::new().add_part(table);

    let context = FormatterContext::new().with_delimiter('|');
    let out = render(&doc, context);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .from_reader(out.as_slice());
    let records: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();

    assert_eq!(records.len(), texts.len());
    for (record, expected) in records.iter().zip(texts.iter()) {
        assert_eq!(record, expected);
    }
}

#[test]
fn test_legacy_encoding_read_back() {
    let doc = Document::new().add_part(
        Table::new()
            .with_header_row(TableHeaderRow::from_texts(["Stadt"]))
            .add_part(TableRow::from_texts(["K\u{f6}ln"])),
    );
    let context = FormatterContext::new().with_encoding("windows-1252");
    let out = render(&doc, context);

    assert_eq!(out, b"Stadt\nK\xf6ln\n");
    let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&out);
    assert!(!had_errors);
    assert_eq!(decoded, "Stadt\nK\u{f6}ln\n");
}

#[test]
fn test_utf16_output() {
    let doc = Document::new().add_part(Paragraph::new("ab"));
    let out = render(&doc, FormatterContext::new().with_encoding("UTF-16LE"));
    assert_eq!(out, vec![97, 0, 98, 0, 10, 0]);

    let doc = Document::new().add_part(
        Table::new()
            .with_header_row(TableHeaderRow::from_texts(["Город"]))
            .add_part(TableRow::from_texts(["Москва"])),
    );
    let out = render(&doc, FormatterContext::new().with_encoding("UTF-16BE"));
    let (decoded, had_errors) = encoding_rs::UTF_16BE.decode_without_bom_handling(&out);
    assert!(!had_errors);
    assert_eq!(decoded, "Город\nМосква\n");
}

#[test]
fn test_numbers_localized_in_rows_only() {
    let doc = Document::new().add_part(
        Table::new()
            .with_header_row(TableHeaderRow::from_texts(["1000"]))
            .add_part(TableRow::from_texts(["1000"])),
    );
    let out = render(&doc, FormatterContext::default());
    assert_eq!(String::from_utf8(out).unwrap(), "1000\n1,000\n");
}

#[test]
fn test_label_and_paragraphs() {
    let doc = Document::new()
        .add_part(Paragraph::new("Intro"))
        .add_part(common::scenario_table().with_label("Scenario"));
    let out = String::from_utf8(render(&doc, FormatterContext::new().with_delimiter(','))).unwrap();
    assert!(out.starts_with("Intro\nScenario\nColumn 1,Column 2\n"));
}
