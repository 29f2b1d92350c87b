//! Shared fixtures for integration tests.

#![allow(dead_code)]

use reportkit::model::{
    Composition, Document, DocumentCase, Footer, Heading, Paragraph, Separator, Table,
    TableHeaderRow, TableRow, Title,
};
use reportkit::render::{DocumentHolder, Formatter, OutputSink};
use std::io::{Cursor, Read};

/// Two-column table from the delimited-text scenario.
pub fn scenario_table() -> Table {
    Table::new()
        .with_header_row(TableHeaderRow::from_texts(["Column 1", "Column 2"]))
        .add_part(TableRow::from_texts(["Cell 1.1", "Cell 1.2"]))
        .add_part(TableRow::from_texts(["Cell 2.1", "Cell 2.2"]))
}

/// A table with `rows` numbered rows.
pub fn numbered_table(rows: usize) -> Table {
    Table::new()
        .with_label("Numbers")
        .with_header_row(TableHeaderRow::from_texts(["Index", "Square"]))
        .add_parts((0..rows).map(|i| TableRow::from_texts([i.to_string(), (i * i).to_string()])))
}

/// A document touching every item type, split into two cases.
pub fn full_document() -> Document {
    Document::new()
        .with_label("Monthly report")
        .with_author("Finance")
        .add_part(
            DocumentCase::new("Summary")
                .add_part(Title::new("Monthly report"))
                .add_part(Heading::new("Overview", 1))
                .add_part(Paragraph::new("Revenue grew in every region."))
                .add_part(Separator::new())
                .add_part(scenario_table())
                .add_part(Footer::new("Confidential")),
        )
        .add_part(
            DocumentCase::new("Detail")
                .add_part(Heading::new("Numbers", 2))
                .add_part(numbered_table(5)),
        )
}

/// Render into memory and return the bytes.
pub fn render_bytes(formatter: &mut dyn Formatter, document: &Document) -> Vec<u8> {
    formatter.set_output(OutputSink::Memory).unwrap();
    let holder: DocumentHolder = formatter.handle(document).unwrap();
    holder.into_bytes().unwrap()
}

/// Read one part of a zip package as text.
pub fn zip_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut text = String::new();
    part.read_to_string(&mut text).unwrap();
    text
}

/// Names of every part in a zip package.
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}
