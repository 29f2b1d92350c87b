//! Delimited-text formatter.
//!
//! Every text item becomes a one-field record, a table becomes its label,
//! header and data records, and a separator becomes an empty line.
//! Document cases are flattened.

use super::context::{CSV_LINE_TERMINATOR, CSV_QUOTE};
use super::formatter::{Formatter, FormatterBase};
use super::visitor::{Visitable, Visitor};
use super::FormatterContext;
use crate::error::{Error, Result};
use crate::model::{
    Composition, Document, DocumentCase, Footer, Heading, Paragraph, Separator, Table,
    TableHeaderRow, TableRow, Title,
};
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub struct CsvFormatter {
    base: FormatterBase,
    delimiter: u8,
    writer: Option<csv::Writer<Vec<u8>>>,
}

impl CsvFormatter {
    pub const EXTENSION: &'static str = "csv";
    pub const MEDIA_TYPE: &'static str = "text/csv";

    pub fn new(context: FormatterContext) -> Result<Self> {
        let delimiter = single_byte(context.delimiter, "delimiter")?;
        Ok(Self {
            base: FormatterBase::new(context)?,
            delimiter,
            writer: None,
        })
    }

    fn writer(&mut self) -> Result<&mut csv::Writer<Vec<u8>>> {
        self.writer
            .as_mut()
            .ok_or_else(|| Error::Render("CSV writer is not initialized".to_string()))
    }

    fn build_writer(&self, buffer: Vec<u8>) -> csv::Writer<Vec<u8>> {
        WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(CSV_QUOTE as u8)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .flexible(true)
            .from_writer(buffer)
    }

    /// Flush the record writer and take its buffer.
    fn take_buffer(&mut self) -> Result<Vec<u8>> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| Error::Render("CSV writer is not initialized".to_string()))?;
        writer
            .into_inner()
            .map_err(|e| Error::Render(format!("CSV flush failed: {}", e.error())))
    }

    fn write_single(&mut self, text: &str) -> Result<()> {
        let text = self.base.localize(text).into_owned();
        self.writer()?.write_record([text])?;
        Ok(())
    }
}

fn single_byte(c: char, what: &str) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(Error::Other(format!("CSV {} must be an ASCII character: {:?}", what, c)))
    }
}

impl Visitor for CsvFormatter {
    fn visit_document(&mut self, document: &Document) -> Result<()> {
        self.visit_composition(document)
    }

    fn visit_document_case(&mut self, case: &DocumentCase) -> Result<()> {
        self.visit_composition(case)
    }

    fn visit_title(&mut self, title: &Title) -> Result<()> {
        self.write_single(&title.text)
    }

    fn visit_heading(&mut self, heading: &Heading) -> Result<()> {
        self.write_single(&heading.text)
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        self.write_single(&paragraph.text)
    }

    fn visit_footer(&mut self, footer: &Footer) -> Result<()> {
        self.write_single(&footer.text)
    }

    fn visit_separator(&mut self, _separator: &Separator) -> Result<()> {
        let mut bytes = self.take_buffer()?;
        bytes.extend_from_slice(CSV_LINE_TERMINATOR.as_bytes());
        self.writer = Some(self.build_writer(bytes));
        Ok(())
    }

    fn visit_table(&mut self, table: &Table) -> Result<()> {
        if let Some(label) = table.label.as_deref() {
            self.write_single(label)?;
        }
        if let Some(header) = &table.header_row {
            header.accept(self)?;
        }
        self.visit_composition(table)
    }

    fn visit_table_header_row(&mut self, row: &TableHeaderRow) -> Result<()> {
        let record: Vec<&str> = row.parts().iter().map(|c| c.text.as_str()).collect();
        self.writer()?.write_record(&record)?;
        Ok(())
    }

    fn visit_table_row(&mut self, row: &TableRow) -> Result<()> {
        let record: Vec<String> = row
            .parts()
            .iter()
            .map(|c| self.base.localize(&c.text).into_owned())
            .collect();
        self.writer()?.write_record(&record)?;
        Ok(())
    }
}

impl Formatter for CsvFormatter {
    fn extension(&self) -> &'static str {
        Self::EXTENSION
    }

    fn content_media_type(&self) -> &'static str {
        Self::MEDIA_TYPE
    }

    fn base(&self) -> &FormatterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormatterBase {
        &mut self.base
    }

    fn initialize_resource(&mut self) -> Result<()> {
        self.writer = Some(self.build_writer(Vec::new()));
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let bytes = self.take_buffer()?;
        let text = String::from_utf8(bytes)?;
        let encoded = self.base.encode_strict(&text)?;
        self.base.write_output(&encoded)
    }

    fn cleanup_resource(&mut self) -> Result<()> {
        self.writer = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::OutputSink;

    fn render(doc: &Document, context: FormatterContext) -> Result<String> {
        let mut formatter = CsvFormatter::new(context)?;
        formatter.set_output(OutputSink::Memory)?;
        let holder = formatter.handle(doc)?;
        Ok(String::from_utf8(holder.into_bytes().unwrap_or_default()).unwrap())
    }

    #[test]
    fn test_text_items_and_separator() {
        let doc = Document::new()
            .add_part(Title::new("Report"))
            .add_part(Separator::new())
            .add_part(Paragraph::new("a;b"));
        let out = render(&doc, FormatterContext::default()).unwrap();
        assert_eq!(out, "Report\n\n\"a;b\"\n");
    }

    #[test]
    fn test_cases_flattened() {
        let doc = Document::new()
            .add_part(DocumentCase::new("One").add_part(Paragraph::new("x")))
            .add_part(DocumentCase::new("Two").add_part(Paragraph::new("y")));
        assert_eq!(render(&doc, FormatterContext::default()).unwrap(), "x\ny\n");
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let context = FormatterContext::new().with_delimiter('\u{a7}');
        assert!(CsvFormatter::new(context).is_err());
    }

    #[test]
    fn test_unmappable_character_fails() {
        let doc = Document::new().add_part(Paragraph::new("\u{416}"));
        let context = FormatterContext::new().with_encoding("windows-1252");
        assert!(matches!(render(&doc, context), Err(Error::Encoding(_))));
    }
}
