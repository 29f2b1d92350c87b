//! Spreadsheet formatters (`xlsx` and legacy `xls`).
//!
//! Content goes into an in-memory [`Workbook`]: every text item takes its
//! own row, tables take a label row, a header row and one row per data
//! row. Sheets are opened lazily, named after the enclosing document case.

mod workbook;
mod xls;
mod xlsx;

pub use workbook::{
    column_name, sanitize_sheet_name, Cell, CellFormat, Sheet, Workbook, DEFAULT_SHEET_NAME,
    MAX_SHEET_NAME_LEN,
};

use super::formatter::{Formatter, FormatterBase};
use super::visitor::{Visitable, Visitor};
use super::xml::CoreProperties;
use super::FormatterContext;
use crate::error::{Error, Result};
use crate::model::{
    Composition, Document, DocumentCase, Footer, Heading, ItemRef, Node, Paragraph, Separator,
    Table, TableHeaderRow, TableRow, Title, DEFAULT_CASE_NAME,
};
use crate::style::{BorderStyle, LayoutStyle, Style};
use log::debug;
use std::sync::Arc;

/// Widest column in character units.
const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Pixels per character unit, for explicit widths.
const PIXELS_PER_CHAR: f64 = 7.0;

/// Package flavor written at finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFlavor {
    /// Office Open XML package
    Xlsx,
    /// SpreadsheetML 2003 flat XML
    Xls,
}

impl SpreadsheetFlavor {
    pub fn extension(self) -> &'static str {
        match self {
            SpreadsheetFlavor::Xlsx => "xlsx",
            SpreadsheetFlavor::Xls => "xls",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            SpreadsheetFlavor::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            SpreadsheetFlavor::Xls => "application/vnd.ms-excel",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum WidthRule {
    Auto,
    Fixed(u32),
}

/// Column sizing collected while a table is written.
#[derive(Debug, Default)]
struct TableColumns {
    rules: Vec<Option<WidthRule>>,
    max_chars: Vec<usize>,
}

impl TableColumns {
    fn observe(&mut self, column: usize, text: &str) {
        if self.max_chars.len() <= column {
            self.max_chars.resize(column + 1, 0);
        }
        let chars = text.chars().count();
        if chars > self.max_chars[column] {
            self.max_chars[column] = chars;
        }
    }

    fn widths(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rules.iter().enumerate().filter_map(|(i, rule)| {
            let width = match (*rule)? {
                WidthRule::Auto => self.max_chars.get(i).copied().unwrap_or(0) as f64 + 2.0,
                WidthRule::Fixed(px) => px as f64 / PIXELS_PER_CHAR,
            };
            Some((i, width.min(MAX_COLUMN_WIDTH)))
        })
    }
}

pub struct SpreadsheetFormatter {
    base: FormatterBase,
    flavor: SpreadsheetFlavor,
    book: Option<Workbook>,
    properties: CoreProperties,
    sheet: Option<usize>,
    pending_name: Option<String>,
    columns: Option<TableColumns>,
}

impl SpreadsheetFormatter {
    pub fn new(context: FormatterContext, flavor: SpreadsheetFlavor) -> Result<Self> {
        Ok(Self {
            base: FormatterBase::new(context)?,
            flavor,
            book: None,
            properties: CoreProperties::default(),
            sheet: None,
            pending_name: None,
            columns: None,
        })
    }

    pub fn xlsx(context: FormatterContext) -> Result<Self> {
        Self::new(context, SpreadsheetFlavor::Xlsx)
    }

    pub fn xls(context: FormatterContext) -> Result<Self> {
        Self::new(context, SpreadsheetFlavor::Xls)
    }

    pub fn flavor(&self) -> SpreadsheetFlavor {
        self.flavor
    }

    fn book(&mut self) -> Result<&mut Workbook> {
        self.book
            .as_mut()
            .ok_or_else(|| Error::Render("Workbook is not initialized".to_string()))
    }

    fn format_for(&mut self, style: Option<&Style>) -> Result<Option<usize>> {
        match style {
            Some(style) => Ok(Some(self.book()?.format_index(style))),
            None => Ok(None),
        }
    }

    /// Current sheet, opening one on first use.
    fn current_sheet(&mut self) -> Result<&mut Sheet> {
        let index = match self.sheet {
            Some(index) => index,
            None => {
                let name = self
                    .pending_name
                    .take()
                    .unwrap_or_else(|| DEFAULT_CASE_NAME.to_string());
                let index = self.book()?.add_sheet(&name);
                debug!("Opened sheet #{} for {:?}", index, name);
                self.sheet = Some(index);
                index
            }
        };
        self.book()?
            .sheet_mut(index)
            .ok_or_else(|| Error::Render(format!("Sheet #{} is missing", index)))
    }

    fn push_text_row(&mut self, item: ItemRef<'_>, column: usize, text: &str) -> Result<()> {
        let style = self.base.resolve(item);
        let format = self.format_for(style.as_deref())?;
        let text = self.base.localize(text).into_owned();
        self.current_sheet()?
            .push_row(vec![Cell::new(column, text, format)]);
        Ok(())
    }
}

impl Visitor for SpreadsheetFormatter {
    fn visit_document(&mut self, document: &Document) -> Result<()> {
        self.properties = CoreProperties::of(document);
        self.visit_composition(document)
    }

    fn visit_document_case(&mut self, case: &DocumentCase) -> Result<()> {
        self.sheet = None;
        self.pending_name = Some(case.name().to_string());
        self.visit_composition(case)?;
        self.sheet = None;
        self.pending_name = None;
        Ok(())
    }

    fn visit_title(&mut self, title: &Title) -> Result<()> {
        self.push_text_row(title.as_item(), 0, &title.text)
    }

    fn visit_heading(&mut self, heading: &Heading) -> Result<()> {
        self.push_text_row(heading.as_item(), heading.depth as usize, &heading.text)
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        self.push_text_row(paragraph.as_item(), 0, &paragraph.text)
    }

    fn visit_footer(&mut self, footer: &Footer) -> Result<()> {
        self.push_text_row(footer.as_item(), 0, &footer.text)
    }

    fn visit_separator(&mut self, separator: &Separator) -> Result<()> {
        let resolved = self.base.resolve(separator.as_item());
        let weight = separator.effective_weight(resolved.as_deref());
        let style = if weight.is_visible() {
            let color = resolved
                .as_deref()
                .and_then(|s| s.layout_facet())
                .and_then(|l| l.borders.bottom.color)
                .unwrap_or(crate::style::Color::BLACK);
            let line = Style::layout(
                LayoutStyle::new().with_border_bottom(BorderStyle::new(color, weight)),
            );
            Some(match resolved.as_deref() {
                Some(r) => Style::join(r, &line),
                None => line,
            })
        } else {
            resolved.as_deref().cloned()
        };
        let format = self.format_for(style.as_ref())?;
        self.current_sheet()?
            .push_row(vec![Cell::new(0, String::new(), format)]);
        Ok(())
    }

    fn visit_table(&mut self, table: &Table) -> Result<()> {
        if let Some(label) = table.label.as_deref() {
            self.push_text_row(table.as_item(), 0, label)?;
        }

        self.columns = Some(TableColumns::default());
        if let Some(header) = &table.header_row {
            header.accept(self)?;
        }
        self.visit_composition(table)?;

        let columns = self.columns.take().unwrap_or_default();
        if self.sheet.is_some() {
            let sheet = self.current_sheet()?;
            for (column, width) in columns.widths() {
                sheet.set_column_width(column, width);
            }
        }
        Ok(())
    }

    fn visit_table_header_row(&mut self, row: &TableHeaderRow) -> Result<()> {
        let row_style = self.base.resolve(row.as_item());
        let mut cells = Vec::with_capacity(row.parts().len());
        let mut rules = Vec::with_capacity(row.parts().len());

        for (column, cell) in row.parts().iter().enumerate() {
            let style = self.base.resolve_within(row_style.as_ref(), cell.as_item());
            let rule = style.as_deref().and_then(|s| s.layout_facet()).and_then(|l| {
                if l.is_auto_width() {
                    Some(WidthRule::Auto)
                } else {
                    l.width.map(WidthRule::Fixed)
                }
            });
            rules.push(rule);
            let format = self.format_for(style.as_deref())?;
            cells.push(Cell::new(column, cell.text.clone(), format));
        }

        if let Some(columns) = self.columns.as_mut() {
            columns.rules = rules;
            for cell in &cells {
                columns.observe(cell.column, &cell.text);
            }
        }
        self.current_sheet()?.push_row(cells);
        Ok(())
    }

    fn visit_table_row(&mut self, row: &TableRow) -> Result<()> {
        let row_style: Option<Arc<Style>> = self.base.resolve(row.as_item());
        let mut cells = Vec::with_capacity(row.parts().len());

        for (column, cell) in row.parts().iter().enumerate() {
            let style = self.base.resolve_within(row_style.as_ref(), cell.as_item());
            let format = self.format_for(style.as_deref())?;
            let text = self.base.localize(&cell.text).into_owned();
            cells.push(Cell::new(column, text, format));
        }

        if let Some(columns) = self.columns.as_mut() {
            for cell in &cells {
                columns.observe(cell.column, &cell.text);
            }
        }
        self.current_sheet()?.push_row(cells);
        Ok(())
    }
}

impl Formatter for SpreadsheetFormatter {
    fn extension(&self) -> &'static str {
        self.flavor.extension()
    }

    fn content_media_type(&self) -> &'static str {
        self.flavor.media_type()
    }

    fn base(&self) -> &FormatterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormatterBase {
        &mut self.base
    }

    fn initialize_resource(&mut self) -> Result<()> {
        self.book = Some(Workbook::new());
        self.sheet = None;
        self.pending_name = None;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let mut book = self
            .book
            .take()
            .ok_or_else(|| Error::Render("Workbook is not initialized".to_string()))?;
        // A workbook needs at least one sheet.
        if book.sheets().is_empty() {
            book.add_sheet(DEFAULT_SHEET_NAME);
        }

        let bytes = match self.flavor {
            SpreadsheetFlavor::Xlsx => xlsx::write_xlsx(&book, &self.properties)?,
            SpreadsheetFlavor::Xls => {
                let encoding = self.base.encoding();
                let text = xls::write_spreadsheet_ml(&book, &self.properties, encoding.name())?;
                self.base.encode_with_references(&text).into_owned()
            }
        };
        self.base.write_output(&bytes)
    }

    fn cleanup_resource(&mut self) -> Result<()> {
        self.book = None;
        self.columns = None;
        Ok(())
    }
}
