//! Table types.

use super::kind::ItemKind;
use super::node::{impl_node, Composition};
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which producer built a table. Data-bound tables report a narrower kind
/// so that style conditions can target them separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOrigin {
    #[default]
    Plain,
    Report,
    Query,
}

/// A table: optional label, optional header row, and data rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "TableData")]
pub struct Table {
    /// Caption rendered above the table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row: Option<TableHeaderRow>,

    #[serde(default)]
    rows: Vec<TableRow>,

    #[serde(default)]
    pub origin: TableOrigin,

    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_header_row(mut self, header: TableHeaderRow) -> Self {
        self.header_row = Some(header);
        self
    }

    pub fn with_origin(mut self, origin: TableOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Runtime kind, which depends on the producer.
    pub fn kind(&self) -> ItemKind {
        match self.origin {
            TableOrigin::Plain => ItemKind::Table,
            TableOrigin::Report => ItemKind::ReportTable,
            TableOrigin::Query => ItemKind::QueryTable,
        }
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count: header width, or widest row when there is no header.
    pub fn column_count(&self) -> usize {
        match &self.header_row {
            Some(header) => header.parts().len(),
            None => self.rows.iter().map(|r| r.parts().len()).max().unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name used in error messages: the label, or the given position.
    pub fn display_name(&self, position: usize) -> String {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => format!("#{}", position),
        }
    }

    /// Remove a row, keeping the remaining indices contiguous.
    pub fn remove_row(&mut self, index: usize) -> Option<TableRow> {
        if index >= self.rows.len() {
            return None;
        }
        let row = self.rows.remove(index);
        self.reindex();
        Some(row)
    }

    fn reindex(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.row_index = i;
        }
    }
}

/// Wire form of [`Table`]; row indices are rebuilt on load.
#[derive(Deserialize)]
struct TableData {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    header_row: Option<TableHeaderRow>,
    #[serde(default)]
    rows: Vec<TableRow>,
    #[serde(default)]
    origin: TableOrigin,
}

impl From<TableData> for Table {
    fn from(data: TableData) -> Self {
        let mut table = Table {
            label: data.label,
            header_row: data.header_row,
            rows: data.rows,
            origin: data.origin,
            style: None,
        };
        table.reindex();
        table
    }
}

impl Composition for Table {
    type Part = TableRow;

    fn parts(&self) -> &[TableRow] {
        &self.rows
    }

    fn push(&mut self, mut row: TableRow) {
        row.row_index = self.rows.len();
        self.rows.push(row);
    }

    fn for_each_part_mut(&mut self, f: &mut dyn FnMut(&mut TableRow)) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            f(row);
            row.row_index = i;
        }
    }

    /// Rows get the style, and so do their cells. The header row and its
    /// cells get it too.
    fn spread_style_to_parts(&mut self, style: &Arc<Style>) {
        self.for_each_part_mut(&mut |row: &mut TableRow| {
            row.style = Some(Arc::clone(style));
            row.spread_style_to_parts(style);
        });
        if let Some(header) = self.header_row.as_mut() {
            header.style = Some(Arc::clone(style));
            header.spread_style_to_parts(style);
        }
    }
}

/// Header row: one cell per column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableHeaderRow {
    #[serde(default)]
    pub cells: Vec<TableHeaderCell>,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl TableHeaderRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create() -> Self {
        Self::default()
    }

    /// Header row from display texts; aliases equal the texts.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().add_parts(texts.into_iter().map(|t| TableHeaderCell::new(t)))
    }

    /// Column key for each cell, in order.
    pub fn aliases(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.alias()).collect()
    }
}

impl Composition for TableHeaderRow {
    type Part = TableHeaderCell;

    fn parts(&self) -> &[TableHeaderCell] {
        &self.cells
    }

    fn push(&mut self, cell: TableHeaderCell) {
        self.cells.push(cell);
    }

    fn for_each_part_mut(&mut self, f: &mut dyn FnMut(&mut TableHeaderCell)) {
        self.cells.iter_mut().for_each(f);
    }
}

/// Header cell: display text plus a logical column key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableHeaderCell {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl TableHeaderCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alias: None,
            style: None,
        }
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Column key; falls back to the display text.
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.text)
    }

    pub fn has_alias(&self) -> bool {
        self.alias.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Data row. Its index among sibling rows is assigned when it is added to
/// a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
    #[serde(skip)]
    row_index: usize,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create() -> Self {
        Self::default()
    }

    /// Row of plain text cells.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().add_parts(texts.into_iter().map(|t| TableCell::new(t)))
    }

    /// Zero-based position among the table's rows.
    pub fn row_index(&self) -> usize {
        self.row_index
    }
}

impl Composition for TableRow {
    type Part = TableCell;

    fn parts(&self) -> &[TableCell] {
        &self.cells
    }

    fn push(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }

    fn for_each_part_mut(&mut self, f: &mut dyn FnMut(&mut TableCell)) {
        self.cells.iter_mut().for_each(f);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl From<&str> for TableCell {
    fn from(text: &str) -> Self {
        TableCell::new(text)
    }
}

impl From<String> for TableCell {
    fn from(text: String) -> Self {
        TableCell::new(text)
    }
}

impl From<&str> for TableHeaderCell {
    fn from(text: &str) -> Self {
        TableHeaderCell::new(text)
    }
}

impl_node!(Table, Table, ItemKind::Table);
impl_node!(TableHeaderRow, HeaderRow, ItemKind::TableHeaderRow);
impl_node!(TableHeaderCell, HeaderCell, ItemKind::TableHeaderCell);
impl_node!(TableRow, Row, ItemKind::TableRow);
impl_node!(TableCell, Cell, ItemKind::TableCell);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_index_assigned_on_add() {
        let table = Table::new()
            .add_part(TableRow::from_texts(["a"]))
            .add_part(TableRow::from_texts(["b"]))
            .add_part(TableRow::from_texts(["c"]));

        let indices: Vec<usize> = table.rows().iter().map(|r| r.row_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_remove_row_reindexes() {
        let mut table =
            Table::new().add_parts((0..4).map(|i| TableRow::from_texts([i.to_string()])));
        table.remove_row(1);
        let indices: Vec<usize> = table.rows().iter().map(|r| r.row_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(table.rows()[1].cells[0].text, "2");
    }

    #[test]
    fn test_in_place_edits_keep_indices() {
        let mut table =
            Table::new().add_parts((0..3).map(|i| TableRow::from_texts([i.to_string()])));
        let mut replacement = Some(TableRow::from_texts(["new"]));
        table.for_each_part_mut(&mut |row: &mut TableRow| {
            if let Some(new_row) = replacement.take() {
                *row = new_row;
            }
        });

        let indices: Vec<usize> = table.rows().iter().map(|r| r.row_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(table.rows()[0].cells[0].text, "new");
    }

    #[test]
    fn test_spread_reaches_cells_and_header() {
        let style = Arc::new(Style::text(crate::style::TextStyle::new().with_bold(true)));
        let mut table = Table::new()
            .with_header_row(TableHeaderRow::from_texts(["h"]))
            .add_part(TableRow::from_texts(["a", "b"]));
        table.spread_style_to_parts(&style);

        let row = &table.rows()[0];
        assert!(Arc::ptr_eq(row.style.as_ref().unwrap(), &style));
        assert!(row.cells.iter().all(|c| Arc::ptr_eq(c.style.as_ref().unwrap(), &style)));
        let header = table.header_row.as_ref().unwrap();
        assert!(Arc::ptr_eq(header.style.as_ref().unwrap(), &style));
        assert!(Arc::ptr_eq(header.cells[0].style.as_ref().unwrap(), &style));
    }

    #[test]
    fn test_kind_follows_origin() {
        assert_eq!(Table::new().kind(), ItemKind::Table);
        assert_eq!(
            Table::new().with_origin(TableOrigin::Query).kind(),
            ItemKind::QueryTable
        );
    }

    #[test]
    fn test_header_alias_fallback() {
        let cell = TableHeaderCell::new("Name");
        assert_eq!(cell.alias(), "Name");
        assert!(!cell.has_alias());

        let cell = cell.with_alias("name");
        assert_eq!(cell.alias(), "name");
        assert!(cell.has_alias());
    }

    #[test]
    fn test_column_count() {
        let table = Table::new().add_part(TableRow::from_texts(["a", "b", "c"]));
        assert_eq!(table.column_count(), 3);

        let table = table.with_header_row(TableHeaderRow::from_texts(["x", "y"]));
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_deserialize_rebuilds_indices() {
        let json = r#"{"label":"T","rows":[{"cells":[{"text":"a"}]},{"cells":[{"text":"b"}]}]}"#;
        let table: Table = serde_json::from_str(json).unwrap();
        assert_eq!(table.rows()[1].row_index(), 1);
        assert_eq!(table.origin, TableOrigin::Plain);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Table::new().display_name(2), "#2");
        assert_eq!(Table::new().with_label("Totals").display_name(2), "Totals");
    }
}
