//! Record access and the in-memory table adapter.

use crate::model::{Composition, Table, TableCell, TableHeaderCell, TableHeaderRow, TableOrigin, TableRow};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Uniform read access to one record's named fields.
pub trait TableRecord {
    /// Field names in declaration order.
    fn field_names(&self) -> Vec<String>;

    /// Display text of a field, `None` when it is missing.
    fn field_value(&self, name: &str) -> Option<String>;
}

impl TableRecord for BTreeMap<String, String> {
    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl TableRecord for Vec<(String, String)> {
    fn field_names(&self) -> Vec<String> {
        self.iter().map(|(name, _)| name.clone()).collect()
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone())
    }
}

impl TableRecord for Value {
    fn field_names(&self) -> Vec<String> {
        match self {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.as_object()?.get(name).and_then(value_text)
    }
}

/// Text of a JSON scalar. Null and nested values count as missing.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Any serializable value read as a record through its JSON form.
///
/// Struct fields keep their declaration order.
#[derive(Debug, Clone)]
pub struct SerializedRecord(Value);

impl SerializedRecord {
    pub fn new<T: Serialize>(value: &T) -> Self {
        // A value that fails to serialize reads as a record without fields.
        Self(serde_json::to_value(value).unwrap_or(Value::Null))
    }
}

impl TableRecord for SerializedRecord {
    fn field_names(&self) -> Vec<String> {
        self.0.field_names()
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.0.field_value(name)
    }
}

/// Header row from field names; text and alias both equal the name.
pub(crate) fn header_from_names(names: Vec<String>) -> TableHeaderRow {
    TableHeaderRow::new().add_parts(
        names
            .into_iter()
            .map(|name| TableHeaderCell::new(name.clone()).with_alias(name)),
    )
}

/// One cell per header column; a missing field becomes an empty cell.
pub(crate) fn row_for<R: TableRecord + ?Sized>(header: &TableHeaderRow, record: &R) -> TableRow {
    TableRow::new().add_parts(header.parts().iter().map(|cell| {
        TableCell::new(record.field_value(cell.alias()).unwrap_or_default())
    }))
}

/// Table built from an in-memory collection of records.
///
/// # Example
///
/// ```
/// use reportkit::data::ReportTable;
/// use std::collections::BTreeMap;
///
/// let mut record = BTreeMap::new();
/// record.insert("name".to_string(), "Ada".to_string());
///
/// let table = ReportTable::new(vec![Some(record)]).infer_header().build();
/// assert_eq!(table.rows()[0].cells[0].text, "Ada");
/// ```
#[derive(Debug, Clone)]
pub struct ReportTable<R> {
    records: Vec<Option<R>>,
    header: Option<TableHeaderRow>,
    infer_header: bool,
    label: Option<String>,
}

impl<R: TableRecord> ReportTable<R> {
    /// Absent records are skipped when the table is built.
    pub fn new(records: impl IntoIterator<Item = Option<R>>) -> Self {
        Self {
            records: records.into_iter().collect(),
            header: None,
            infer_header: false,
            label: None,
        }
    }

    /// Explicit header. Its aliases select the record fields.
    pub fn with_header(mut self, header: TableHeaderRow) -> Self {
        self.header = Some(header);
        self.infer_header = false;
        self
    }

    /// Derive the header from the first present record.
    pub fn infer_header(mut self) -> Self {
        self.infer_header = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn build(self) -> Table {
        let header = match self.header {
            Some(header) => Some(header),
            None if self.infer_header => self
                .records
                .iter()
                .flatten()
                .next()
                .map(|record| header_from_names(record.field_names())),
            None => None,
        };

        let mut table = Table::new().with_origin(TableOrigin::Report);
        table.label = self.label;

        if let Some(header) = &header {
            for record in self.records.iter().flatten() {
                table.push(row_for(header, record));
            }
        } else {
            // Without a header every field of a record is a column.
            for record in self.records.iter().flatten() {
                let cells = record
                    .field_names()
                    .iter()
                    .map(|name| TableCell::new(record.field_value(name).unwrap_or_default()))
                    .collect::<Vec<_>>();
                table.push(TableRow::new().add_parts(cells));
            }
        }
        table.header_row = header;
        debug!("Built report table with {} rows", table.row_count());
        table
    }
}
