//! Query-backed table adapter.

use super::records::{row_for, TableRecord};
use crate::error::{Error, Result};
use crate::model::{Composition, Table, TableCell, TableHeaderCell, TableHeaderRow, TableOrigin, TableRow};
use log::{debug, info};

/// Default number of rows requested per fetch.
pub const DEFAULT_FETCH_SIZE: usize = 50;

/// Column metadata reported by a query source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Key used to look up the field in each record
    pub name: String,

    /// Display text for the header cell
    pub label: String,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// A source of query results.
pub trait QuerySource {
    /// Column metadata of the query, executed with at most `max_rows` rows.
    fn columns(&self, query: &str, max_rows: usize) -> Result<Vec<ColumnMeta>>;

    /// Stream every result record to `sink`, `fetch_size` rows at a time.
    fn fetch(
        &self,
        query: &str,
        fetch_size: usize,
        sink: &mut dyn FnMut(&dyn TableRecord) -> Result<()>,
    ) -> Result<()>;
}

/// Table built by running a query against a [`QuerySource`].
#[derive(Debug, Clone)]
pub struct QueryTable {
    query: String,
    header: Option<TableHeaderRow>,
    infer_header: bool,
    fetch_size: usize,
    label: Option<String>,
}

impl QueryTable {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            header: None,
            infer_header: false,
            fetch_size: DEFAULT_FETCH_SIZE,
            label: None,
        }
    }

    pub fn with_header(mut self, header: TableHeaderRow) -> Self {
        self.header = Some(header);
        self.infer_header = false;
        self
    }

    /// Derive the header from column metadata before fetching rows.
    pub fn infer_header(mut self) -> Self {
        self.infer_header = true;
        self
    }

    pub fn with_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size.max(1);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn build<S: QuerySource + ?Sized>(&self, source: &S) -> Result<Table> {
        if self.query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let header = match &self.header {
            Some(header) => Some(header.clone()),
            None if self.infer_header => {
                debug!("Reading column metadata for query");
                let columns = source.columns(&self.query, 1)?;
                Some(TableHeaderRow::new().add_parts(
                    columns
                        .into_iter()
                        .map(|c| TableHeaderCell::new(c.label).with_alias(c.name)),
                ))
            }
            None => None,
        };

        let mut rows = Vec::new();
        source.fetch(&self.query, self.fetch_size, &mut |record: &dyn TableRecord| {
            rows.push(match &header {
                Some(header) => lookup_row(header, record),
                None => all_fields(record),
            });
            Ok(())
        })?;
        info!("Query table fetched {} rows", rows.len());

        let mut table = Table::new().with_origin(TableOrigin::Query);
        table.label = self.label.clone();
        table.header_row = header;
        for row in rows {
            table.push(row);
        }
        Ok(table)
    }
}

/// Fields by alias; a header cell without an alias reads the field at
/// its column position.
fn lookup_row(header: &TableHeaderRow, record: &dyn TableRecord) -> TableRow {
    if header.parts().iter().all(|c| !c.alias().is_empty()) {
        return row_for(header, record);
    }
    let names = record.field_names();
    TableRow::new().add_parts(header.parts().iter().enumerate().map(|(i, cell)| {
        let value = if cell.alias().is_empty() {
            names.get(i).and_then(|name| record.field_value(name))
        } else {
            record.field_value(cell.alias())
        };
        TableCell::new(value.unwrap_or_default())
    }))
}

fn all_fields(record: &dyn TableRecord) -> TableRow {
    TableRow::new().add_parts(
        record
            .field_names()
            .iter()
            .map(|name| TableCell::new(record.field_value(name).unwrap_or_default())),
    )
}
