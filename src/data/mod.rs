//! Adapters that turn external records into [`Table`](crate::model::Table)s.
//!
//! [`ReportTable`] reads an in-memory collection, [`QueryTable`] streams
//! rows from a [`QuerySource`]. Both can infer the header row and render a
//! missing field as an empty cell.

mod query;
mod records;

pub use query::{ColumnMeta, QuerySource, QueryTable, DEFAULT_FETCH_SIZE};
pub use records::{ReportTable, SerializedRecord, TableRecord};
