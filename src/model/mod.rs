//! Document model types.
//!
//! The model is a format-agnostic tree: a [`Document`] owns [`Item`]s,
//! which may be [`DocumentCase`]s (sheets/pages) holding further items.
//! Tables own rows which own cells. Every node can carry a directly
//! attached [`Style`](crate::style::Style).

mod document;
mod kind;
mod node;
mod table;
mod text;

pub use document::{Document, DocumentCase, Item, DEFAULT_CASE_NAME};
pub use kind::ItemKind;
pub use node::{Composition, ItemRef, Node, Styled};
pub use table::{Table, TableCell, TableHeaderCell, TableHeaderRow, TableOrigin, TableRow};
pub use text::{Footer, Heading, Paragraph, Separator, Title};
