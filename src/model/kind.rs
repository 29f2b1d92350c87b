//! Runtime type tags for document nodes.
//!
//! Style conditions are declared against an [`ItemKind`]. The kinds form a
//! single-inheritance tree rooted at [`ItemKind::DocumentItem`] so that a
//! condition can be checked for assignability without reflection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a document node, abstract or concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    // Abstract kinds
    DocumentItem,
    TextItem,
    CompositionPart,

    // Concrete kinds
    Document,
    DocumentCase,
    Title,
    Heading,
    Paragraph,
    Separator,
    Footer,
    Table,
    ReportTable,
    QueryTable,
    TableHeaderRow,
    TableHeaderCell,
    TableRow,
    TableCell,
}

impl ItemKind {
    /// Direct supertype, `None` for the root.
    pub const fn parent(self) -> Option<ItemKind> {
        use ItemKind::*;
        match self {
            DocumentItem => None,
            TextItem | CompositionPart | Separator => Some(DocumentItem),
            Document | DocumentCase | Table | TableHeaderRow | TableRow => Some(CompositionPart),
            ReportTable | QueryTable => Some(Table),
            Title | Heading | Paragraph | Footer | TableHeaderCell | TableCell => Some(TextItem),
        }
    }

    pub const fn is_abstract(self) -> bool {
        matches!(
            self,
            ItemKind::DocumentItem | ItemKind::TextItem | ItemKind::CompositionPart
        )
    }

    /// True when a value of kind `other` can be used where `self` is
    /// expected, i.e. `other` is `self` or one of its descendants.
    pub fn is_assignable_from(self, other: ItemKind) -> bool {
        let mut current = Some(other);
        while let Some(kind) = current {
            if kind == self {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    pub const fn name(self) -> &'static str {
        use ItemKind::*;
        match self {
            DocumentItem => "DocumentItem",
            TextItem => "TextItem",
            CompositionPart => "CompositionPart",
            Document => "Document",
            DocumentCase => "DocumentCase",
            Title => "Title",
            Heading => "Heading",
            Paragraph => "Paragraph",
            Separator => "Separator",
            Footer => "Footer",
            Table => "Table",
            ReportTable => "ReportTable",
            QueryTable => "QueryTable",
            TableHeaderRow => "TableHeaderRow",
            TableHeaderCell => "TableHeaderCell",
            TableRow => "TableRow",
            TableCell => "TableCell",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
