//! Node traits shared by every document item.

use super::document::{Document, DocumentCase};
use super::kind::ItemKind;
use super::table::{Table, TableCell, TableHeaderCell, TableHeaderRow, TableRow};
use super::text::{Footer, Heading, Paragraph, Separator, Title};
use crate::style::Style;
use std::sync::Arc;

/// Anything that can carry a directly attached style.
pub trait Styled {
    fn style(&self) -> Option<&Arc<Style>>;

    fn set_style(&mut self, style: Option<Arc<Style>>);

    /// Attach a style and return self for chaining.
    fn with_style(mut self, style: impl Into<Arc<Style>>) -> Self
    where
        Self: Sized,
    {
        self.set_style(Some(style.into()));
        self
    }
}

/// A concrete node type with a fixed [`ItemKind`].
pub trait Node: Styled {
    /// Declared kind of this node type.
    const KIND: ItemKind;

    /// Borrowed, type-erased view of this node.
    fn as_item(&self) -> ItemRef<'_>;

    /// Downcast a type-erased view back to this node type.
    fn from_item<'a>(item: ItemRef<'a>) -> Option<&'a Self>;
}

/// A node owning an ordered list of children of one type.
pub trait Composition {
    type Part;

    fn parts(&self) -> &[Self::Part];

    /// Append a child, keeping insertion order.
    fn push(&mut self, part: Self::Part);

    /// Edit every child in place. Children cannot be added, removed or
    /// reordered this way.
    fn for_each_part_mut(&mut self, f: &mut dyn FnMut(&mut Self::Part));

    fn add_part(mut self, part: impl Into<Self::Part>) -> Self
    where
        Self: Sized,
    {
        self.push(part.into());
        self
    }

    fn add_parts<I>(mut self, parts: I) -> Self
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: Into<Self::Part>,
    {
        for part in parts {
            self.push(part.into());
        }
        self
    }

    /// Attach the same style reference to every current child.
    fn spread_style_to_parts(&mut self, style: &Arc<Style>)
    where
        Self::Part: Styled,
    {
        self.for_each_part_mut(&mut |part: &mut Self::Part| {
            part.set_style(Some(Arc::clone(style)))
        });
    }
}

/// Borrowed view of any document node, used by style conditions.
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    Document(&'a Document),
    Case(&'a DocumentCase),
    Title(&'a Title),
    Heading(&'a Heading),
    Paragraph(&'a Paragraph),
    Separator(&'a Separator),
    Footer(&'a Footer),
    Table(&'a Table),
    HeaderRow(&'a TableHeaderRow),
    HeaderCell(&'a TableHeaderCell),
    Row(&'a TableRow),
    Cell(&'a TableCell),
}

impl<'a> ItemRef<'a> {
    /// Runtime kind of the referenced node.
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Document(_) => ItemKind::Document,
            ItemRef::Case(_) => ItemKind::DocumentCase,
            ItemRef::Title(_) => ItemKind::Title,
            ItemRef::Heading(_) => ItemKind::Heading,
            ItemRef::Paragraph(_) => ItemKind::Paragraph,
            ItemRef::Separator(_) => ItemKind::Separator,
            ItemRef::Footer(_) => ItemKind::Footer,
            ItemRef::Table(t) => t.kind(),
            ItemRef::HeaderRow(_) => ItemKind::TableHeaderRow,
            ItemRef::HeaderCell(_) => ItemKind::TableHeaderCell,
            ItemRef::Row(_) => ItemKind::TableRow,
            ItemRef::Cell(_) => ItemKind::TableCell,
        }
    }

    /// Directly attached style, if any.
    pub fn style(&self) -> Option<&'a Arc<Style>> {
        match *self {
            ItemRef::Document(n) => n.style(),
            ItemRef::Case(n) => n.style(),
            ItemRef::Title(n) => n.style(),
            ItemRef::Heading(n) => n.style(),
            ItemRef::Paragraph(n) => n.style(),
            ItemRef::Separator(n) => n.style(),
            ItemRef::Footer(n) => n.style(),
            ItemRef::Table(n) => n.style(),
            ItemRef::HeaderRow(n) => n.style(),
            ItemRef::HeaderCell(n) => n.style(),
            ItemRef::Row(n) => n.style(),
            ItemRef::Cell(n) => n.style(),
        }
    }

    /// Text content of text-bearing nodes.
    pub fn text(&self) -> Option<&'a str> {
        match *self {
            ItemRef::Title(n) => Some(&n.text),
            ItemRef::Heading(n) => Some(&n.text),
            ItemRef::Paragraph(n) => Some(&n.text),
            ItemRef::Footer(n) => Some(&n.text),
            ItemRef::HeaderCell(n) => Some(&n.text),
            ItemRef::Cell(n) => Some(&n.text),
            _ => None,
        }
    }
}

/// Implements [`Styled`], [`Node`] and `From<&T> for ItemRef` for a node
/// type holding a `style: Option<Arc<Style>>` field.
macro_rules! impl_node {
    ($ty:ident, $variant:ident, $kind:expr) => {
        impl $crate::model::Styled for $ty {
            fn style(&self) -> Option<&std::sync::Arc<$crate::style::Style>> {
                self.style.as_ref()
            }

            fn set_style(&mut self, style: Option<std::sync::Arc<$crate::style::Style>>) {
                self.style = style;
            }
        }

        impl $crate::model::Node for $ty {
            const KIND: $crate::model::ItemKind = $kind;

            fn as_item(&self) -> $crate::model::ItemRef<'_> {
                $crate::model::ItemRef::$variant(self)
            }

            fn from_item<'a>(item: $crate::model::ItemRef<'a>) -> Option<&'a Self> {
                match item {
                    $crate::model::ItemRef::$variant(node) => Some(node),
                    _ => None,
                }
            }
        }

        impl<'a> From<&'a $ty> for $crate::model::ItemRef<'a> {
            fn from(node: &'a $ty) -> Self {
                $crate::model::ItemRef::$variant(node)
            }
        }
    };
}

pub(crate) use impl_node;
