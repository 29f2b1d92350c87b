//! Double dispatch over the document tree.
//!
//! Every node type implements [`Visitable::accept`], which calls exactly
//! the matching [`Visitor`] method and hands the node back. Formatters
//! implement `Visitor` and override only the node types they render;
//! the defaults log and continue.
//!
//! # Example
//!
//! ```
//! use reportkit::model::{Composition, Document, Heading, Paragraph};
//! use reportkit::render::{Visitable, Visitor};
//! use reportkit::Result;
//!
//! #[derive(Default)]
//! struct HeadingCollector(Vec<String>);
//!
//! impl Visitor for HeadingCollector {
//!     fn visit_document(&mut self, document: &Document) -> Result<()> {
//!         self.visit_composition(document)
//!     }
//!
//!     fn visit_heading(&mut self, heading: &Heading) -> Result<()> {
//!         self.0.push(heading.text.clone());
//!         Ok(())
//!     }
//! }
//!
//! let doc = Document::new()
//!     .add_part(Heading::new("Intro", 1))
//!     .add_part(Paragraph::new("skipped"));
//! let mut collector = HeadingCollector::default();
//! doc.accept(&mut collector).unwrap();
//! assert_eq!(collector.0, vec!["Intro"]);
//! ```

use crate::error::Result;
use crate::model::{
    Composition, Document, DocumentCase, Footer, Heading, Item, Paragraph, Separator, Table,
    TableCell, TableHeaderCell, TableHeaderRow, TableRow, Title,
};
use log::debug;

/// One method per concrete node type.
pub trait Visitor {
    fn visit_document(&mut self, document: &Document) -> Result<()> {
        let _ = document;
        debug!("No overriding for visit_document");
        Ok(())
    }

    fn visit_document_case(&mut self, case: &DocumentCase) -> Result<()> {
        debug!("No overriding for visit_document_case: {}", case.name());
        Ok(())
    }

    fn visit_title(&mut self, title: &Title) -> Result<()> {
        let _ = title;
        debug!("No overriding for visit_title");
        Ok(())
    }

    fn visit_heading(&mut self, heading: &Heading) -> Result<()> {
        let _ = heading;
        debug!("No overriding for visit_heading");
        Ok(())
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let _ = paragraph;
        debug!("No overriding for visit_paragraph");
        Ok(())
    }

    fn visit_table(&mut self, table: &Table) -> Result<()> {
        let _ = table;
        debug!("No overriding for visit_table");
        Ok(())
    }

    fn visit_table_header_row(&mut self, row: &TableHeaderRow) -> Result<()> {
        let _ = row;
        debug!("No overriding for visit_table_header_row");
        Ok(())
    }

    fn visit_table_header_cell(&mut self, cell: &TableHeaderCell) -> Result<()> {
        let _ = cell;
        debug!("No overriding for visit_table_header_cell");
        Ok(())
    }

    fn visit_table_row(&mut self, row: &TableRow) -> Result<()> {
        let _ = row;
        debug!("No overriding for visit_table_row");
        Ok(())
    }

    fn visit_table_cell(&mut self, cell: &TableCell) -> Result<()> {
        let _ = cell;
        debug!("No overriding for visit_table_cell");
        Ok(())
    }

    fn visit_separator(&mut self, separator: &Separator) -> Result<()> {
        let _ = separator;
        debug!("No overriding for visit_separator");
        Ok(())
    }

    fn visit_footer(&mut self, footer: &Footer) -> Result<()> {
        let _ = footer;
        debug!("No overriding for visit_footer");
        Ok(())
    }

    /// Dispatch every child of a composition to this visitor, in order.
    /// The first error aborts the walk.
    fn visit_composition<C>(&mut self, composition: &C) -> Result<()>
    where
        C: Composition,
        C::Part: Visitable,
        Self: Sized,
    {
        for part in composition.parts() {
            part.accept(self)?;
        }
        Ok(())
    }
}

/// A node that can be dispatched to a [`Visitor`].
pub trait Visitable {
    /// Call the visitor method for this node type and return the node.
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<&Self>;
}

macro_rules! impl_visitable {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Visitable for $ty {
                fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<&Self> {
                    visitor.$method(self)?;
                    Ok(self)
                }
            }
        )*
    };
}

impl_visitable! {
    Document => visit_document,
    DocumentCase => visit_document_case,
    Title => visit_title,
    Heading => visit_heading,
    Paragraph => visit_paragraph,
    Table => visit_table,
    TableHeaderRow => visit_table_header_row,
    TableHeaderCell => visit_table_header_cell,
    TableRow => visit_table_row,
    TableCell => visit_table_cell,
    Separator => visit_separator,
    Footer => visit_footer,
}

impl Visitable for Item {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<&Self> {
        match self {
            Item::Case(n) => visitor.visit_document_case(n)?,
            Item::Title(n) => visitor.visit_title(n)?,
            Item::Heading(n) => visitor.visit_heading(n)?,
            Item::Paragraph(n) => visitor.visit_paragraph(n)?,
            Item::Table(n) => visitor.visit_table(n)?,
            Item::Separator(n) => visitor.visit_separator(n)?,
            Item::Footer(n) => visitor.visit_footer(n)?,
        }
        Ok(self)
    }
}

/// Visitor that overrides nothing.
#[derive(Debug, Clone, Default)]
pub struct DefaultVisitor;

impl DefaultVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Visitor for DefaultVisitor {}
