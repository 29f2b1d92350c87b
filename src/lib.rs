//! # reportkit
//!
//! Format-agnostic report documents rendered to PDF, spreadsheets, word
//! processing documents, CSV and HTML.
//!
//! A [`Document`] is built once from titles, headings, paragraphs,
//! separators, footers and tables. Styles are registered separately with
//! conditions that say which items they apply to, and each formatter walks
//! the tree with a visitor to produce its native output.
//!
//! ## Quick Start
//!
//! ```
//! use reportkit::model::{Composition, Document, Table, TableHeaderRow, TableRow, Title};
//! use reportkit::render::FormatterContext;
//!
//! fn main() -> reportkit::Result<()> {
//!     let doc = Document::new()
//!         .add_part(Title::new("Quarterly totals"))
//!         .add_part(
//!             Table::new()
//!                 .with_header_row(TableHeaderRow::from_texts(["Region", "Total"]))
//!                 .add_part(TableRow::from_texts(["North", "1500"])),
//!         );
//!
//!     let csv = reportkit::render_to_bytes(&doc, "csv", FormatterContext::default(), &[])?;
//!     assert_eq!(
//!         String::from_utf8(csv).unwrap(),
//!         "Quarterly totals\nRegion;Total\nNorth;1,500\n"
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Seven output formats**: pdf, xlsx, xls, docx, doc, csv, html
//! - **Conditional styles**: match by item kind and predicate, e.g. zebra rows
//! - **Data adapters**: tables from in-memory records or query sources
//! - **Output sinks**: files, streams, memory or temporary files
//! - **Parallel batches**: independent renders run on Rayon

pub mod convert;
pub mod data;
pub mod error;
pub mod model;
pub mod render;
pub mod style;

// Re-export commonly used types
pub use convert::FormatterFactory;
pub use data::{ColumnMeta, QuerySource, QueryTable, ReportTable, SerializedRecord, TableRecord};
pub use error::{Error, Result};
pub use model::{
    Document, DocumentCase, Footer, Heading, Paragraph, Separator, Table, TableCell,
    TableHeaderCell, TableHeaderRow, TableRow, Title,
};
pub use render::{DocumentHolder, Formatter, FormatterContext, OutputSink};
pub use style::{Style, StyleCondition, StyleService};

use log::debug;
use rayon::prelude::*;
use std::sync::Arc;

/// Render a document into memory.
///
/// # Arguments
///
/// * `document` - Document to render
/// * `extension` - Output format key, e.g. `"pdf"` or `"xlsx"`
/// * `context` - Encoding, locale and other formatter settings
/// * `styles` - Conditional styles, in priority order
///
/// # Example
///
/// ```
/// use reportkit::{render_to_bytes, Document, FormatterContext};
///
/// let bytes = render_to_bytes(&Document::new(), "html", FormatterContext::default(), &[]).unwrap();
/// assert!(String::from_utf8(bytes).unwrap().contains("<html"));
/// ```
pub fn render_to_bytes(
    document: &Document,
    extension: &str,
    context: FormatterContext,
    styles: &[Arc<Style>],
) -> Result<Vec<u8>> {
    let factory = FormatterFactory::with_defaults();
    render_with(&factory, document, extension, context, styles)
}

/// Render a batch of independent documents in parallel.
///
/// Each job gets its own formatter and style registry. Results keep the
/// order of `jobs`.
///
/// # Example
///
/// ```
/// use reportkit::{render_many, Document, FormatterContext};
///
/// let jobs = vec![(Document::new(), "csv".to_string()), (Document::new(), "pdf".to_string())];
/// let results = render_many(&jobs, &FormatterContext::default(), &[]);
/// assert_eq!(results.len(), 2);
/// assert!(results.iter().all(|r| r.is_ok()));
/// ```
pub fn render_many(
    jobs: &[(Document, String)],
    context: &FormatterContext,
    styles: &[Arc<Style>],
) -> Vec<Result<Vec<u8>>> {
    let factory = FormatterFactory::with_defaults();
    debug!("Rendering {} documents in parallel", jobs.len());
    jobs.par_iter()
        .map(|(document, extension)| {
            render_with(&factory, document, extension, context.clone(), styles)
        })
        .collect()
}

fn render_with(
    factory: &FormatterFactory,
    document: &Document,
    extension: &str,
    context: FormatterContext,
    styles: &[Arc<Style>],
) -> Result<Vec<u8>> {
    let mut formatter = factory.create_formatter(extension, context)?;
    formatter.style_service_mut()?.add_styles(styles.iter().cloned());
    formatter.set_output(OutputSink::Memory)?;
    let holder = formatter.handle(document)?;
    holder
        .into_bytes()
        .ok_or_else(|| Error::Render("Rendered output is not held in memory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Composition, ItemKind};
    use crate::style::{Color, TextStyle};

    fn sample() -> Document {
        Document::new()
            .add_part(Title::new("Report"))
            .add_part(Paragraph::new("Body"))
    }

    #[test]
    fn test_render_to_bytes_csv() {
        let bytes = render_to_bytes(&sample(), "csv", FormatterContext::default(), &[]).unwrap();
        assert_eq!(bytes, b"Report\nBody\n");
    }

    #[test]
    fn test_render_to_bytes_unknown_format() {
        let err = render_to_bytes(&sample(), "rtf", FormatterContext::default(), &[]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_render_to_bytes_applies_styles() {
        let red = TextStyle {
            color: Some(Color::RED),
            ..TextStyle::default()
        };
        let style = Arc::new(
            Style::text(red).with_condition(StyleCondition::of_kind(ItemKind::Title)),
        );
        let bytes =
            render_to_bytes(&sample(), "html", FormatterContext::default(), &[style]).unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains(&Color::RED.to_css()));
    }

    #[test]
    fn test_render_many_keeps_order() {
        let jobs: Vec<(Document, String)> = ["csv", "pdf", "nope", "docx"]
            .iter()
            .map(|ext| (sample(), ext.to_string()))
            .collect();
        let results = render_many(&jobs, &FormatterContext::default(), &[]);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap(), b"Report\nBody\n");
        assert!(results[1].as_ref().unwrap().starts_with(b"%PDF-"));
        assert!(results[2].is_err());
        assert!(results[3].as_ref().unwrap().starts_with(b"PK"));
    }
}
