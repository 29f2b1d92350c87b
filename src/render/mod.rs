//! Rendering: the visitor core, the formatter lifecycle, and one formatter
//! per output format.

mod context;
mod csv;
mod formatter;
mod html;
mod output;
pub mod pdf;
pub mod spreadsheet;
pub mod visitor;
pub mod word;
pub(crate) mod xml;

pub use self::csv::CsvFormatter;
pub use context::{FormatterContext, CSV_LINE_TERMINATOR, CSV_QUOTE};
pub use formatter::{Formatter, FormatterBase, FormatterState};
pub use html::{css_declarations, HtmlFormatter};
pub use output::{DocumentHolder, OutputSink};
pub use pdf::PdfFormatter;
pub use spreadsheet::{SpreadsheetFlavor, SpreadsheetFormatter};
pub use visitor::{DefaultVisitor, Visitable, Visitor};
pub use word::{WordFlavor, WordFormatter};
