//! Formatter factory: maps an extension key to a formatter constructor.
//!
//! # Example
//!
//! ```
//! use reportkit::convert::FormatterFactory;
//! use reportkit::model::{Composition, Document, Paragraph};
//! use reportkit::render::{FormatterContext, OutputSink};
//!
//! fn main() -> reportkit::Result<()> {
//!     let factory = FormatterFactory::with_defaults();
//!     let mut formatter = factory.create_formatter("CSV", FormatterContext::default())?;
//!     formatter.set_output(OutputSink::Memory)?;
//!
//!     let doc = Document::new().add_part(Paragraph::new("hello"));
//!     let holder = formatter.handle(&doc)?;
//!     assert_eq!(holder.bytes(), Some(&b"hello\n"[..]));
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::render::{
    CsvFormatter, Formatter, FormatterContext, HtmlFormatter, PdfFormatter, SpreadsheetFormatter,
    WordFormatter,
};
use log::debug;
use std::collections::HashMap;

/// Builds a formatter for one render.
pub type FormatterConstructor = fn(FormatterContext) -> Result<Box<dyn Formatter>>;

/// Registry of formatter constructors keyed by lowercase extension.
#[derive(Clone)]
pub struct FormatterFactory {
    constructors: HashMap<String, FormatterConstructor>,
}

impl FormatterFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Factory with every built-in format registered.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory
            .register("pdf", |ctx| Ok(Box::new(PdfFormatter::new(ctx)?)))
            .register("xlsx", |ctx| Ok(Box::new(SpreadsheetFormatter::xlsx(ctx)?)))
            .register("xls", |ctx| Ok(Box::new(SpreadsheetFormatter::xls(ctx)?)))
            .register("docx", |ctx| Ok(Box::new(WordFormatter::docx(ctx)?)))
            .register("doc", |ctx| Ok(Box::new(WordFormatter::doc(ctx)?)))
            .register("csv", |ctx| Ok(Box::new(CsvFormatter::new(ctx)?)))
            .register("html", |ctx| Ok(Box::new(HtmlFormatter::new(ctx)?)));
        factory
    }

    /// Register (or replace) the constructor for an extension.
    pub fn register(&mut self, extension: &str, constructor: FormatterConstructor) -> &mut Self {
        self.constructors
            .insert(extension.to_lowercase(), constructor);
        self
    }

    /// Check if an extension is supported.
    pub fn supports(&self, extension: &str) -> bool {
        self.constructors.contains_key(&extension.to_lowercase())
    }

    /// All registered extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.constructors.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }

    /// New formatter for the extension, configured with `context`.
    pub fn create_formatter(
        &self,
        extension: &str,
        context: FormatterContext,
    ) -> Result<Box<dyn Formatter>> {
        let key = extension.to_lowercase();
        let constructor = self
            .constructors
            .get(&key)
            .ok_or_else(|| Error::UnsupportedFormat(extension.to_string()))?;
        debug!("Creating {} formatter", key);
        constructor(context).map_err(|e| Error::Instantiation {
            format: key,
            reason: e.to_string(),
        })
    }
}

impl Default for FormatterFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FormatterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterFactory")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}
