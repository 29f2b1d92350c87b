//! Error types for reportkit.

use std::io;
use thiserror::Error;

/// Result type alias for reportkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when writing the rendered artifact.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No formatter is registered for the requested extension.
    #[error("Improper report format: {0}")]
    UnsupportedFormat(String),

    /// A formatter is registered but could not be constructed.
    #[error("Can't instantiate formatter for {format}: {reason}")]
    Instantiation { format: String, reason: String },

    /// A formatter was driven out of order (e.g. `handle` called twice).
    #[error("Formatter is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// The format needs column definitions but the table has no header row.
    #[error("There is no header row in table {table}")]
    MissingHeaderRow { table: String },

    /// Heading depth is outside what the target format can express.
    #[error("Heading depth {depth} is out of range (max {max})")]
    InvalidHeadingDepth { depth: u8, max: u8 },

    /// A query-backed table was built without a query.
    #[error("Query is empty")]
    EmptyQuery,

    /// The query source reported a failure.
    #[error("Query error: {0}")]
    Query(String),

    /// No font matches the requested text style.
    #[error("Can't find valid font with attributes {style} for locale {locale}")]
    FontNotFound { style: String, locale: String },

    /// The chosen font cannot display a glyph the locale requires.
    #[error("Can't display glyph {glyph} with font {font} for locale {locale}")]
    GlyphNotDisplayable {
        glyph: char,
        font: String,
        locale: String,
    },

    /// Unknown encoding label, or text not representable in the encoding.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Delimited-text writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// PDF object model failure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// XML writer failure.
    #[error("XML error: {0}")]
    Xml(String),

    /// Zip package writer failure.
    #[error("Archive error: {0}")]
    Archive(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Archive(err.to_string()),
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedFormat("xyz".to_string());
        assert_eq!(err.to_string(), "Improper report format: xyz");

        let err = Error::MissingHeaderRow {
            table: "Totals".to_string(),
        };
        assert_eq!(err.to_string(), "There is no header row in table Totals");

        let err = Error::GlyphNotDisplayable {
            glyph: 'Ж',
            font: "Helvetica".to_string(),
            locale: "ru".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Can't display glyph Ж with font Helvetica for locale ru"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_zip_io_error_unwraps() {
        let zip_err = zip::result::ZipError::Io(io::Error::new(io::ErrorKind::Other, "disk"));
        let err: Error = zip_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
