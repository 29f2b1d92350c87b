//! Integration tests for the formatter factory.

mod common;

use reportkit::convert::FormatterFactory;
use reportkit::model::Composition;
use reportkit::render::{CsvFormatter, FormatterContext, FormatterState};
use reportkit::Error;

#[test]
fn test_every_default_format_renders() {
    let factory = FormatterFactory::default();
    let doc = common::full_document();

    for ext in factory.supported_extensions() {
        let mut formatter = factory
            .create_formatter(ext, FormatterContext::default())
            .unwrap();
        assert_eq!(formatter.extension(), ext);
        let bytes = common::render_bytes(formatter.as_mut(), &doc);
        assert!(!bytes.is_empty(), "{} produced no output", ext);
        assert_eq!(formatter.state(), FormatterState::Finalized);
    }
}

#[test]
fn test_media_types() {
    let factory = FormatterFactory::with_defaults();
    let media = |ext: &str| {
        factory
            .create_formatter(ext, FormatterContext::default())
            .unwrap()
            .content_media_type()
    };
    assert_eq!(media("pdf"), "application/pdf");
    assert_eq!(media("csv"), "text/csv");
    assert_eq!(media("html"), "text/html");
    assert_eq!(
        media("docx"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
}

#[test]
fn test_unsupported_format_names_extension() {
    let factory = FormatterFactory::with_defaults();
    let err = factory
        .create_formatter("xyz", FormatterContext::default())
        .err().unwrap();
    assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == "xyz"));
    assert!(err.to_string().contains("xyz"));
}

#[test]
fn test_bad_configuration_is_instantiation_error() {
    let factory = FormatterFactory::with_defaults();
    let context = FormatterContext::default().with_delimiter('\u{2192}');
    let err = factory.create_formatter("csv", context).err().unwrap();
    assert!(matches!(err, Error::Instantiation { ref format, .. } if format == "csv"));
}

#[test]
fn test_custom_registration() {
    let mut factory = FormatterFactory::new();
    assert!(!factory.supports("csv"));
    factory.register("tsv", |ctx| {
        Ok(Box::new(CsvFormatter::new(ctx.with_delimiter('\t'))?))
    });

    let mut formatter = factory
        .create_formatter("TSV", FormatterContext::default())
        .unwrap();
    let bytes = common::render_bytes(
        formatter.as_mut(),
        &reportkit::Document::new().add_part(common::scenario_table()),
    );
    assert!(String::from_utf8(bytes).unwrap().starts_with("Column 1\tColumn 2\n"));
}
