//! Integration tests for HTML output.

mod common;

use reportkit::model::{
    Composition, Document, ItemKind, Paragraph, Separator, Styled, Table, TableHeaderCell,
    TableHeaderRow, TableRow,
};
use reportkit::render::{Formatter, FormatterContext, HtmlFormatter};
use reportkit::style::{
    BorderStyle, BorderWeight, Color, FillPattern, LayoutStyle, Style, StyleCondition, TextStyle,
};

fn render(doc: &Document, formatter: &mut HtmlFormatter) -> String {
    String::from_utf8(common::render_bytes(formatter, doc)).unwrap()
}

#[test]
fn test_document_structure() {
    let mut formatter = HtmlFormatter::new(FormatterContext::default()).unwrap();
    let html = render(&common::full_document(), &mut formatter);

    assert!(html.starts_with("<!DOCTYPE html>\n<html>\n<head>\n"));
    assert!(html.contains("<meta charset=\"UTF-8\">"));
    assert!(html.contains("<meta name=\"author\" content=\"Finance\">"));
    assert!(html.contains("<title>Monthly report</title>"));
    assert!(html.contains("<section data-name=\"Summary\">"));
    assert!(html.contains("<h1>Monthly report</h1>"));
    assert!(html.contains("<h2>Numbers</h2>"));
    assert!(html.contains("<hr style=\"border-bottom: 1px solid #000000\">"));
    assert!(html.contains("<thead>\n<tr><th>Column 1</th><th>Column 2</th></tr>\n</thead>"));
    assert!(html.contains("<tr><td>Cell 1.1</td><td>Cell 1.2</td></tr>"));
    assert!(html.contains("<caption>Numbers</caption>"));
    assert!(html.contains("<footer>Confidential</footer>"));
    assert!(html.ends_with("</body>\n</html>\n"));
}

#[test]
fn test_registered_styles_become_classes() {
    let even = Style::text(TextStyle {
        bold: Some(true),
        ..TextStyle::default()
    })
    .with_condition(StyleCondition::when::<TableRow, _>(|r| r.row_index() % 2 == 0));
    let titles = Style::text(TextStyle {
        color: Some(Color::RED),
        ..TextStyle::default()
    })
    .with_condition(StyleCondition::of_kind(ItemKind::Title));

    let mut formatter = HtmlFormatter::new(FormatterContext::default()).unwrap();
    formatter
        .style_service_mut()
        .unwrap()
        .add_style(even)
        .add_style(titles);
    let html = render(&common::full_document(), &mut formatter);

    assert!(html.contains("<style>\n.s0 { "));
    assert!(html.contains("#ff0000"));
    assert!(html.contains("<h1 class=\"s1\">Monthly report</h1>"));
    assert!(html.contains("<tr class=\"s0\"><td>Cell 1.1</td>"));
    assert!(html.contains("<tr><td>Cell 2.1</td>"));
}

#[test]
fn test_text_is_escaped_and_localized() {
    let doc = Document::new()
        .add_part(Paragraph::new("a < b & c"))
        .add_part(common::numbered_table(0).add_part(TableRow::from_texts(["12345", "x"])));
    let mut formatter = HtmlFormatter::new(FormatterContext::default()).unwrap();
    let html = render(&doc, &mut formatter);

    assert!(html.contains("<p>a &lt; b &amp; c</p>"));
    assert!(html.contains("<td>12,345</td>"));
}

#[test]
fn test_unmappable_text_becomes_references() {
    let doc = Document::new().add_part(Paragraph::new("\u{416}"));
    let context = FormatterContext::new().with_encoding("windows-1252");
    let mut formatter = HtmlFormatter::new(context).unwrap();
    let html = render(&doc, &mut formatter);
    assert!(html.contains("<p>&#1046;</p>"));
    assert!(html.contains("<meta charset=\"windows-1252\">"));
}

#[test]
fn test_attached_style_overrides_class() {
    let grey = Style::layout(
        LayoutStyle::new()
            .with_fill_pattern(FillPattern::SolidForeground)
            .with_fill_foreground(Color::GREY_25_PERCENT),
    )
    .with_condition(StyleCondition::of_kind(ItemKind::TableHeaderCell));
    let mut formatter = HtmlFormatter::new(FormatterContext::default()).unwrap();
    formatter.style_service_mut().unwrap().add_style(grey);

    let header = TableHeaderRow::new()
        .add_part(
            TableHeaderCell::new("Total").with_style(Style::text(TextStyle::new().with_bold(true))),
        )
        .add_part(TableHeaderCell::new("Plain"));
    let doc = Document::new().add_part(Table::new().with_header_row(header));
    let html = render(&doc, &mut formatter);

    assert!(html.contains("<th class=\"s0\" style=\"font-weight: bold\">Total</th>"));
    assert!(html.contains("<th class=\"s0\">Plain</th>"));
}

#[test]
fn test_separator_border_follows_weight_and_color() {
    let red_line = Style::layout(
        LayoutStyle::new().with_border_bottom(BorderStyle::new(Color::RED, BorderWeight::Dashed)),
    );
    let doc = Document::new()
        .add_part(Separator::create(BorderWeight::Thick))
        .add_part(Separator::new().with_style(red_line))
        .add_part(Separator::create(BorderWeight::None));
    let mut formatter = HtmlFormatter::new(FormatterContext::default()).unwrap();
    let html = render(&doc, &mut formatter);

    assert!(html.contains("<hr style=\"border-bottom: 3px solid #000000\">"));
    assert!(html.contains("<hr style=\"border-bottom: 1px dashed #ff0000\">"));
    assert!(html.contains("<hr style=\"border-bottom: 0px none #000000\">"));
}

#[test]
fn test_html4_presentational_markup() {
    let titles = Style::text(TextStyle::new().with_color(Color::RED).with_bold(true))
        .with_condition(StyleCondition::of_kind(ItemKind::Title));
    let mut formatter = HtmlFormatter::new(FormatterContext::default())
        .unwrap()
        .with_html4_tags(true);
    assert!(formatter.uses_html4_tags());
    formatter.style_service_mut().unwrap().add_style(titles);
    let html = render(&common::full_document(), &mut formatter);

    assert!(!html.contains("<style>"));
    assert!(!html.contains("class="));
    assert!(html.contains("<h1><font color=\"#ff0000\"><b>Monthly report</b></font></h1>"));
    assert!(html.contains("<table border=\"1\">"));
    assert!(html.contains("<hr size=\"1\" color=\"#000000\" noshade>"));
    assert!(html.contains("<td>Cell 1.1</td>"));
}

#[test]
fn test_html4_table_uses_resolved_style() {
    let table_style = Style::layout(
        LayoutStyle::new()
            .with_fill_pattern(FillPattern::SolidForeground)
            .with_fill_foreground(Color::LIGHT_GREEN),
    )
    .with_condition(StyleCondition::of_kind(ItemKind::Table));
    let mut formatter = HtmlFormatter::new(FormatterContext::default())
        .unwrap()
        .with_html4_tags(true);
    formatter.style_service_mut().unwrap().add_style(table_style);
    let doc = Document::new().add_part(common::scenario_table());
    let html = render(&doc, &mut formatter);

    assert!(html.contains("<table bgcolor=\"#ccffcc\">"));
}
