//! Integration tests for conditional style resolution.

use reportkit::model::{
    Composition, ItemKind, Node, Paragraph, Styled, Table, TableCell, TableHeaderCell,
    TableHeaderRow, TableOrigin, TableRow, Title,
};
use reportkit::style::{
    Color, FillPattern, LayoutStyle, NumberFormat, Style, StyleCondition, StyleService, TextStyle,
};
use std::sync::Arc;

fn colored(color: Color) -> Style {
    Style::text(TextStyle {
        color: Some(color),
        ..TextStyle::default()
    })
}

fn of_kind(kind: ItemKind) -> StyleCondition {
    StyleCondition::of_kind(kind)
}

fn zebra_table(rows: usize) -> Table {
    Table::new().add_parts((0..rows).map(|i| TableRow::from_texts([format!("row {}", i)])))
}

#[test]
fn test_zebra_partition_with_fallback() {
    let even = Arc::new(
        colored(Color::GREEN)
            .with_condition(StyleCondition::when::<TableRow, _>(|r| r.row_index() % 2 == 0)),
    );
    let fallback = Arc::new(colored(Color::BLUE));

    let mut service = StyleService::default();
    service.add_style(Arc::clone(&even)).add_style(Arc::clone(&fallback));

    let table = zebra_table(5);
    let picked: Vec<bool> = table
        .rows()
        .iter()
        .map(|row| Arc::ptr_eq(&service.resolve(row.as_item()).unwrap(), &even))
        .collect();
    assert_eq!(picked, vec![true, false, true, false, true]);

    for row in table.rows().iter().skip(1).step_by(2) {
        let style = service.resolve(row.as_item()).unwrap();
        assert!(Arc::ptr_eq(&style, &fallback));
    }
}

#[test]
fn test_even_and_negation_partition_rows() {
    let even = StyleCondition::when::<TableRow, _>(|r| r.row_index() % 2 == 0);
    let odd = even.negate();
    let table = zebra_table(8);

    let even_count = table.rows().iter().filter(|r| even.matches(r.as_item())).count();
    let odd_count = table.rows().iter().filter(|r| odd.matches(r.as_item())).count();
    assert_eq!(even_count, 4);
    assert_eq!(odd_count, 4);
    for row in table.rows() {
        assert!(even.matches(row.as_item()) ^ odd.matches(row.as_item()));
    }
}

#[test]
fn test_first_match_wins() {
    let first = Arc::new(colored(Color::RED).with_condition(of_kind(ItemKind::Title)));
    let second = Arc::new(colored(Color::BLUE).with_condition(of_kind(ItemKind::Title)));
    let mut service = StyleService::default();
    service.add_styles([Arc::clone(&first), Arc::clone(&second)]);

    let resolved = service.resolve(Title::new("t").as_item()).unwrap();
    assert!(Arc::ptr_eq(&resolved, &first));
}

#[test]
fn test_resolution_is_repeatable() {
    let style = Arc::new(colored(Color::RED).with_condition(StyleCondition::when::<Paragraph, _>(
        |p| p.text.contains('!'),
    )));
    let mut service = StyleService::default();
    service.add_style(Arc::clone(&style));

    let paragraph = Paragraph::new("hey!");
    let first = service.resolve(paragraph.as_item());
    for _ in 0..10 {
        let again = service.resolve(paragraph.as_item());
        assert!(Arc::ptr_eq(first.as_ref().unwrap(), again.as_ref().unwrap()));
    }
    assert_eq!(service.styles().len(), 1);
}

#[test]
fn test_no_style_without_match_or_attachment() {
    let mut service = StyleService::default();
    service.add_style(colored(Color::RED).with_condition(of_kind(ItemKind::Footer)));
    assert!(service.resolve(Paragraph::new("plain").as_item()).is_none());
}

#[test]
fn test_attached_style_is_fallback() {
    let attached = Arc::new(colored(Color::TEAL));
    let paragraph = Paragraph::new("p").with_style(Arc::clone(&attached));

    let service = StyleService::default();
    assert!(service.extract_style_for(paragraph.as_item()).is_none());
    assert!(Arc::ptr_eq(&service.resolve(paragraph.as_item()).unwrap(), &attached));
}

// A condition declared for a narrower kind still matches an item of the
// broader kind, while the reverse does not.
#[test]
fn test_assignability_direction_is_pinned() {
    let plain = Table::new();
    let report = Table::new().with_origin(TableOrigin::Report);

    let for_report = Arc::new(colored(Color::RED).with_condition(of_kind(ItemKind::ReportTable)));
    let for_table = Arc::new(colored(Color::BLUE).with_condition(of_kind(ItemKind::Table)));

    let mut service = StyleService::default();
    service.add_style(Arc::clone(&for_report));
    assert!(service.resolve(plain.as_item()).is_some());
    assert!(service.resolve(report.as_item()).is_some());

    let mut service = StyleService::default();
    service.add_style(Arc::clone(&for_table));
    assert!(service.resolve(plain.as_item()).is_some());
    assert!(service.resolve(report.as_item()).is_none());

    assert!(ItemKind::Table.is_assignable_from(ItemKind::ReportTable));
    assert!(!ItemKind::ReportTable.is_assignable_from(ItemKind::Table));
}

#[test]
fn test_remove_styles_by_identity() {
    let a = Arc::new(colored(Color::RED));
    let twin = Arc::new(colored(Color::RED));
    let mut service = StyleService::default();
    service.add_styles([Arc::clone(&a), Arc::clone(&twin)]);

    service.remove_styles(&[Arc::clone(&a)]);
    assert!(!service.contains(&a));
    assert!(service.contains(&twin));
}

#[test]
fn test_registered_and_attached_styles_merge() {
    let grey_fill = Arc::new(
        Style::layout(
            LayoutStyle::new()
                .with_fill_pattern(FillPattern::SolidForeground)
                .with_fill_foreground(Color::GREY_25_PERCENT),
        )
        .with_condition(of_kind(ItemKind::TableHeaderCell)),
    );
    let mut service = StyleService::default();
    service.add_style(Arc::clone(&grey_fill));

    let cell =
        TableHeaderCell::new("Total").with_style(Style::text(TextStyle::new().with_bold(true)));
    let resolved = service.resolve(cell.as_item()).unwrap();
    let (text, layout) = resolved.split();
    assert!(text.is_bold());
    assert_eq!(layout.fill_color(), Some(Color::GREY_25_PERCENT));

    // The attached style wins where both set the same attribute.
    let red_fill = Style::layout(
        LayoutStyle::new()
            .with_fill_pattern(FillPattern::SolidForeground)
            .with_fill_foreground(Color::RED),
    );
    let cell = TableHeaderCell::new("Total").with_style(red_fill);
    let resolved = service.resolve(cell.as_item()).unwrap();
    assert_eq!(resolved.split().1.fill_color(), Some(Color::RED));
}

#[test]
fn test_cell_style_joins_row_style() {
    let row_style = Arc::new(Style::layout(
        LayoutStyle::new()
            .with_fill_pattern(FillPattern::SolidForeground)
            .with_fill_foreground(Color::YELLOW),
    ));
    let cell_style = Arc::new(colored(Color::RED).with_condition(of_kind(ItemKind::TableCell)));
    let mut service = StyleService::default();
    service.add_style(Arc::clone(&cell_style));

    let cell = TableCell::new("x");
    let joined = service.resolve_within(Some(&row_style), cell.as_item()).unwrap();
    let (text, layout) = joined.split();
    assert_eq!(text.text_color(), Color::RED);
    assert_eq!(layout.fill_color(), Some(Color::YELLOW));
}

#[test]
fn test_spread_style_to_parts() {
    let style = Arc::new(colored(Color::GREEN));
    let mut row = TableRow::from_texts(["a", "b", "c"]);
    row.spread_style_to_parts(&style);
    assert!(row.parts().iter().all(|cell| Arc::ptr_eq(cell.style().unwrap(), &style)));

    let mut table = zebra_table(2).with_header_row(TableHeaderRow::from_texts(["h"]));
    table.spread_style_to_parts(&style);
    for row in table.rows() {
        assert!(Arc::ptr_eq(row.style().unwrap(), &style));
        assert!(row.parts().iter().all(|cell| Arc::ptr_eq(cell.style().unwrap(), &style)));
    }
    let header = table.header_row.as_ref().unwrap();
    assert!(header.parts().iter().all(|cell| Arc::ptr_eq(cell.style().unwrap(), &style)));
}

#[test]
fn test_row_indices_follow_position_after_edits() {
    let mut table = zebra_table(3);
    table.for_each_part_mut(&mut |row: &mut TableRow| *row = TableRow::from_texts(["x"]));
    table.remove_row(0);
    let indices: Vec<usize> = table.rows().iter().map(|r| r.row_index()).collect();
    assert_eq!(indices, vec![0, 1]);

    let even = StyleCondition::when::<TableRow, _>(|r| r.row_index() % 2 == 0);
    assert!(even.matches(table.rows()[0].as_item()));
    assert!(!even.matches(table.rows()[1].as_item()));
}

#[test]
fn test_number_localization() {
    let format = NumberFormat::default();
    assert_eq!(format.localize("123"), "123");
    assert_eq!(format.localize("1234"), "1,234");
    assert_eq!(format.localize("12ab"), "12ab");

    let german = NumberFormat::for_locale("de");
    assert_eq!(german.localize("1234.5"), "1.234,5");
}
