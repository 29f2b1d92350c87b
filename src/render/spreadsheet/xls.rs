//! SpreadsheetML 2003 writer for the legacy spreadsheet extension.
//!
//! The flat XML is opened by legacy spreadsheet applications as `.xls`.
//! Text is encoded with the configured charset; characters the charset
//! can't hold become numeric character references.

use super::workbook::{CellFormat, Workbook};
use crate::error::Result;
use crate::render::xml::{office_font_name, CoreProperties, XmlWriter};
use crate::style::{BorderWeight, FillPattern, HorAlignment, VertAlignment};

const SS_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Points per character unit of column width.
const POINTS_PER_CHAR: f64 = 5.25;

/// Serialize a workbook as SpreadsheetML text. The caller encodes it.
pub fn write_spreadsheet_ml(
    book: &Workbook,
    properties: &CoreProperties,
    encoding: &str,
) -> Result<String> {
    let mut xml = XmlWriter::new();
    xml.declaration(encoding)?;
    xml.raw("\n<?mso-application progid=\"Excel.Sheet\"?>\n");
    xml.start(
        "Workbook",
        &[
            ("xmlns", SS_NS),
            ("xmlns:o", "urn:schemas-microsoft-com:office:office"),
            ("xmlns:x", "urn:schemas-microsoft-com:office:excel"),
            ("xmlns:ss", SS_NS),
        ],
    )?;

    xml.start(
        "DocumentProperties",
        &[("xmlns", "urn:schemas-microsoft-com:office:office")],
    )?;
    if let Some(title) = &properties.title {
        xml.leaf("Title", &[], title)?;
    }
    if let Some(author) = &properties.author {
        xml.leaf("Author", &[], author)?;
    }
    if let Some(description) = &properties.description {
        xml.leaf("Description", &[], description)?;
    }
    if let Some(created) = properties.created_w3c() {
        xml.leaf("Created", &[], &created)?;
    }
    xml.end("DocumentProperties")?;

    xml.start("Styles", &[])?;
    xml.empty("Style", &[("ss:ID", "Default"), ("ss:Name", "Normal")])?;
    for (i, format) in book.formats().iter().enumerate() {
        write_style(&mut xml, &style_id(i), format)?;
    }
    xml.end("Styles")?;

    for sheet in book.sheets() {
        xml.start("Worksheet", &[("ss:Name", sheet.name())])?;
        xml.start("Table", &[])?;
        for (&column, &width) in sheet.column_widths() {
            let index = (column + 1).to_string();
            let points = format!("{:.2}", width * POINTS_PER_CHAR);
            xml.empty(
                "Column",
                &[("ss:Index", index.as_str()), ("ss:Width", points.as_str())],
            )?;
        }
        for (r, cells) in sheet.rows().iter().enumerate() {
            let row_index = (r + 1).to_string();
            xml.start("Row", &[("ss:Index", row_index.as_str())])?;
            for cell in cells {
                let index = (cell.column + 1).to_string();
                let style = cell.format.map(style_id);
                let mut attrs = vec![("ss:Index", index.as_str())];
                if let Some(style) = style.as_deref() {
                    attrs.push(("ss:StyleID", style));
                }
                if cell.text.is_empty() {
                    xml.empty("Cell", &attrs)?;
                    continue;
                }
                xml.start("Cell", &attrs)?;
                xml.leaf("Data", &[("ss:Type", "String")], &cell.text)?;
                xml.end("Cell")?;
            }
            xml.end("Row")?;
        }
        xml.end("Table")?;
        xml.end("Worksheet")?;
    }

    xml.end("Workbook")?;
    xml.into_string()
}

fn style_id(format: usize) -> String {
    format!("s{}", format + 1)
}

fn write_style(xml: &mut XmlWriter, id: &str, format: &CellFormat) -> Result<()> {
    let text = &format.text;
    let layout = &format.layout;
    xml.start("Style", &[("ss:ID", id)])?;

    let mut alignment = Vec::new();
    if let Some(h) = layout.horizontal_alignment {
        alignment.push(("ss:Horizontal", horizontal(h)));
    }
    if let Some(v) = layout.vertical_alignment {
        alignment.push(("ss:Vertical", vertical(v)));
    }
    if layout.shrink_to_fit == Some(true) {
        alignment.push(("ss:ShrinkToFit", "1"));
    }
    if !alignment.is_empty() {
        xml.empty("Alignment", &alignment)?;
    }

    if layout.borders.any_visible() {
        xml.start("Borders", &[])?;
        for (edge, border) in layout.borders.edges() {
            if let Some((line, weight)) = line_style(border.weight()) {
                let position = capitalize(edge);
                let color = border.color().to_string();
                xml.empty(
                    "Border",
                    &[
                        ("ss:Position", position.as_str()),
                        ("ss:LineStyle", line),
                        ("ss:Weight", weight),
                        ("ss:Color", color.as_str()),
                    ],
                )?;
            }
        }
        xml.end("Borders")?;
    }

    let name = office_font_name(text);
    let size = text.size().to_string();
    let color = text.text_color().to_string();
    let mut font = vec![
        ("ss:FontName", name.as_str()),
        ("ss:Size", size.as_str()),
        ("ss:Color", color.as_str()),
    ];
    if text.is_bold() {
        font.push(("ss:Bold", "1"));
    }
    if text.is_italic() {
        font.push(("ss:Italic", "1"));
    }
    if text.is_underline() {
        font.push(("ss:Underline", "Single"));
    }
    xml.empty("Font", &font)?;

    if let Some(fill) = layout.fill_color() {
        let color = fill.to_string();
        xml.empty(
            "Interior",
            &[
                ("ss:Color", color.as_str()),
                ("ss:Pattern", interior_pattern(layout.pattern())),
            ],
        )?;
    }

    xml.end("Style")
}

fn capitalize(edge: &str) -> String {
    let mut chars = edge.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn line_style(weight: BorderWeight) -> Option<(&'static str, &'static str)> {
    match weight {
        BorderWeight::None => None,
        BorderWeight::Hair => Some(("Continuous", "0")),
        BorderWeight::Thin => Some(("Continuous", "1")),
        BorderWeight::Medium => Some(("Continuous", "2")),
        BorderWeight::Thick => Some(("Continuous", "3")),
        BorderWeight::Dashed => Some(("Dash", "1")),
        BorderWeight::Dotted => Some(("Dot", "1")),
        BorderWeight::Double => Some(("Double", "3")),
    }
}

fn interior_pattern(pattern: FillPattern) -> &'static str {
    match pattern {
        FillPattern::NoFill => "None",
        FillPattern::SolidForeground => "Solid",
        FillPattern::FineDots => "Gray125",
        FillPattern::SparseDots => "Gray0625",
        FillPattern::AltBars => "Gray50",
        FillPattern::ThickHorzBands => "HorzStripe",
        FillPattern::ThickVertBands => "VertStripe",
        FillPattern::ThinHorzBands => "ThinHorzStripe",
        FillPattern::ThinVertBands => "ThinVertStripe",
    }
}

fn horizontal(alignment: HorAlignment) -> &'static str {
    match alignment {
        HorAlignment::General => "Automatic",
        HorAlignment::Left => "Left",
        HorAlignment::Center => "Center",
        HorAlignment::Right => "Right",
        HorAlignment::Fill => "Fill",
        HorAlignment::Justify => "Justify",
    }
}

fn vertical(alignment: VertAlignment) -> &'static str {
    match alignment {
        VertAlignment::Top => "Top",
        VertAlignment::Center => "Center",
        VertAlignment::Bottom => "Bottom",
        VertAlignment::Justify => "Justify",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::spreadsheet::workbook::Cell;
    use crate::style::{Style, TextStyle};

    #[test]
    fn test_spreadsheet_ml_structure() {
        let mut book = Workbook::new();
        let bold = book.format_index(&Style::text(TextStyle::new().with_bold(true)));
        let i = book.add_sheet("Data");
        book.sheet_mut(i)
            .unwrap()
            .push_row(vec![Cell::new(1, "Total", Some(bold))]);

        let xml = write_spreadsheet_ml(&book, &CoreProperties::default(), "UTF-8").unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\""));
        assert!(xml.contains("<?mso-application progid=\"Excel.Sheet\"?>"));
        assert!(xml.contains(r#"<Worksheet ss:Name="Data">"#));
        assert!(xml.contains(r#"<Cell ss:Index="2" ss:StyleID="s1"><Data ss:Type="String">Total</Data></Cell>"#));
        assert!(xml.contains(r#"ss:Bold="1""#));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bottom"), "Bottom");
    }
}
