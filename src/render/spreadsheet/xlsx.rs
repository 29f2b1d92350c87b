//! Office Open XML spreadsheet package writer.

use super::workbook::{column_name, CellFormat, Sheet, Workbook};
use crate::error::Result;
use crate::render::xml::{office_font_name, CoreProperties, Package, XmlWriter};
use crate::style::{BorderWeight, Borders, Color, FillPattern, HorAlignment, VertAlignment};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Serialize a workbook as an `.xlsx` package.
pub fn write_xlsx(book: &Workbook, properties: &CoreProperties) -> Result<Vec<u8>> {
    let sheet_count = book.sheets().len();
    let mut package = Package::new();
    package.add("[Content_Types].xml", content_types(sheet_count)?);
    package.add("_rels/.rels", root_relationships()?);
    package.add("docProps/core.xml", properties.core_xml()?);
    package.add("xl/workbook.xml", workbook_xml(book)?);
    package.add("xl/_rels/workbook.xml.rels", workbook_relationships(sheet_count)?);
    package.add("xl/styles.xml", StyleTable::build(book.formats()).to_xml()?);
    for (i, sheet) in book.sheets().iter().enumerate() {
        package.add(format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(sheet)?);
    }
    package.finish()
}

fn content_types(sheet_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start(
        "Types",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types")],
    )?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/xl/workbook.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
            ),
        ],
    )?;
    for i in 1..=sheet_count {
        let part = format!("/xl/worksheets/sheet{}.xml", i);
        xml.empty(
            "Override",
            &[
                ("PartName", part.as_str()),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
                ),
            ],
        )?;
    }
    xml.empty(
        "Override",
        &[
            ("PartName", "/xl/styles.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
            ),
        ],
    )?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/docProps/core.xml"),
            ("ContentType", "application/vnd.openxmlformats-package.core-properties+xml"),
        ],
    )?;
    xml.end("Types")?;
    Ok(xml.into_bytes())
}

fn root_relationships() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("Relationships", &[("xmlns", PKG_REL_NS)])?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            (
                "Type",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            ),
            ("Target", "xl/workbook.xml"),
        ],
    )?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId2"),
            (
                "Type",
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            ),
            ("Target", "docProps/core.xml"),
        ],
    )?;
    xml.end("Relationships")?;
    Ok(xml.into_bytes())
}

fn workbook_xml(book: &Workbook) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("workbook", &[("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])?;
    xml.start("sheets", &[])?;
    for (i, sheet) in book.sheets().iter().enumerate() {
        let id = (i + 1).to_string();
        let rel = format!("rId{}", i + 1);
        xml.empty(
            "sheet",
            &[
                ("name", sheet.name()),
                ("sheetId", id.as_str()),
                ("r:id", rel.as_str()),
            ],
        )?;
    }
    xml.end("sheets")?;
    xml.end("workbook")?;
    Ok(xml.into_bytes())
}

fn workbook_relationships(sheet_count: usize) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("Relationships", &[("xmlns", PKG_REL_NS)])?;
    for i in 1..=sheet_count {
        let id = format!("rId{}", i);
        let target = format!("worksheets/sheet{}.xml", i);
        xml.empty(
            "Relationship",
            &[
                ("Id", id.as_str()),
                (
                    "Type",
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
                ),
                ("Target", target.as_str()),
            ],
        )?;
    }
    let styles_id = format!("rId{}", sheet_count + 1);
    xml.empty(
        "Relationship",
        &[
            ("Id", styles_id.as_str()),
            (
                "Type",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
            ),
            ("Target", "styles.xml"),
        ],
    )?;
    xml.end("Relationships")?;
    Ok(xml.into_bytes())
}

fn sheet_xml(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("worksheet", &[("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])?;

    if !sheet.column_widths().is_empty() {
        xml.start("cols", &[])?;
        for (&column, &width) in sheet.column_widths() {
            let index = (column + 1).to_string();
            let width = format!("{:.2}", width);
            xml.empty(
                "col",
                &[
                    ("min", index.as_str()),
                    ("max", index.as_str()),
                    ("width", width.as_str()),
                    ("customWidth", "1"),
                ],
            )?;
        }
        xml.end("cols")?;
    }

    xml.start("sheetData", &[])?;
    for (r, cells) in sheet.rows().iter().enumerate() {
        let row_ref = (r + 1).to_string();
        xml.start("row", &[("r", row_ref.as_str())])?;
        for cell in cells {
            let cell_ref = format!("{}{}", column_name(cell.column), r + 1);
            // Xf 0 is the default format.
            let xf = cell.format.map(|f| (f + 1).to_string());
            let mut attrs = vec![("r", cell_ref.as_str())];
            if let Some(xf) = xf.as_deref() {
                attrs.push(("s", xf));
            }
            if cell.text.is_empty() {
                if cell.format.is_some() {
                    xml.empty("c", &attrs)?;
                }
                continue;
            }
            attrs.push(("t", "inlineStr"));
            xml.start("c", &attrs)?;
            xml.start("is", &[])?;
            xml.leaf("t", &[("xml:space", "preserve")], &cell.text)?;
            xml.end("is")?;
            xml.end("c")?;
        }
        xml.end("row")?;
    }
    xml.end("sheetData")?;
    xml.end("worksheet")?;
    Ok(xml.into_bytes())
}

#[derive(Debug, Clone, PartialEq)]
struct FontKey {
    name: String,
    size: u16,
    bold: bool,
    italic: bool,
    underline: bool,
    color: Color,
}

#[derive(Debug, Clone, PartialEq)]
struct FillKey {
    pattern: FillPattern,
    foreground: Option<Color>,
    background: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
struct Xf {
    font: usize,
    fill: usize,
    border: usize,
    horizontal: Option<HorAlignment>,
    vertical: Option<VertAlignment>,
    shrink_to_fit: bool,
}

/// Deduplicated fonts, fills and borders plus one cell xf per format.
#[derive(Debug, Default)]
struct StyleTable {
    fonts: Vec<FontKey>,
    fills: Vec<FillKey>,
    borders: Vec<Borders>,
    xfs: Vec<Xf>,
}

fn intern<T: PartialEq>(items: &mut Vec<T>, item: T) -> usize {
    match items.iter().position(|i| *i == item) {
        Some(i) => i,
        None => {
            items.push(item);
            items.len() - 1
        }
    }
}

impl StyleTable {
    fn build(formats: &[CellFormat]) -> Self {
        let mut table = StyleTable::default();
        let default_format = CellFormat::default();
        table.fonts.push(font_key(&default_format));
        // The first two fills are reserved by the format.
        table.fills.push(FillKey {
            pattern: FillPattern::NoFill,
            foreground: None,
            background: None,
        });
        table.fills.push(FillKey {
            pattern: FillPattern::FineDots,
            foreground: None,
            background: None,
        });
        table.borders.push(Borders::default());
        table.xfs.push(Xf {
            font: 0,
            fill: 0,
            border: 0,
            horizontal: None,
            vertical: None,
            shrink_to_fit: false,
        });

        for format in formats {
            let layout = &format.layout;
            let font = intern(&mut table.fonts, font_key(format));
            let fill = match layout.pattern() {
                FillPattern::NoFill => 0,
                pattern => intern(
                    &mut table.fills,
                    FillKey {
                        pattern,
                        foreground: layout.fill_foreground,
                        background: layout.fill_background,
                    },
                ),
            };
            let border = intern(&mut table.borders, layout.borders);
            table.xfs.push(Xf {
                font,
                fill,
                border,
                horizontal: layout.horizontal_alignment,
                vertical: layout.vertical_alignment,
                shrink_to_fit: layout.shrink_to_fit == Some(true),
            });
        }
        table
    }

    fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::new();
        xml.declaration("UTF-8")?;
        xml.start("styleSheet", &[("xmlns", MAIN_NS)])?;

        let count = self.fonts.len().to_string();
        xml.start("fonts", &[("count", count.as_str())])?;
        for font in &self.fonts {
            xml.start("font", &[])?;
            if font.bold {
                xml.empty("b", &[])?;
            }
            if font.italic {
                xml.empty("i", &[])?;
            }
            if font.underline {
                xml.empty("u", &[])?;
            }
            let size = font.size.to_string();
            xml.empty("sz", &[("val", size.as_str())])?;
            let rgb = argb(font.color);
            xml.empty("color", &[("rgb", rgb.as_str())])?;
            xml.empty("name", &[("val", font.name.as_str())])?;
            xml.end("font")?;
        }
        xml.end("fonts")?;

        let count = self.fills.len().to_string();
        xml.start("fills", &[("count", count.as_str())])?;
        for fill in &self.fills {
            xml.start("fill", &[])?;
            let pattern = pattern_type(fill.pattern);
            if fill.foreground.is_none() && fill.background.is_none() {
                xml.empty("patternFill", &[("patternType", pattern)])?;
            } else {
                xml.start("patternFill", &[("patternType", pattern)])?;
                if let Some(fg) = fill.foreground {
                    let rgb = argb(fg);
                    xml.empty("fgColor", &[("rgb", rgb.as_str())])?;
                }
                if let Some(bg) = fill.background {
                    let rgb = argb(bg);
                    xml.empty("bgColor", &[("rgb", rgb.as_str())])?;
                }
                xml.end("patternFill")?;
            }
            xml.end("fill")?;
        }
        xml.end("fills")?;

        let count = self.borders.len().to_string();
        xml.start("borders", &[("count", count.as_str())])?;
        for borders in &self.borders {
            xml.start("border", &[])?;
            for (name, edge) in [
                ("left", borders.left),
                ("right", borders.right),
                ("top", borders.top),
                ("bottom", borders.bottom),
            ] {
                match border_style(edge.weight()) {
                    Some(style) => {
                        xml.start(name, &[("style", style)])?;
                        let rgb = argb(edge.color());
                        xml.empty("color", &[("rgb", rgb.as_str())])?;
                        xml.end(name)?;
                    }
                    None => xml.empty(name, &[])?,
                }
            }
            xml.empty("diagonal", &[])?;
            xml.end("border")?;
        }
        xml.end("borders")?;

        xml.start("cellStyleXfs", &[("count", "1")])?;
        xml.empty(
            "xf",
            &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")],
        )?;
        xml.end("cellStyleXfs")?;

        let count = self.xfs.len().to_string();
        xml.start("cellXfs", &[("count", count.as_str())])?;
        for xf in &self.xfs {
            let font = xf.font.to_string();
            let fill = xf.fill.to_string();
            let border = xf.border.to_string();
            let attrs = [
                ("numFmtId", "0"),
                ("fontId", font.as_str()),
                ("fillId", fill.as_str()),
                ("borderId", border.as_str()),
                ("xfId", "0"),
                ("applyFont", "1"),
                ("applyFill", "1"),
                ("applyBorder", "1"),
                ("applyAlignment", "1"),
            ];
            let mut alignment = Vec::new();
            if let Some(h) = xf.horizontal {
                alignment.push(("horizontal", horizontal(h)));
            }
            if let Some(v) = xf.vertical {
                alignment.push(("vertical", vertical(v)));
            }
            if xf.shrink_to_fit {
                alignment.push(("shrinkToFit", "1"));
            }
            if alignment.is_empty() {
                xml.empty("xf", &attrs)?;
            } else {
                xml.start("xf", &attrs)?;
                xml.empty("alignment", &alignment)?;
                xml.end("xf")?;
            }
        }
        xml.end("cellXfs")?;

        xml.start("cellStyles", &[("count", "1")])?;
        xml.empty("cellStyle", &[("name", "Normal"), ("xfId", "0"), ("builtinId", "0")])?;
        xml.end("cellStyles")?;

        xml.end("styleSheet")?;
        Ok(xml.into_bytes())
    }
}

fn font_key(format: &CellFormat) -> FontKey {
    let text = &format.text;
    FontKey {
        name: office_font_name(text),
        size: text.size(),
        bold: text.is_bold(),
        italic: text.is_italic(),
        underline: text.is_underline(),
        color: text.text_color(),
    }
}

fn argb(color: Color) -> String {
    format!("FF{}", color.to_hex())
}

fn pattern_type(pattern: FillPattern) -> &'static str {
    match pattern {
        FillPattern::NoFill => "none",
        FillPattern::SolidForeground => "solid",
        FillPattern::FineDots => "gray125",
        FillPattern::SparseDots => "gray0625",
        FillPattern::AltBars => "mediumGray",
        FillPattern::ThickHorzBands => "darkHorizontal",
        FillPattern::ThickVertBands => "darkVertical",
        FillPattern::ThinHorzBands => "lightHorizontal",
        FillPattern::ThinVertBands => "lightVertical",
    }
}

fn border_style(weight: BorderWeight) -> Option<&'static str> {
    match weight {
        BorderWeight::None => None,
        BorderWeight::Thin => Some("thin"),
        BorderWeight::Medium => Some("medium"),
        BorderWeight::Dashed => Some("dashed"),
        BorderWeight::Dotted => Some("dotted"),
        BorderWeight::Thick => Some("thick"),
        BorderWeight::Double => Some("double"),
        BorderWeight::Hair => Some("hair"),
    }
}

fn horizontal(alignment: HorAlignment) -> &'static str {
    match alignment {
        HorAlignment::General => "general",
        HorAlignment::Left => "left",
        HorAlignment::Center => "center",
        HorAlignment::Right => "right",
        HorAlignment::Fill => "fill",
        HorAlignment::Justify => "justify",
    }
}

fn vertical(alignment: VertAlignment) -> &'static str {
    match alignment {
        VertAlignment::Top => "top",
        VertAlignment::Center => "center",
        VertAlignment::Bottom => "bottom",
        VertAlignment::Justify => "justify",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::spreadsheet::workbook::Cell;
    use crate::style::{BorderStyle, LayoutStyle, Style, TextStyle};

    #[test]
    fn test_style_table_dedup() {
        let mut book = Workbook::new();
        let header = Style::layout_text(
            TextStyle::new().with_bold(true),
            LayoutStyle::new()
                .with_fill_foreground(Color::GREY_25_PERCENT)
                .with_fill_pattern(FillPattern::SolidForeground)
                .with_border(BorderStyle::new(Color::BLACK, BorderWeight::Thin)),
        );
        let row = Style::layout(
            LayoutStyle::new().with_border(BorderStyle::new(Color::BLACK, BorderWeight::Thin)),
        );
        book.format_index(&header);
        book.format_index(&row);

        let table = StyleTable::build(book.formats());
        // default + bold
        assert_eq!(table.fonts.len(), 2);
        // none, gray125, grey solid
        assert_eq!(table.fills.len(), 3);
        // empty + thin box shared by both formats
        assert_eq!(table.borders.len(), 2);
        assert_eq!(table.xfs.len(), 3);
        assert_eq!(table.xfs[1].border, table.xfs[2].border);
    }

    #[test]
    fn test_sheet_xml_cells() {
        let mut book = Workbook::new();
        let i = book.add_sheet("S");
        let sheet = book.sheet_mut(i).unwrap();
        sheet.push_row(vec![Cell::new(0, "a & b", None), Cell::new(27, "z", Some(0))]);
        sheet.set_column_width(0, 12.0);

        let xml = String::from_utf8(sheet_xml(&book.sheets()[0]).unwrap()).unwrap();
        assert!(xml.contains(r#"<col min="1" max="1" width="12.00" customWidth="1"/>"#));
        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">a &amp; b</t></is></c>"#));
        assert!(xml.contains(r#"<c r="AB1" s="1" t="inlineStr">"#));
    }
}
