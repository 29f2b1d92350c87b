//! Word-processor body model and its WordprocessingML serialization.
//!
//! Both the docx package and the 2003 flat XML share element names for
//! paragraphs, runs and tables, so one serializer serves both.

use crate::error::Result;
use crate::render::xml::{office_font_name, XmlWriter};
use crate::style::{BorderStyle, BorderWeight, HorAlignment, LayoutStyle, TextStyle, VertAlignment};

/// Twips per heading level of indentation.
pub const INDENT_PER_LEVEL: u32 = 567;

/// A4 width in twips.
pub const PAGE_WIDTH: u32 = 11906;

/// A4 height in twips.
pub const PAGE_HEIGHT: u32 = 16838;

pub const PAGE_MARGIN: u32 = 1134;

/// Usable text width in twips.
pub const CONTENT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

/// Twips per CSS pixel.
const TWIPS_PER_PIXEL: u32 = 15;

/// Highest built-in heading style.
pub const MAX_HEADING_DEPTH: u8 = 9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Para {
    pub style_id: Option<String>,
    pub text: String,
    pub text_style: Option<TextStyle>,
    pub layout: Option<LayoutStyle>,
    /// Left indent and hanging amount in twips.
    pub indent: Option<(u32, u32)>,
    pub bottom_border: Option<BorderStyle>,
}

impl Para {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_style_id(mut self, id: impl Into<String>) -> Self {
        self.style_id = Some(id.into());
        self
    }

    /// Take both facets of a resolved style.
    pub fn styled(mut self, text: Option<TextStyle>, layout: Option<LayoutStyle>) -> Self {
        self.text_style = text;
        self.layout = layout;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordCell {
    pub text: String,
    pub text_style: TextStyle,
    pub layout: LayoutStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordTable {
    pub caption: Option<Para>,
    pub header: Option<Vec<WordCell>>,
    pub rows: Vec<Vec<WordCell>>,
}

impl WordTable {
    pub fn column_count(&self) -> usize {
        self.header
            .iter()
            .chain(self.rows.iter())
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Para),
    Table(WordTable),
    PageBreak,
}

/// Paragraph style definitions for Title and Heading1..9.
pub fn write_style_definitions(xml: &mut XmlWriter) -> Result<()> {
    xml.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?;
    xml.empty("w:name", &[("w:val", "Normal")])?;
    xml.end("w:style")?;

    write_heading_style(xml, "Title", "Title", None, 52)?;
    for level in 1..=MAX_HEADING_DEPTH {
        let id = format!("Heading{}", level);
        let name = format!("heading {}", level);
        // 16pt at level 1 down to 10pt.
        let half_points = 32u32.saturating_sub(2 * (level as u32 - 1)).max(20);
        write_heading_style(xml, &id, &name, Some(level - 1), half_points)?;
    }

    xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", "Footer")])?;
    xml.empty("w:name", &[("w:val", "footer")])?;
    xml.empty("w:basedOn", &[("w:val", "Normal")])?;
    xml.end("w:style")
}

fn write_heading_style(
    xml: &mut XmlWriter,
    id: &str,
    name: &str,
    outline: Option<u8>,
    half_points: u32,
) -> Result<()> {
    xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", id)])?;
    xml.empty("w:name", &[("w:val", name)])?;
    xml.empty("w:basedOn", &[("w:val", "Normal")])?;
    xml.empty("w:next", &[("w:val", "Normal")])?;
    xml.start("w:pPr", &[])?;
    xml.empty("w:keepNext", &[])?;
    if let Some(level) = outline {
        let level = level.to_string();
        xml.empty("w:outlineLvl", &[("w:val", level.as_str())])?;
    }
    xml.end("w:pPr")?;
    xml.start("w:rPr", &[])?;
    xml.empty("w:b", &[])?;
    let size = half_points.to_string();
    xml.empty("w:sz", &[("w:val", size.as_str())])?;
    xml.end("w:rPr")?;
    xml.end("w:style")
}

pub fn write_blocks(xml: &mut XmlWriter, blocks: &[Block]) -> Result<()> {
    for block in blocks {
        match block {
            Block::Paragraph(para) => write_paragraph(xml, para)?,
            Block::Table(table) => write_table(xml, table)?,
            Block::PageBreak => {
                xml.start("w:p", &[])?;
                xml.start("w:r", &[])?;
                xml.empty("w:br", &[("w:type", "page")])?;
                xml.end("w:r")?;
                xml.end("w:p")?;
            }
        }
    }
    Ok(())
}

pub fn write_paragraph(xml: &mut XmlWriter, para: &Para) -> Result<()> {
    xml.start("w:p", &[])?;
    xml.start("w:pPr", &[])?;
    if let Some(id) = &para.style_id {
        xml.empty("w:pStyle", &[("w:val", id.as_str())])?;
    }
    if let Some(border) = &para.bottom_border {
        if let Some((val, size)) = border_value(border.weight()) {
            xml.start("w:pBdr", &[])?;
            let size = size.to_string();
            let color = border.color().to_hex();
            xml.empty(
                "w:bottom",
                &[
                    ("w:val", val),
                    ("w:sz", size.as_str()),
                    ("w:space", "1"),
                    ("w:color", color.as_str()),
                ],
            )?;
            xml.end("w:pBdr")?;
        }
    }
    if let Some(layout) = &para.layout {
        write_shading(xml, layout)?;
    }
    if let Some((left, hanging)) = para.indent {
        let left = left.to_string();
        let hanging = hanging.to_string();
        xml.empty(
            "w:ind",
            &[("w:left", left.as_str()), ("w:hanging", hanging.as_str())],
        )?;
    }
    if let Some(jc) = para.layout.as_ref().and_then(|l| justification(l.h_align())) {
        xml.empty("w:jc", &[("w:val", jc)])?;
    }
    xml.end("w:pPr")?;

    if !para.text.is_empty() {
        write_run(xml, &para.text, para.text_style.as_ref())?;
    }
    xml.end("w:p")
}

fn write_run(xml: &mut XmlWriter, text: &str, style: Option<&TextStyle>) -> Result<()> {
    xml.start("w:r", &[])?;
    if let Some(style) = style {
        xml.start("w:rPr", &[])?;
        if style.font_family.is_some() || style.font_name_resource.is_some() {
            let font = office_font_name(style);
            xml.empty(
                "w:rFonts",
                &[("w:ascii", font.as_str()), ("w:hAnsi", font.as_str())],
            )?;
        }
        if style.is_bold() {
            xml.empty("w:b", &[])?;
        }
        if style.is_italic() {
            xml.empty("w:i", &[])?;
        }
        if let Some(color) = style.color {
            let color = color.to_hex();
            xml.empty("w:color", &[("w:val", color.as_str())])?;
        }
        if let Some(size) = style.font_size {
            let half_points = (size as u32 * 2).to_string();
            xml.empty("w:sz", &[("w:val", half_points.as_str())])?;
        }
        if style.is_underline() {
            xml.empty("w:u", &[("w:val", "single")])?;
        }
        xml.end("w:rPr")?;
    }
    xml.leaf("w:t", &[("xml:space", "preserve")], text)?;
    xml.end("w:r")
}

fn write_shading(xml: &mut XmlWriter, layout: &LayoutStyle) -> Result<()> {
    if let Some(fill) = layout.fill_color() {
        let fill = fill.to_hex();
        xml.empty(
            "w:shd",
            &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill.as_str())],
        )?;
    }
    Ok(())
}

fn write_table(xml: &mut XmlWriter, table: &WordTable) -> Result<()> {
    if let Some(caption) = &table.caption {
        write_paragraph(xml, caption)?;
    }
    let columns = table.column_count().max(1);
    let column_width = CONTENT_WIDTH / columns as u32;

    xml.start("w:tbl", &[])?;
    xml.start("w:tblPr", &[])?;
    xml.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
    xml.end("w:tblPr")?;

    xml.start("w:tblGrid", &[])?;
    let width = column_width.to_string();
    for _ in 0..columns {
        xml.empty("w:gridCol", &[("w:w", width.as_str())])?;
    }
    xml.end("w:tblGrid")?;

    if let Some(header) = &table.header {
        write_table_row(xml, header, column_width, true)?;
    }
    for row in &table.rows {
        write_table_row(xml, row, column_width, false)?;
    }
    xml.end("w:tbl")
}

fn write_table_row(
    xml: &mut XmlWriter,
    cells: &[WordCell],
    column_width: u32,
    header: bool,
) -> Result<()> {
    xml.start("w:tr", &[])?;
    if header {
        xml.start("w:trPr", &[])?;
        xml.empty("w:tblHeader", &[])?;
        xml.end("w:trPr")?;
    }
    for cell in cells {
        let layout = &cell.layout;
        xml.start("w:tc", &[])?;
        xml.start("w:tcPr", &[])?;
        let width = layout
            .width
            .map(|px| px * TWIPS_PER_PIXEL)
            .unwrap_or(column_width)
            .to_string();
        xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
        if layout.borders.any_visible() {
            xml.start("w:tcBorders", &[])?;
            for (edge, border) in layout.borders.edges() {
                if let Some((val, size)) = border_value(border.weight()) {
                    let name = format!("w:{}", edge);
                    let size = size.to_string();
                    let color = border.color().to_hex();
                    xml.empty(
                        &name,
                        &[
                            ("w:val", val),
                            ("w:sz", size.as_str()),
                            ("w:space", "0"),
                            ("w:color", color.as_str()),
                        ],
                    )?;
                }
            }
            xml.end("w:tcBorders")?;
        }
        write_shading(xml, layout)?;
        if let Some(v) = layout.vertical_alignment {
            let value = match v {
                VertAlignment::Top => "top",
                VertAlignment::Center | VertAlignment::Justify => "center",
                VertAlignment::Bottom => "bottom",
            };
            xml.empty("w:vAlign", &[("w:val", value)])?;
        }
        xml.end("w:tcPr")?;

        xml.start("w:p", &[])?;
        if let Some(jc) = justification(layout.h_align()) {
            xml.start("w:pPr", &[])?;
            xml.empty("w:jc", &[("w:val", jc)])?;
            xml.end("w:pPr")?;
        }
        if !cell.text.is_empty() {
            write_run(xml, &cell.text, Some(&cell.text_style))?;
        }
        xml.end("w:p")?;
        xml.end("w:tc")?;
    }
    xml.end("w:tr")
}

/// Border line value and size in eighths of a point.
fn border_value(weight: BorderWeight) -> Option<(&'static str, u32)> {
    match weight {
        BorderWeight::None => None,
        BorderWeight::Hair => Some(("single", 2)),
        BorderWeight::Thin => Some(("single", 4)),
        BorderWeight::Medium => Some(("single", 8)),
        BorderWeight::Thick => Some(("single", 12)),
        BorderWeight::Dashed => Some(("dashed", 4)),
        BorderWeight::Dotted => Some(("dotted", 4)),
        BorderWeight::Double => Some(("double", 4)),
    }
}

fn justification(alignment: HorAlignment) -> Option<&'static str> {
    match alignment {
        HorAlignment::General => None,
        HorAlignment::Left => Some("left"),
        HorAlignment::Center => Some("center"),
        HorAlignment::Right => Some("right"),
        HorAlignment::Fill | HorAlignment::Justify => Some("both"),
    }
}
