//! Word-processor formatters (`docx` and legacy `doc`).
//!
//! Traversal builds a list of [`Block`]s; finalize serializes them either
//! as an OPC package or as 2003 flat XML. Titles and headings use the
//! built-in paragraph styles, headings are indented by depth, and each
//! document case after the first content begins on a new page.

mod body;
mod docx;
mod wordml;

pub use body::{Block, Para, WordCell, WordTable, INDENT_PER_LEVEL, MAX_HEADING_DEPTH};

use super::formatter::{Formatter, FormatterBase};
use super::visitor::{Visitable, Visitor};
use super::xml::CoreProperties;
use super::FormatterContext;
use crate::error::{Error, Result};
use crate::model::{
    Composition, Document, DocumentCase, Footer, Heading, ItemRef, Node, Paragraph, Separator,
    Table, TableHeaderRow, TableRow, Title,
};
use crate::style::{BorderStyle, Color, Style};
use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFlavor {
    /// Office Open XML package
    Docx,
    /// WordprocessingML 2003 flat XML
    Doc,
}

impl WordFlavor {
    pub fn extension(self) -> &'static str {
        match self {
            WordFlavor::Docx => "docx",
            WordFlavor::Doc => "doc",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            WordFlavor::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            WordFlavor::Doc => "application/msword",
        }
    }
}

pub struct WordFormatter {
    base: FormatterBase,
    flavor: WordFlavor,
    blocks: Vec<Block>,
    footers: Vec<Para>,
    properties: CoreProperties,
    table: Option<WordTable>,
}

impl WordFormatter {
    pub fn new(context: FormatterContext, flavor: WordFlavor) -> Result<Self> {
        Ok(Self {
            base: FormatterBase::new(context)?,
            flavor,
            blocks: Vec::new(),
            footers: Vec::new(),
            properties: CoreProperties::default(),
            table: None,
        })
    }

    pub fn docx(context: FormatterContext) -> Result<Self> {
        Self::new(context, WordFlavor::Docx)
    }

    pub fn doc(context: FormatterContext) -> Result<Self> {
        Self::new(context, WordFlavor::Doc)
    }

    pub fn flavor(&self) -> WordFlavor {
        self.flavor
    }

    /// Blocks built so far.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn styled_para(&self, style: Option<&Style>, text: &str) -> Para {
        let text = self.base.localize(text).into_owned();
        Para::new(text).styled(
            style.and_then(|s| s.text_facet()).cloned(),
            style.and_then(|s| s.layout_facet()).cloned(),
        )
    }

    fn cells<'a, I>(
        &self,
        row_style: Option<&Arc<Style>>,
        cells: I,
        localize: bool,
    ) -> Vec<WordCell>
    where
        I: Iterator<Item = (ItemRef<'a>, &'a str)>,
    {
        cells
            .map(|(item, text)| {
                let style = self.base.resolve_within(row_style, item);
                let (text_style, layout) = style
                    .as_deref()
                    .map(Style::split)
                    .unwrap_or_default();
                let text = if localize {
                    self.base.localize(text).into_owned()
                } else {
                    text.to_string()
                };
                WordCell {
                    text,
                    text_style,
                    layout,
                }
            })
            .collect()
    }
}

impl Visitor for WordFormatter {
    fn visit_document(&mut self, document: &Document) -> Result<()> {
        self.properties = CoreProperties::of(document);
        self.visit_composition(document)
    }

    fn visit_document_case(&mut self, case: &DocumentCase) -> Result<()> {
        if !self.blocks.is_empty() {
            debug!("Page break before case {:?}", case.name());
            self.blocks.push(Block::PageBreak);
        }
        self.visit_composition(case)
    }

    fn visit_title(&mut self, title: &Title) -> Result<()> {
        let style = self.base.resolve(title.as_item());
        let para = self
            .styled_para(style.as_deref(), &title.text)
            .with_style_id("Title");
        self.blocks.push(Block::Paragraph(para));
        Ok(())
    }

    fn visit_heading(&mut self, heading: &Heading) -> Result<()> {
        if heading.depth > MAX_HEADING_DEPTH {
            return Err(Error::InvalidHeadingDepth {
                depth: heading.depth,
                max: MAX_HEADING_DEPTH,
            });
        }
        let style = self.base.resolve(heading.as_item());
        let mut para = self
            .styled_para(style.as_deref(), &heading.text)
            .with_style_id(format!("Heading{}", heading.depth.max(1)));
        if heading.depth > 0 {
            para.indent = Some((heading.depth as u32 * INDENT_PER_LEVEL, INDENT_PER_LEVEL));
        }
        self.blocks.push(Block::Paragraph(para));
        Ok(())
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let style = self.base.resolve(paragraph.as_item());
        let para = self.styled_para(style.as_deref(), &paragraph.text);
        self.blocks.push(Block::Paragraph(para));
        Ok(())
    }

    fn visit_footer(&mut self, footer: &Footer) -> Result<()> {
        let style = self.base.resolve(footer.as_item());
        let para = self
            .styled_para(style.as_deref(), &footer.text)
            .with_style_id("Footer");
        self.footers.push(para);
        Ok(())
    }

    fn visit_separator(&mut self, separator: &Separator) -> Result<()> {
        let style = self.base.resolve(separator.as_item());
        let weight = separator.effective_weight(style.as_deref());
        let mut para = self.styled_para(style.as_deref(), "");
        if weight.is_visible() {
            let color = style
                .as_deref()
                .and_then(|s| s.layout_facet())
                .and_then(|l| l.borders.bottom.color)
                .unwrap_or(Color::BLACK);
            para.bottom_border = Some(BorderStyle::new(color, weight));
        }
        self.blocks.push(Block::Paragraph(para));
        Ok(())
    }

    fn visit_table(&mut self, table: &Table) -> Result<()> {
        let caption = table.label.as_deref().map(|label| {
            let style = self.base.resolve(table.as_item());
            self.styled_para(style.as_deref(), label)
        });
        self.table = Some(WordTable {
            caption,
            ..WordTable::default()
        });

        if let Some(header) = &table.header_row {
            header.accept(self)?;
        }
        self.visit_composition(table)?;

        if let Some(built) = self.table.take() {
            self.blocks.push(Block::Table(built));
        }
        Ok(())
    }

    fn visit_table_header_row(&mut self, row: &TableHeaderRow) -> Result<()> {
        let row_style = self.base.resolve(row.as_item());
        let cells = self.cells(
            row_style.as_ref(),
            row.parts().iter().map(|c| (c.as_item(), c.text.as_str())),
            false,
        );
        if let Some(table) = self.table.as_mut() {
            table.header = Some(cells);
        }
        Ok(())
    }

    fn visit_table_row(&mut self, row: &TableRow) -> Result<()> {
        let row_style = self.base.resolve(row.as_item());
        let cells = self.cells(
            row_style.as_ref(),
            row.parts().iter().map(|c| (c.as_item(), c.text.as_str())),
            true,
        );
        if let Some(table) = self.table.as_mut() {
            table.rows.push(cells);
        }
        Ok(())
    }
}

impl Formatter for WordFormatter {
    fn extension(&self) -> &'static str {
        self.flavor.extension()
    }

    fn content_media_type(&self) -> &'static str {
        self.flavor.media_type()
    }

    fn base(&self) -> &FormatterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormatterBase {
        &mut self.base
    }

    fn initialize_resource(&mut self) -> Result<()> {
        self.blocks.clear();
        self.footers.clear();
        self.table = None;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let bytes = match self.flavor {
            WordFlavor::Docx => docx::write_docx(&self.blocks, &self.footers, &self.properties)?,
            WordFlavor::Doc => {
                let encoding = self.base.encoding();
                let text = wordml::write_word_ml(
                    &self.blocks,
                    &self.footers,
                    &self.properties,
                    encoding.name(),
                )?;
                self.base.encode_with_references(&text).into_owned()
            }
        };
        self.base.write_output(&bytes)
    }

    fn cleanup_resource(&mut self) -> Result<()> {
        self.blocks.clear();
        self.footers.clear();
        self.table = None;
        Ok(())
    }
}
