//! PDF formatter.
//!
//! Content is laid out top to bottom on A4 pages as the tree is visited:
//! text wraps to the content width, tables split columns evenly and a
//! page ends when the next block does not fit. Footers are stamped on
//! every page when the document is assembled in [`Formatter::finalize`].

mod fonts;
mod metrics;
mod page;

pub use fonts::{FontBook, PdfFont};
pub use metrics::StandardMetrics;
pub use page::{wrap, Page, CONTENT_WIDTH, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};

use super::formatter::{Formatter, FormatterBase};
use super::visitor::{Visitable, Visitor};
use super::xml::CoreProperties;
use super::FormatterContext;
use crate::error::{Error, Result};
use crate::model::{
    Composition, Document, DocumentCase, Footer, Heading, ItemRef, Node, Paragraph, Separator,
    Table, TableHeaderRow, TableRow, Title,
};
use crate::style::{BorderWeight, Color, HorAlignment, LayoutStyle, Style, TextStyle};
use fonts::{deflate, text_string};
use log::debug;
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use page::LINE_SPACING;
use std::sync::Arc;

pub const EXTENSION: &str = "pdf";
pub const MEDIA_TYPE: &str = "application/pdf";

/// Cell padding in points.
const CELL_PADDING: f32 = 2.0;

/// Indent per heading level in points.
const HEADING_INDENT: f32 = 12.0;

/// Deepest heading; deeper indents would leave the content area.
pub const MAX_HEADING_DEPTH: u8 = 9;

const TITLE_SIZE: u16 = 18;

fn heading_size(depth: u8) -> u16 {
    16u16.saturating_sub(2 * depth.saturating_sub(1) as u16).max(11)
}

/// A block of wrapped text ready to draw.
struct TextRun {
    font: usize,
    size: f32,
    style: TextStyle,
    lines: Vec<String>,
}

impl TextRun {
    fn line_height(&self) -> f32 {
        self.size * LINE_SPACING
    }

    fn height(&self) -> f32 {
        self.lines.len().max(1) as f32 * self.line_height()
    }
}

pub struct PdfFormatter {
    base: FormatterBase,
    fonts: FontBook,
    pages: Vec<Page>,
    current: Option<Page>,
    footers: Vec<TextRun>,
    properties: CoreProperties,
    tables_seen: usize,
    columns: Option<usize>,
}

impl PdfFormatter {
    pub fn new(context: FormatterContext) -> Result<Self> {
        Ok(Self {
            base: FormatterBase::new(context)?,
            fonts: FontBook::new(),
            pages: Vec::new(),
            current: None,
            footers: Vec::new(),
            properties: CoreProperties::default(),
            tables_seen: 0,
            columns: None,
        })
    }

    /// Pages finished so far, plus the open one.
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(self.current.is_some())
    }

    fn page(&mut self) -> &mut Page {
        self.current.get_or_insert_with(|| {
            debug!("Opening page {}", self.pages.len() + 1);
            Page::new()
        })
    }

    fn close_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.pages.push(page);
        }
    }

    /// Open a new page when `height` does not fit on the current one.
    fn reserve(&mut self, height: f32) -> &mut Page {
        let full = self
            .current
            .as_ref()
            .is_some_and(|p| !p.is_blank() && p.remaining() < height);
        if full {
            self.close_page();
        }
        self.page()
    }

    /// Resolve and register the font for a text style, then wrap `text`.
    fn text_run(&mut self, style: TextStyle, text: &str, width: f32) -> Result<TextRun> {
        let resource = self
            .base
            .style_service()
            .font_for(&style, &self.base.context().locale)?;
        let font = self.fonts.register(&resource)?;
        let size = style.size() as f32;
        let lines = match self.fonts.get(font) {
            Some(f) => wrap(text, width, |s| f.text_width(s, size)),
            None => vec![text.to_string()],
        };
        Ok(TextRun {
            font,
            size,
            style,
            lines,
        })
    }

    /// Draw one line of a run at (x, top of line).
    fn draw_line(
        &mut self,
        run: &TextRun,
        line: &str,
        x: f32,
        top: f32,
        width: f32,
        align: HorAlignment,
    ) {
        let (resource, bytes, hex, line_width) = match self.fonts.get_mut(run.font) {
            Some(font) => {
                let line_width = font.text_width(line, run.size);
                (
                    font.resource().to_string(),
                    font.encode(line),
                    font.is_embedded(),
                    line_width,
                )
            }
            None => return,
        };
        let x = match align {
            HorAlignment::Center => x + (width - line_width).max(0.0) / 2.0,
            HorAlignment::Right => x + (width - line_width).max(0.0),
            _ => x,
        };
        let baseline = top + run.size;
        let color = run.style.text_color();
        let underline = run.style.is_underline();
        let page = self.page();
        page.text(x, baseline, &resource, run.size, color, bytes, hex);
        if underline {
            let y = baseline + run.size * 0.1;
            page.line((x, y), (x + line_width, y), BorderWeight::Thin, color);
        }
    }

    /// Write a text block with optional background and alignment.
    fn write_block(
        &mut self,
        style: TextStyle,
        layout: Option<LayoutStyle>,
        text: &str,
        indent: f32,
    ) -> Result<()> {
        let width = CONTENT_WIDTH - indent;
        let run = self.text_run(style, text, width)?;
        let line_height = run.line_height();
        let align = layout.as_ref().map(|l| l.h_align()).unwrap_or_default();
        let fill = layout.as_ref().and_then(|l| l.fill_color());

        for line in &run.lines {
            let top = self.reserve(line_height).cursor();
            if let Some(fill) = fill {
                self.page().fill_rect(MARGIN + indent, top, width, line_height, fill);
            }
            if !line.is_empty() {
                self.draw_line(&run, line, MARGIN + indent, top, width, align);
            }
            self.page().advance(line_height);
        }
        self.page().advance(run.size * 0.4);
        Ok(())
    }

    fn styled_block(
        &mut self,
        item: ItemRef<'_>,
        defaults: TextStyle,
        text: &str,
        indent: f32,
    ) -> Result<()> {
        let style = self.base.resolve(item);
        let text_style = match style.as_deref().and_then(|s| s.text_facet()) {
            Some(t) => defaults.merge(t),
            None => defaults,
        };
        let layout = style.as_deref().and_then(|s| s.layout_facet()).cloned();
        let text = self.base.localize(text).into_owned();
        self.write_block(text_style, layout, &text, indent)
    }

    /// Draw one table row; cells are (resolved style, text).
    fn write_row(&mut self, cells: Vec<(Option<Arc<Style>>, String)>) -> Result<()> {
        let columns = self.columns.unwrap_or(cells.len()).max(1);
        let column_width = CONTENT_WIDTH / columns as f32;
        let inner = column_width - 2.0 * CELL_PADDING;

        let mut laid_out = Vec::with_capacity(cells.len());
        for (style, text) in cells.into_iter().take(columns) {
            let (text_style, layout) = style.as_deref().map(Style::split).unwrap_or_default();
            let run = self.text_run(text_style, &text, inner)?;
            laid_out.push((run, layout));
        }
        let row_height = laid_out
            .iter()
            .map(|(run, _)| run.height())
            .fold(0.0f32, f32::max)
            + 2.0 * CELL_PADDING;

        let top = self.reserve(row_height).cursor();
        for (i, (run, layout)) in laid_out.iter().enumerate() {
            let x = MARGIN + i as f32 * column_width;
            if let Some(fill) = layout.fill_color() {
                self.page().fill_rect(x, top, column_width, row_height, fill);
            }
            let bottom = top + row_height;
            let right = x + column_width;
            for (edge, border) in layout.borders.edges() {
                let (from, to) = match edge {
                    "top" => ((x, top), (right, top)),
                    "left" => ((x, top), (x, bottom)),
                    "right" => ((right, top), (right, bottom)),
                    _ => ((x, bottom), (right, bottom)),
                };
                self.page().line(from, to, border.weight(), border.color());
            }
            let mut line_top = top + CELL_PADDING;
            for line in &run.lines {
                if !line.is_empty() {
                    self.draw_line(run, line, x + CELL_PADDING, line_top, inner, layout.h_align());
                }
                line_top += run.line_height();
            }
        }
        self.page().advance(row_height);
        Ok(())
    }

    /// Stamp footers on every page, bottom-aligned at the margin.
    fn stamp_footers(&mut self) {
        if self.footers.is_empty() {
            return;
        }
        let footers = std::mem::take(&mut self.footers);
        let total: f32 = footers.iter().map(TextRun::height).sum();
        let pages = std::mem::take(&mut self.pages);
        for page in pages {
            self.current = Some(page);
            let mut top = PAGE_HEIGHT - MARGIN - total;
            for run in &footers {
                for line in &run.lines {
                    self.draw_line(run, line, MARGIN, top, CONTENT_WIDTH, HorAlignment::Left);
                    top += run.line_height();
                }
            }
            self.close_page();
        }
        self.footers = footers;
    }

    fn info_dictionary(&self) -> lopdf::Dictionary {
        let mut info = dictionary! {
            "Creator" => text_string("reportkit"),
        };
        if let Some(title) = &self.properties.title {
            info.set("Title", text_string(title));
        }
        if let Some(author) = &self.properties.author {
            info.set("Author", text_string(author));
        }
        if let Some(description) = &self.properties.description {
            info.set("Subject", text_string(description));
        }
        if let Some(created) = self.properties.created {
            let date = created.format("D:%Y%m%d%H%M%SZ").to_string();
            info.set("CreationDate", text_string(&date));
        }
        info
    }

    fn assemble(&mut self) -> Result<Vec<u8>> {
        self.close_page();
        if self.pages.is_empty() {
            self.pages.push(Page::new());
        }
        self.stamp_footers();

        let mut doc = PdfDocument::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_dict = self.fonts.write_objects(&mut doc)?;
        let resources_id = doc.add_object(dictionary! { "Font" => font_dict });

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in self.pages.drain(..) {
            let content = deflate(&page.into_content().encode()?)?;
            let content_id =
                doc.add_object(Stream::new(dictionary! { "Filter" => "FlateDecode" }, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let info_id = doc.add_object(self.info_dictionary());
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        debug!("Assembled PDF with {} pages, {} bytes", count, bytes.len());
        Ok(bytes)
    }
}

impl Visitor for PdfFormatter {
    fn visit_document(&mut self, document: &Document) -> Result<()> {
        self.properties = CoreProperties::of(document);
        self.visit_composition(document)
    }

    fn visit_document_case(&mut self, case: &DocumentCase) -> Result<()> {
        debug!("Case {:?} starts a new page", case.name());
        self.close_page();
        self.visit_composition(case)
    }

    fn visit_title(&mut self, title: &Title) -> Result<()> {
        let defaults = TextStyle::new().with_bold(true).with_font_size(TITLE_SIZE);
        self.styled_block(title.as_item(), defaults, &title.text, 0.0)
    }

    fn visit_heading(&mut self, heading: &Heading) -> Result<()> {
        if heading.depth > MAX_HEADING_DEPTH {
            return Err(Error::InvalidHeadingDepth {
                depth: heading.depth,
                max: MAX_HEADING_DEPTH,
            });
        }
        let defaults = TextStyle::new()
            .with_bold(true)
            .with_font_size(heading_size(heading.depth));
        let indent = heading.depth.saturating_sub(1) as f32 * HEADING_INDENT;
        self.styled_block(heading.as_item(), defaults, &heading.text, indent)
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        self.styled_block(paragraph.as_item(), TextStyle::new(), &paragraph.text, 0.0)
    }

    fn visit_footer(&mut self, footer: &Footer) -> Result<()> {
        let style = self.base.resolve(footer.as_item());
        let text_style = style
            .as_deref()
            .and_then(|s| s.text_facet())
            .cloned()
            .unwrap_or_default();
        let text = self.base.localize(&footer.text).into_owned();
        let run = self.text_run(text_style, &text, CONTENT_WIDTH)?;
        self.footers.push(run);
        Ok(())
    }

    fn visit_separator(&mut self, separator: &Separator) -> Result<()> {
        let style = self.base.resolve(separator.as_item());
        let weight = separator.effective_weight(style.as_deref());
        let gap = 6.0;
        let top = self.reserve(gap).cursor();
        if weight.is_visible() {
            let color = style
                .as_deref()
                .and_then(|s| s.layout_facet())
                .and_then(|l| l.borders.bottom.color)
                .unwrap_or(Color::BLACK);
            let y = top + gap / 2.0;
            self.page()
                .line((MARGIN, y), (MARGIN + CONTENT_WIDTH, y), weight, color);
        }
        self.page().advance(gap);
        Ok(())
    }

    fn visit_table(&mut self, table: &Table) -> Result<()> {
        self.tables_seen += 1;
        let header = table.header_row.as_ref().ok_or_else(|| Error::MissingHeaderRow {
            table: table.display_name(self.tables_seen),
        })?;

        if let Some(label) = table.label.as_deref() {
            self.styled_block(table.as_item(), TextStyle::new(), label, 0.0)?;
        }
        self.columns = Some(header.parts().len());
        header.accept(self)?;
        self.visit_composition(table)?;
        self.columns = None;
        self.page().advance(CELL_PADDING * 2.0);
        Ok(())
    }

    fn visit_table_header_row(&mut self, row: &TableHeaderRow) -> Result<()> {
        let row_style = self.base.resolve(row.as_item());
        let cells = row
            .parts()
            .iter()
            .map(|c| {
                (
                    self.base.resolve_within(row_style.as_ref(), c.as_item()),
                    c.text.clone(),
                )
            })
            .collect();
        self.write_row(cells)
    }

    fn visit_table_row(&mut self, row: &TableRow) -> Result<()> {
        let row_style = self.base.resolve(row.as_item());
        let cells = row
            .parts()
            .iter()
            .map(|c| {
                (
                    self.base.resolve_within(row_style.as_ref(), c.as_item()),
                    self.base.localize(&c.text).into_owned(),
                )
            })
            .collect();
        self.write_row(cells)
    }
}

impl Formatter for PdfFormatter {
    fn extension(&self) -> &'static str {
        EXTENSION
    }

    fn content_media_type(&self) -> &'static str {
        MEDIA_TYPE
    }

    fn base(&self) -> &FormatterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormatterBase {
        &mut self.base
    }

    fn initialize_resource(&mut self) -> Result<()> {
        self.fonts = FontBook::new();
        self.pages.clear();
        self.current = None;
        self.footers.clear();
        self.tables_seen = 0;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let bytes = self.assemble()?;
        self.base.write_output(&bytes)
    }

    fn cleanup_resource(&mut self) -> Result<()> {
        self.pages.clear();
        self.current = None;
        self.footers.clear();
        self.columns = None;
        Ok(())
    }
}
