//! HTML formatter.
//!
//! Registered styles become CSS classes (`.s0`, `.s1`, ... in registration
//! order) in the document head; attached styles are rendered inline and
//! override the class. In HTML4 mode there is no style sheet: each element
//! carries presentational attributes and its text is wrapped in `<font>`.

use super::formatter::{Formatter, FormatterBase};
use super::visitor::{Visitable, Visitor};
use super::FormatterContext;
use crate::error::{Error, Result};
use crate::model::{
    Document, DocumentCase, Footer, Heading, ItemRef, Node, Paragraph, Separator,
    Table, TableCell, TableHeaderCell, TableHeaderRow, TableRow, Title,
};
use crate::style::{
    BorderStyle, BorderWeight, Color, HorAlignment, LayoutStyle, Style, TextStyle, VertAlignment,
};
use log::debug;
use quick_xml::escape::escape;
use std::sync::Arc;

/// Deepest heading HTML can express.
pub const MAX_HEADING_DEPTH: u8 = 6;

#[derive(Debug, Default)]
struct Head {
    title: String,
    author: Option<String>,
    description: Option<String>,
}

/// Attributes of an opening tag plus the markup wrapped around its text.
#[derive(Debug, Default)]
struct Markup {
    attrs: String,
    open: String,
    close: String,
}

pub struct HtmlFormatter {
    base: FormatterBase,
    html4_tags: bool,
    head: Head,
    body: Option<String>,
}

impl HtmlFormatter {
    pub const EXTENSION: &'static str = "html";
    pub const MEDIA_TYPE: &'static str = "text/html";

    pub fn new(context: FormatterContext) -> Result<Self> {
        Ok(Self {
            base: FormatterBase::new(context)?,
            html4_tags: false,
            head: Head::default(),
            body: None,
        })
    }

    /// Style elements with HTML4 presentational markup instead of CSS.
    pub fn with_html4_tags(mut self, enabled: bool) -> Self {
        self.html4_tags = enabled;
        self
    }

    pub fn uses_html4_tags(&self) -> bool {
        self.html4_tags
    }

    fn body(&mut self) -> Result<&mut String> {
        self.body
            .as_mut()
            .ok_or_else(|| Error::Render("HTML body is not initialized".to_string()))
    }

    /// Markup for an item. `extra` is inline CSS appended after the item's
    /// own declarations.
    fn markup(&self, item: ItemRef<'_>, extra: &[String]) -> Markup {
        if self.html4_tags {
            return match self.base.resolve(item) {
                Some(style) => html4_markup(&style),
                None => Markup::default(),
            };
        }

        let service = self.base.style_service();
        let registered = service.extract_style_for(item);
        let mut attrs = String::new();
        if let Some(position) = registered.and_then(|style| service.position_of(style)) {
            debug!("Applying class s{} to {}", position, item.kind());
            attrs.push_str(&format!(" class=\"s{}\"", position));
        }

        let attached = match (registered, item.style()) {
            (Some(r), Some(a)) if Arc::ptr_eq(r, a) => None,
            (_, attached) => attached,
        };
        let mut css = attached.map(|style| css_declarations(style)).unwrap_or_default();
        // `extra` replaces declarations of the same property.
        css.retain(|decl| !extra.iter().any(|e| property(e) == property(decl)));
        css.extend(extra.iter().cloned());
        if !css.is_empty() {
            attrs.push_str(&format!(" style=\"{}\"", escape(css.join("; ").as_str())));
        }
        Markup {
            attrs,
            ..Markup::default()
        }
    }

    fn element(&mut self, tag: &str, item: ItemRef<'_>, text: &str) -> Result<()> {
        let markup = self.markup(item, &[]);
        let text = escape(&*self.base.localize(text)).into_owned();
        self.body()?.push_str(&format!(
            "<{tag}{}>{}{text}{}</{tag}>\n",
            markup.attrs, markup.open, markup.close
        ));
        Ok(())
    }

    fn cell(&mut self, tag: &str, item: ItemRef<'_>, text: &str) -> Result<()> {
        let markup = self.markup(item, &[]);
        self.body()?.push_str(&format!(
            "<{tag}{}>{}{}{}</{tag}>",
            markup.attrs, markup.open, text, markup.close
        ));
        Ok(())
    }

    fn head_markup(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str(&format!(
            "<meta charset=\"{}\">\n",
            self.base.encoding().name()
        ));
        if let Some(author) = &self.head.author {
            out.push_str(&format!(
                "<meta name=\"author\" content=\"{}\">\n",
                escape(author.as_str())
            ));
        }
        if let Some(description) = &self.head.description {
            out.push_str(&format!(
                "<meta name=\"description\" content=\"{}\">\n",
                escape(description.as_str())
            ));
        }
        out.push_str(&format!("<title>{}</title>\n", escape(self.head.title.as_str())));

        let styles = self.base.style_service().styles();
        if !styles.is_empty() && !self.html4_tags {
            out.push_str("<style>\n");
            for (i, style) in styles.iter().enumerate() {
                out.push_str(&format!(
                    ".s{} {{ {} }}\n",
                    i,
                    css_declarations(style).join("; ")
                ));
            }
            out.push_str("</style>\n");
        }
        out.push_str("</head>\n<body>\n");
        out
    }
}

fn property(declaration: &str) -> &str {
    declaration.split(':').next().unwrap_or(declaration).trim()
}

/// HTML4 `<font size>` step (1 to 7) for a point size.
fn html4_font_size(points: u16) -> u8 {
    match points {
        0..=8 => 1,
        9..=10 => 2,
        11..=12 => 3,
        13..=14 => 4,
        15..=18 => 5,
        19..=24 => 6,
        _ => 7,
    }
}

/// Presentational attributes and text wrappers for a style.
fn html4_markup(style: &Style) -> Markup {
    let mut markup = Markup::default();

    if let Some(layout) = style.layout_facet() {
        markup.attrs = html4_attributes(layout);
    }

    if let Some(text) = style.text_facet() {
        let font = html4_font(text);
        if !font.is_empty() {
            markup.open.push_str(&format!("<font{}>", font));
        }
        let emphasis = [
            (text.is_bold(), "b"),
            (text.is_italic(), "i"),
            (text.is_underline(), "u"),
        ];
        for (_, tag) in emphasis.iter().filter(|(on, _)| *on) {
            markup.open.push_str(&format!("<{}>", tag));
        }
        for (_, tag) in emphasis.iter().rev().filter(|(on, _)| *on) {
            markup.close.push_str(&format!("</{}>", tag));
        }
        if !font.is_empty() {
            markup.close.push_str("</font>");
        }
    }
    markup
}

fn html4_font(text: &TextStyle) -> String {
    let mut attrs = String::new();
    match text.font_name_resource.as_deref() {
        Some(name) => attrs.push_str(&format!(" face=\"{}\"", escape(name))),
        None if text.font_family.is_some() => {
            attrs.push_str(&format!(" face=\"{}\"", text.family().css_generic()))
        }
        None => {}
    }
    if let Some(size) = text.font_size {
        attrs.push_str(&format!(" size=\"{}\"", html4_font_size(size)));
    }
    if let Some(color) = text.color {
        attrs.push_str(&format!(" color=\"{}\"", color.to_css()));
    }
    attrs
}

/// `align`, `bgcolor` and `border` attributes, in that order.
fn html4_attributes(layout: &LayoutStyle) -> String {
    let mut attrs = String::new();
    let align = match layout.horizontal_alignment {
        Some(HorAlignment::Left) => Some("left"),
        Some(HorAlignment::Center) => Some("center"),
        Some(HorAlignment::Right) => Some("right"),
        Some(HorAlignment::Fill | HorAlignment::Justify) => Some("justify"),
        Some(HorAlignment::General) | None => None,
    };
    if let Some(align) = align {
        attrs.push_str(&format!(" align=\"{}\"", align));
    }
    if let Some(fill) = layout.fill_color() {
        attrs.push_str(&format!(" bgcolor=\"{}\"", fill.to_css()));
    }
    let border = layout
        .borders
        .edges()
        .iter()
        .map(|(_, edge)| border_width(edge.weight()))
        .max()
        .unwrap_or(0);
    if border > 0 {
        attrs.push_str(&format!(" border=\"{}\"", border));
    }
    attrs
}

/// Table style used in HTML4 mode when nothing resolves.
fn html4_default_table_style() -> Style {
    Style::layout(
        LayoutStyle::new().with_border_bottom(BorderStyle::new(Color::BLACK, BorderWeight::Thin)),
    )
}

/// CSS declarations for a style, sorted by property.
pub fn css_declarations(style: &Style) -> Vec<String> {
    let mut decls = Vec::new();

    if let Some(text) = style.text_facet() {
        let generic = text.family().css_generic();
        match text.font_name_resource.as_deref() {
            Some(name) => decls.push(format!("font-family: {},{}", name, generic)),
            None if text.font_family.is_some() => decls.push(format!("font-family: {}", generic)),
            None => {}
        }
        if let Some(size) = text.font_size {
            decls.push(format!("font-size: {}pt", size));
        }
        if text.is_bold() {
            decls.push("font-weight: bold".to_string());
        }
        if text.is_italic() {
            decls.push("font-style: italic".to_string());
        }
        if text.is_underline() {
            decls.push("text-decoration: underline".to_string());
        }
        if let Some(color) = text.color {
            decls.push(format!("color: {}", color.to_css()));
        }
    }

    if let Some(layout) = style.layout_facet() {
        if let Some(fill) = layout.fill_color() {
            decls.push(format!("background-color: {}", fill.to_css()));
        }
        for (edge, border) in layout.borders.edges() {
            if border.is_visible() {
                decls.push(format!("border-{}: {}", edge, css_border(&border)));
            }
        }
        if let Some(align) = layout.horizontal_alignment {
            let value = match align {
                HorAlignment::General => None,
                HorAlignment::Left => Some("left"),
                HorAlignment::Center => Some("center"),
                HorAlignment::Right => Some("right"),
                HorAlignment::Fill | HorAlignment::Justify => Some("justify"),
            };
            if let Some(value) = value {
                decls.push(format!("text-align: {}", value));
            }
        }
        if let Some(align) = layout.vertical_alignment {
            let value = match align {
                VertAlignment::Top => "top",
                VertAlignment::Center | VertAlignment::Justify => "middle",
                VertAlignment::Bottom => "bottom",
            };
            decls.push(format!("vertical-align: {}", value));
        }
        if let Some(width) = layout.width {
            decls.push(format!("width: {}px", width));
        }
        if layout.shrink_to_fit == Some(true) {
            decls.push("white-space: nowrap".to_string());
        }
    }

    decls.sort();
    decls
}

/// Pixel width of a border weight.
fn border_width(weight: BorderWeight) -> u32 {
    match weight {
        BorderWeight::None => 0,
        BorderWeight::Thin
        | BorderWeight::Hair
        | BorderWeight::Dashed
        | BorderWeight::Dotted => 1,
        BorderWeight::Medium => 2,
        BorderWeight::Thick | BorderWeight::Double => 3,
    }
}

fn css_border(border: &BorderStyle) -> String {
    let line = match border.weight() {
        BorderWeight::None => "none",
        BorderWeight::Dashed => "dashed",
        BorderWeight::Dotted => "dotted",
        BorderWeight::Double => "double",
        _ => "solid",
    };
    format!(
        "{}px {} {}",
        border_width(border.weight()),
        line,
        border.color().to_css()
    )
}

impl Visitor for HtmlFormatter {
    fn visit_document(&mut self, document: &Document) -> Result<()> {
        self.head = Head {
            title: document.label.clone().unwrap_or_default(),
            author: document.author.clone(),
            description: document.description.clone(),
        };
        self.visit_composition(document)
    }

    fn visit_document_case(&mut self, case: &DocumentCase) -> Result<()> {
        let attrs = self.markup(case.as_item(), &[]).attrs;
        let name = escape(case.name()).into_owned();
        self.body()?
            .push_str(&format!("<section data-name=\"{}\"{}>\n", name, attrs));
        self.visit_composition(case)?;
        self.body()?.push_str("</section>\n");
        Ok(())
    }

    fn visit_title(&mut self, title: &Title) -> Result<()> {
        self.element("h1", title.as_item(), &title.text)
    }

    fn visit_heading(&mut self, heading: &Heading) -> Result<()> {
        if heading.depth > MAX_HEADING_DEPTH {
            return Err(Error::InvalidHeadingDepth {
                depth: heading.depth,
                max: MAX_HEADING_DEPTH,
            });
        }
        let tag = format!("h{}", heading.depth.max(1));
        self.element(&tag, heading.as_item(), &heading.text)
    }

    fn visit_paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        self.element("p", paragraph.as_item(), &paragraph.text)
    }

    fn visit_separator(&mut self, separator: &Separator) -> Result<()> {
        let resolved = self.base.resolve(separator.as_item());
        let weight = separator.effective_weight(resolved.as_deref());
        let color = resolved
            .as_deref()
            .and_then(|s| s.layout_facet())
            .and_then(|l| l.borders.bottom.color)
            .unwrap_or(Color::BLACK);
        let line = BorderStyle::new(color, weight);

        let attrs = if self.html4_tags {
            match border_width(weight) {
                0 => " size=\"0\" noshade".to_string(),
                width => format!(" size=\"{}\" color=\"{}\" noshade", width, color.to_css()),
            }
        } else {
            let border = format!("border-bottom: {}", css_border(&line));
            self.markup(separator.as_item(), &[border]).attrs
        };
        self.body()?.push_str(&format!("<hr{}>\n", attrs));
        Ok(())
    }

    fn visit_footer(&mut self, footer: &Footer) -> Result<()> {
        self.element("footer", footer.as_item(), &footer.text)
    }

    fn visit_table(&mut self, table: &Table) -> Result<()> {
        let attrs = if self.html4_tags {
            let style = self
                .base
                .resolve(table.as_item())
                .unwrap_or_else(|| Arc::new(html4_default_table_style()));
            html4_markup(&style).attrs
        } else {
            self.markup(table.as_item(), &[]).attrs
        };
        let body = self.body()?;
        body.push_str(&format!("<table{}>\n", attrs));
        if let Some(label) = table.label.as_deref() {
            body.push_str(&format!("<caption>{}</caption>\n", escape(label)));
        }
        if let Some(header) = &table.header_row {
            header.accept(self)?;
        }
        self.body()?.push_str("<tbody>\n");
        self.visit_composition(table)?;
        self.body()?.push_str("</tbody>\n</table>\n");
        Ok(())
    }

    fn visit_table_header_row(&mut self, row: &TableHeaderRow) -> Result<()> {
        let attrs = self.markup(row.as_item(), &[]).attrs;
        self.body()?.push_str(&format!("<thead>\n<tr{}>", attrs));
        self.visit_composition(row)?;
        self.body()?.push_str("</tr>\n</thead>\n");
        Ok(())
    }

    fn visit_table_header_cell(&mut self, cell: &TableHeaderCell) -> Result<()> {
        let text = escape(cell.text.as_str()).into_owned();
        self.cell("th", cell.as_item(), &text)
    }

    fn visit_table_row(&mut self, row: &TableRow) -> Result<()> {
        let attrs = self.markup(row.as_item(), &[]).attrs;
        self.body()?.push_str(&format!("<tr{}>", attrs));
        self.visit_composition(row)?;
        self.body()?.push_str("</tr>\n");
        Ok(())
    }

    fn visit_table_cell(&mut self, cell: &TableCell) -> Result<()> {
        let text = escape(&*self.base.localize(&cell.text)).into_owned();
        self.cell("td", cell.as_item(), &text)
    }
}

impl Formatter for HtmlFormatter {
    fn extension(&self) -> &'static str {
        Self::EXTENSION
    }

    fn content_media_type(&self) -> &'static str {
        Self::MEDIA_TYPE
    }

    fn base(&self) -> &FormatterBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut FormatterBase {
        &mut self.base
    }

    fn initialize_resource(&mut self) -> Result<()> {
        self.body = Some(String::new());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let body = self
            .body
            .take()
            .ok_or_else(|| Error::Render("HTML body is not initialized".to_string()))?;
        let mut page = self.head_markup();
        page.push_str(&body);
        page.push_str("</body>\n</html>\n");
        let encoded = self.base.encode_with_references(&page).into_owned();
        self.base.write_output(&encoded)
    }

    fn cleanup_resource(&mut self) -> Result<()> {
        self.body = None;
        Ok(())
    }
}
