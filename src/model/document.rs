//! Document-level types.

use super::kind::ItemKind;
use super::node::{impl_node, Composition, ItemRef, Node, Styled};
use super::table::Table;
use super::text::{Footer, Heading, Paragraph, Separator, Title};
use crate::style::Style;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default name of a document case when none (or a blank one) is given.
pub const DEFAULT_CASE_NAME: &str = "Sheet";

/// Root of the document tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document label (window title, PDF title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Free text summary (PDF subject)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Top-level items, in order
    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if the document has any items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Top-level document cases.
    pub fn cases(&self) -> impl Iterator<Item = &DocumentCase> {
        self.items.iter().filter_map(|item| match item {
            Item::Case(case) => Some(case),
            _ => None,
        })
    }
}

impl Composition for Document {
    type Part = Item;

    fn parts(&self) -> &[Item] {
        &self.items
    }

    fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    fn for_each_part_mut(&mut self, f: &mut dyn FnMut(&mut Item)) {
        self.items.iter_mut().for_each(f);
    }
}

/// Named subdivision of a document: a sheet in a workbook, a new page in
/// paged formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCase {
    #[serde(default = "default_case_name")]
    name: String,

    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(skip)]
    pub style: Option<Arc<Style>>,
}

fn default_case_name() -> String {
    DEFAULT_CASE_NAME.to_string()
}

impl Default for DocumentCase {
    fn default() -> Self {
        Self {
            name: default_case_name(),
            items: Vec::new(),
            style: None,
        }
    }
}

impl DocumentCase {
    pub fn new(name: impl AsRef<str>) -> Self {
        let mut case = Self::default();
        case.set_name(name);
        case
    }

    pub fn create() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name; blank input is ignored.
    pub fn set_name(&mut self, name: impl AsRef<str>) {
        let name = name.as_ref();
        if !name.trim().is_empty() {
            self.name = name.to_string();
        }
    }

    pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
        self.set_name(name);
        self
    }
}

impl Composition for DocumentCase {
    type Part = Item;

    fn parts(&self) -> &[Item] {
        &self.items
    }

    fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    fn for_each_part_mut(&mut self, f: &mut dyn FnMut(&mut Item)) {
        self.items.iter_mut().for_each(f);
    }
}

impl_node!(Document, Document, ItemKind::Document);
impl_node!(DocumentCase, Case, ItemKind::DocumentCase);

/// Any child of a document or document case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    Case(DocumentCase),
    Title(Title),
    Heading(Heading),
    Paragraph(Paragraph),
    Table(Table),
    Separator(Separator),
    Footer(Footer),
}

impl Item {
    /// Borrowed, type-erased view.
    pub fn as_item(&self) -> ItemRef<'_> {
        match self {
            Item::Case(n) => n.as_item(),
            Item::Title(n) => n.as_item(),
            Item::Heading(n) => n.as_item(),
            Item::Paragraph(n) => n.as_item(),
            Item::Table(n) => n.as_item(),
            Item::Separator(n) => n.as_item(),
            Item::Footer(n) => n.as_item(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.as_item().kind()
    }
}

impl Styled for Item {
    fn style(&self) -> Option<&Arc<Style>> {
        self.as_item().style()
    }

    fn set_style(&mut self, style: Option<Arc<Style>>) {
        match self {
            Item::Case(n) => n.set_style(style),
            Item::Title(n) => n.set_style(style),
            Item::Heading(n) => n.set_style(style),
            Item::Paragraph(n) => n.set_style(style),
            Item::Table(n) => n.set_style(style),
            Item::Separator(n) => n.set_style(style),
            Item::Footer(n) => n.set_style(style),
        }
    }
}

macro_rules! impl_into_item {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Item {
                fn from(node: $ty) -> Self {
                    Item::$variant(node)
                }
            }
        )*
    };
}

impl_into_item! {
    DocumentCase => Case,
    Title => Title,
    Heading => Heading,
    Paragraph => Paragraph,
    Table => Table,
    Separator => Separator,
    Footer => Footer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc.label.is_none());
    }

    #[test]
    fn test_case_name_defaults_and_ignores_blank() {
        let case = DocumentCase::create();
        assert_eq!(case.name(), DEFAULT_CASE_NAME);

        let case = DocumentCase::new("   ");
        assert_eq!(case.name(), DEFAULT_CASE_NAME);

        let case = DocumentCase::new("Totals").with_name("");
        assert_eq!(case.name(), "Totals");
    }

    #[test]
    fn test_parts_keep_insertion_order() {
        let doc = Document::new()
            .add_part(Title::new("T"))
            .add_part(Paragraph::new("P"))
            .add_part(Separator::new())
            .add_part(Footer::new("F"));

        let kinds: Vec<ItemKind> = doc.parts().iter().map(Item::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ItemKind::Title,
                ItemKind::Paragraph,
                ItemKind::Separator,
                ItemKind::Footer
            ]
        );
    }

    #[test]
    fn test_spread_style_shares_reference() {
        let style = Arc::new(Style::text(crate::style::TextStyle::new().with_bold(true)));
        let mut doc = Document::new()
            .add_part(Title::new("T"))
            .add_part(Paragraph::new("P"));
        doc.spread_style_to_parts(&style);

        for part in doc.parts() {
            assert!(Arc::ptr_eq(part.style().unwrap(), &style));
        }
    }

    #[test]
    fn test_json_shape() {
        let doc = Document::new()
            .with_label("Report")
            .add_part(DocumentCase::new("Main").add_part(Heading::new("H", 1)));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["items"][0]["type"], "Case");
        assert_eq!(json["items"][0]["items"][0]["type"], "Heading");

        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back.cases().next().unwrap().name(), "Main");
    }
}
