//! Style registry and resolution.

use super::font::{FontProvider, FontResource, StandardFonts};
use super::number::NumberFormat;
use super::text::TextStyle;
use super::Style;
use crate::error::Result;
use crate::model::ItemRef;
use log::debug;
use std::borrow::Cow;
use std::sync::Arc;

/// Ordered list of registered styles plus the shared number format and
/// font lookup. Configure it before rendering; formatters only read it
/// while traversing.
#[derive(Debug, Clone)]
pub struct StyleService {
    styles: Vec<Arc<Style>>,
    number_format: NumberFormat,
    font_provider: Arc<dyn FontProvider>,
}

impl Default for StyleService {
    fn default() -> Self {
        Self::new(NumberFormat::default())
    }
}

impl StyleService {
    pub fn new(number_format: NumberFormat) -> Self {
        Self {
            styles: Vec::new(),
            number_format,
            font_provider: Arc::new(StandardFonts::new()),
        }
    }

    pub fn with_font_provider(mut self, provider: Arc<dyn FontProvider>) -> Self {
        self.font_provider = provider;
        self
    }

    pub fn set_font_provider(&mut self, provider: Arc<dyn FontProvider>) {
        self.font_provider = provider;
    }

    /// Append one style to the registry.
    pub fn add_style(&mut self, style: impl Into<Arc<Style>>) -> &mut Self {
        self.styles.push(style.into());
        self
    }

    /// Append styles in order. Earlier styles take precedence.
    pub fn add_styles<I>(&mut self, styles: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<Style>>,
    {
        self.styles.extend(styles.into_iter().map(Into::into));
        self
    }

    /// Remove styles by identity.
    pub fn remove_styles(&mut self, styles: &[Arc<Style>]) -> &mut Self {
        self.styles
            .retain(|s| !styles.iter().any(|r| Arc::ptr_eq(s, r)));
        self
    }

    pub fn contains(&self, style: &Arc<Style>) -> bool {
        self.styles.iter().any(|s| Arc::ptr_eq(s, style))
    }

    pub fn styles(&self) -> &[Arc<Style>] {
        &self.styles
    }

    /// Registration index of a style, by identity.
    pub fn position_of(&self, style: &Arc<Style>) -> Option<usize> {
        self.styles.iter().position(|s| Arc::ptr_eq(s, style))
    }

    /// First registered style whose condition matches the item. A style
    /// without a condition matches everything.
    pub fn extract_style_for(&self, item: ItemRef<'_>) -> Option<&Arc<Style>> {
        self.styles.iter().find(|style| {
            style
                .condition
                .as_ref()
                .map_or(true, |condition| condition.matches(item))
        })
    }

    /// Registry match joined with the item's attached style. The attached
    /// style wins per attribute; either one alone is returned as is.
    pub fn resolve(&self, item: ItemRef<'_>) -> Option<Arc<Style>> {
        let resolved = match (self.extract_style_for(item), item.style()) {
            (Some(registered), Some(attached)) if !Arc::ptr_eq(registered, attached) => {
                Some(Arc::new(Style::join(registered, attached)))
            }
            (Some(registered), _) => Some(Arc::clone(registered)),
            (None, attached) => attached.cloned(),
        };
        if resolved.is_some() {
            debug!("Resolved style for {}", item.kind());
        }
        resolved
    }

    /// Resolve an item nested in a styled container (a cell in a row): the
    /// item's own style is joined over the container's.
    pub fn resolve_within(
        &self,
        container: Option<&Arc<Style>>,
        item: ItemRef<'_>,
    ) -> Option<Arc<Style>> {
        match (container, self.resolve(item)) {
            (Some(outer), Some(inner)) => Some(Arc::new(Style::join(outer, &inner))),
            (Some(outer), None) => Some(Arc::clone(outer)),
            (None, inner) => inner,
        }
    }

    pub fn number_format(&self) -> &NumberFormat {
        &self.number_format
    }

    pub fn set_number_format(&mut self, format: NumberFormat) {
        self.number_format = format;
    }

    /// Shared localization step for cell and paragraph text.
    pub fn localize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.number_format.localize(text)
    }

    pub fn font_provider(&self) -> &Arc<dyn FontProvider> {
        &self.font_provider
    }

    /// Font for a text style; the style's own locale wins over the default.
    pub fn font_for(&self, style: &TextStyle, default_locale: &str) -> Result<FontResource> {
        let locale = style.locale.as_deref().unwrap_or(default_locale);
        self.font_provider.font_resource(style, locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Composition, Node, Paragraph, Styled, Table, TableRow, Title};
    use crate::style::{Color, LayoutStyle, StyleCondition};

    fn bold() -> Arc<Style> {
        Arc::new(Style::text(TextStyle::new().with_bold(true)))
    }

    #[test]
    fn test_first_match_wins() {
        let title_style = Arc::new(
            Style::text(TextStyle::new().with_font_size(20))
                .with_condition(StyleCondition::of_kind(crate::model::ItemKind::Title)),
        );
        let fallback = bold();

        let mut service = StyleService::default();
        service.add_styles([Arc::clone(&title_style), Arc::clone(&fallback)]);

        let title = Title::new("t");
        let para = Paragraph::new("p");
        assert!(Arc::ptr_eq(service.extract_style_for(title.as_item()).unwrap(), &title_style));
        assert!(Arc::ptr_eq(service.extract_style_for(para.as_item()).unwrap(), &fallback));
    }

    #[test]
    fn test_unconditioned_first_masks_later() {
        let fallback = bold();
        let specific = Arc::new(
            Style::text(TextStyle::new()).with_condition(StyleCondition::of_kind(
                crate::model::ItemKind::Title,
            )),
        );
        let mut service = StyleService::default();
        service.add_styles([Arc::clone(&fallback), specific]);

        let title = Title::new("t");
        assert!(Arc::ptr_eq(service.extract_style_for(title.as_item()).unwrap(), &fallback));
    }

    #[test]
    fn test_fallback_to_attached() {
        let attached = bold();
        let service = StyleService::default();
        let para = Paragraph::new("p").with_style(Arc::clone(&attached));
        assert!(service.extract_style_for(para.as_item()).is_none());
        assert!(Arc::ptr_eq(&service.resolve(para.as_item()).unwrap(), &attached));
        assert!(service.resolve(Paragraph::new("x").as_item()).is_none());
    }

    #[test]
    fn test_remove_and_contains() {
        let a = bold();
        let b = bold();
        let mut service = StyleService::default();
        service.add_styles([Arc::clone(&a), Arc::clone(&b)]);
        assert!(service.contains(&a));

        service.remove_styles(&[Arc::clone(&a)]);
        assert!(!service.contains(&a));
        assert!(service.contains(&b));
        assert_eq!(service.position_of(&b), Some(0));
    }

    #[test]
    fn test_resolve_within_joins() {
        let row_style = Arc::new(Style::layout(
            LayoutStyle::new().with_fill_foreground(Color::LIGHT_GREEN),
        ));
        let table = Table::new().add_part(
            TableRow::from_texts(["a"]).with_style(Arc::clone(&row_style)),
        );
        let row = &table.rows()[0];
        let mut cell = row.cells[0].clone();
        cell.set_style(Some(bold()));

        let service = StyleService::default();
        let row_resolved = service.resolve(row.as_item());
        let resolved = service
            .resolve_within(row_resolved.as_ref(), cell.as_item())
            .unwrap();
        assert_eq!(resolved.text_facet().unwrap().bold, Some(true));
        assert_eq!(
            resolved.layout_facet().unwrap().fill_foreground,
            Some(Color::LIGHT_GREEN)
        );
    }

    #[test]
    fn test_registered_and_attached_are_joined() {
        let fill = Arc::new(
            Style::layout(LayoutStyle::new().with_fill_foreground(Color::GREY_25_PERCENT))
                .with_condition(StyleCondition::of_kind(crate::model::ItemKind::Paragraph)),
        );
        let mut service = StyleService::default();
        service.add_style(Arc::clone(&fill));

        let para = Paragraph::new("p").with_style(bold());
        let resolved = service.resolve(para.as_item()).unwrap();
        assert_eq!(resolved.text_facet().unwrap().bold, Some(true));
        assert_eq!(
            resolved.layout_facet().unwrap().fill_foreground,
            Some(Color::GREY_25_PERCENT)
        );

        let same = Paragraph::new("p").with_style(Arc::clone(&fill));
        assert!(Arc::ptr_eq(&service.resolve(same.as_item()).unwrap(), &fill));
    }

    #[test]
    fn test_localize_uses_number_format() {
        let service = StyleService::default();
        assert_eq!(service.localize("1234"), "1,234");
    }
}
