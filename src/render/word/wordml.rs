//! WordprocessingML 2003 flat XML writer for the legacy `doc` extension.

use super::body::{
    write_blocks, write_paragraph, write_style_definitions, Block, Para, PAGE_HEIGHT,
    PAGE_MARGIN, PAGE_WIDTH,
};
use crate::error::Result;
use crate::render::xml::{CoreProperties, XmlWriter};

const W_NS: &str = "http://schemas.microsoft.com/office/word/2003/wordml";
const O_NS: &str = "urn:schemas-microsoft-com:office:office";

/// Serialize the body as WordML text. The caller encodes it.
pub fn write_word_ml(
    blocks: &[Block],
    footers: &[Para],
    properties: &CoreProperties,
    encoding: &str,
) -> Result<String> {
    let mut xml = XmlWriter::new();
    xml.declaration(encoding)?;
    xml.raw("\n<?mso-application progid=\"Word.Document\"?>\n");
    xml.start(
        "w:wordDocument",
        &[("xmlns:w", W_NS), ("xmlns:o", O_NS), ("xml:space", "preserve")],
    )?;

    xml.start("o:DocumentProperties", &[])?;
    if let Some(title) = &properties.title {
        xml.leaf("o:Title", &[], title)?;
    }
    if let Some(author) = &properties.author {
        xml.leaf("o:Author", &[], author)?;
    }
    if let Some(description) = &properties.description {
        xml.leaf("o:Description", &[], description)?;
    }
    if let Some(created) = properties.created_w3c() {
        xml.leaf("o:Created", &[], &created)?;
    }
    xml.end("o:DocumentProperties")?;

    xml.start("w:styles", &[])?;
    write_style_definitions(&mut xml)?;
    xml.end("w:styles")?;

    xml.start("w:body", &[])?;
    write_blocks(&mut xml, blocks)?;

    xml.start("w:sectPr", &[])?;
    if !footers.is_empty() {
        xml.start("w:ftr", &[("w:type", "odd")])?;
        for para in footers {
            write_paragraph(&mut xml, para)?;
        }
        xml.end("w:ftr")?;
    }
    let width = PAGE_WIDTH.to_string();
    let height = PAGE_HEIGHT.to_string();
    xml.empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
    let margin = PAGE_MARGIN.to_string();
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", margin.as_str()),
            ("w:right", margin.as_str()),
            ("w:bottom", margin.as_str()),
            ("w:left", margin.as_str()),
            ("w:header", "709"),
            ("w:footer", "709"),
            ("w:gutter", "0"),
        ],
    )?;
    xml.end("w:sectPr")?;
    xml.end("w:body")?;

    xml.end("w:wordDocument")?;
    xml.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_ml_structure() {
        let properties = CoreProperties {
            title: Some("Minutes".to_string()),
            ..CoreProperties::default()
        };
        let blocks = vec![Block::Paragraph(Para::new("Agenda"))];
        let footers = vec![Para::new("Confidential")];
        let xml = write_word_ml(&blocks, &footers, &properties, "windows-1252").unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"windows-1252\""));
        assert!(xml.contains("<?mso-application progid=\"Word.Document\"?>"));
        assert!(xml.contains("<o:Title>Minutes</o:Title>"));
        assert!(xml.contains(r#"<w:ftr w:type="odd">"#));
        assert!(xml.contains("Agenda"));
        assert!(xml.ends_with("</w:wordDocument>"));
    }
}
