//! WordprocessingML package writer (`docx`).

use super::body::{
    write_blocks, write_paragraph, write_style_definitions, Block, Para, PAGE_HEIGHT,
    PAGE_MARGIN, PAGE_WIDTH,
};
use crate::error::Result;
use crate::render::xml::{CoreProperties, Package, XmlWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const FOOTER_ID: &str = "rIdFooter1";

pub fn write_docx(blocks: &[Block], footers: &[Para], properties: &CoreProperties) -> Result<Vec<u8>> {
    let mut package = Package::new();
    package.add("[Content_Types].xml", content_types(!footers.is_empty())?);
    package.add("_rels/.rels", root_rels()?);
    package.add("docProps/core.xml", properties.core_xml()?);
    package.add("word/document.xml", document_xml(blocks, !footers.is_empty())?);
    package.add("word/styles.xml", styles_xml()?);
    package.add(
        "word/_rels/document.xml.rels",
        document_rels(!footers.is_empty())?,
    );
    if !footers.is_empty() {
        package.add("word/footer1.xml", footer_xml(footers)?);
    }
    package.finish()
}

fn content_types(with_footer: bool) -> Result<Vec<u8>> {
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
    xml.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/word/document.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
            ),
        ],
    )?;
    xml.empty(
        "Override",
        &[
            ("PartName", "/word/styles.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
            ),
        ],
    )?;
    if with_footer {
        xml.empty(
            "Override",
            &[
                ("PartName", "/word/footer1.xml"),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
                ),
            ],
        )?;
    }
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

fn root_rels() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("Relationships", &[("xmlns", REL_NS)])?;
    let office = format!("{}/officeDocument", REL_TYPE);
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", office.as_str()),
            ("Target", "word/document.xml"),
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

fn document_rels(with_footer: bool) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("Relationships", &[("xmlns", REL_NS)])?;
    let styles = format!("{}/styles", REL_TYPE);
    xml.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", styles.as_str()), ("Target", "styles.xml")],
    )?;
    if with_footer {
        let footer = format!("{}/footer", REL_TYPE);
        xml.empty(
            "Relationship",
            &[
                ("Id", FOOTER_ID),
                ("Type", footer.as_str()),
                ("Target", "footer1.xml"),
            ],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.into_bytes())
}

fn document_xml(blocks: &[Block], with_footer: bool) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
    xml.start("w:body", &[])?;
    write_blocks(&mut xml, blocks)?;

    xml.start("w:sectPr", &[])?;
    if with_footer {
        xml.empty(
            "w:footerReference",
            &[("w:type", "default"), ("r:id", FOOTER_ID)],
        )?;
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
    xml.end("w:document")?;
    Ok(xml.into_bytes())
}

fn styles_xml() -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("w:styles", &[("xmlns:w", W_NS)])?;
    write_style_definitions(&mut xml)?;
    xml.end("w:styles")?;
    Ok(xml.into_bytes())
}

fn footer_xml(footers: &[Para]) -> Result<Vec<u8>> {
    let mut xml = XmlWriter::new();
    xml.declaration("UTF-8")?;
    xml.start("w:ftr", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
    for para in footers {
        write_paragraph(&mut xml, para)?;
    }
    xml.end("w:ftr")?;
    Ok(xml.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_package_parts() {
        let blocks = vec![Block::Paragraph(Para::new("Hello").with_style_id("Title"))];
        let bytes = write_docx(&blocks, &[], &CoreProperties::default()).unwrap();

        let document = part(&bytes, "word/document.xml");
        assert!(document.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(document.contains(r#"<w:pgSz w:w="11906" w:h="16838"/>"#));
        assert!(!document.contains("w:footerReference"));

        let styles = part(&bytes, "word/styles.xml");
        assert!(styles.contains(r#"w:styleId="Heading9""#));

        let mut archive = zip::ZipArchive::new(Cursor::new(&bytes[..])).unwrap();
        assert!(archive.by_name("word/footer1.xml").is_err());
    }

    #[test]
    fn test_footer_part() {
        let footers = vec![Para::new("Page footer").with_style_id("Footer")];
        let bytes = write_docx(&[], &footers, &CoreProperties::default()).unwrap();
        assert!(part(&bytes, "word/document.xml").contains(r#"r:id="rIdFooter1""#));
        assert!(part(&bytes, "word/footer1.xml").contains("Page footer"));
        assert!(part(&bytes, "[Content_Types].xml").contains("/word/footer1.xml"));
    }
}
