//! Small XML and zip-package helpers shared by the office formats.

use crate::error::Result;
use crate::model::Document;
use crate::style::{FontFamily, TextStyle};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Event-level XML writer over an in-memory buffer. Text and attribute
/// values are escaped.
pub(crate) struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
        }
    }

    pub(crate) fn declaration(&mut self, encoding: &str) -> Result<()> {
        self.inner.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some(encoding),
            Some("yes"),
        )))?;
        Ok(())
    }

    /// Pre-escaped markup written as-is.
    pub(crate) fn raw(&mut self, markup: &str) {
        self.inner.get_mut().extend_from_slice(markup.as_bytes());
    }

    pub(crate) fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.inner.write_event(Event::Start(element(name, attrs)))?;
        Ok(())
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.inner.write_event(Event::Empty(element(name, attrs)))?;
        Ok(())
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<()> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<()> {
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// `<name attrs>text</name>`
    pub(crate) fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    pub(crate) fn into_string(self) -> Result<String> {
        Ok(String::from_utf8(self.into_bytes())?)
    }
}

fn element<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &(key, value) in attrs {
        start.push_attribute((key, value));
    }
    start
}

/// Parts of a zip-based office package, written in insertion order.
#[derive(Default)]
pub(crate) struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, name: impl Into<String>, content: Vec<u8>) {
        self.parts.push((name.into(), content));
    }

    pub(crate) fn finish(self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in self.parts {
            debug!("Writing package part {}", name);
            zip.start_file(name, options)?;
            zip.write_all(&content)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

/// Descriptive document properties carried into office packages.
#[derive(Debug, Clone, Default)]
pub(crate) struct CoreProperties {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl CoreProperties {
    /// Properties of a document; the creation time defaults to now.
    pub(crate) fn of(document: &Document) -> Self {
        Self {
            title: document.label.clone(),
            author: document.author.clone(),
            description: document.description.clone(),
            created: Some(document.created.unwrap_or_else(Utc::now)),
        }
    }

    pub(crate) fn created_w3c(&self) -> Option<String> {
        self.created
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// `docProps/core.xml` of an OPC package.
    pub(crate) fn core_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlWriter::new();
        xml.declaration("UTF-8")?;
        xml.start(
            "cp:coreProperties",
            &[
                (
                    "xmlns:cp",
                    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
                ),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:dcterms", "http://purl.org/dc/terms/"),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ],
        )?;
        if let Some(title) = &self.title {
            xml.leaf("dc:title", &[], title)?;
        }
        if let Some(author) = &self.author {
            xml.leaf("dc:creator", &[], author)?;
        }
        if let Some(description) = &self.description {
            xml.leaf("dc:description", &[], description)?;
        }
        if let Some(created) = self.created_w3c() {
            xml.leaf("dcterms:created", &[("xsi:type", "dcterms:W3CDTF")], &created)?;
        }
        xml.end("cp:coreProperties")?;
        Ok(xml.into_bytes())
    }
}

/// Font face name for office formats: the explicit resource name, else a
/// common face of the family.
pub(crate) fn office_font_name(text: &TextStyle) -> String {
    match text.font_name_resource.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => match text.family() {
            FontFamily::Serif => "Times New Roman",
            FontFamily::SansSerif => "Arial",
            FontFamily::Monospaced => "Courier New",
        }
        .to_string(),
    }
}
