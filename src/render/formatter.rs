//! The converter contract shared by every output format.

use super::context::FormatterContext;
use super::output::{DocumentHolder, OutputSink, SinkWriter};
use super::visitor::{Visitable, Visitor};
use crate::error::{Error, Result};
use crate::model::{Document, ItemRef};
use crate::style::{Style, StyleService};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use log::{debug, error, info};
use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;

/// Lifecycle of a single render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterState {
    Unopened,
    ResourceAcquired,
    Traversing,
    Finalized,
}

impl FormatterState {
    pub fn name(self) -> &'static str {
        match self {
            FormatterState::Unopened => "unopened",
            FormatterState::ResourceAcquired => "resource acquired",
            FormatterState::Traversing => "traversing",
            FormatterState::Finalized => "finalized",
        }
    }
}

/// State every formatter carries: configuration, styles, sink and
/// lifecycle. Concrete formatters embed one and expose it through
/// [`Formatter::base`].
#[derive(Debug)]
pub struct FormatterBase {
    context: FormatterContext,
    encoding: &'static Encoding,
    style_service: StyleService,
    sink: Option<OutputSink>,
    writer: Option<SinkWriter>,
    state: FormatterState,
}

impl FormatterBase {
    /// Fails when the context names an unknown encoding.
    pub fn new(context: FormatterContext) -> Result<Self> {
        let encoding = context.output_encoding()?;
        let style_service = StyleService::new(context.number_format.clone());
        Ok(Self {
            context,
            encoding,
            style_service,
            sink: None,
            writer: None,
            state: FormatterState::Unopened,
        })
    }

    pub fn context(&self) -> &FormatterContext {
        &self.context
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn style_service(&self) -> &StyleService {
        &self.style_service
    }

    pub fn state(&self) -> FormatterState {
        self.state
    }

    fn expect_state(&self, expected: FormatterState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }

    fn set_state(&mut self, state: FormatterState) {
        debug!("Formatter state {} -> {}", self.state.name(), state.name());
        self.state = state;
    }

    /// Registry match joined with the item's attached style.
    pub fn resolve(&self, item: ItemRef<'_>) -> Option<Arc<Style>> {
        self.style_service.resolve(item)
    }

    /// Item style joined over an enclosing container's style.
    pub fn resolve_within(
        &self,
        container: Option<&Arc<Style>>,
        item: ItemRef<'_>,
    ) -> Option<Arc<Style>> {
        self.style_service.resolve_within(container, item)
    }

    pub fn localize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.style_service.localize(text)
    }

    /// Encode text, failing on the first unmappable character.
    pub fn encode_strict<'a>(&self, text: &'a str) -> Result<Cow<'a, [u8]>> {
        let (bytes, had_errors) = encode_text(self.encoding, text);
        if had_errors {
            let glyph = text
                .chars()
                .find(|c| encode_text(self.encoding, c.encode_utf8(&mut [0; 4])).1)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(Error::Encoding(format!(
                "Character {:?} can't be encoded as {}",
                glyph,
                self.encoding.name()
            )));
        }
        Ok(bytes)
    }

    /// Encode text, writing unmappable characters as numeric character
    /// references.
    pub fn encode_with_references<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        encode_text(self.encoding, text).0
    }

    /// Append bytes to the opened sink.
    pub fn write_output(&mut self, bytes: &[u8]) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => {
                writer.write_all(bytes)?;
                Ok(())
            }
            None => Err(Error::InvalidState {
                expected: FormatterState::Traversing.name(),
                actual: self.state.name(),
            }),
        }
    }

    fn open_output(&mut self, extension: &str) -> Result<()> {
        let sink = self.sink.take().unwrap_or_default();
        self.writer = Some(SinkWriter::open(sink, extension)?);
        Ok(())
    }

    fn abandon(&mut self) {
        self.writer = None;
        self.set_state(FormatterState::Finalized);
    }
}

/// Encode `text`, reporting whether any character was unmappable.
/// encoding_rs has no UTF-16 encoder, so both byte orders are written here
/// without a byte order mark.
fn encode_text<'a>(encoding: &'static Encoding, text: &'a str) -> (Cow<'a, [u8]>, bool) {
    if encoding == UTF_16LE {
        let bytes = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        (Cow::Owned(bytes), false)
    } else if encoding == UTF_16BE {
        let bytes = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        (Cow::Owned(bytes), false)
    } else {
        let (bytes, _, had_errors) = encoding.encode(text);
        (bytes, had_errors)
    }
}

/// A format converter: a [`Visitor`] with a resource lifecycle.
///
/// Implementors buffer their native content during traversal and write
/// it to the sink in [`Formatter::finalize`]. Callers use
/// [`Formatter::handle`].
pub trait Formatter: Visitor + Send {
    /// Extension key, e.g. `"xlsx"`.
    fn extension(&self) -> &'static str;

    fn content_media_type(&self) -> &'static str;

    fn base(&self) -> &FormatterBase;

    fn base_mut(&mut self) -> &mut FormatterBase;

    /// Acquire the native writable resource (workbook, page tree, buffer).
    fn initialize_resource(&mut self) -> Result<()>;

    /// Serialize the native resource into the sink. Runs only after a
    /// successful traversal.
    fn finalize(&mut self) -> Result<()>;

    /// Release the native resource. Runs on every exit path.
    fn cleanup_resource(&mut self) -> Result<()>;

    fn state(&self) -> FormatterState {
        self.base().state()
    }

    fn context(&self) -> &FormatterContext {
        self.base().context()
    }

    /// Registry to configure before rendering.
    fn style_service_mut(&mut self) -> Result<&mut StyleService> {
        let base = self.base_mut();
        base.expect_state(FormatterState::Unopened)?;
        Ok(&mut base.style_service)
    }

    /// Pick the sink. Defaults to a temporary file.
    fn set_output(&mut self, sink: OutputSink) -> Result<()> {
        let base = self.base_mut();
        base.expect_state(FormatterState::Unopened)?;
        base.sink = Some(sink);
        Ok(())
    }

    /// Render the document and hand back the produced artifact.
    fn handle(&mut self, document: &Document) -> Result<DocumentHolder> {
        self.base().expect_state(FormatterState::Unopened)?;
        let extension = self.extension();
        info!("Rendering document as {}", extension);

        if let Err(e) = self.base_mut().open_output(extension) {
            self.base_mut().abandon();
            return Err(e);
        }
        if let Err(e) = self.initialize_resource() {
            if let Err(cleanup) = self.cleanup_resource() {
                error!("Cleanup after failed {} setup failed: {}", extension, cleanup);
            }
            self.base_mut().abandon();
            return Err(e);
        }
        self.base_mut().set_state(FormatterState::ResourceAcquired);

        self.base_mut().set_state(FormatterState::Traversing);
        let mut outcome = document.accept(self).map(|_| ());
        if outcome.is_ok() {
            outcome = self.finalize();
        }
        let released = self.cleanup_resource();

        if let Err(e) = outcome {
            if let Err(cleanup) = released {
                error!("Cleanup after failed {} render failed: {}", extension, cleanup);
            }
            self.base_mut().abandon();
            return Err(e);
        }
        if let Err(e) = released {
            self.base_mut().abandon();
            return Err(e);
        }

        let base = self.base_mut();
        base.set_state(FormatterState::Finalized);
        let writer = base.writer.take().ok_or(Error::InvalidState {
            expected: FormatterState::Traversing.name(),
            actual: FormatterState::Finalized.name(),
        })?;
        let holder = DocumentHolder::new(extension, self.content_media_type(), writer.finish()?);
        info!("Rendered {} document: {:?}", extension, holder);
        Ok(holder)
    }
}
