//! Output sinks and produced-artifact handles.

use crate::error::Result;
use log::{debug, warn};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};

/// Where a render writes its artifact. Chosen before rendering.
#[derive(Default)]
pub enum OutputSink {
    /// Create (or truncate) a named file
    File(PathBuf),

    /// Caller-provided stream
    Stream(Box<dyn Write + Send>),

    /// In-memory buffer returned through the holder
    Memory,

    /// Generated temporary file, deleted when the holder is closed
    #[default]
    TempFile,
}

impl OutputSink {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        OutputSink::File(path.into())
    }

    pub fn stream<W: Write + Send + 'static>(writer: W) -> Self {
        OutputSink::Stream(Box::new(writer))
    }

    fn describe(&self) -> String {
        match self {
            OutputSink::File(path) => format!("file {}", path.display()),
            OutputSink::Stream(_) => "stream".to_string(),
            OutputSink::Memory => "memory".to_string(),
            OutputSink::TempFile => "temporary file".to_string(),
        }
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// An opened sink.
pub(crate) enum SinkWriter {
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
    Temp(BufWriter<NamedTempFile>),
    Stream(Box<dyn Write + Send>),
    Memory(Vec<u8>),
}

impl SinkWriter {
    pub(crate) fn open(sink: OutputSink, extension: &str) -> Result<Self> {
        debug!("Opening {} for {}", sink.describe(), extension);
        Ok(match sink {
            OutputSink::File(path) => {
                let writer = BufWriter::new(File::create(&path)?);
                SinkWriter::File { path, writer }
            }
            OutputSink::TempFile => {
                let file = tempfile::Builder::new()
                    .prefix("report-")
                    .suffix(&format!(".{}", extension))
                    .tempfile()?;
                SinkWriter::Temp(BufWriter::new(file))
            }
            OutputSink::Stream(stream) => SinkWriter::Stream(stream),
            OutputSink::Memory => SinkWriter::Memory(Vec::new()),
        })
    }

    /// Flush and turn into the caller-facing resource.
    pub(crate) fn finish(self) -> Result<Resource> {
        Ok(match self {
            SinkWriter::File { path, mut writer } => {
                writer.flush()?;
                Resource::File(path)
            }
            SinkWriter::Temp(writer) => {
                let file = writer.into_inner().map_err(|e| e.into_error())?;
                Resource::Temp(file.into_temp_path())
            }
            SinkWriter::Stream(mut stream) => {
                stream.flush()?;
                Resource::Stream(stream)
            }
            SinkWriter::Memory(buf) => Resource::Memory(buf),
        })
    }
}

impl fmt::Debug for SinkWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkWriter::File { path, .. } => write!(f, "SinkWriter(file {})", path.display()),
            SinkWriter::Temp(writer) => {
                write!(f, "SinkWriter(temp {})", writer.get_ref().path().display())
            }
            SinkWriter::Stream(_) => f.write_str("SinkWriter(stream)"),
            SinkWriter::Memory(buf) => write!(f, "SinkWriter(memory, {} bytes)", buf.len()),
        }
    }
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::File { writer, .. } => writer.write(buf),
            SinkWriter::Temp(writer) => writer.write(buf),
            SinkWriter::Stream(stream) => stream.write(buf),
            SinkWriter::Memory(vec) => vec.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::File { writer, .. } => writer.flush(),
            SinkWriter::Temp(writer) => writer.flush(),
            SinkWriter::Stream(stream) => stream.flush(),
            SinkWriter::Memory(_) => Ok(()),
        }
    }
}

pub(crate) enum Resource {
    File(PathBuf),
    Temp(TempPath),
    Stream(Box<dyn Write + Send>),
    Memory(Vec<u8>),
}

/// Handle to a rendered artifact.
///
/// The underlying resource is released once by [`DocumentHolder::close`]
/// (or on drop); later calls are no-ops.
pub struct DocumentHolder {
    extension: &'static str,
    media_type: &'static str,
    resource: Option<Resource>,
}

impl DocumentHolder {
    pub(crate) fn new(
        extension: &'static str,
        media_type: &'static str,
        resource: Resource,
    ) -> Self {
        Self {
            extension,
            media_type,
            resource: Some(resource),
        }
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Path of a file or temp-file artifact.
    pub fn path(&self) -> Option<&Path> {
        match self.resource.as_ref()? {
            Resource::File(path) => Some(path),
            Resource::Temp(temp) => Some(temp),
            _ => None,
        }
    }

    /// Bytes of an in-memory artifact.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self.resource.as_ref()? {
            Resource::Memory(buf) => Some(buf),
            _ => None,
        }
    }

    /// Take the in-memory buffer, closing the holder.
    pub fn into_bytes(mut self) -> Option<Vec<u8>> {
        match self.resource.take()? {
            Resource::Memory(buf) => Some(buf),
            other => {
                self.resource = Some(other);
                None
            }
        }
    }

    /// Hand back a caller-provided stream, closing the holder.
    pub fn take_stream(&mut self) -> Option<Box<dyn Write + Send>> {
        match self.resource.take()? {
            Resource::Stream(stream) => Some(stream),
            other => {
                self.resource = Some(other);
                None
            }
        }
    }

    /// Keep a temporary artifact on disk and return its path.
    pub fn persist(&mut self) -> Result<Option<PathBuf>> {
        match self.resource.take() {
            Some(Resource::Temp(temp)) => {
                let path = temp.keep().map_err(|e| e.error)?;
                self.resource = Some(Resource::File(path.clone()));
                Ok(Some(path))
            }
            other => {
                self.resource = other;
                Ok(self.path().map(Path::to_path_buf))
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.resource.is_none()
    }

    /// Release the resource. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        match self.resource.take() {
            None => Ok(()),
            Some(Resource::Temp(temp)) => {
                debug!("Removing temporary artifact {}", temp.display());
                temp.close()?;
                Ok(())
            }
            Some(Resource::Stream(mut stream)) => {
                stream.flush()?;
                Ok(())
            }
            Some(Resource::File(_)) | Some(Resource::Memory(_)) => Ok(()),
        }
    }
}

impl Drop for DocumentHolder {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to release {} artifact: {}", self.extension, e);
        }
    }
}

impl fmt::Debug for DocumentHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = match &self.resource {
            None => "closed".to_string(),
            Some(Resource::File(p)) => format!("file {}", p.display()),
            Some(Resource::Temp(p)) => format!("temp {}", p.display()),
            Some(Resource::Stream(_)) => "stream".to_string(),
            Some(Resource::Memory(b)) => format!("memory ({} bytes)", b.len()),
        };
        f.debug_struct("DocumentHolder")
            .field("extension", &self.extension)
            .field("resource", &resource)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink() {
        let mut writer = SinkWriter::open(OutputSink::Memory, "csv").unwrap();
        writer.write_all(b"a;b\n").unwrap();
        let holder = DocumentHolder::new("csv", "text/csv", writer.finish().unwrap());
        assert_eq!(holder.bytes(), Some(&b"a;b\n"[..]));
        assert_eq!(holder.into_bytes().unwrap(), b"a;b\n");
    }

    #[test]
    fn test_temp_file_removed_on_close() {
        let mut writer = SinkWriter::open(OutputSink::TempFile, "html").unwrap();
        writer.write_all(b"<p>").unwrap();
        let mut holder = DocumentHolder::new("html", "text/html", writer.finish().unwrap());

        let path = holder.path().unwrap().to_path_buf();
        assert!(path.to_string_lossy().ends_with(".html"));
        assert_eq!(std::fs::read(&path).unwrap(), b"<p>");

        holder.close().unwrap();
        assert!(!path.exists());
        assert!(holder.is_closed());
        // Second close is a no-op.
        holder.close().unwrap();
    }

    #[test]
    fn test_persist_keeps_temp_file() {
        let writer = SinkWriter::open(OutputSink::TempFile, "csv").unwrap();
        let mut holder = DocumentHolder::new("csv", "text/csv", writer.finish().unwrap());
        let path = holder.persist().unwrap().unwrap();
        holder.close().unwrap();
        assert!(path.exists());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        let mut writer = SinkWriter::open(OutputSink::file(&target), "csv").unwrap();
        writer.write_all(b"x").unwrap();
        let holder = DocumentHolder::new("csv", "text/csv", writer.finish().unwrap());
        assert_eq!(holder.path(), Some(target.as_path()));
        assert_eq!(std::fs::read(&target).unwrap(), b"x");
    }
}
