//! Multipart form-data bodies.
//!
//! Parts write themselves into a [`MultipartEnvelope`], which frames them
//! with a fixed boundary so the resulting `Content-Type` is stable across
//! runs.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::error::{DomainError, DomainResult};

/// Boundary token used for every multipart body.
pub const BOUNDARY: &str = "HttpCheckBoundary";

/// Something that can write one part of a multipart body.
pub trait FormPart {
    /// Append this part to `envelope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the part's content cannot be produced.
    fn write_part(&self, envelope: &mut MultipartEnvelope) -> DomainResult<()>;
}

/// A plain form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPart {
    /// Form field name.
    pub name: String,
    /// Field value.
    pub value: String,
}

impl FieldPart {
    /// Create a new field part.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl FormPart for FieldPart {
    fn write_part(&self, envelope: &mut MultipartEnvelope) -> DomainResult<()> {
        envelope.write_field(&self.name, &self.value)
    }
}

/// A file field whose content is read from disk when the body is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub name: String,
    /// Path of the file to attach.
    pub path: PathBuf,
}

impl FilePart {
    /// Create a new file part.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl FormPart for FilePart {
    fn write_part(&self, envelope: &mut MultipartEnvelope) -> DomainResult<()> {
        let content = std::fs::read(&self.path).map_err(|source| DomainError::FileRead {
            path: self.path.display().to_string(),
            source,
        })?;

        let filename = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");

        let mime_type = mime_guess::from_path(&self.path).first_or_octet_stream();

        envelope.write_file(&self.name, filename, mime_type.essence_str(), &content)
    }
}

/// A finished multipart body together with its `Content-Type` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    /// Boundary-qualified content type.
    pub content_type: String,
    /// Encoded envelope bytes.
    pub body: Vec<u8>,
}

/// Incrementally written multipart/form-data envelope.
#[derive(Debug, Default)]
pub struct MultipartEnvelope {
    buf: Vec<u8>,
}

impl MultipartEnvelope {
    /// Create an empty envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `Content-Type` header value matching this envelope.
    #[must_use]
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    /// Append a plain text field.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidFieldName`] if `name` contains a line break.
    pub fn write_field(&mut self, name: &str, value: &str) -> DomainResult<()> {
        self.write_headers(name, None, None)?;
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        Ok(())
    }

    /// Append a file field.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidFieldName`] if `name` or `filename`
    /// contains a line break.
    pub fn write_file(
        &mut self,
        name: &str,
        filename: &str,
        content_type: &str,
        content: &[u8],
    ) -> DomainResult<()> {
        self.write_headers(name, Some(filename), Some(content_type))?;
        self.buf.extend_from_slice(content);
        self.buf.extend_from_slice(b"\r\n");
        Ok(())
    }

    fn write_headers(
        &mut self,
        name: &str,
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> DomainResult<()> {
        let mut head = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"",
            escape_quotes(name)?
        );
        if let Some(filename) = filename {
            let _ = write!(head, "; filename=\"{}\"", escape_quotes(filename)?);
        }
        head.push_str("\r\n");
        if let Some(content_type) = content_type {
            let _ = write!(head, "Content-Type: {content_type}\r\n");
        }
        head.push_str("\r\n");

        self.buf.extend_from_slice(head.as_bytes());
        Ok(())
    }

    /// Write the closing boundary and return the finished body.
    #[must_use]
    pub fn finish(mut self) -> MultipartBody {
        self.buf.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        MultipartBody {
            content_type: Self::content_type(),
            body: self.buf,
        }
    }
}

/// Build a complete multipart body from `parts`, in order.
///
/// # Errors
///
/// Returns the first error produced by a part, e.g. a missing file.
pub fn build_multipart(parts: &[&dyn FormPart]) -> DomainResult<MultipartBody> {
    let mut envelope = MultipartEnvelope::new();
    for part in parts {
        part.write_part(&mut envelope)?;
    }
    Ok(envelope.finish())
}

fn escape_quotes(value: &str) -> DomainResult<String> {
    if value.contains(['\r', '\n']) {
        return Err(DomainError::InvalidFieldName(value.to_string()));
    }
    Ok(value.replace('\\', "\\\\").replace('"', "\\\""))
}
