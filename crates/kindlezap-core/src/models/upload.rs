/// Content types accepted as PDF uploads.
pub const PDF_CONTENT_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

/// Content types accepted as plain-text uploads (summarization only).
pub const TEXT_CONTENT_TYPES: &[&str] = &["text/plain"];

/// What kind of document an upload holds, judged by its declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    PlainText,
}

/// A file received from the HTTP boundary, fully buffered.
#[derive(Clone)]
pub struct Upload {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

impl Upload {
    /// Classify the upload by its declared content type (parameters ignored).
    pub fn kind(&self) -> Option<UploadKind> {
        let normalized = normalize_mime_type(self.content_type.as_deref()?).to_lowercase();
        if PDF_CONTENT_TYPES.contains(&normalized.as_str()) {
            Some(UploadKind::Pdf)
        } else if TEXT_CONTENT_TYPES.contains(&normalized.as_str()) {
            Some(UploadKind::PlainText)
        } else {
            None
        }
    }

    /// Original filename without any directory components.
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .and_then(|name| name.rsplit(|c: char| c == '/' || c == '\\').next())
            .unwrap_or("unknown")
    }
}

/// Normalize MIME type by stripping parameters (e.g. "application/pdf; name=x" -> "application/pdf").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}
