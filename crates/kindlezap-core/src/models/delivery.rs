use std::path::Path;

use super::metadata::BookMetadata;

pub const EPUB_CONTENT_TYPE: &str = "application/epub+zip";

/// A single file attached to a delivery email.
#[derive(Clone)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("size", &self.data.len())
            .finish()
    }
}

impl Attachment {
    /// Name the attachment after the metadata title when there is one, otherwise after the
    /// converted file itself.
    pub fn filename_for(metadata: Option<&BookMetadata>, epub_path: &Path) -> String {
        metadata
            .and_then(BookMetadata::title)
            .map(sanitize_title)
            .filter(|t| !t.is_empty())
            .map(|t| format!("{}.epub", t))
            .unwrap_or_else(|| {
                epub_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "book.epub".to_string())
            })
    }
}

/// Strip characters that cannot appear in an attachment filename.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | '"'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Everything needed for one SMTP transaction.
#[derive(Debug, Clone)]
pub struct DeliveryEnvelope {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub attachments: Vec<Attachment>,
}
