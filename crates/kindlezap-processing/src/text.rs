//! Plain-text extraction for summarization.

use std::path::{Path, PathBuf};

use crate::error::ExtractionError;

/// Extract the text of a stored PDF. Runs the parser on the blocking pool.
pub async fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    let path: PathBuf = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await
        .map_err(|e| ExtractionError::Join(e.to_string()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    tracing::debug!(chars = text.chars().count(), "Extracted PDF text");
    Ok(text)
}

/// Decode a text upload. Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Render plain text as escaped HTML paragraphs, split on blank lines.
pub fn plain_text_to_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br/>")))
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
