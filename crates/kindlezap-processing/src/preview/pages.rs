//! Preview straight from the PDF: one fragment per rendered page.

use regex::{NoExpand, Regex};
use scraper::{Html, Selector};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::PreviewError;
use crate::process::ProcessGate;

static PAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body > div").expect("valid selector"));
static STYLE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+style\s*=\s*("[^"]*"|'[^']*')"#).expect("valid regex"));
static IMG_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b").expect("valid regex"));

/// Render `pdf` to HTML with mutool, writing to `html_out`, and split the result into pages.
pub async fn render_pages(
    gate: &ProcessGate,
    mutool: &str,
    pdf: &Path,
    html_out: &Path,
    image_max_width: &str,
) -> Result<Vec<String>, PreviewError> {
    let args = vec![
        "draw".to_string(),
        "-q".to_string(),
        "-F".to_string(),
        "html".to_string(),
        "-o".to_string(),
        html_out.to_string_lossy().into_owned(),
        pdf.to_string_lossy().into_owned(),
    ];

    let output = gate.run(mutool, &args).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(PreviewError::PageExtraction(format!(
            "{} exited with {}: {}",
            mutool, output.status, stderr
        )));
    }

    let html = tokio::fs::read_to_string(html_out).await?;
    let pages = split_pages(&html)
        .into_iter()
        .map(|page| constrain_images(&strip_styles(&page), image_max_width))
        .collect::<Vec<_>>();

    tracing::debug!(pages = pages.len(), "Rendered PDF pages");
    Ok(pages)
}

/// Each top-level `<div>` of the body is one page.
pub fn split_pages(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document.select(&PAGE).map(|page| page.html()).collect()
}

/// Absolute positioning from the renderer does not survive outside its own page box.
pub fn strip_styles(html: &str) -> String {
    STYLE_ATTR.replace_all(html, "").into_owned()
}

pub fn constrain_images(html: &str, max_width: &str) -> String {
    let replacement = format!(r#"<img style="max-width:{};height:auto""#, max_width);
    IMG_OPEN
        .replace_all(html, NoExpand(&replacement))
        .into_owned()
}
