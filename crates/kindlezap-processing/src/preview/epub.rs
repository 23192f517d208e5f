//! Preview from the converted EPUB: one fragment per spine item, images inlined.

use base64::Engine;
use epub::doc::EpubDoc;
use regex::{Captures, Regex};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::error::PreviewError;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\bsrc\s*=\s*)(["'])([^"']*)(["'])"#).expect("valid regex")
});

/// Read every spine item of the EPUB at `path` in reading order.
///
/// Blocking; callers run it on the blocking pool.
pub fn read_epub_items(path: &Path, cover_names: &[String]) -> Result<Vec<String>, PreviewError> {
    let mut doc = EpubDoc::new(path)
        .map_err(|e| PreviewError::Open(format!("{}: {}", path.display(), e)))?;

    let mut fragments = Vec::new();
    loop {
        if let Some((content, _mime)) = doc.get_current_str() {
            let base = doc
                .get_current_path()
                .and_then(|p| p.parent().map(Path::to_path_buf))
                .unwrap_or_default();
            let html = inline_images(&content, cover_names, |src| {
                doc.get_resource_by_path(resolve_href(&base, src))
            });
            fragments.push(html);
        }

        if !doc.go_next() {
            break;
        }
    }

    tracing::debug!(items = fragments.len(), "Read EPUB items");
    Ok(fragments)
}

/// Replace relative `<img src>` references with base64 data URIs.
///
/// Cover images, remote URLs and images the loader cannot find keep their original reference.
pub fn inline_images<F>(html: &str, cover_names: &[String], mut load: F) -> String
where
    F: FnMut(&str) -> Option<Vec<u8>>,
{
    IMG_SRC
        .replace_all(html, |caps: &Captures<'_>| {
            let src = &caps[3];
            if should_skip(src, cover_names) {
                return caps[0].to_string();
            }
            match load(src) {
                Some(bytes) => format!(
                    "{}{}data:{};base64,{}{}",
                    &caps[1],
                    &caps[2],
                    image_mime(src),
                    base64::engine::general_purpose::STANDARD.encode(bytes),
                    &caps[4]
                ),
                None => {
                    tracing::debug!(src = %src, "Image not found in EPUB");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn should_skip(src: &str, cover_names: &[String]) -> bool {
    let lower = src.to_ascii_lowercase();
    if src.is_empty()
        || lower.starts_with("data:")
        || lower.starts_with("http:")
        || lower.starts_with("https:")
    {
        return true;
    }
    let file_name = src.rsplit('/').next().unwrap_or(src);
    cover_names.iter().any(|name| name == file_name)
}

/// Resolve `href` against the directory of the referencing item, inside the archive.
pub fn resolve_href(base: &Path, href: &str) -> PathBuf {
    let href = href.split(['#', '?']).next().unwrap_or(href);
    let mut resolved = PathBuf::new();
    for component in base.join(href).components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => resolved.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    resolved
}

fn image_mime(src: &str) -> &'static str {
    let ext = Path::new(src)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
