//! HTML preview rendering.
//!
//! Two strategies are available: walk the converted EPUB's reading order (default), or
//! render the source PDF page by page with mutool. Both finish with cover removal.

mod cover;
pub mod epub;
pub mod pages;

pub use cover::remove_cover_svg;

use kindlezap_core::{ConversionJob, PreviewConfig, PreviewDocument, PreviewStrategy};
use std::path::PathBuf;

use crate::error::PreviewError;
use crate::process::ProcessGate;

#[derive(Clone, Debug)]
pub struct PreviewRenderer {
    strategy: PreviewStrategy,
    mutool_path: String,
    cover_names: Vec<String>,
    image_max_width: String,
    gate: ProcessGate,
}

impl PreviewRenderer {
    pub fn new(config: &PreviewConfig, gate: ProcessGate) -> Self {
        Self {
            strategy: config.strategy,
            mutool_path: config.mutool_path.clone(),
            cover_names: config.cover_image_names.clone(),
            image_max_width: config.image_max_width.clone(),
            gate,
        }
    }

    pub fn strategy(&self) -> PreviewStrategy {
        self.strategy
    }

    /// Extra file the renderer writes next to the job's input, if any.
    ///
    /// Callers register it for cleanup before calling [`render`](Self::render).
    pub fn scratch_path(&self, job: &ConversionJob) -> Option<PathBuf> {
        match self.strategy {
            PreviewStrategy::Epub => None,
            PreviewStrategy::Pages => Some(job.input.with_extension("html")),
        }
    }

    /// Build the preview for a converted job.
    #[tracing::instrument(skip(self, job), fields(strategy = ?self.strategy))]
    pub async fn render(&self, job: &ConversionJob) -> Result<PreviewDocument, PreviewError> {
        let fragments = match self.strategy {
            PreviewStrategy::Epub => {
                let path = job.output.clone();
                let cover_names = self.cover_names.clone();
                tokio::task::spawn_blocking(move || epub::read_epub_items(&path, &cover_names))
                    .await
                    .map_err(|e| PreviewError::Join(e.to_string()))??
            }
            PreviewStrategy::Pages => {
                let html_out = job.input.with_extension("html");
                pages::render_pages(
                    &self.gate,
                    &self.mutool_path,
                    &job.input,
                    &html_out,
                    &self.image_max_width,
                )
                .await?
            }
        };

        let fragments = fragments
            .iter()
            .map(|fragment| remove_cover_svg(fragment, &self.cover_names))
            .collect();

        Ok(PreviewDocument::new(fragments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;

    const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Fixture</dc:title>
    <dc:identifier id="bookid">fixture-1</dc:identifier>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="cover" href="text/cover.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="fig" href="images/fig.png" media-type="image/png"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="cover"/>
    <itemref idref="ch1"/>
  </spine>
</package>"#;

    const NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head/>
  <docTitle><text>Fixture</text></docTitle>
  <navMap>
    <navPoint id="p1" playOrder="1"><navLabel><text>One</text></navLabel><content src="text/ch1.xhtml"/></navPoint>
  </navMap>
</ncx>"#;

    const COVER: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><div><svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><image xlink:href="cover_image.jpg"/></svg></div></body></html>"#;

    const CHAPTER: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><h1>Chapter One</h1><img src="../images/fig.png" alt="fig"/></body></html>"#;

    fn write_epub(path: &Path) {
        write_epub_with(path, OPF);
    }

    fn write_epub_with(path: &Path, opf: &str) {
        let file = std::fs::File::create(path).expect("create epub");
        let mut zip = zip::ZipWriter::new(file);
        let stored =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let entries: [(&str, &[u8]); 6] = [
            ("mimetype", b"application/epub+zip"),
            ("META-INF/container.xml", CONTAINER.as_bytes()),
            ("OEBPS/content.opf", opf.as_bytes()),
            ("OEBPS/toc.ncx", NCX.as_bytes()),
            ("OEBPS/text/cover.xhtml", COVER.as_bytes()),
            ("OEBPS/text/ch1.xhtml", CHAPTER.as_bytes()),
        ];
        for (name, data) in entries {
            zip.start_file(name, stored).expect("start file");
            zip.write_all(data).expect("write entry");
        }
        zip.start_file("OEBPS/images/fig.png", stored).expect("start image");
        zip.write_all(b"PNGDATA").expect("write image");
        zip.finish().expect("finish");
    }

    fn config(strategy: PreviewStrategy) -> PreviewConfig {
        PreviewConfig {
            strategy,
            mutool_path: "kindlezap-no-such-mutool".to_string(),
            cover_image_names: vec!["cover_image.jpg".to_string(), "cover_image.png".to_string()],
            image_max_width: "100%".to_string(),
        }
    }

    #[tokio::test]
    async fn epub_preview_inlines_images_and_drops_cover() {
        let dir = tempfile::tempdir().expect("tempdir");
        let job = ConversionJob::new(dir.path().join("book.pdf"), None);
        write_epub(&job.output);

        let renderer = PreviewRenderer::new(
            &config(PreviewStrategy::Epub),
            ProcessGate::new(1, Duration::from_secs(5)),
        );
        assert_eq!(renderer.scratch_path(&job), None);

        let preview = renderer.render(&job).await.expect("render");
        assert_eq!(preview.len(), 2);

        let html = preview.into_html();
        assert!(!html.contains("cover_image.jpg"));
        assert!(html.contains("Chapter One"));
        // "PNGDATA" in base64
        assert!(html.contains("data:image/png;base64,UE5HREFUQQ=="));
    }

    #[test]
    fn epub_items_follow_spine_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("book.epub");
        let reordered = OPF.replace(
            r#"<itemref idref="cover"/>
    <itemref idref="ch1"/>"#,
            r#"<itemref idref="ch1"/>
    <itemref idref="cover"/>"#,
        );
        assert_ne!(reordered, OPF);
        write_epub_with(&path, &reordered);

        let items = super::epub::read_epub_items(&path, &[]).expect("read");
        assert_eq!(items.len(), 2);
        assert!(items[0].contains("Chapter One"));
        assert!(items[1].contains("cover_image.jpg"));
    }

    #[test]
    fn pages_strategy_writes_next_to_input() {
        let renderer = PreviewRenderer::new(
            &config(PreviewStrategy::Pages),
            ProcessGate::new(1, Duration::from_secs(5)),
        );
        let job = ConversionJob::new("/tmp/kindlezap-x.pdf", None);
        assert_eq!(
            renderer.scratch_path(&job),
            Some(PathBuf::from("/tmp/kindlezap-x.html"))
        );
    }
}
