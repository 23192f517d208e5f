//! Document fixtures for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

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
    <item id="cover" href="titlepage.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
    <item id="fig" href="figure.png" media-type="image/png"/>
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
    <navPoint id="p1" playOrder="1"><navLabel><text>One</text></navLabel><content src="chapter1.xhtml"/></navPoint>
  </navMap>
</ncx>"#;

const TITLE_PAGE: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><div><svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><image xlink:href="cover_image.jpg"/></svg></div></body></html>"#;

const CHAPTER: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><h1>Chapter One</h1><p>It was a dark and stormy night.</p><img src="figure.png" alt="figure"/></body></html>"#;

/// Minimal EPUB with a cover page and one chapter referencing an image.
pub fn minimal_epub() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let stored =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let entries: [(&str, &[u8]); 7] = [
        ("mimetype", b"application/epub+zip"),
        ("META-INF/container.xml", CONTAINER.as_bytes()),
        ("OEBPS/content.opf", OPF.as_bytes()),
        ("OEBPS/toc.ncx", NCX.as_bytes()),
        ("OEBPS/titlepage.xhtml", TITLE_PAGE.as_bytes()),
        ("OEBPS/chapter1.xhtml", CHAPTER.as_bytes()),
        ("OEBPS/figure.png", b"PNGDATA"),
    ];
    for (name, data) in entries {
        zip.start_file(name, stored).expect("start file");
        zip.write_all(data).expect("write entry");
    }
    zip.finish().expect("finish epub").into_inner()
}

/// Bytes that look like a PDF upload. The converter is replaced in tests, so only the
/// declared content type matters.
pub fn sample_pdf(label: &str) -> Vec<u8> {
    format!("%PDF-1.4\n% {}\n%%EOF\n", label).into_bytes()
}
