use std::path::{Path, PathBuf};

use super::metadata::BookMetadata;

/// One PDF-to-EPUB conversion.
///
/// The output path is derived from the input: same directory and base name, `.epub` extension.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub metadata: Option<BookMetadata>,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, metadata: Option<BookMetadata>) -> Self {
        let input = input.into();
        let output = epub_path_for(&input);
        Self {
            input,
            output,
            metadata: metadata.filter(|m| !m.is_empty()),
        }
    }
}

/// Destination path for a converted document.
pub fn epub_path_for(input: &Path) -> PathBuf {
    input.with_extension("epub")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_swaps_extension_only() {
        let job = ConversionJob::new("/tmp/kindlezap-abc123.pdf", None);
        assert_eq!(job.output, PathBuf::from("/tmp/kindlezap-abc123.epub"));
        assert_eq!(job.input.file_stem(), job.output.file_stem());
    }

    #[test]
    fn empty_metadata_is_dropped() {
        let job = ConversionJob::new("/tmp/book.pdf", Some(BookMetadata::default()));
        assert!(job.metadata.is_none());
    }
}
