//! Kindlezap Processing Library
//!
//! Everything that touches document content:
//! - PDF to EPUB conversion through an external converter
//! - HTML preview rendering (EPUB items or PDF pages)
//! - Plain-text extraction for summarization
//!
//! External tools run through a shared [`ProcessGate`] that bounds how many of them run at once.

pub mod converter;
pub mod error;
pub mod preview;
pub mod process;
pub mod text;

// Re-export commonly used types
pub use converter::{DocumentConverter, EbookConverter};
pub use error::{ConversionError, ExtractionError, PreviewError};
pub use preview::{remove_cover_svg, PreviewRenderer};
pub use process::{ProcessError, ProcessGate};
pub use text::{decode_text, extract_pdf_text, plain_text_to_html};
