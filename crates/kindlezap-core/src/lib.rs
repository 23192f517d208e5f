//! Kindlezap Core Library
//!
//! Configuration, error types, and the data model shared by every kindlezap crate.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{
    Config, ConverterConfig, FeatureFlags, PreviewConfig, PreviewStrategy, ServerConfig,
    SmtpConfig, SummaryConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    parse_metadata_field, Attachment, BookMetadata, ConversionJob, DeliveryEnvelope,
    PreviewDocument, Summary, Upload, UploadKind, EPUB_CONTENT_TYPE,
};
