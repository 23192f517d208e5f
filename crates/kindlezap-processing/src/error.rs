use kindlezap_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

use crate::process::ProcessError;

/// Converter failures. A non-zero exit is an expected outcome and carries the tool's stderr.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("converter reported success but produced no file at {0}")]
    MissingOutput(PathBuf),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to open converted document: {0}")]
    Open(String),

    #[error("page extraction failed: {0}")]
    PageExtraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("preview task failed: {0}")]
    Join(String),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to extract text: {0}")]
    Pdf(String),

    #[error("extraction task failed: {0}")]
    Join(String),
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        AppError::Conversion(err.to_string())
    }
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        AppError::Extraction(format!("Failed to render preview: {}", err))
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(format!("Failed to extract text: {}", err))
    }
}
