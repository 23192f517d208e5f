use async_trait::async_trait;
use kindlezap_core::{BookMetadata, ConversionJob};
use std::path::PathBuf;

use crate::error::ConversionError;
use crate::process::ProcessGate;

/// Converts a stored PDF into an EPUB.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert `job.input` into `job.output` and return the output path.
    async fn convert(&self, job: &ConversionJob) -> Result<PathBuf, ConversionError>;
}

/// Calibre `ebook-convert` invoked as a child process.
pub struct EbookConverter {
    binary: String,
    output_profile: String,
    gate: ProcessGate,
}

impl EbookConverter {
    pub fn new(binary: impl Into<String>, output_profile: impl Into<String>, gate: ProcessGate) -> Self {
        Self {
            binary: binary.into(),
            output_profile: output_profile.into(),
            gate,
        }
    }

    /// Command line for one job: `<in> <out> --output-profile <profile> [metadata flags]`.
    pub fn build_args(&self, job: &ConversionJob) -> Vec<String> {
        let mut args = vec![
            job.input.to_string_lossy().into_owned(),
            job.output.to_string_lossy().into_owned(),
            "--output-profile".to_string(),
            self.output_profile.clone(),
        ];

        if let Some(metadata) = &job.metadata {
            push_metadata_args(&mut args, metadata);
        }

        args
    }
}

fn push_metadata_args(args: &mut Vec<String>, metadata: &BookMetadata) {
    let fields = [
        ("--title", metadata.title.as_deref()),
        ("--authors", metadata.author.as_deref()),
        ("--language", metadata.language.as_deref()),
        ("--tags", metadata.genre.as_deref()),
    ];

    for (flag, value) in fields {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
    }

    // Calibre otherwise renders a generated cover page with the old title
    args.push("--no-default-epub-cover".to_string());
}

#[async_trait]
impl DocumentConverter for EbookConverter {
    #[tracing::instrument(skip(self, job), fields(input = %job.input.display()))]
    async fn convert(&self, job: &ConversionJob) -> Result<PathBuf, ConversionError> {
        let args = self.build_args(job);
        let output = self.gate.run(&self.binary, &args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(status = %output.status, stderr = %stderr, "Conversion failed");
            return Err(ConversionError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        if !tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
            return Err(ConversionError::MissingOutput(job.output.clone()));
        }

        tracing::info!(output = %job.output.display(), "Conversion completed");
        Ok(job.output.clone())
    }
}
