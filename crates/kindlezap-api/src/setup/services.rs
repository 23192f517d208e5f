//! Construction of the pipeline components from configuration

use crate::state::AppState;
use anyhow::{Context, Result};
use kindlezap_core::Config;
use kindlezap_processing::{EbookConverter, PreviewRenderer, ProcessGate};
use kindlezap_services::{OpenAiSummarizer, SmtpMailer};
use kindlezap_storage::TempStorage;
use std::sync::Arc;
use std::time::Duration;

pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let storage = TempStorage::new(&config.converter.temp_dir)
        .await
        .context("Failed to prepare temporary directory")?;

    // Converter and page renderer share one process budget
    let gate = ProcessGate::new(
        config.converter.max_concurrent_conversions,
        Duration::from_secs(config.converter.timeout_secs),
    );

    let converter = EbookConverter::new(
        config.converter.ebook_convert_path.clone(),
        config.converter.output_profile.clone(),
        gate.clone(),
    );
    let preview = PreviewRenderer::new(&config.preview, gate);
    let summarizer = OpenAiSummarizer::new(&config.summary);
    let mailer = SmtpMailer::new(&config.smtp).context("Failed to configure SMTP transport")?;

    if config.summary.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, summaries will use the fallback message");
    }

    tracing::info!(
        temp_dir = %storage.base_path().display(),
        converter = %config.converter.ebook_convert_path,
        output_profile = %config.converter.output_profile,
        max_concurrent_conversions = config.converter.max_concurrent_conversions,
        preview_strategy = ?config.preview.strategy,
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        storage,
        converter: Arc::new(converter),
        preview,
        summarizer: Arc::new(summarizer),
        mailer: Arc::new(mailer),
    }))
}
