//! Request pipeline: store -> convert / render / summarize -> deliver -> clean up.
//!
//! Each public entry point opens a [`TempFileScope`] before touching the filesystem and
//! releases it once the work is done, whatever the outcome. If the request future is
//! dropped midway the scope's `Drop` removes the files instead.

use kindlezap_core::{
    AppError, Attachment, BookMetadata, ConversionJob, DeliveryEnvelope, PreviewDocument,
    PreviewStrategy, Summary, Upload, UploadKind,
};
use kindlezap_processing::{decode_text, extract_pdf_text, plain_text_to_html};
use kindlezap_storage::TempFileScope;
use std::path::Path;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Summary and preview HTML for one uploaded document.
#[derive(Debug)]
pub struct SummarizedDocument {
    pub summary: Summary,
    pub html: String,
}

/// Convert every upload and mail the results to `recipient` as one message.
///
/// `metadata[i]` applies to `uploads[i]`; uploads past the end of `metadata` get none.
pub async fn deliver_books(
    state: &AppState,
    uploads: &[Upload],
    metadata: Vec<BookMetadata>,
    recipient: String,
) -> Result<usize, HttpAppError> {
    let mut scope = state.storage.scope();
    let result = convert_and_deliver(state, &mut scope, uploads, metadata, recipient).await;
    scope.release().await;
    result
}

/// Convert one upload and render its preview.
pub async fn preview_document(
    state: &AppState,
    upload: &Upload,
) -> Result<PreviewDocument, HttpAppError> {
    let mut scope = state.storage.scope();
    let result = store_and_render(state, &mut scope, upload).await;
    scope.release().await;
    result
}

/// Summarize one upload and, when previews are enabled, render it as HTML.
pub async fn summarize_document(
    state: &AppState,
    upload: &Upload,
) -> Result<SummarizedDocument, HttpAppError> {
    if upload.kind() == Some(UploadKind::PlainText) {
        let text = decode_text(&upload.data);
        let summary = state.summarizer.summarize(&text).await;
        return Ok(SummarizedDocument {
            summary,
            html: plain_text_to_html(&text),
        });
    }

    let mut scope = state.storage.scope();
    let result = summarize_pdf(state, &mut scope, upload).await;
    scope.release().await;
    result
}

async fn convert_and_deliver(
    state: &AppState,
    scope: &mut TempFileScope,
    uploads: &[Upload],
    metadata: Vec<BookMetadata>,
    recipient: String,
) -> Result<usize, HttpAppError> {
    let mut metadata = metadata.into_iter();
    let mut attachments = Vec::with_capacity(uploads.len());

    for upload in uploads {
        let input = scope.store(&upload.data).await?;
        let job = ConversionJob::new(input, metadata.next());
        convert(state, scope, &job).await?;

        let data = tokio::fs::read(&job.output).await.map_err(|e| {
            AppError::Storage(format!("Failed to read {}: {}", job.output.display(), e))
        })?;
        attachments.push(Attachment {
            filename: attachment_name(&job, upload),
            data,
        });
    }

    let count = attachments.len();
    let envelope = DeliveryEnvelope {
        sender: state.config.smtp.sender.clone(),
        recipient,
        subject: state.config.smtp.subject.clone(),
        attachments,
    };

    tracing::debug!(attachments = count, "Delivering converted books");
    state.mailer.deliver(envelope).await?;
    Ok(count)
}

async fn store_and_render(
    state: &AppState,
    scope: &mut TempFileScope,
    upload: &Upload,
) -> Result<PreviewDocument, HttpAppError> {
    let input = scope.store(&upload.data).await?;
    let job = ConversionJob::new(input, None);
    render(state, scope, &job).await
}

async fn summarize_pdf(
    state: &AppState,
    scope: &mut TempFileScope,
    upload: &Upload,
) -> Result<SummarizedDocument, HttpAppError> {
    let input = scope.store(&upload.data).await?;
    let job = ConversionJob::new(input, None);

    let html = if state.config.features.preview {
        let preview = render(state, scope, &job).await?;
        if preview.is_empty() {
            String::new()
        } else {
            preview.into_html()
        }
    } else {
        String::new()
    };

    // Missing text is not fatal; the summarizer answers with its fallback
    let text = match extract_pdf_text(&job.input).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, file = %upload.display_name(), "No text extracted");
            String::new()
        }
    };
    let summary = state.summarizer.summarize(&text).await;

    Ok(SummarizedDocument { summary, html })
}

/// Run the converter for `job`. The output is tracked before the converter starts so a
/// partially written EPUB is removed too.
async fn convert(
    state: &AppState,
    scope: &mut TempFileScope,
    job: &ConversionJob,
) -> Result<(), HttpAppError> {
    scope.track(job.output.clone());
    state.converter.convert(job).await?;
    Ok(())
}

/// Render a preview, converting first when the strategy reads the EPUB.
async fn render(
    state: &AppState,
    scope: &mut TempFileScope,
    job: &ConversionJob,
) -> Result<PreviewDocument, HttpAppError> {
    if state.preview.strategy() == PreviewStrategy::Epub {
        convert(state, scope, job).await?;
    }
    if let Some(scratch) = state.preview.scratch_path(job) {
        scope.track(scratch);
    }
    Ok(state.preview.render(job).await?)
}

/// Title from metadata when present, otherwise the uploaded file's own name.
fn attachment_name(job: &ConversionJob, upload: &Upload) -> String {
    let name = upload.display_name();
    let fallback = if upload.filename.is_some() && !name.trim().is_empty() {
        Path::new(name).with_extension("epub")
    } else {
        job.output.clone()
    };
    Attachment::filename_for(job.metadata.as_ref(), &fallback)
}
