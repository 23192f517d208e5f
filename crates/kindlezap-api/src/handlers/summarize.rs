use axum::extract::{Multipart, State};
use axum::Json;
use kindlezap_core::UploadKind;
use serde::Serialize;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::services::pipeline;
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, validate_uploads};

#[derive(Debug, Serialize)]
pub struct SummaryList {
    pub summary: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: SummaryList,
    pub html: Vec<String>,
}

/// Summarize each uploaded PDF or text file, in upload order.
#[tracing::instrument(skip(state, multipart))]
pub async fn summarize_documents(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<SummarizeResponse>, HttpAppError> {
    let form = read_upload_form(multipart).await?;
    validate_uploads(
        &form.files,
        &[UploadKind::Pdf, UploadKind::PlainText],
        state.config.features.batch,
    )?;

    let mut summaries = Vec::with_capacity(form.files.len());
    let mut html = Vec::with_capacity(form.files.len());
    let mut fallbacks = 0;
    for upload in &form.files {
        let document = pipeline::summarize_document(&state, upload).await?;
        if document.summary.is_fallback() {
            fallbacks += 1;
        }
        summaries.push(document.summary.into_text());
        html.push(document.html);
    }

    tracing::info!(files = form.files.len(), fallbacks, "Documents summarized");

    Ok(Json(SummarizeResponse {
        summary: SummaryList { summary: summaries },
        html,
    }))
}
