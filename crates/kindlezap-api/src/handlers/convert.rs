use axum::extract::{Multipart, State};
use axum::Json;
use kindlezap_core::{AppError, UploadKind};
use serde::Serialize;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::services::pipeline;
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, validate_uploads};

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub html: String,
}

/// Convert one PDF and return its HTML preview.
#[tracing::instrument(skip(state, multipart))]
pub async fn convert_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, HttpAppError> {
    let form = read_upload_form(multipart).await?;
    validate_uploads(&form.files, &[UploadKind::Pdf], false)?;

    let upload = &form.files[0];
    let preview = pipeline::preview_document(&state, upload).await?;

    if preview.is_empty() {
        return Err(AppError::Extraction(
            "No HTML content could be extracted from the document".to_string(),
        )
        .into());
    }

    tracing::info!(
        file = %upload.display_name(),
        fragments = preview.len(),
        "Preview rendered"
    );

    Ok(Json(ConvertResponse {
        html: preview.into_html(),
    }))
}
