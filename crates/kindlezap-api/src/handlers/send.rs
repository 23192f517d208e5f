use axum::extract::{Multipart, State};
use axum::Json;
use kindlezap_core::{parse_metadata_field, AppError, UploadKind};
use serde::Serialize;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::services::pipeline;
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, validate_uploads};

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
}

/// Convert one or more PDFs, optionally with metadata, and email them in one message.
#[tracing::instrument(skip(state, multipart))]
pub async fn send_documents(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<SendResponse>, HttpAppError> {
    let form = read_upload_form(multipart).await?;
    validate_uploads(&form.files, &[UploadKind::Pdf], state.config.features.batch)?;
    let recipient = form.recipient()?;

    let metadata = match form.metadata.as_deref() {
        Some(raw) if state.config.features.metadata_injection => parse_metadata_field(raw)?,
        Some(_) => {
            tracing::debug!("Metadata injection disabled, ignoring metadata field");
            Vec::new()
        }
        None => Vec::new(),
    };

    if metadata.len() > form.files.len() {
        return Err(AppError::InvalidInput(format!(
            "Received {} metadata entries for {} files",
            metadata.len(),
            form.files.len()
        ))
        .into());
    }

    let sent = pipeline::deliver_books(&state, &form.files, metadata, recipient).await?;
    tracing::info!(files = sent, "Books sent");

    Ok(Json(SendResponse {
        status: "Email sent successfully".to_string(),
    }))
}

/// Convert a single PDF and email it with default metadata.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let form = read_upload_form(multipart).await?;
    validate_uploads(&form.files, &[UploadKind::Pdf], false)?;
    let recipient = form.recipient()?;

    pipeline::deliver_books(&state, &form.files, Vec::new(), recipient).await?;
    tracing::info!(file = %form.files[0].display_name(), "Book sent");

    Ok(Json(UploadResponse {
        message: "Book successfully sent to Kindle!".to_string(),
    }))
}
