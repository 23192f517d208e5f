//! Multipart form reading and validation for document uploads

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use kindlezap_core::{AppError, Upload, UploadKind};

/// Field names carrying documents.
const FILE_FIELDS: &[&str] = &["file", "files"];

/// A fully buffered multipart request.
///
/// Nothing is written to disk while reading, so a request rejected by validation leaves no
/// trace on the filesystem.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<Upload>,
    pub email: Option<String>,
    pub metadata: Option<String>,
}

impl UploadForm {
    /// Recipient address, required and validated as a mailbox.
    pub fn recipient(&self) -> Result<String, AppError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::InvalidInput("No email provided".to_string()))?;

        kindlezap_services::parse_mailbox(email)
            .map_err(|e| AppError::InvalidInput(format!("Invalid email address: {}", e)))?;

        Ok(email.to_string())
    }
}

/// Read every field of the form into memory.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if FILE_FIELDS.contains(&field_name.as_str()) {
            let filename = field.file_name().map(|s: &str| s.to_string());
            let content_type = field.content_type().map(|s: &str| s.to_string());
            let data = field.bytes().await.map_err(multipart_error)?;

            form.files.push(Upload {
                data: data.to_vec(),
                filename,
                content_type,
            });
        } else if field_name == "email" {
            form.email = Some(field.text().await.map_err(multipart_error)?);
        } else if field_name == "metadata" {
            form.metadata = Some(field.text().await.map_err(multipart_error)?);
        } else {
            tracing::debug!(field = %field_name, "Ignoring unknown form field");
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Check that files are present, named, of an accepted kind, and not more than one unless
/// `allow_many`.
pub fn validate_uploads(
    files: &[Upload],
    accepted: &[UploadKind],
    allow_many: bool,
) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::InvalidInput("No file provided".to_string()));
    }

    if files.len() > 1 && !allow_many {
        return Err(AppError::InvalidInput(
            "Only one file may be sent per request".to_string(),
        ));
    }

    for file in files {
        if file.filename.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(AppError::InvalidInput("File has no name".to_string()));
        }

        match file.kind() {
            Some(kind) if accepted.contains(&kind) => {}
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "Invalid content type for {}: {}",
                    file.display_name(),
                    file.content_type.as_deref().unwrap_or("none")
                )))
            }
        }
    }

    Ok(())
}
