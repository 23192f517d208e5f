//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Component errors convert into
//! `HttpAppError` through `AppError`, so every failure renders with the same JSON shape.
//! In production [`redact_error_details`] strips the diagnostic fields from those bodies.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use kindlezap_core::{AppError, ErrorMetadata, LogLevel};
use kindlezap_processing::{ConversionError, ExtractionError, PreviewError};
use kindlezap_services::DeliveryError;
use kindlezap_storage::StorageError;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl ErrorResponse {
    /// Same response without `details` and `error_type`.
    pub fn redacted(self) -> Self {
        ErrorResponse {
            details: None,
            error_type: None,
            ..self
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl HttpAppError {
    fn body(&self) -> ErrorResponse {
        let app_error = &self.0;
        let (details, error_type) = if app_error.is_sensitive() {
            (None, None)
        } else {
            (
                Some(app_error.to_string()),
                Some(app_error.error_type().to_string()),
            )
        };

        ErrorResponse {
            error: app_error.client_message(),
            details,
            error_type,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        let body = self.body();
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Re-renders error bodies without diagnostics when `production` is set.
///
/// The flag comes from [`kindlezap_core::Config::is_production`] at router setup.
pub async fn redact_error_details(
    State(production): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(body) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };
    if !production {
        return response;
    }

    let mut redacted = Json(body.redacted()).into_response();
    *redacted.status_mut() = response.status();
    redacted
}

// Component errors reach the client through AppError

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::WriteFailed(msg) => AppError::Storage(msg),
            StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<ConversionError> for HttpAppError {
    fn from(err: ConversionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<PreviewError> for HttpAppError {
    fn from(err: PreviewError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ExtractionError> for HttpAppError {
    fn from(err: ExtractionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<DeliveryError> for HttpAppError {
    fn from(err: DeliveryError) -> Self {
        HttpAppError(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_errors_hide_details() {
        let err = HttpAppError::from(DeliveryError::Smtp("535 bad credentials".to_string()));
        let body = err.body();
        assert_eq!(body.error, "Error sending file");
        assert_eq!(body.code, "DELIVERY_FAILED");
        assert!(body.details.is_none());
    }

    #[test]
    fn validation_errors_carry_details_until_redacted() {
        let err = HttpAppError(AppError::InvalidInput("No file provided".to_string()));
        let body = err.body();
        assert_eq!(body.error, "No file provided");
        assert_eq!(body.error_type.as_deref(), Some("InvalidInput"));
        assert!(body.details.is_some());

        let redacted = body.redacted();
        assert!(redacted.details.is_none());
        assert!(redacted.error_type.is_none());
        assert_eq!(redacted.code, "INVALID_INPUT");
    }

    #[test]
    fn status_follows_error_metadata() {
        let response = HttpAppError(AppError::PayloadTooLarge("too big".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = HttpAppError::from(ConversionError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "not a pdf".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
