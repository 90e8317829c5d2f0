use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sandgraph_application::{DeletionError, DeletionErrorKind};
use sandgraph_core::AppError;
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

/// HTTP API error wrapper around application errors.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Deletion(DeletionError),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<DeletionError> for ApiError {
    fn from(value: DeletionError) -> Self {
        Self::Deletion(value)
    }
}

impl ApiError {
    fn status_and_payload(&self) -> (StatusCode, ErrorResponse) {
        match self {
            Self::Deletion(deletion_error) => {
                let kind = deletion_error.kind();
                let status = match kind {
                    DeletionErrorKind::NotFound => StatusCode::NOT_FOUND,
                    DeletionErrorKind::AccessDenied => StatusCode::FORBIDDEN,
                    DeletionErrorKind::DispatchError => StatusCode::SERVICE_UNAVAILABLE,
                };

                (
                    status,
                    ErrorResponse {
                        kind: kind.as_str().to_owned(),
                        message: deletion_error.to_string(),
                    },
                )
            }
            Self::App(app_error) => {
                let (status, kind) = match app_error {
                    AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
                    AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                    AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                    AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
                    AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
                    AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
                    AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
                };

                let message = match app_error {
                    AppError::Internal(_) | AppError::Unavailable(_) => {
                        error!(error = %app_error, "request failed");
                        "the request could not be completed".to_owned()
                    }
                    _ => app_error.to_string(),
                };

                (
                    status,
                    ErrorResponse {
                        kind: kind.to_owned(),
                        message,
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = self.status_and_payload();
        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
