use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use divvy_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Unauthenticated { .. } | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InvalidInput(_) | AppError::NoValidSplits | AppError::ShareMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            ErrorResponse {
                message: "Server error".to_string(),
                error: Some(self.0.to_string()),
            }
        } else {
            ErrorResponse {
                message: self.0.to_string(),
                error: self.0.detail(),
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
