//! Conversion of domain errors into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use storebooks_core::catalog::LookupError;
use storebooks_core::journal::{CommitError, CommitErrorBody, ReconcileError, ReconcileResponse};
use storebooks_shared::AppError;

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Application error rendered as `{error, message}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self(match err {
            LookupError::Unavailable(message) => AppError::Unavailable(message),
            LookupError::Rejected(message) => AppError::Forbidden(message),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.status_code() >= 500 {
            tracing::error!(error = %self.0, "Request failed");
        }
        (
            status(self.0.status_code()),
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

/// Commit failure rendered as a [`CommitErrorBody`].
#[derive(Debug)]
pub struct CommitFailure(pub CommitError);

impl IntoResponse for CommitFailure {
    fn into_response(self) -> Response {
        let body = CommitErrorBody::from(&self.0);
        (status(self.0.http_status_code()), Json(body)).into_response()
    }
}

/// Reconciliation failure rendered as `{applied: false, error}`.
#[derive(Debug)]
pub struct ReconcileFailure(pub ReconcileError);

impl IntoResponse for ReconcileFailure {
    fn into_response(self) -> Response {
        let body = ReconcileResponse {
            applied: false,
            error: Some(self.0.to_string()),
        };
        (status(self.0.http_status_code()), Json(body)).into_response()
    }
}
