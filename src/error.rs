use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::qr::QrError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("QR encoding failed: {0}")]
    Encoding(String),

    #[error("Asset write failed: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<QrError> for AppError {
    fn from(e: QrError) -> Self {
        match e {
            QrError::Encoding(msg) => AppError::Encoding(msg),
            QrError::Io(source) => AppError::Io(source.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Encoding(_) | AppError::Io(_) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
