use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use corkboard_types::ApiResponse;

#[derive(Error, Debug)]
pub enum CorkboardError {
    #[error("Project not found or access denied")]
    ProjectNotFound,

    #[error("Task not found or access denied")]
    TaskNotFound,

    #[error("Column not found or access denied")]
    ColumnNotFound,

    #[error("Subtask not found")]
    SubtaskNotFound,

    #[error("Comment not found or not owner")]
    CommentNotFound,

    #[error("Attachment not found or access denied")]
    AttachmentNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing or invalid bearer token")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Position {position} is out of range for a container of size {len}")]
    PositionOutOfRange { position: i64, len: i64 },

    #[error("Corrupt position ordering in container {container}: {detail}")]
    CorruptOrdering { container: String, detail: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CorkboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Entity lookups double as access checks; a caller without
            // membership sees the same 404 as a missing row, so existence is
            // never leaked.
            CorkboardError::ProjectNotFound
            | CorkboardError::TaskNotFound
            | CorkboardError::ColumnNotFound
            | CorkboardError::SubtaskNotFound
            | CorkboardError::CommentNotFound
            | CorkboardError::AttachmentNotFound
            | CorkboardError::UserNotFound => StatusCode::NOT_FOUND,

            CorkboardError::InvalidCredentials | CorkboardError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }

            CorkboardError::Validation(_) | CorkboardError::PositionOutOfRange { .. } => {
                StatusCode::BAD_REQUEST
            }

            CorkboardError::Conflict(_) => StatusCode::CONFLICT,

            CorkboardError::CorruptOrdering { .. }
            | CorkboardError::Database(_)
            | CorkboardError::Io(_)
            | CorkboardError::Json(_)
            | CorkboardError::Toml(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_label(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "Validation Error",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            _ => "Server Error",
        }
    }
}

impl IntoResponse for CorkboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = ApiResponse::<()>::failure(self.error_label(), self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CorkboardError>;
