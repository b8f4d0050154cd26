//! Attachment upload and download. Bytes live on disk under the configured
//! blob directory; rows in `attachments` carry the metadata and the
//! storage key pointing at the file.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use serde::Deserialize;

use corkboard_types::{ApiResponse, Attachment, ids};

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::error::{CorkboardError, Result};
use crate::services::task_service;

const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
    pub mime_type: Option<String>,
}

pub async fn upload(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<Attachment>>> {
    let file_name = query.file_name.trim();
    if file_name.is_empty() {
        return Err(CorkboardError::Validation(
            "file_name is required".to_string(),
        ));
    }
    if body.is_empty() {
        return Err(CorkboardError::Validation(
            "attachment body is empty".to_string(),
        ));
    }
    if body.len() > MAX_ATTACHMENT_BYTES {
        return Err(CorkboardError::Validation(
            "attachment exceeds the 10 MiB limit".to_string(),
        ));
    }

    // The storage key is server-generated; client names never touch the
    // filesystem.
    let storage_key = ids::new_id();
    let path = state.blob_dir.join(&storage_key);
    tokio::fs::write(&path, &body).await?;

    let result = task_service::add_attachment(
        &state.pool,
        &id,
        &user_id,
        file_name,
        &storage_key,
        body.len() as i64,
        query.mime_type.as_deref(),
    )
    .await;

    match result {
        Ok(attachment) => Ok(Json(ApiResponse::ok(attachment))),
        Err(e) => {
            // Don't leave orphaned bytes behind a failed insert.
            if let Err(io) = tokio::fs::remove_file(&path).await {
                tracing::warn!(error = %io, storage_key, "failed to remove orphaned blob");
            }
            Err(e)
        }
    }
}

pub async fn download(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let attachment = task_service::get_attachment(&state.pool, &id, &user_id).await?;

    let path = state.blob_dir.join(&attachment.storage_key);
    let bytes = tokio::fs::read(&path).await?;

    let mut headers = HeaderMap::new();
    let mime = attachment
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    if let Ok(value) = HeaderValue::from_str(mime) {
        headers.insert(CONTENT_TYPE, value);
    }
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment.file_name.replace('"', "")
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(CONTENT_DISPOSITION, value);
    }

    Ok((headers, bytes))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let attachment = task_service::delete_attachment(&state.pool, &id, &user_id).await?;

    let path = state.blob_dir.join(&attachment.storage_key);
    if let Err(io) = tokio::fs::remove_file(&path).await {
        tracing::warn!(error = %io, attachment_id = %attachment.id, "blob already gone");
    }

    Ok(Json(ApiResponse::ack()))
}
