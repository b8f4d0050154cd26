use axum::Json;
use axum::extract::{Path, State};

use corkboard_types::{ApiResponse, Column, CreateColumn, ReorderColumn, UpdateColumn};

use crate::api::auth::AuthUser;
use crate::api::{ApiJson, AppState};
use crate::error::Result;
use crate::services::column_service;

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(input): ApiJson<CreateColumn>,
) -> Result<Json<ApiResponse<Column>>> {
    let column = column_service::create_column(&state.pool, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(column)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateColumn>,
) -> Result<Json<ApiResponse<Column>>> {
    let column = column_service::update_column(&state.pool, &id, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(column)))
}

pub async fn reorder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ReorderColumn>,
) -> Result<Json<ApiResponse<Vec<Column>>>> {
    let columns = column_service::reorder_column(&state.pool, &id, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(columns)))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    column_service::delete_column(&state.pool, &id, &user_id).await?;
    Ok(Json(ApiResponse::ack()))
}
