use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use corkboard_types::{ApiResponse, UserPublic};

use crate::api::AppState;
use crate::api::auth::AuthUser;
use crate::error::Result;
use crate::services::user_service;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

pub async fn search(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<UserPublic>>>> {
    let users = user_service::search(&state.pool, &query.q, query.limit).await?;
    Ok(Json(ApiResponse::ok(users)))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserPublic>>> {
    let user = user_service::get(&state.pool, &id).await?;
    Ok(Json(ApiResponse::ok(user)))
}
