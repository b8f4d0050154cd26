use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use corkboard_types::{ActivityView, ApiResponse};

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::error::Result;
use crate::services::activity_service;

#[derive(Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

pub async fn recent(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityView>>>> {
    let activities =
        activity_service::recent(&state.pool, &user_id, query.limit.unwrap_or(20)).await?;
    Ok(Json(ApiResponse::ok(activities)))
}
