use axum::Json;
use axum::extract::State;

use corkboard_types::{ApiResponse, Metrics};

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::error::Result;
use crate::services::metrics_service;

pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Metrics>>> {
    let metrics = metrics_service::dashboard(&state.pool, &user_id).await?;
    Ok(Json(ApiResponse::ok(metrics)))
}
