//! Registration, login, and the bearer-token extractor.

use axum::Json;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use corkboard_types::{ApiResponse, AuthData, LoginRequest, RegisterRequest, UpdateProfile, UserPublic};

use crate::api::{ApiJson, AppState};
use crate::error::{CorkboardError, Result};
use crate::services::auth_service;

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header. Every route except register/login requires it.
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = CorkboardError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(CorkboardError::Unauthorized)?;

        let user_id = auth_service::authenticate(&state.pool, token).await?;
        Ok(AuthUser(user_id))
    }
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthData>>> {
    let data =
        auth_service::register(&state.pool, &input.email, &input.password, &input.full_name)
            .await?;
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<UserPublic>>> {
    let profile = auth_service::get_profile(&state.pool, &user_id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(input): ApiJson<UpdateProfile>,
) -> Result<Json<ApiResponse<UserPublic>>> {
    let profile = auth_service::update_profile(&state.pool, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>> {
    let data = auth_service::login(&state.pool, &input.email, &input.password).await?;
    Ok(Json(ApiResponse::ok(data)))
}
