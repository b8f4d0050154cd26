use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use corkboard_types::{
    ApiResponse, Board, CreateProject, MemberRole, Project, ProjectMember, UpdateProject,
};

use crate::api::auth::AuthUser;
use crate::api::{ApiJson, AppState};
use crate::error::Result;
use crate::services::project_service;

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Vec<Project>>>> {
    let projects = project_service::list_projects(&state.pool, &user_id).await?;
    Ok(Json(ApiResponse::ok(projects)))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(input): ApiJson<CreateProject>,
) -> Result<Json<ApiResponse<Project>>> {
    let project = project_service::create_project(&state.pool, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(project)))
}

pub async fn board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Board>>> {
    let board = project_service::get_board(&state.pool, &id, &user_id).await?;
    Ok(Json(ApiResponse::ok(board)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateProject>,
) -> Result<Json<ApiResponse<Project>>> {
    let project = project_service::update_project(&state.pool, &id, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(project)))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    project_service::delete_project(&state.pool, &id, &user_id).await?;
    Ok(Json(ApiResponse::ack()))
}

#[derive(Deserialize)]
pub struct AddMemberBody {
    pub email: String,
    #[serde(default)]
    pub role: Option<MemberRole>,
}

pub async fn add_member(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<AddMemberBody>,
) -> Result<Json<ApiResponse<ProjectMember>>> {
    let member = project_service::add_member(
        &state.pool,
        &id,
        &user_id,
        &input.email,
        input.role.unwrap_or_default(),
    )
    .await?;
    Ok(Json(ApiResponse::ok(member)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, member_user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    project_service::remove_member(&state.pool, &id, &user_id, &member_user_id).await?;
    Ok(Json(ApiResponse::ack()))
}
