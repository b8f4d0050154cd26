use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use corkboard_types::{
    ApiResponse, CalendarTask, CommentView, CreateComment, CreateSubtask, CreateTask, MoveTask,
    Subtask, Task, TaskDetails, UpdateSubtask, UpdateTask,
};

use crate::api::auth::AuthUser;
use crate::api::{ApiJson, AppState};
use crate::error::Result;
use crate::services::task_service;

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(input): ApiJson<CreateTask>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = task_service::create_task(&state.pool, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(task)))
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn calendar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarTask>>>> {
    let tasks = task_service::calendar(
        &state.pool,
        &user_id,
        query.from.as_deref(),
        query.to.as_deref(),
    )
    .await?;
    Ok(Json(ApiResponse::ok(tasks)))
}

pub async fn details(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TaskDetails>>> {
    let details = task_service::get_task_details(&state.pool, &id, &user_id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateTask>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = task_service::update_task(&state.pool, &id, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn move_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<MoveTask>,
) -> Result<Json<ApiResponse<()>>> {
    task_service::move_task(&state.pool, &id, &user_id, input).await?;
    Ok(Json(ApiResponse::ack()))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    task_service::delete_task(&state.pool, &id, &user_id).await?;
    Ok(Json(ApiResponse::ack()))
}

// --- Subtasks ---

pub async fn add_subtask(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CreateSubtask>,
) -> Result<Json<ApiResponse<Subtask>>> {
    let subtask = task_service::add_subtask(&state.pool, &id, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(subtask)))
}

pub async fn update_subtask(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, subtask_id)): Path<(String, String)>,
    ApiJson(input): ApiJson<UpdateSubtask>,
) -> Result<Json<ApiResponse<Subtask>>> {
    let subtask =
        task_service::update_subtask(&state.pool, &id, &subtask_id, &user_id, input).await?;
    Ok(Json(ApiResponse::ok(subtask)))
}

pub async fn remove_subtask(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, subtask_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    task_service::delete_subtask(&state.pool, &id, &subtask_id, &user_id).await?;
    Ok(Json(ApiResponse::ack()))
}

// --- Comments ---

pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CreateComment>,
) -> Result<Json<ApiResponse<CommentView>>> {
    let comment = task_service::add_comment(&state.pool, &id, &user_id, &input.content).await?;
    Ok(Json(ApiResponse::ok(comment)))
}

pub async fn remove_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((_id, comment_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    task_service::delete_comment(&state.pool, &comment_id, &user_id).await?;
    Ok(Json(ApiResponse::ack()))
}
