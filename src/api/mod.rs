//! JSON REST API: axum router, shared state, and the extractors every
//! handler leans on.

pub mod activities;
pub mod attachments;
pub mod auth;
pub mod columns;
pub mod metrics;
pub mod projects;
pub mod tasks;
pub mod users;

use std::path::PathBuf;

use axum::Router;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::routing::{delete, get, post, put};
use sqlx::SqlitePool;

use crate::error::CorkboardError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// Directory holding attachment bytes.
    pub blob_dir: PathBuf,
}

/// `axum::Json` with rejections folded into the standard error envelope, so
/// a malformed body comes back as a 400 validation error and never reaches a
/// handler.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = CorkboardError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| CorkboardError::Validation(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/me", get(auth::me).put(auth::update_profile))
        .route("/api/users", get(users::search))
        .route("/api/users/{id}", get(users::get))
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/{id}",
            get(projects::board)
                .put(projects::update)
                .delete(projects::remove),
        )
        .route("/api/projects/{id}/members", post(projects::add_member))
        .route(
            "/api/projects/{id}/members/{user_id}",
            delete(projects::remove_member),
        )
        .route("/api/columns", post(columns::create))
        .route(
            "/api/columns/{id}",
            put(columns::update).delete(columns::remove),
        )
        .route("/api/columns/{id}/reorder", put(columns::reorder))
        .route("/api/tasks", post(tasks::create))
        .route("/api/tasks/calendar", get(tasks::calendar))
        .route(
            "/api/tasks/{id}",
            get(tasks::details).put(tasks::update).delete(tasks::remove),
        )
        .route("/api/tasks/{id}/move", post(tasks::move_task))
        .route("/api/tasks/{id}/subtasks", post(tasks::add_subtask))
        .route(
            "/api/tasks/{id}/subtasks/{subtask_id}",
            put(tasks::update_subtask).delete(tasks::remove_subtask),
        )
        .route("/api/tasks/{id}/comments", post(tasks::add_comment))
        .route(
            "/api/tasks/{id}/comments/{comment_id}",
            delete(tasks::remove_comment),
        )
        .route("/api/tasks/{id}/attachments", post(attachments::upload))
        .route(
            "/api/attachments/{id}",
            get(attachments::download).delete(attachments::remove),
        )
        .route("/api/activities", get(activities::recent))
        .route("/api/metrics", get(metrics::dashboard))
        .with_state(state)
}
