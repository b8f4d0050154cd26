#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;

use corkboard::db;
use corkboard::services::{auth_service, project_service, task_service};
use corkboard_types::{Board, CreateProject, CreateTask, Priority, Project, Task};

/// A fresh on-disk SQLite database that disappears with the test.
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn setup() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::connection::create_pool(&dir.path().join("test.db"))
        .await
        .unwrap();
    db::connection::run_migrations(&pool).await.unwrap();
    TestDb { pool, _dir: dir }
}

/// Register an account; returns (user_id, token).
pub async fn register(pool: &SqlitePool, email: &str) -> (String, String) {
    let data = auth_service::register(pool, email, "hunter2hunter2", "Test User")
        .await
        .unwrap();
    (data.user.id, data.token)
}

/// A project with its three default columns.
pub async fn make_project(pool: &SqlitePool, owner_id: &str) -> Project {
    project_service::create_project(
        pool,
        owner_id,
        CreateProject {
            name: "Test Board".to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

pub async fn make_task(
    pool: &SqlitePool,
    user_id: &str,
    project_id: &str,
    column_id: &str,
    title: &str,
) -> Task {
    task_service::create_task(
        pool,
        user_id,
        CreateTask {
            project_id: project_id.to_string(),
            column_id: column_id.to_string(),
            title: title.to_string(),
            description: None,
            priority: Some(Priority::Medium),
            assignee_id: None,
            due_date: None,
            labels: None,
        },
    )
    .await
    .unwrap()
}

pub async fn board(pool: &SqlitePool, project_id: &str, user_id: &str) -> Board {
    project_service::get_board(pool, project_id, user_id)
        .await
        .unwrap()
}

/// Task titles of one column in position order.
pub fn column_order(board: &Board, column_id: &str) -> Vec<String> {
    board
        .columns
        .iter()
        .find(|c| c.column.id == column_id)
        .map(|c| c.tasks.iter().map(|t| t.title.clone()).collect())
        .unwrap_or_default()
}

/// Assert positions in `column_id` are exactly 0..n in listing order.
pub fn assert_dense(board: &Board, column_id: &str) {
    let column = board
        .columns
        .iter()
        .find(|c| c.column.id == column_id)
        .unwrap();
    for (i, task) in column.tasks.iter().enumerate() {
        assert_eq!(
            task.position, i as i64,
            "column {column_id} has a gap or duplicate at index {i}"
        );
    }
}
