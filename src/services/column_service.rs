//! Column lifecycle and the project-scoped reorder.

use sqlx::SqlitePool;

use corkboard_types::{Column, CreateColumn, ReorderColumn, UpdateColumn, ids};

use crate::db;
use crate::error::{CorkboardError, Result};
use crate::services::project_service;

const DEFAULT_COLOR: &str = "#6366f1";

/// Create a column appended at the end of the project's column list.
pub async fn create_column(
    pool: &SqlitePool,
    user_id: &str,
    input: CreateColumn,
) -> Result<Column> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CorkboardError::Validation(
            "project_id and name are required".to_string(),
        ));
    }
    if let Some(limit) = input.wip_limit {
        if limit < 1 {
            return Err(CorkboardError::Validation(
                "wip_limit must be a positive integer".to_string(),
            ));
        }
    }

    project_service::require_access(pool, &input.project_id, user_id).await?;

    db::columns::create_appended(
        pool,
        &ids::new_id(),
        &input.project_id,
        name,
        input.wip_limit,
        input.color.as_deref().unwrap_or(DEFAULT_COLOR),
    )
    .await
}

pub async fn require_column(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Column> {
    db::columns::get_for_user(pool, id, user_id)
        .await?
        .ok_or(CorkboardError::ColumnNotFound)
}

/// Update name, WIP limit or color. The WIP limit stays advisory: nothing
/// checks it against the column's task count, here or in the move path.
pub async fn update_column(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    updates: UpdateColumn,
) -> Result<Column> {
    let column = require_column(pool, id, user_id).await?;

    let name = match updates.name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CorkboardError::Validation("name cannot be empty".to_string()));
            }
            name
        }
        None => column.name,
    };
    let color = updates.color.unwrap_or(column.color);

    db::columns::update_meta(pool, id, &name, updates.wip_limit, &color).await?;
    require_column(pool, id, user_id).await
}

/// Reorder a column within its project; returns the project's columns in
/// their new order.
pub async fn reorder_column(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    input: ReorderColumn,
) -> Result<Vec<Column>> {
    let column = require_column(pool, id, user_id).await?;

    if input.position < 0 {
        return Err(CorkboardError::Validation(
            "position must be a non-negative integer".to_string(),
        ));
    }

    db::columns::reorder(pool, &column.id, input.position).await
}

/// Delete a column. Refused with 409 while it still contains tasks; the
/// caller must move or delete them first. Owner only.
pub async fn delete_column(pool: &SqlitePool, id: &str, user_id: &str) -> Result<()> {
    let column = db::columns::get_owned(pool, id, user_id)
        .await?
        .ok_or(CorkboardError::ColumnNotFound)?;

    db::columns::delete_guarded(pool, &column.id).await
}
