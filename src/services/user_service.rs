//! User lookup for pickers, e.g. choosing an assignee.

use sqlx::SqlitePool;

use corkboard_types::UserPublic;

use crate::db;
use crate::error::{CorkboardError, Result};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

/// Search accounts by name or email substring. An empty query lists
/// accounts up to the limit.
pub async fn search(
    pool: &SqlitePool,
    query: &str,
    limit: Option<i64>,
) -> Result<Vec<UserPublic>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let users = db::users::search(pool, query.trim(), limit).await?;
    Ok(users.into_iter().map(UserPublic::from).collect())
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<UserPublic> {
    let user = db::users::get(pool, id)
        .await?
        .ok_or(CorkboardError::UserNotFound)?;
    Ok(UserPublic::from(user))
}
