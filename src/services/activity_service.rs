//! Append-only audit log.

use sqlx::SqlitePool;

use corkboard_types::{Activity, ActivityAction, ActivityView, ids};

use crate::db;
use crate::error::Result;

/// Append one audit record. Records are write-once and have no bearing on
/// the position invariant; a failure here is logged but does not unwind the
/// operation it describes.
pub async fn record(
    pool: &SqlitePool,
    project_id: &str,
    task_id: Option<&str>,
    user_id: &str,
    action: ActivityAction,
) -> Result<()> {
    let activity = Activity {
        id: ids::new_id(),
        project_id: project_id.to_string(),
        task_id: task_id.map(str::to_string),
        user_id: user_id.to_string(),
        action: action.kind().to_string(),
        details: serde_json::to_string(&action)?,
        created_at: ids::now_rfc3339(),
    };
    db::activities::create(pool, &activity).await
}

/// Like [`record`], for callers that must not fail on audit trouble.
pub async fn record_best_effort(
    pool: &SqlitePool,
    project_id: &str,
    task_id: Option<&str>,
    user_id: &str,
    action: ActivityAction,
) {
    if let Err(e) = record(pool, project_id, task_id, user_id, action).await {
        tracing::warn!(error = %e, project_id, "failed to append activity record");
    }
}

/// Recent activity across the caller's projects, newest first.
pub async fn recent(pool: &SqlitePool, user_id: &str, limit: i64) -> Result<Vec<ActivityView>> {
    let limit = limit.clamp(1, 100);
    db::activities::list_recent_for_user(pool, user_id, limit).await
}
