//! Dashboard aggregates.

use sqlx::SqlitePool;

use corkboard_types::Metrics;

use crate::db;
use crate::error::Result;

pub async fn dashboard(pool: &SqlitePool, user_id: &str) -> Result<Metrics> {
    let stats = db::metrics::dashboard_stats(pool, user_id).await?;
    let priority_distribution = db::metrics::priority_distribution(pool, user_id).await?;
    let team_performance = db::metrics::team_performance(pool, user_id).await?;
    Ok(Metrics {
        stats,
        priority_distribution,
        team_performance,
    })
}
