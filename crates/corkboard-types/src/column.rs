use serde::{Deserialize, Serialize};

/// A board column. `position` is a dense zero-based index unique within the
/// owning project; it is assigned and maintained by the server's reindexing
/// engine and never written directly from a request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Column {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub position: i64,
    /// Advisory soft cap on the number of tasks; stored and surfaced, never
    /// enforced against concurrent moves.
    pub wip_limit: Option<i64>,
    pub color: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumn {
    pub project_id: String,
    pub name: String,
    pub wip_limit: Option<i64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateColumn {
    pub name: Option<String>,
    pub wip_limit: Option<i64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderColumn {
    pub position: i64,
}
