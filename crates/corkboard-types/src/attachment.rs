use serde::{Deserialize, Serialize};

/// Attachment metadata. File bytes live in the server's blob directory under
/// `storage_key`; only the metadata travels over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Attachment {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub file_name: String,
    pub storage_key: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub created_at: String,
}
