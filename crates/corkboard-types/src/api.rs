use serde::{Deserialize, Serialize};

use crate::user::UserPublic;

/// The uniform response envelope: `{ success, data?, error?, message? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// A bare `{ "success": true }` acknowledgement, as returned by move and
    /// delete endpoints.
    pub fn ack() -> Self {
        ApiResponse {
            success: true,
            data: None,
            error: None,
            message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful register/login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthData {
    pub token: String,
    pub user: UserPublic,
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub overdue_tasks: i64,
    pub total_projects: i64,
    pub active_projects: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AssigneePerformance {
    pub user_id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub completed: i64,
    pub in_progress: i64,
    pub total: i64,
}

/// `GET /api/metrics` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub stats: DashboardStats,
    pub priority_distribution: Vec<PriorityCount>,
    pub team_performance: Vec<AssigneePerformance>,
}
