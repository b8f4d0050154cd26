use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::comment::CommentView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Sort key, most urgent first.
    pub fn order(&self) -> i32 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(()),
        }
    }
}

/// A card on the board. `position` is a dense zero-based index unique within
/// the owning column, maintained exclusively by the server's reindexing
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub column_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub position: i64,
    pub assignee_id: Option<String>,
    pub due_date: Option<String>,
    pub labels: Option<String>, // JSON array
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn priority_enum(&self) -> Priority {
        self.priority.parse().unwrap_or_default()
    }

    pub fn labels_vec(&self) -> Vec<String> {
        self.labels
            .as_ref()
            .and_then(|l| serde_json::from_str(l).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Subtask {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub is_completed: i64,
    pub position: i64,
    pub created_at: String,
}

impl Subtask {
    pub fn is_completed(&self) -> bool {
        self.is_completed != 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: String,
    pub column_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub assignee_id: Option<String>,
    pub due_date: Option<String>,
    pub labels: Option<Vec<String>>,
}

/// Patch body for `PUT /api/tasks/{id}`. An absent field stays unchanged;
/// for the nullable fields an explicit JSON `null` clears the stored value,
/// so the outer `Option` means "present in the body" and the inner one is
/// the new value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Option<Vec<String>>>,
}

/// Keeps "field absent" (outer `None`) distinct from "field set to null"
/// (inner `None`); the stock `Option` impl collapses the two.
fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/tasks/{id}/move`. Both fields are required; `position`
/// must be non-negative and within the destination container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveTask {
    pub column_id: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubtask {
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubtask {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

/// `GET /api/tasks/{id}` payload: the task plus its dependent collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
    pub comments: Vec<CommentView>,
    pub attachments: Vec<Attachment>,
}

/// A due-dated task projected for the calendar view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CalendarTask {
    pub id: String,
    pub title: String,
    pub due_date: String,
    pub priority: String,
    pub project_id: String,
    pub project_name: String,
    pub column_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parses_and_orders_most_urgent_first() {
        let p: Priority = "critical".parse().unwrap();
        assert_eq!(p, Priority::Critical);
        assert!(Priority::Critical.order() < Priority::Low.order());
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn labels_survive_the_json_column() {
        let task = Task {
            id: "t".to_string(),
            project_id: "p".to_string(),
            column_id: "c".to_string(),
            title: "x".to_string(),
            description: None,
            priority: "medium".to_string(),
            position: 0,
            assignee_id: None,
            due_date: None,
            labels: Some(r#"["backend","urgent"]"#.to_string()),
            created_by: "u".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(task.labels_vec(), ["backend", "urgent"]);
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let patch: UpdateTask = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(patch.assignee_id, None);
        assert_eq!(patch.due_date, None);

        let patch: UpdateTask =
            serde_json::from_str(r#"{"assignee_id":null,"due_date":"2026-09-01"}"#).unwrap();
        assert_eq!(patch.assignee_id, Some(None));
        assert_eq!(patch.due_date, Some(Some("2026-09-01".to_string())));

        let patch: UpdateTask = serde_json::from_str(r#"{"labels":null}"#).unwrap();
        assert_eq!(patch.labels, Some(None));
    }
}
