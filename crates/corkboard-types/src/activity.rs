use serde::{Deserialize, Serialize};

/// The closed set of audit-log actions, each carrying its own payload.
///
/// Stored as a tagged JSON value in the `details` column with the tag
/// duplicated into the indexed `action` column. Matching is exhaustive, so
/// adding a variant forces every consumer to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityAction {
    TaskCreated {
        title: String,
    },
    TaskUpdated {
        changed: Vec<String>,
    },
    TaskMoved {
        from_column: String,
        to_column: String,
        position: i64,
    },
    TaskDeleted {
        title: String,
    },
    CommentAdded {
        comment_id: String,
    },
    AttachmentAdded {
        attachment_id: String,
        file_name: String,
    },
    MemberAdded {
        user_id: String,
    },
    MemberRemoved {
        user_id: String,
    },
}

impl ActivityAction {
    /// Stable string tag used for the indexed `action` column.
    pub fn kind(&self) -> &'static str {
        match self {
            ActivityAction::TaskCreated { .. } => "task_created",
            ActivityAction::TaskUpdated { .. } => "task_updated",
            ActivityAction::TaskMoved { .. } => "task_moved",
            ActivityAction::TaskDeleted { .. } => "task_deleted",
            ActivityAction::CommentAdded { .. } => "comment_added",
            ActivityAction::AttachmentAdded { .. } => "attachment_added",
            ActivityAction::MemberAdded { .. } => "member_added",
            ActivityAction::MemberRemoved { .. } => "member_removed",
        }
    }

    /// Human-readable one-liner for activity feeds.
    pub fn describe(&self) -> String {
        match self {
            ActivityAction::TaskCreated { title } => format!("created task \"{}\"", title),
            ActivityAction::TaskUpdated { changed } => {
                format!("updated task fields: {}", changed.join(", "))
            }
            ActivityAction::TaskMoved {
                from_column,
                to_column,
                position,
            } => format!(
                "moved a task from {} to {} (position {})",
                from_column, to_column, position
            ),
            ActivityAction::TaskDeleted { title } => format!("deleted task \"{}\"", title),
            ActivityAction::CommentAdded { .. } => "added a comment".to_string(),
            ActivityAction::AttachmentAdded { file_name, .. } => {
                format!("attached \"{}\"", file_name)
            }
            ActivityAction::MemberAdded { user_id } => format!("added member {}", user_id),
            ActivityAction::MemberRemoved { user_id } => format!("removed member {}", user_id),
        }
    }
}

/// An audit-log row. Write-once; rows are never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Activity {
    pub id: String,
    pub project_id: String,
    pub task_id: Option<String>,
    pub user_id: String,
    pub action: String,
    pub details: String, // tagged JSON of ActivityAction
    pub created_at: String,
}

impl Activity {
    pub fn action_enum(&self) -> Option<ActivityAction> {
        serde_json::from_str(&self.details).ok()
    }
}

/// An activity row joined with actor/task/project display fields for feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActivityView {
    pub id: String,
    pub project_id: String,
    pub project_name: String,
    pub task_id: Option<String>,
    pub task_title: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub action: String,
    pub details: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_details_json() {
        let action = ActivityAction::TaskMoved {
            from_column: "col-a".to_string(),
            to_column: "col-b".to_string(),
            position: 2,
        };
        let details = serde_json::to_string(&action).unwrap();
        let parsed: ActivityAction = serde_json::from_str(&details).unwrap();
        assert_eq!(parsed, action);
        assert_eq!(action.kind(), "task_moved");
    }

    #[test]
    fn describe_names_the_file_for_attachments() {
        let action = ActivityAction::AttachmentAdded {
            attachment_id: "att-1".to_string(),
            file_name: "spec.pdf".to_string(),
        };
        assert_eq!(action.describe(), "attached \"spec.pdf\"");
    }

    #[test]
    fn unknown_action_tag_is_rejected() {
        let parsed: Result<ActivityAction, _> =
            serde_json::from_str(r#"{"kind":"task_teleported"}"#);
        assert!(parsed.is_err());
    }
}
