//! Task lifecycle: create/move/delete drive the position reindexing engine;
//! everything else is conventional CRUD around it.

use sqlx::SqlitePool;

use corkboard_types::{
    ActivityAction, Attachment, CalendarTask, Comment, CommentView, CreateSubtask, CreateTask,
    MoveTask, Subtask, Task, TaskDetails, UpdateSubtask, UpdateTask, ids,
};

use crate::db;
use crate::error::{CorkboardError, Result};
use crate::services::{activity_service, project_service};

/// Create a task appended at the end of the target column.
pub async fn create_task(pool: &SqlitePool, user_id: &str, input: CreateTask) -> Result<Task> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CorkboardError::Validation(
            "project_id, column_id, and title are required".to_string(),
        ));
    }

    // Membership check precedes any mutation.
    project_service::require_access(pool, &input.project_id, user_id).await?;

    // The column must belong to the same project.
    let column = db::columns::get_for_user(pool, &input.column_id, user_id)
        .await?
        .ok_or(CorkboardError::ColumnNotFound)?;
    if column.project_id != input.project_id {
        return Err(CorkboardError::Validation(
            "column does not belong to the given project".to_string(),
        ));
    }

    let now = ids::now_rfc3339();
    let task = Task {
        id: ids::new_id(),
        project_id: input.project_id,
        column_id: input.column_id,
        title: title.to_string(),
        description: input.description,
        priority: input.priority.unwrap_or_default().as_str().to_string(),
        position: 0, // assigned by the insert
        assignee_id: input.assignee_id,
        due_date: input.due_date,
        labels: match &input.labels {
            Some(labels) => Some(serde_json::to_string(labels)?),
            None => None,
        },
        created_by: user_id.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    let task = db::tasks::create_appended(pool, &task).await?;

    activity_service::record_best_effort(
        pool,
        &task.project_id,
        Some(&task.id),
        user_id,
        ActivityAction::TaskCreated {
            title: task.title.clone(),
        },
    )
    .await;

    tracing::debug!(task_id = %task.id, position = task.position, "created task");
    Ok(task)
}

/// Look up a task the caller may read and write.
pub async fn require_task(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Task> {
    db::tasks::get_for_user(pool, id, user_id)
        .await?
        .ok_or(CorkboardError::TaskNotFound)
}

/// A task with its subtasks, comments and attachments.
pub async fn get_task_details(pool: &SqlitePool, id: &str, user_id: &str) -> Result<TaskDetails> {
    let task = require_task(pool, id, user_id).await?;
    let subtasks = db::subtasks::list_by_task(pool, &task.id).await?;
    let comments = db::comments::list_views_by_task(pool, &task.id).await?;
    let attachments = db::attachments::list_by_task(pool, &task.id).await?;
    Ok(TaskDetails {
        task,
        subtasks,
        comments,
        attachments,
    })
}

pub async fn update_task(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    updates: UpdateTask,
) -> Result<Task> {
    let mut task = require_task(pool, id, user_id).await?;

    let mut changed = Vec::new();
    if let Some(title) = updates.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(CorkboardError::Validation("title cannot be empty".to_string()));
        }
        task.title = title;
        changed.push("title".to_string());
    }
    // For the nullable fields the outer Option is "present in the body";
    // an inner None clears the stored value.
    if let Some(description) = updates.description {
        task.description = description;
        changed.push("description".to_string());
    }
    if let Some(priority) = updates.priority {
        task.priority = priority.as_str().to_string();
        changed.push("priority".to_string());
    }
    if let Some(assignee_id) = updates.assignee_id {
        task.assignee_id = assignee_id;
        changed.push("assignee_id".to_string());
    }
    if let Some(due_date) = updates.due_date {
        task.due_date = due_date;
        changed.push("due_date".to_string());
    }
    if let Some(labels) = updates.labels {
        task.labels = match labels {
            Some(labels) => Some(serde_json::to_string(&labels)?),
            None => None,
        };
        changed.push("labels".to_string());
    }

    db::tasks::update_meta(pool, &task).await?;

    if !changed.is_empty() {
        activity_service::record_best_effort(
            pool,
            &task.project_id,
            Some(&task.id),
            user_id,
            ActivityAction::TaskUpdated { changed },
        )
        .await;
    }

    require_task(pool, id, user_id).await
}

/// Move a task to a column at a position. The whole reindex commits or none
/// of it does; every committed move appends a `task_moved` audit record.
pub async fn move_task(pool: &SqlitePool, id: &str, user_id: &str, input: MoveTask) -> Result<()> {
    // Membership check precedes any mutation.
    let task = require_task(pool, id, user_id).await?;

    let dest = db::columns::get_for_user(pool, &input.column_id, user_id)
        .await?
        .ok_or(CorkboardError::ColumnNotFound)?;
    if dest.project_id != task.project_id {
        return Err(CorkboardError::Validation(
            "cannot move a task into another project's column".to_string(),
        ));
    }
    if input.position < 0 {
        return Err(CorkboardError::Validation(
            "position must be a non-negative integer".to_string(),
        ));
    }

    let outcome = db::tasks::move_to(pool, &task.id, &dest.id, input.position).await?;

    // A move to the task's current slot commits nothing, so it leaves no
    // audit record either.
    if outcome.changed {
        activity_service::record_best_effort(
            pool,
            &outcome.project_id,
            Some(&task.id),
            user_id,
            ActivityAction::TaskMoved {
                from_column: outcome.from_column,
                to_column: outcome.to_column,
                position: outcome.position,
            },
        )
        .await;
    }

    tracing::debug!(task_id = %task.id, position = outcome.position, "moved task");
    Ok(())
}

/// Delete a task and reindex the remaining siblings in its column.
pub async fn delete_task(pool: &SqlitePool, id: &str, user_id: &str) -> Result<()> {
    let task = require_task(pool, id, user_id).await?;

    let (project_id, _column, _pos, title) = db::tasks::delete_reindexed(pool, &task.id).await?;

    activity_service::record_best_effort(
        pool,
        &project_id,
        None,
        user_id,
        ActivityAction::TaskDeleted { title },
    )
    .await;

    Ok(())
}

/// Due-dated tasks for the calendar view.
pub async fn calendar(
    pool: &SqlitePool,
    user_id: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<CalendarTask>> {
    db::tasks::calendar(pool, user_id, from, to).await
}

// --- Subtasks ---

pub async fn add_subtask(
    pool: &SqlitePool,
    task_id: &str,
    user_id: &str,
    input: CreateSubtask,
) -> Result<Subtask> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CorkboardError::Validation("title is required".to_string()));
    }
    let task = require_task(pool, task_id, user_id).await?;
    db::subtasks::create_appended(pool, &ids::new_id(), &task.id, title).await
}

pub async fn update_subtask(
    pool: &SqlitePool,
    task_id: &str,
    subtask_id: &str,
    user_id: &str,
    updates: UpdateSubtask,
) -> Result<Subtask> {
    let task = require_task(pool, task_id, user_id).await?;
    let subtask = db::subtasks::get(pool, subtask_id, &task.id)
        .await?
        .ok_or(CorkboardError::SubtaskNotFound)?;

    let title = updates.title.unwrap_or(subtask.title);
    let is_completed = match updates.is_completed {
        Some(done) => i64::from(done),
        None => subtask.is_completed,
    };
    db::subtasks::update(pool, subtask_id, &task.id, &title, is_completed).await?;

    db::subtasks::get(pool, subtask_id, &task.id)
        .await?
        .ok_or(CorkboardError::SubtaskNotFound)
}

pub async fn delete_subtask(
    pool: &SqlitePool,
    task_id: &str,
    subtask_id: &str,
    user_id: &str,
) -> Result<()> {
    let task = require_task(pool, task_id, user_id).await?;
    if !db::subtasks::delete(pool, subtask_id, &task.id).await? {
        return Err(CorkboardError::SubtaskNotFound);
    }
    Ok(())
}

// --- Comments ---

pub async fn add_comment(
    pool: &SqlitePool,
    task_id: &str,
    user_id: &str,
    content: &str,
) -> Result<CommentView> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CorkboardError::Validation("content is required".to_string()));
    }
    let task = require_task(pool, task_id, user_id).await?;

    let now = ids::now_rfc3339();
    let comment = Comment {
        id: ids::new_id(),
        task_id: task.id.clone(),
        user_id: user_id.to_string(),
        content: content.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    db::comments::create(pool, &comment).await?;

    activity_service::record_best_effort(
        pool,
        &task.project_id,
        Some(&task.id),
        user_id,
        ActivityAction::CommentAdded {
            comment_id: comment.id.clone(),
        },
    )
    .await;

    db::comments::get_view(pool, &comment.id)
        .await?
        .ok_or(CorkboardError::CommentNotFound)
}

/// Delete a comment; only its author may do so.
pub async fn delete_comment(pool: &SqlitePool, comment_id: &str, user_id: &str) -> Result<()> {
    if !db::comments::delete_owned(pool, comment_id, user_id).await? {
        return Err(CorkboardError::CommentNotFound);
    }
    Ok(())
}

// --- Attachments ---

/// Record an attachment and hand back its metadata. The caller has already
/// persisted the bytes under `storage_key`.
pub async fn add_attachment(
    pool: &SqlitePool,
    task_id: &str,
    user_id: &str,
    file_name: &str,
    storage_key: &str,
    file_size: i64,
    mime_type: Option<&str>,
) -> Result<Attachment> {
    let task = require_task(pool, task_id, user_id).await?;

    let attachment = Attachment {
        id: ids::new_id(),
        task_id: task.id.clone(),
        user_id: user_id.to_string(),
        file_name: file_name.to_string(),
        storage_key: storage_key.to_string(),
        file_size,
        mime_type: mime_type.map(str::to_string),
        created_at: ids::now_rfc3339(),
    };
    db::attachments::create(pool, &attachment).await?;

    activity_service::record_best_effort(
        pool,
        &task.project_id,
        Some(&task.id),
        user_id,
        ActivityAction::AttachmentAdded {
            attachment_id: attachment.id.clone(),
            file_name: attachment.file_name.clone(),
        },
    )
    .await;

    Ok(attachment)
}

pub async fn get_attachment(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Attachment> {
    db::attachments::get_for_user(pool, id, user_id)
        .await?
        .ok_or(CorkboardError::AttachmentNotFound)
}

pub async fn delete_attachment(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Attachment> {
    let attachment = get_attachment(pool, id, user_id).await?;
    db::attachments::delete(pool, &attachment.id).await?;
    Ok(attachment)
}
