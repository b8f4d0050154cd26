//! Project lifecycle, membership and the board query.

use sqlx::SqlitePool;

use corkboard_types::{
    ActivityAction, Board, ColumnWithTasks, CreateProject, MemberRole, Project, ProjectMember,
    UpdateProject, ids,
};

use crate::db;
use crate::error::{CorkboardError, Result};
use crate::positions;
use crate::services::activity_service;

/// The columns every new project starts with.
const DEFAULT_COLUMNS: [(&str, &str); 3] = [
    ("To Do", "#6366f1"),
    ("In Progress", "#f59e0b"),
    ("Done", "#10b981"),
];

pub async fn create_project(
    pool: &SqlitePool,
    owner_id: &str,
    input: CreateProject,
) -> Result<Project> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CorkboardError::Validation("name is required".to_string()));
    }

    let now = ids::now_rfc3339();
    let project = Project {
        id: ids::new_id(),
        name: name.to_string(),
        description: input.description,
        owner_id: owner_id.to_string(),
        is_archived: 0,
        created_at: now.clone(),
        updated_at: now,
    };
    db::projects::create(pool, &project).await?;

    for (name, color) in DEFAULT_COLUMNS {
        db::columns::create_appended(pool, &ids::new_id(), &project.id, name, None, color).await?;
    }

    tracing::info!(project_id = %project.id, owner_id, "created project");
    Ok(project)
}

/// Look up a project the caller may read and write; missing and forbidden
/// are indistinguishable.
pub async fn require_access(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Project> {
    db::projects::get_for_user(pool, id, user_id)
        .await?
        .ok_or(CorkboardError::ProjectNotFound)
}

pub async fn require_owner(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Project> {
    db::projects::get_owned(pool, id, user_id)
        .await?
        .ok_or(CorkboardError::ProjectNotFound)
}

pub async fn list_projects(pool: &SqlitePool, user_id: &str) -> Result<Vec<Project>> {
    db::projects::list_for_user(pool, user_id).await
}

/// The full board: columns in position order, each with its tasks in
/// position order, plus the member roster. Orderings are integrity-checked
/// on the way out; a gap or duplicate is reported, never patched.
pub async fn get_board(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Board> {
    let project = require_access(pool, id, user_id).await?;

    let columns = db::columns::list_by_project(pool, &project.id).await?;
    positions::check_dense(
        &format!("project {}", project.id),
        &columns.iter().map(|c| c.position).collect::<Vec<_>>(),
    )?;

    let mut with_tasks = Vec::with_capacity(columns.len());
    for column in columns {
        let tasks = db::tasks::list_by_column(pool, &column.id).await?;
        positions::check_dense(
            &format!("column {}", column.id),
            &tasks.iter().map(|t| t.position).collect::<Vec<_>>(),
        )?;
        with_tasks.push(ColumnWithTasks { column, tasks });
    }

    let members = db::members::roster(pool, &project.id).await?;

    Ok(Board {
        project,
        columns: with_tasks,
        members,
    })
}

pub async fn update_project(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    updates: UpdateProject,
) -> Result<Project> {
    let mut project = require_access(pool, id, user_id).await?;

    if let Some(name) = updates.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CorkboardError::Validation("name cannot be empty".to_string()));
        }
        project.name = name;
    }
    if let Some(description) = updates.description {
        project.description = Some(description);
    }
    if let Some(archived) = updates.is_archived {
        project.is_archived = if archived { 1 } else { 0 };
    }

    db::projects::update(pool, &project).await?;
    require_access(pool, id, user_id).await
}

/// Delete a project and everything it owns. Owner only.
pub async fn delete_project(pool: &SqlitePool, id: &str, user_id: &str) -> Result<()> {
    let project = require_owner(pool, id, user_id).await?;
    db::projects::delete(pool, &project.id).await?;
    tracing::info!(project_id = %project.id, "deleted project");
    Ok(())
}

/// Add a member by email. Owner only.
pub async fn add_member(
    pool: &SqlitePool,
    project_id: &str,
    owner_id: &str,
    email: &str,
    role: MemberRole,
) -> Result<ProjectMember> {
    let project = require_owner(pool, project_id, owner_id).await?;

    let user = db::users::get_by_email(pool, &email.trim().to_lowercase())
        .await?
        .ok_or(CorkboardError::UserNotFound)?;

    if user.id == project.owner_id {
        return Err(CorkboardError::Conflict(
            "the owner is already a member".to_string(),
        ));
    }
    if db::members::exists(pool, &project.id, &user.id).await? {
        return Err(CorkboardError::Conflict(
            "user is already a member of this project".to_string(),
        ));
    }

    let member = ProjectMember {
        id: ids::new_id(),
        project_id: project.id.clone(),
        user_id: user.id.clone(),
        role: role.as_str().to_string(),
        joined_at: ids::now_rfc3339(),
    };
    db::members::add(pool, &member).await?;

    activity_service::record_best_effort(
        pool,
        &project.id,
        None,
        owner_id,
        ActivityAction::MemberAdded {
            user_id: user.id.clone(),
        },
    )
    .await;

    Ok(member)
}

/// Remove a member. Owner only.
pub async fn remove_member(
    pool: &SqlitePool,
    project_id: &str,
    owner_id: &str,
    member_user_id: &str,
) -> Result<()> {
    let project = require_owner(pool, project_id, owner_id).await?;

    if !db::members::remove(pool, &project.id, member_user_id).await? {
        return Err(CorkboardError::UserNotFound);
    }

    activity_service::record_best_effort(
        pool,
        &project.id,
        None,
        owner_id,
        ActivityAction::MemberRemoved {
            user_id: member_user_id.to_string(),
        },
    )
    .await;

    Ok(())
}
