pub mod connection;

use sqlx::SqlitePool;

use crate::error::Result;
use crate::positions::Shift;

/// Database operations for users
pub mod users {
    use corkboard_types::User;

    use super::*;

    pub async fn create(pool: &SqlitePool, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, password_salt, full_name,
                avatar_url, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .bind(&user.role)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Substring search over name and email; an empty query lists accounts
    /// up to the limit.
    pub async fn search(pool: &SqlitePool, query: &str, limit: i64) -> Result<Vec<User>> {
        let users = if query.is_empty() {
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY full_name ASC LIMIT ?")
                .bind(limit)
                .fetch_all(pool)
                .await?
        } else {
            let pattern = format!("%{query}%");
            sqlx::query_as::<_, User>(
                r#"
                SELECT * FROM users
                WHERE full_name LIKE ? OR email LIKE ?
                ORDER BY full_name ASC
                LIMIT ?
                "#,
            )
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(pool)
            .await?
        };
        Ok(users)
    }

    pub async fn update_profile(
        pool: &SqlitePool,
        id: &str,
        full_name: &str,
        avatar_url: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET full_name = ?, avatar_url = ?, updated_at = ? WHERE id = ?",
        )
        .bind(full_name)
        .bind(avatar_url)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Database operations for bearer tokens
pub mod auth_tokens {
    use super::*;

    pub async fn insert(
        pool: &SqlitePool,
        token: &str,
        user_id: &str,
        expires_at: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Resolve a token to its user id, ignoring expired tokens.
    pub async fn lookup_user(pool: &SqlitePool, token: &str) -> Result<Option<String>> {
        let user_id = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM auth_tokens WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(chrono::Utc::now().to_rfc3339())
        .fetch_optional(pool)
        .await?;
        Ok(user_id)
    }

    pub async fn delete_expired(pool: &SqlitePool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= ?")
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Database operations for projects
pub mod projects {
    use corkboard_types::Project;

    use super::*;

    pub async fn create(pool: &SqlitePool, project: &Project) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, owner_id, is_archived, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.owner_id)
        .bind(project.is_archived)
        .bind(&project.created_at)
        .bind(&project.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch a project only if `user_id` is its owner or a member. `None`
    /// covers both "does not exist" and "no access".
    pub async fn get_for_user(
        pool: &SqlitePool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.* FROM projects p
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE p.id = ? AND (p.owner_id = ? OR pm.user_id = ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(project)
    }

    pub async fn get_owned(pool: &SqlitePool, id: &str, owner_id: &str) -> Result<Option<Project>> {
        let project =
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND owner_id = ?")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(pool)
                .await?;
        Ok(project)
    }

    pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.* FROM projects p
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE p.owner_id = ? OR pm.user_id = ?
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(projects)
    }

    pub async fn update(pool: &SqlitePool, project: &Project) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE projects SET name = ?, description = ?, is_archived = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.is_archived)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&project.id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a project; columns, tasks, members and activity cascade.
    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Database operations for project members
pub mod members {
    use corkboard_types::{MemberInfo, ProjectMember};

    use super::*;

    pub async fn add(pool: &SqlitePool, member: &ProjectMember) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO project_members (id, project_id, user_id, role, joined_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.id)
        .bind(&member.project_id)
        .bind(&member.user_id)
        .bind(&member.role)
        .bind(&member.joined_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn remove(pool: &SqlitePool, project_id: &str, user_id: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = ? AND user_id = ?")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, project_id: &str, user_id: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM project_members WHERE project_id = ? AND user_id = ?",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Member roster with display fields, owner first.
    pub async fn roster(pool: &SqlitePool, project_id: &str) -> Result<Vec<MemberInfo>> {
        let members = sqlx::query_as::<_, MemberInfo>(
            r#"
            SELECT u.id AS user_id, u.full_name, u.email, u.avatar_url, 'owner' AS role
            FROM projects p JOIN users u ON p.owner_id = u.id
            WHERE p.id = ?
            UNION ALL
            SELECT u.id AS user_id, u.full_name, u.email, u.avatar_url, pm.role
            FROM project_members pm JOIN users u ON pm.user_id = u.id
            WHERE pm.project_id = ?
            "#,
        )
        .bind(project_id)
        .bind(project_id)
        .fetch_all(pool)
        .await?;
        Ok(members)
    }
}

/// Database operations for columns, including the project-scoped half of the
/// position reindexing engine.
pub mod columns {
    use corkboard_types::Column;

    use crate::error::CorkboardError;
    use crate::positions;

    use super::*;

    /// Insert a column appended at the end of the project's column list. The
    /// position is computed by the INSERT itself, so two concurrent creates
    /// cannot read the same stale maximum.
    pub async fn create_appended(
        pool: &SqlitePool,
        id: &str,
        project_id: &str,
        name: &str,
        wip_limit: Option<i64>,
        color: &str,
    ) -> Result<Column> {
        sqlx::query(
            r#"
            INSERT INTO columns (id, project_id, name, position, wip_limit, color, created_at)
            VALUES (?, ?, ?,
                (SELECT COALESCE(MAX(position), -1) + 1 FROM columns WHERE project_id = ?),
                ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(project_id)
        .bind(name)
        .bind(project_id)
        .bind(wip_limit)
        .bind(color)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

        let column = sqlx::query_as::<_, Column>("SELECT * FROM columns WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(column)
    }

    /// Fetch a column only if `user_id` can access its project.
    pub async fn get_for_user(
        pool: &SqlitePool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Column>> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            SELECT DISTINCT c.* FROM columns c
            JOIN projects p ON c.project_id = p.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE c.id = ? AND (p.owner_id = ? OR pm.user_id = ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(column)
    }

    pub async fn get_owned(pool: &SqlitePool, id: &str, owner_id: &str) -> Result<Option<Column>> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            SELECT c.* FROM columns c
            JOIN projects p ON c.project_id = p.id
            WHERE c.id = ? AND p.owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
        Ok(column)
    }

    pub async fn list_by_project(pool: &SqlitePool, project_id: &str) -> Result<Vec<Column>> {
        let columns = sqlx::query_as::<_, Column>(
            "SELECT * FROM columns WHERE project_id = ? ORDER BY position ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;
        Ok(columns)
    }

    pub async fn update_meta(
        pool: &SqlitePool,
        id: &str,
        name: &str,
        wip_limit: Option<i64>,
        color: &str,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE columns SET name = ?, wip_limit = ?, color = ? WHERE id = ?")
            .bind(name)
            .bind(wip_limit)
            .bind(color)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reorder a column within its project. All position shifts commit
    /// atomically; the first statement takes the write lock and re-reads the
    /// authoritative old position, so a concurrent reorder cannot work from
    /// a stale one.
    pub async fn reorder(pool: &SqlitePool, id: &str, new_pos: i64) -> Result<Vec<Column>> {
        let mut tx = pool.begin().await?;

        let (project_id, old_pos) = sqlx::query_as::<_, (String, i64)>(
            "UPDATE columns SET position = position WHERE id = ? RETURNING project_id, position",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM columns WHERE project_id = ?")
                .bind(&project_id)
                .fetch_one(&mut *tx)
                .await?;
        // The column is already in the container, so the reachable indexes
        // are [0, count).
        positions::validate_target(new_pos, count - 1)?;

        match positions::plan_same_container(old_pos, new_pos) {
            positions::MovePlan::NoOp => {
                tx.rollback().await?;
            }
            positions::MovePlan::SameContainer { shift, to } => {
                apply_shift(&mut tx, &project_id, shift).await?;
                sqlx::query("UPDATE columns SET position = ? WHERE id = ?")
                    .bind(to)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
            }
            positions::MovePlan::CrossContainer { .. } => unreachable!(),
        }

        list_by_project(pool, &project_id).await
    }

    /// Delete a column, rejecting the delete while tasks remain, and close
    /// the gap in the project's column list. One atomic unit.
    pub async fn delete_guarded(pool: &SqlitePool, id: &str) -> Result<()> {
        let mut tx = pool.begin().await?;

        let task_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE column_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if task_count > 0 {
            tx.rollback().await?;
            return Err(CorkboardError::Conflict(
                "Cannot delete column with tasks. Move or delete tasks first.".to_string(),
            ));
        }

        let (project_id, old_pos) = sqlx::query_as::<_, (String, i64)>(
            "DELETE FROM columns WHERE id = ? RETURNING project_id, position",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        apply_shift(&mut tx, &project_id, positions::plan_remove(old_pos)).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn apply_shift(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        project_id: &str,
        shift: Shift,
    ) -> Result<()> {
        match shift.hi {
            Some(hi) => {
                sqlx::query(
                    "UPDATE columns SET position = position + ? WHERE project_id = ? AND position >= ? AND position <= ?",
                )
                .bind(shift.delta)
                .bind(project_id)
                .bind(shift.lo)
                .bind(hi)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "UPDATE columns SET position = position + ? WHERE project_id = ? AND position >= ?",
                )
                .bind(shift.delta)
                .bind(project_id)
                .bind(shift.lo)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}

/// Database operations for tasks, including the column-scoped half of the
/// position reindexing engine.
pub mod tasks {
    use corkboard_types::{CalendarTask, Task};

    use crate::positions;

    use super::*;

    /// Where a committed move left the board. `changed` is false for a
    /// same-column move to the task's current position, which commits
    /// nothing.
    #[derive(Debug, Clone)]
    pub struct MoveOutcome {
        pub project_id: String,
        pub from_column: String,
        pub to_column: String,
        pub position: i64,
        pub changed: bool,
    }

    /// Insert a task appended at the end of its column. The position is
    /// computed by the INSERT itself, so two concurrent creates cannot read
    /// the same stale maximum.
    pub async fn create_appended(pool: &SqlitePool, task: &Task) -> Result<Task> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, project_id, column_id, title, description, priority,
                position, assignee_id, due_date, labels, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?,
                (SELECT COALESCE(MAX(position), -1) + 1 FROM tasks WHERE column_id = ?),
                ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.id)
        .bind(&task.project_id)
        .bind(&task.column_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.priority)
        .bind(&task.column_id)
        .bind(&task.assignee_id)
        .bind(&task.due_date)
        .bind(&task.labels)
        .bind(&task.created_by)
        .bind(&task.created_at)
        .bind(&task.updated_at)
        .execute(pool)
        .await?;

        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
            .bind(&task.id)
            .fetch_one(pool)
            .await?;
        Ok(task)
    }

    /// Fetch a task only if `user_id` can access its project.
    pub async fn get_for_user(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT DISTINCT t.* FROM tasks t
            JOIN projects p ON t.project_id = p.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE t.id = ? AND (p.owner_id = ? OR pm.user_id = ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(task)
    }

    pub async fn list_by_column(pool: &SqlitePool, column_id: &str) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE column_id = ? ORDER BY position ASC",
        )
        .bind(column_id)
        .fetch_all(pool)
        .await?;
        Ok(tasks)
    }

    pub async fn update_meta(pool: &SqlitePool, task: &Task) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, priority = ?, assignee_id = ?,
                due_date = ?, labels = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.priority)
        .bind(&task.assignee_id)
        .bind(&task.due_date)
        .bind(&task.labels)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&task.id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a task to `dest_column` at `new_pos`. All sibling shifts and the
    /// final reassignment commit as one unit. The first statement takes the
    /// write lock and re-reads the authoritative source column/position, so
    /// two concurrent moves into the same column serialize instead of
    /// computing shifts from stale state.
    pub async fn move_to(
        pool: &SqlitePool,
        id: &str,
        dest_column: &str,
        new_pos: i64,
    ) -> Result<MoveOutcome> {
        let mut tx = pool.begin().await?;

        let (project_id, old_column, old_pos) = sqlx::query_as::<_, (String, String, i64)>(
            "UPDATE tasks SET position = position WHERE id = ? RETURNING project_id, column_id, position",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let dest_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE column_id = ?")
                .bind(dest_column)
                .fetch_one(&mut *tx)
                .await?;

        let mut outcome = MoveOutcome {
            project_id,
            from_column: old_column.clone(),
            to_column: dest_column.to_string(),
            position: new_pos,
            changed: true,
        };

        if old_column == dest_column {
            // Container size after removing the task from its own column.
            positions::validate_target(new_pos, dest_count - 1)?;
            match positions::plan_same_container(old_pos, new_pos) {
                positions::MovePlan::NoOp => {
                    tx.rollback().await?;
                    outcome.changed = false;
                    return Ok(outcome);
                }
                positions::MovePlan::SameContainer { shift, to } => {
                    apply_shift(&mut tx, dest_column, shift).await?;
                    assign(&mut tx, id, dest_column, to).await?;
                }
                positions::MovePlan::CrossContainer { .. } => unreachable!(),
            }
        } else {
            positions::validate_target(new_pos, dest_count)?;
            match positions::plan_cross_container(old_pos, new_pos) {
                positions::MovePlan::CrossContainer {
                    close_gap,
                    open_slot,
                    to,
                } => {
                    apply_shift(&mut tx, &old_column, close_gap).await?;
                    apply_shift(&mut tx, dest_column, open_slot).await?;
                    assign(&mut tx, id, dest_column, to).await?;
                }
                _ => unreachable!(),
            }
        }

        tx.commit().await?;
        Ok(outcome)
    }

    /// Delete a task and close the gap in its column, as one atomic unit.
    /// Returns the deleted task's project, column, position and title.
    pub async fn delete_reindexed(
        pool: &SqlitePool,
        id: &str,
    ) -> Result<(String, String, i64, String)> {
        let mut tx = pool.begin().await?;

        let (project_id, column_id, old_pos, title) = sqlx::query_as::<_, (String, String, i64, String)>(
            "DELETE FROM tasks WHERE id = ? RETURNING project_id, column_id, position, title",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        apply_shift(&mut tx, &column_id, positions::plan_remove(old_pos)).await?;

        tx.commit().await?;
        Ok((project_id, column_id, old_pos, title))
    }

    /// Due-dated tasks across the caller's projects, for the calendar view.
    pub async fn calendar(
        pool: &SqlitePool,
        user_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<CalendarTask>> {
        let mut query = String::from(
            r#"
            SELECT DISTINCT t.id, t.title, t.due_date, t.priority, t.project_id,
                p.name AS project_name, c.name AS column_name
            FROM tasks t
            JOIN projects p ON t.project_id = p.id
            JOIN columns c ON t.column_id = c.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE (p.owner_id = ? OR pm.user_id = ?) AND t.due_date IS NOT NULL
            "#,
        );
        if from.is_some() {
            query.push_str(" AND t.due_date >= ?");
        }
        if to.is_some() {
            query.push_str(" AND t.due_date <= ?");
        }
        query.push_str(" ORDER BY t.due_date ASC");

        let mut q = sqlx::query_as::<_, CalendarTask>(&query)
            .bind(user_id)
            .bind(user_id);
        if let Some(f) = from {
            q = q.bind(f);
        }
        if let Some(t) = to {
            q = q.bind(t);
        }

        let tasks = q.fetch_all(pool).await?;
        Ok(tasks)
    }

    async fn assign(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: &str,
        column_id: &str,
        position: i64,
    ) -> Result<()> {
        sqlx::query("UPDATE tasks SET column_id = ?, position = ?, updated_at = ? WHERE id = ?")
            .bind(column_id)
            .bind(position)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn apply_shift(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        column_id: &str,
        shift: Shift,
    ) -> Result<()> {
        match shift.hi {
            Some(hi) => {
                sqlx::query(
                    "UPDATE tasks SET position = position + ? WHERE column_id = ? AND position >= ? AND position <= ?",
                )
                .bind(shift.delta)
                .bind(column_id)
                .bind(shift.lo)
                .bind(hi)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "UPDATE tasks SET position = position + ? WHERE column_id = ? AND position >= ?",
                )
                .bind(shift.delta)
                .bind(column_id)
                .bind(shift.lo)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}

/// Database operations for subtasks
pub mod subtasks {
    use corkboard_types::Subtask;

    use super::*;

    /// Subtasks are append-ordered only; deletes leave no invariant to
    /// restore, so there is no delete-side reindex here.
    pub async fn create_appended(
        pool: &SqlitePool,
        id: &str,
        task_id: &str,
        title: &str,
    ) -> Result<Subtask> {
        sqlx::query(
            r#"
            INSERT INTO subtasks (id, task_id, title, is_completed, position, created_at)
            VALUES (?, ?, ?, 0,
                (SELECT COALESCE(MAX(position), -1) + 1 FROM subtasks WHERE task_id = ?),
                ?)
            "#,
        )
        .bind(id)
        .bind(task_id)
        .bind(title)
        .bind(task_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

        let subtask = sqlx::query_as::<_, Subtask>("SELECT * FROM subtasks WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(subtask)
    }

    pub async fn get(pool: &SqlitePool, id: &str, task_id: &str) -> Result<Option<Subtask>> {
        let subtask =
            sqlx::query_as::<_, Subtask>("SELECT * FROM subtasks WHERE id = ? AND task_id = ?")
                .bind(id)
                .bind(task_id)
                .fetch_optional(pool)
                .await?;
        Ok(subtask)
    }

    pub async fn list_by_task(pool: &SqlitePool, task_id: &str) -> Result<Vec<Subtask>> {
        let subtasks = sqlx::query_as::<_, Subtask>(
            "SELECT * FROM subtasks WHERE task_id = ? ORDER BY position ASC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;
        Ok(subtasks)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        task_id: &str,
        title: &str,
        is_completed: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE subtasks SET title = ?, is_completed = ? WHERE id = ? AND task_id = ?",
        )
        .bind(title)
        .bind(is_completed)
        .bind(id)
        .bind(task_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &SqlitePool, id: &str, task_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = ? AND task_id = ?")
            .bind(id)
            .bind(task_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Database operations for comments
pub mod comments {
    use corkboard_types::{Comment, CommentView};

    use super::*;

    pub async fn create(pool: &SqlitePool, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, task_id, user_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.task_id)
        .bind(&comment.user_id)
        .bind(&comment.content)
        .bind(&comment.created_at)
        .bind(&comment.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn get_view(pool: &SqlitePool, id: &str) -> Result<Option<CommentView>> {
        let comment = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.task_id, c.user_id, c.content, u.full_name, u.avatar_url,
                c.created_at, c.updated_at
            FROM comments c JOIN users u ON c.user_id = u.id
            WHERE c.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(comment)
    }

    pub async fn list_views_by_task(pool: &SqlitePool, task_id: &str) -> Result<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.task_id, c.user_id, c.content, u.full_name, u.avatar_url,
                c.created_at, c.updated_at
            FROM comments c JOIN users u ON c.user_id = u.id
            WHERE c.task_id = ?
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;
        Ok(comments)
    }

    /// Delete a comment, but only for its author.
    pub async fn delete_owned(pool: &SqlitePool, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Database operations for attachment metadata
pub mod attachments {
    use corkboard_types::Attachment;

    use super::*;

    pub async fn create(pool: &SqlitePool, attachment: &Attachment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO attachments (id, task_id, user_id, file_name, storage_key,
                file_size, mime_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&attachment.id)
        .bind(&attachment.task_id)
        .bind(&attachment.user_id)
        .bind(&attachment.file_name)
        .bind(&attachment.storage_key)
        .bind(attachment.file_size)
        .bind(&attachment.mime_type)
        .bind(&attachment.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch an attachment only if `user_id` can access the owning project.
    pub async fn get_for_user(
        pool: &SqlitePool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Attachment>> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT DISTINCT a.* FROM attachments a
            JOIN tasks t ON a.task_id = t.id
            JOIN projects p ON t.project_id = p.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE a.id = ? AND (p.owner_id = ? OR pm.user_id = ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(attachment)
    }

    pub async fn list_by_task(pool: &SqlitePool, task_id: &str) -> Result<Vec<Attachment>> {
        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE task_id = ? ORDER BY created_at DESC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;
        Ok(attachments)
    }

    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Database operations for the append-only activity log
pub mod activities {
    use corkboard_types::{Activity, ActivityView};

    use super::*;

    /// Insert an audit record. Rows are write-once; there is no update path.
    pub async fn create(pool: &SqlitePool, activity: &Activity) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_log (id, project_id, task_id, user_id, action, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&activity.id)
        .bind(&activity.project_id)
        .bind(&activity.task_id)
        .bind(&activity.user_id)
        .bind(&activity.action)
        .bind(&activity.details)
        .bind(&activity.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Recent activity across every project the caller can see, newest first.
    pub async fn list_recent_for_user(
        pool: &SqlitePool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ActivityView>> {
        let activities = sqlx::query_as::<_, ActivityView>(
            r#"
            SELECT DISTINCT a.id, a.project_id, p.name AS project_name, a.task_id,
                t.title AS task_title, a.user_id, u.full_name AS user_name,
                u.avatar_url AS user_avatar, a.action, a.details, a.created_at
            FROM activity_log a
            JOIN users u ON a.user_id = u.id
            JOIN projects p ON a.project_id = p.id
            LEFT JOIN tasks t ON a.task_id = t.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE p.owner_id = ? OR pm.user_id = ?
            ORDER BY a.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(activities)
    }

    pub async fn list_by_entity(
        pool: &SqlitePool,
        project_id: &str,
        action: Option<&str>,
    ) -> Result<Vec<Activity>> {
        let activities = match action {
            Some(action) => {
                sqlx::query_as::<_, Activity>(
                    "SELECT * FROM activity_log WHERE project_id = ? AND action = ? ORDER BY created_at DESC",
                )
                .bind(project_id)
                .bind(action)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Activity>(
                    "SELECT * FROM activity_log WHERE project_id = ? ORDER BY created_at DESC",
                )
                .bind(project_id)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(activities)
    }
}

/// Aggregate queries for the dashboard
pub mod metrics {
    use corkboard_types::{AssigneePerformance, DashboardStats, PriorityCount};

    use super::*;

    const DONE_COLUMNS: &str = "('done', 'completed', 'finished')";
    const DOING_COLUMNS: &str = "('in progress', 'doing', 'working')";

    pub async fn dashboard_stats(pool: &SqlitePool, user_id: &str) -> Result<DashboardStats> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(&format!(
            r#"
            SELECT
                COUNT(DISTINCT t.id),
                COUNT(DISTINCT CASE WHEN LOWER(c.name) IN {DONE_COLUMNS} THEN t.id END),
                COUNT(DISTINCT CASE WHEN LOWER(c.name) IN {DOING_COLUMNS} THEN t.id END),
                COUNT(DISTINCT CASE WHEN t.due_date < datetime('now')
                    AND LOWER(c.name) NOT IN {DONE_COLUMNS} THEN t.id END)
            FROM tasks t
            JOIN columns c ON t.column_id = c.id
            JOIN projects p ON t.project_id = p.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE p.owner_id = ? OR pm.user_id = ?
            "#
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let (total_projects, active_projects) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(DISTINCT p.id),
                COUNT(DISTINCT CASE WHEN p.is_archived = 0 THEN p.id END)
            FROM projects p
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE p.owner_id = ? OR pm.user_id = ?
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(DashboardStats {
            total_tasks: row.0,
            completed_tasks: row.1,
            in_progress_tasks: row.2,
            overdue_tasks: row.3,
            total_projects,
            active_projects,
        })
    }

    pub async fn priority_distribution(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<PriorityCount>> {
        let rows = sqlx::query_as::<_, PriorityCount>(
            r#"
            SELECT t.priority, COUNT(DISTINCT t.id) AS count
            FROM tasks t
            JOIN projects p ON t.project_id = p.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE p.owner_id = ? OR pm.user_id = ?
            GROUP BY t.priority
            ORDER BY CASE t.priority
                WHEN 'critical' THEN 1
                WHEN 'high' THEN 2
                WHEN 'medium' THEN 3
                WHEN 'low' THEN 4
                ELSE 5
            END
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn team_performance(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<AssigneePerformance>> {
        let rows = sqlx::query_as::<_, AssigneePerformance>(&format!(
            r#"
            SELECT u.id AS user_id, u.full_name AS name, u.avatar_url AS avatar,
                COUNT(DISTINCT CASE WHEN LOWER(c.name) IN {DONE_COLUMNS} THEN t.id END) AS completed,
                COUNT(DISTINCT CASE WHEN LOWER(c.name) IN {DOING_COLUMNS} THEN t.id END) AS in_progress,
                COUNT(DISTINCT t.id) AS total
            FROM tasks t
            JOIN columns c ON t.column_id = c.id
            JOIN projects p ON t.project_id = p.id
            JOIN users u ON t.assignee_id = u.id
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE (p.owner_id = ? OR pm.user_id = ?) AND t.assignee_id IS NOT NULL
            GROUP BY t.assignee_id
            ORDER BY completed DESC
            LIMIT 10
            "#
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
