//! Service-level board behavior: dense positions through creates, moves and
//! deletes, the column delete guard, and access checks.

mod common;

use corkboard::CorkboardError;
use corkboard::db;
use corkboard::services::{column_service, project_service, task_service};
use corkboard_types::{CreateColumn, MoveTask, ReorderColumn, UpdateTask};

#[tokio::test]
async fn new_project_columns_are_densely_positioned() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;

    let board = common::board(&test.pool, &project.id, &owner).await;
    let positions: Vec<i64> = board.columns.iter().map(|c| c.column.position).collect();
    assert_eq!(positions, [0, 1, 2]);
}

#[tokio::test]
async fn create_appends_at_the_end() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let col = board.columns[0].column.id.clone();

    let first = common::make_task(&test.pool, &owner, &project.id, &col, "first").await;
    let second = common::make_task(&test.pool, &owner, &project.id, &col, "second").await;

    assert_eq!(first.position, 0);
    assert_eq!(second.position, 1);
}

#[tokio::test]
async fn same_column_move_is_a_splice() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let col = board.columns[0].column.id.clone();

    common::make_task(&test.pool, &owner, &project.id, &col, "a").await;
    common::make_task(&test.pool, &owner, &project.id, &col, "b").await;
    let c = common::make_task(&test.pool, &owner, &project.id, &col, "c").await;

    task_service::move_task(
        &test.pool,
        &c.id,
        &owner,
        MoveTask {
            column_id: col.clone(),
            position: 0,
        },
    )
    .await
    .unwrap();

    let board = common::board(&test.pool, &project.id, &owner).await;
    assert_eq!(common::column_order(&board, &col), ["c", "a", "b"]);
    common::assert_dense(&board, &col);
}

#[tokio::test]
async fn cross_column_move_reindexes_both_columns() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let src = board.columns[0].column.id.clone();
    let dst = board.columns[1].column.id.clone();

    let a = common::make_task(&test.pool, &owner, &project.id, &src, "a").await;
    common::make_task(&test.pool, &owner, &project.id, &src, "b").await;
    common::make_task(&test.pool, &owner, &project.id, &dst, "x").await;

    task_service::move_task(
        &test.pool,
        &a.id,
        &owner,
        MoveTask {
            column_id: dst.clone(),
            position: 0,
        },
    )
    .await
    .unwrap();

    let board = common::board(&test.pool, &project.id, &owner).await;
    assert_eq!(common::column_order(&board, &src), ["b"]);
    assert_eq!(common::column_order(&board, &dst), ["a", "x"]);
    common::assert_dense(&board, &src);
    common::assert_dense(&board, &dst);
}

#[tokio::test]
async fn move_to_append_position_is_allowed() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let src = board.columns[0].column.id.clone();
    let dst = board.columns[1].column.id.clone();

    let a = common::make_task(&test.pool, &owner, &project.id, &src, "a").await;
    common::make_task(&test.pool, &owner, &project.id, &dst, "x").await;

    // position == destination length appends.
    task_service::move_task(
        &test.pool,
        &a.id,
        &owner,
        MoveTask {
            column_id: dst.clone(),
            position: 1,
        },
    )
    .await
    .unwrap();

    let board = common::board(&test.pool, &project.id, &owner).await;
    assert_eq!(common::column_order(&board, &dst), ["x", "a"]);
}

#[tokio::test]
async fn move_past_append_position_is_rejected_without_mutation() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let src = board.columns[0].column.id.clone();
    let dst = board.columns[1].column.id.clone();

    let a = common::make_task(&test.pool, &owner, &project.id, &src, "a").await;

    let err = task_service::move_task(
        &test.pool,
        &a.id,
        &owner,
        MoveTask {
            column_id: dst.clone(),
            position: 5,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CorkboardError::PositionOutOfRange { .. }));

    let board = common::board(&test.pool, &project.id, &owner).await;
    assert_eq!(common::column_order(&board, &src), ["a"]);
    assert!(common::column_order(&board, &dst).is_empty());
}

#[tokio::test]
async fn noop_move_changes_nothing() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let col = board.columns[0].column.id.clone();

    common::make_task(&test.pool, &owner, &project.id, &col, "a").await;
    let b = common::make_task(&test.pool, &owner, &project.id, &col, "b").await;
    common::make_task(&test.pool, &owner, &project.id, &col, "c").await;

    let before = db::tasks::list_by_column(&test.pool, &col).await.unwrap();

    task_service::move_task(
        &test.pool,
        &b.id,
        &owner,
        MoveTask {
            column_id: col.clone(),
            position: 1,
        },
    )
    .await
    .unwrap();

    let after = db::tasks::list_by_column(&test.pool, &col).await.unwrap();
    let ids_and_positions =
        |tasks: &[corkboard_types::Task]| -> Vec<(String, i64)> {
            tasks.iter().map(|t| (t.id.clone(), t.position)).collect()
        };
    assert_eq!(ids_and_positions(&before), ids_and_positions(&after));

    // Nothing committed, so nothing lands in the audit log either.
    let records = db::activities::list_by_entity(&test.pool, &project.id, Some("task_moved"))
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn delete_closes_the_gap() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let col = board.columns[0].column.id.clone();

    common::make_task(&test.pool, &owner, &project.id, &col, "a").await;
    let b = common::make_task(&test.pool, &owner, &project.id, &col, "b").await;
    common::make_task(&test.pool, &owner, &project.id, &col, "c").await;

    task_service::delete_task(&test.pool, &b.id, &owner).await.unwrap();

    let board = common::board(&test.pool, &project.id, &owner).await;
    assert_eq!(common::column_order(&board, &col), ["a", "c"]);
    common::assert_dense(&board, &col);
}

#[tokio::test]
async fn explicit_null_clears_nullable_task_fields() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let col = board.columns[0].column.id.clone();
    let task = common::make_task(&test.pool, &owner, &project.id, &col, "a").await;

    let task = task_service::update_task(
        &test.pool,
        &task.id,
        &owner,
        UpdateTask {
            assignee_id: Some(Some(owner.clone())),
            due_date: Some(Some("2026-09-15T00:00:00Z".to_string())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(task.assignee_id.as_deref(), Some(owner.as_str()));

    // A present-but-null field clears; an absent one stays put.
    let task = task_service::update_task(
        &test.pool,
        &task.id,
        &owner,
        UpdateTask {
            assignee_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(task.assignee_id, None);
    assert_eq!(task.due_date.as_deref(), Some("2026-09-15T00:00:00Z"));
}

#[tokio::test]
async fn deleting_a_column_with_tasks_is_a_conflict_and_mutates_nothing() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let col = board.columns[0].column.id.clone();

    common::make_task(&test.pool, &owner, &project.id, &col, "a").await;

    let err = column_service::delete_column(&test.pool, &col, &owner)
        .await
        .unwrap_err();
    assert!(matches!(err, CorkboardError::Conflict(_)));

    let board = common::board(&test.pool, &project.id, &owner).await;
    assert_eq!(board.columns.len(), 3);
    assert_eq!(common::column_order(&board, &col), ["a"]);
}

#[tokio::test]
async fn deleting_an_empty_column_reindexes_the_rest() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let first = board.columns[0].column.id.clone();

    column_service::delete_column(&test.pool, &first, &owner)
        .await
        .unwrap();

    let board = common::board(&test.pool, &project.id, &owner).await;
    let positions: Vec<i64> = board.columns.iter().map(|c| c.column.position).collect();
    assert_eq!(positions, [0, 1]);
}

#[tokio::test]
async fn column_reorder_is_a_splice() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let last = board.columns[2].column.id.clone();

    let columns = column_service::reorder_column(
        &test.pool,
        &last,
        &owner,
        ReorderColumn { position: 0 },
    )
    .await
    .unwrap();

    assert_eq!(columns[0].id, last);
    let positions: Vec<i64> = columns.iter().map(|c| c.position).collect();
    assert_eq!(positions, [0, 1, 2]);
}

#[tokio::test]
async fn new_column_appends_after_existing_ones() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;

    let column = column_service::create_column(
        &test.pool,
        &owner,
        CreateColumn {
            project_id: project.id.clone(),
            name: "Blocked".to_string(),
            wip_limit: Some(3),
            color: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(column.position, 3);
}

#[tokio::test]
async fn outsiders_get_not_found_not_forbidden() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let (stranger, _) = common::register(&test.pool, "stranger@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let col = board.columns[0].column.id.clone();
    let task = common::make_task(&test.pool, &owner, &project.id, &col, "secret").await;

    let err = project_service::get_board(&test.pool, &project.id, &stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, CorkboardError::ProjectNotFound));

    let err = task_service::move_task(
        &test.pool,
        &task.id,
        &stranger,
        MoveTask {
            column_id: col.clone(),
            position: 0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CorkboardError::TaskNotFound));
}

#[tokio::test]
async fn members_can_move_tasks() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let (member, _) = common::register(&test.pool, "member@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let src = board.columns[0].column.id.clone();
    let dst = board.columns[1].column.id.clone();
    let task = common::make_task(&test.pool, &owner, &project.id, &src, "shared").await;

    project_service::add_member(
        &test.pool,
        &project.id,
        &owner,
        "member@example.com",
        Default::default(),
    )
    .await
    .unwrap();

    task_service::move_task(
        &test.pool,
        &task.id,
        &member,
        MoveTask {
            column_id: dst.clone(),
            position: 0,
        },
    )
    .await
    .unwrap();

    let board = common::board(&test.pool, &project.id, &member).await;
    assert_eq!(common::column_order(&board, &dst), ["shared"]);
}

#[tokio::test]
async fn every_move_appends_an_audit_record() {
    let test = common::setup().await;
    let (owner, _) = common::register(&test.pool, "owner@example.com").await;
    let project = common::make_project(&test.pool, &owner).await;
    let board = common::board(&test.pool, &project.id, &owner).await;
    let src = board.columns[0].column.id.clone();
    let dst = board.columns[1].column.id.clone();
    let task = common::make_task(&test.pool, &owner, &project.id, &src, "audited").await;

    task_service::move_task(
        &test.pool,
        &task.id,
        &owner,
        MoveTask {
            column_id: dst,
            position: 0,
        },
    )
    .await
    .unwrap();

    let records = db::activities::list_by_entity(&test.pool, &project.id, Some("task_moved"))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}
