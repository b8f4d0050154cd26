//! End-to-end HTTP tests: a real server on an ephemeral port, driven by
//! `reqwest` for the error-shape checks and by the `easel` client for the
//! optimistic move flow.

mod common;

use axum::Router;
use serde_json::{Value, json};

use corkboard::api::{self, AppState};
use easel::{BoardAction, BoardStore, EaselClient, MoveIntent, MoveState};

async fn spawn_server() -> (String, common::TestDb, tempfile::TempDir) {
    let test = common::setup().await;
    let blobs = tempfile::tempdir().unwrap();
    let app: Router = api::router(AppState {
        pool: test.pool.clone(),
        blob_dir: blobs.path().to_path_buf(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), test, blobs)
}

async fn register_http(base: &str, email: &str) -> String {
    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": "hunter2hunter2",
            "full_name": "Test User",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true, "register failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

struct TestBoard {
    project_id: String,
    columns: Vec<String>,
    tasks: Vec<String>,
}

/// A project with tasks a, b in the first column and x in the second.
async fn seed_board(base: &str, http: &reqwest::Client, token: &str) -> TestBoard {
    let body: Value = http
        .post(format!("{base}/api/projects"))
        .bearer_auth(token)
        .json(&json!({ "name": "Launch" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let body: Value = http
        .get(format!("{base}/api/projects/{project_id}"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let columns: Vec<String> = body["data"]["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();

    let mut tasks = Vec::new();
    for (title, column) in [("a", &columns[0]), ("b", &columns[0]), ("x", &columns[1])] {
        let body: Value = http
            .post(format!("{base}/api/tasks"))
            .bearer_auth(token)
            .json(&json!({
                "project_id": project_id,
                "column_id": column,
                "title": title,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        tasks.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    TestBoard {
        project_id,
        columns,
        tasks,
    }
}

#[tokio::test]
async fn optimistic_move_confirms_against_the_server() {
    let (base, _db, _blobs) = spawn_server().await;
    let http = reqwest::Client::new();
    let token = register_http(&base, "owner@example.com").await;
    let board = seed_board(&base, &http, &token).await;

    let client = EaselClient::new(&base, &token).unwrap();
    let mut store = BoardStore::new();
    store
        .apply(BoardAction::Loaded(
            client.fetch_board(&board.project_id).await.unwrap(),
        ))
        .unwrap();

    let id = store
        .request_move(MoveIntent {
            task_id: board.tasks[0].clone(),
            column_id: board.columns[1].clone(),
            position: 0,
        })
        .unwrap();
    let optimistic = store.view().unwrap().clone();

    client.run_pending(&mut store).await.unwrap();

    assert_eq!(store.move_state(id), MoveState::Confirmed);
    // After the refresh the server-confirmed view equals the optimistic one.
    assert_eq!(store.view().unwrap(), &optimistic);
    assert_eq!(store.baseline().unwrap(), &optimistic);
    assert!(store.view().unwrap().is_dense());
}

#[tokio::test]
async fn rejected_move_rolls_back_to_the_snapshot() {
    let (base, _db, _blobs) = spawn_server().await;
    let http = reqwest::Client::new();
    let token = register_http(&base, "owner@example.com").await;
    let board = seed_board(&base, &http, &token).await;

    let client = EaselClient::new(&base, &token).unwrap();
    let mut store = BoardStore::new();
    store
        .apply(BoardAction::Loaded(
            client.fetch_board(&board.project_id).await.unwrap(),
        ))
        .unwrap();
    let snapshot = store.view().unwrap().clone();

    // Delete the task server-side so the optimistic move gets rejected.
    http.delete(format!("{base}/api/tasks/{}", board.tasks[0]))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let id = store
        .request_move(MoveIntent {
            task_id: board.tasks[0].clone(),
            column_id: board.columns[1].clone(),
            position: 0,
        })
        .unwrap();

    client.run_pending(&mut store).await.unwrap();

    assert_eq!(store.move_state(id), MoveState::RolledBack);
    assert_eq!(store.view().unwrap(), &snapshot);
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (base, _db, _blobs) = spawn_server().await;
    let status = reqwest::Client::new()
        .get(format!("{base}/api/projects"))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 401);
}

#[tokio::test]
async fn malformed_body_is_a_400_envelope() {
    let (base, _db, _blobs) = spawn_server().await;
    let token = register_http(&base, "owner@example.com").await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/projects"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn foreign_projects_read_as_not_found() {
    let (base, _db, _blobs) = spawn_server().await;
    let http = reqwest::Client::new();
    let owner_token = register_http(&base, "owner@example.com").await;
    let board = seed_board(&base, &http, &owner_token).await;
    let stranger_token = register_http(&base, "stranger@example.com").await;

    let status = http
        .get(format!("{base}/api/projects/{}", board.project_id))
        .bearer_auth(&stranger_token)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 404);
}

#[tokio::test]
async fn column_delete_with_tasks_is_a_409() {
    let (base, _db, _blobs) = spawn_server().await;
    let http = reqwest::Client::new();
    let token = register_http(&base, "owner@example.com").await;
    let board = seed_board(&base, &http, &token).await;

    let response = http
        .delete(format!("{base}/api/columns/{}", board.columns[0]))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn user_search_finds_accounts_for_assignment() {
    let (base, _db, _blobs) = spawn_server().await;
    let http = reqwest::Client::new();
    let token = register_http(&base, "alice@example.com").await;
    register_http(&base, "bob@example.com").await;

    let body: Value = http
        .get(format!("{base}/api/users?q=bob"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "bob@example.com");
    // Credentials never appear in the projection.
    assert!(users[0].get("password_hash").is_none());
    let bob_id = users[0]["id"].as_str().unwrap();

    let body: Value = http
        .get(format!("{base}/api/users/{bob_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["email"], "bob@example.com");

    // Empty query lists accounts up to the limit.
    let body: Value = http
        .get(format!("{base}/api/users?limit=1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn attachment_round_trip() {
    let (base, _db, _blobs) = spawn_server().await;
    let http = reqwest::Client::new();
    let token = register_http(&base, "owner@example.com").await;
    let board = seed_board(&base, &http, &token).await;

    let body: Value = http
        .post(format!(
            "{base}/api/tasks/{}/attachments?file_name=notes.txt&mime_type=text/plain",
            board.tasks[0]
        ))
        .bearer_auth(&token)
        .body("meeting notes")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true, "upload failed: {body}");
    let attachment_id = body["data"]["id"].as_str().unwrap();

    let response = http
        .get(format!("{base}/api/attachments/{attachment_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(response.text().await.unwrap(), "meeting notes");
}
