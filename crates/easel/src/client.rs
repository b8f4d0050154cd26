//! HTTP transport. One `reqwest` client with a hard request timeout; a
//! timed-out move settles as a failure exactly like a rejected one.

use std::time::Duration;

use corkboard_types::{ApiResponse, Board, MoveTask};
use serde::de::DeserializeOwned;

use crate::error::EaselError;
use crate::store::{BoardAction, BoardStore, MoveIntent};
use crate::view::BoardView;

/// Requests that outlive this settle as failures and roll back.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EaselClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl EaselClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, EaselError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(EaselClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn unwrap_envelope<T>(envelope: ApiResponse<T>) -> Result<T, EaselError> {
        if envelope.success {
            envelope.data.ok_or(EaselError::Api {
                error: "empty_response".to_string(),
                message: "success response carried no data".to_string(),
            })
        } else {
            Err(EaselError::Api {
                error: envelope.error.unwrap_or_else(|| "unknown".to_string()),
                message: envelope.message.unwrap_or_default(),
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, EaselError> {
        let envelope = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?
            .json::<ApiResponse<T>>()
            .await?;
        Self::unwrap_envelope(envelope)
    }

    pub async fn fetch_board(&self, project_id: &str) -> Result<BoardView, EaselError> {
        let board: Board = self.get_json(&format!("/api/projects/{project_id}")).await?;
        Ok(BoardView::from(board))
    }

    pub async fn move_task(&self, intent: &MoveIntent) -> Result<(), EaselError> {
        let envelope = self
            .http
            .post(format!(
                "{}/api/tasks/{}/move",
                self.base_url, intent.task_id
            ))
            .bearer_auth(&self.token)
            .json(&MoveTask {
                column_id: intent.column_id.clone(),
                position: intent.position,
            })
            .send()
            .await?
            .json::<ApiResponse<serde_json::Value>>()
            .await?;
        if envelope.success {
            Ok(())
        } else {
            Err(EaselError::Api {
                error: envelope.error.unwrap_or_else(|| "unknown".to_string()),
                message: envelope.message.unwrap_or_default(),
            })
        }
    }

    /// Drive the store's queue to completion, one move at a time, then
    /// reconcile against server truth. Serialization lives here: the next
    /// move is not sent until the previous one has settled.
    pub async fn run_pending(&self, store: &mut BoardStore) -> Result<(), EaselError> {
        let mut confirmed_any = false;

        while let Some(pending) = store.next_dispatch() {
            let id = pending.id;
            let intent = pending.intent.clone();
            match self.move_task(&intent).await {
                Ok(()) => {
                    confirmed_any = true;
                    store.apply(BoardAction::MoveConfirmed { id })?;
                }
                Err(e) => {
                    tracing::warn!(move_id = id, error = %e, "move rejected by server");
                    store.apply(BoardAction::MoveFailed {
                        id,
                        error: e.to_string(),
                    })?;
                }
            }
        }

        if confirmed_any {
            if let Some(view) = store.view() {
                let project_id = view.project_id.clone();
                let fresh = self.fetch_board(&project_id).await?;
                store.apply(BoardAction::Refresh(fresh))?;
            }
        }
        Ok(())
    }
}
