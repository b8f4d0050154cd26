//! Explicit state container for a board. Every mutation flows through
//! [`BoardStore::apply`]; the reducer is pure and synchronous, so the store
//! can be driven from any UI loop or from tests without a runtime.
//!
//! Moves are reconciled optimistically: the splice lands in the view at
//! once, the network round-trip settles it later. Overlapping moves are
//! serialized, and a rejection always restores the last server-confirmed
//! baseline, never an intermediate optimistic state.

use std::collections::VecDeque;

use crate::error::EaselError;
use crate::view::BoardView;

pub type MoveId = u64;

/// What gets sent to `POST /api/tasks/{id}/move`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    pub task_id: String,
    pub column_id: String,
    pub position: i64,
}

/// Lifecycle of one move: `Idle` on construction, `OptimisticallyApplied`
/// once the splice is in the view, then exactly one of `Confirmed` or
/// `RolledBack` when the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    OptimisticallyApplied,
    Confirmed,
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct PendingMove {
    pub id: MoveId,
    pub intent: MoveIntent,
    pub state: MoveState,
}

#[derive(Debug, Clone)]
pub enum BoardAction {
    /// Initial board load; resets the store.
    Loaded(BoardView),
    /// Server truth fetched after a confirmation; replaces view and baseline.
    Refresh(BoardView),
    MoveRequested { id: MoveId, intent: MoveIntent },
    MoveConfirmed { id: MoveId },
    MoveFailed { id: MoveId, error: String },
}

#[derive(Debug, Default)]
pub struct BoardStore {
    view: Option<BoardView>,
    /// The last state the server has agreed to. Rollback target.
    baseline: Option<BoardView>,
    /// Unsettled moves, oldest first. Dispatch order is FIFO.
    pending: VecDeque<PendingMove>,
    /// Settled moves, kept so late answers stay observable no-ops.
    settled: Vec<PendingMove>,
    next_id: MoveId,
    last_error: Option<String>,
}

impl BoardStore {
    pub fn new() -> Self {
        BoardStore::default()
    }

    pub fn view(&self) -> Option<&BoardView> {
        self.view.as_ref()
    }

    pub fn baseline(&self) -> Option<&BoardView> {
        self.baseline.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The next move to put on the wire. Serialization is the caller's half
    /// of the contract: settle this one before asking again.
    pub fn next_dispatch(&self) -> Option<&PendingMove> {
        self.pending.front()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn move_state(&self, id: MoveId) -> MoveState {
        self.pending
            .iter()
            .chain(self.settled.iter())
            .find(|m| m.id == id)
            .map(|m| m.state)
            .unwrap_or(MoveState::Idle)
    }

    /// Allocate an id, apply the move optimistically, and queue its
    /// dispatch. Convenience wrapper over [`apply`](Self::apply).
    pub fn request_move(&mut self, intent: MoveIntent) -> Result<MoveId, EaselError> {
        let id = self.next_id;
        self.next_id += 1;
        self.apply(BoardAction::MoveRequested { id, intent })?;
        Ok(id)
    }

    pub fn apply(&mut self, action: BoardAction) -> Result<(), EaselError> {
        match action {
            BoardAction::Loaded(view) => {
                self.baseline = Some(view.clone());
                self.view = Some(view);
                self.pending.clear();
                self.settled.clear();
                self.last_error = None;
                Ok(())
            }

            BoardAction::Refresh(server) => {
                // Server truth replaces the baseline. Pending optimistic
                // moves are replayed on top; any that no longer fit are
                // rolled back.
                self.baseline = Some(server.clone());
                let mut view = server;
                let mut kept = VecDeque::new();
                for mut pending in self.pending.drain(..) {
                    match view.with_move(
                        &pending.intent.task_id,
                        &pending.intent.column_id,
                        pending.intent.position,
                    ) {
                        Ok(next) => {
                            view = next;
                            kept.push_back(pending);
                        }
                        Err(e) => {
                            tracing::debug!(move_id = pending.id, error = %e,
                                "pending move no longer applies after refresh");
                            pending.state = MoveState::RolledBack;
                            self.settled.push(pending);
                        }
                    }
                }
                self.pending = kept;
                self.view = Some(view);
                Ok(())
            }

            BoardAction::MoveRequested { id, intent } => {
                let view = self.view.as_ref().ok_or(EaselError::NoBoard)?;
                let next = view.with_move(&intent.task_id, &intent.column_id, intent.position)?;
                self.view = Some(next);
                self.pending.push_back(PendingMove {
                    id,
                    intent,
                    state: MoveState::OptimisticallyApplied,
                });
                Ok(())
            }

            BoardAction::MoveConfirmed { id } => {
                let confirmed = self
                    .pending
                    .iter()
                    .position(|m| m.id == id)
                    .and_then(|index| self.pending.remove(index));
                // Settling past a refresh is a no-op, not an error.
                let Some(mut confirmed) = confirmed else {
                    return Ok(());
                };
                confirmed.state = MoveState::Confirmed;

                // The server agreed, so the baseline advances by this move.
                if let Some(baseline) = &self.baseline {
                    match baseline.with_move(
                        &confirmed.intent.task_id,
                        &confirmed.intent.column_id,
                        confirmed.intent.position,
                    ) {
                        Ok(next) => self.baseline = Some(next),
                        Err(e) => {
                            // A refresh will reconcile; keep the old baseline.
                            tracing::warn!(move_id = id, error = %e,
                                "confirmed move did not apply to the baseline");
                        }
                    }
                }
                self.settled.push(confirmed);
                Ok(())
            }

            BoardAction::MoveFailed { id, error } => {
                let Some(index) = self.pending.iter().position(|m| m.id == id) else {
                    return Ok(());
                };
                tracing::debug!(move_id = id, error = %error, "move rejected, rolling back");
                self.last_error = Some(error);

                // Everything optimistic from the failed move onward was
                // built on state the server never saw. Discard the lot and
                // restore the confirmed baseline.
                for mut pending in self.pending.drain(index..).collect::<Vec<_>>() {
                    pending.state = MoveState::RolledBack;
                    self.settled.push(pending);
                }
                self.view = self.baseline.clone();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ColumnView, TaskCard};

    fn card(id: &str, position: i64) -> TaskCard {
        TaskCard {
            id: id.to_string(),
            title: format!("task {id}"),
            priority: "medium".to_string(),
            position,
        }
    }

    fn board() -> BoardView {
        BoardView {
            project_id: "p1".to_string(),
            columns: vec![
                ColumnView {
                    id: "c1".to_string(),
                    name: "To Do".to_string(),
                    position: 0,
                    tasks: vec![card("a", 0), card("b", 1), card("c", 2)],
                },
                ColumnView {
                    id: "c2".to_string(),
                    name: "Done".to_string(),
                    position: 1,
                    tasks: vec![card("d", 0)],
                },
            ],
        }
    }

    fn intent(task: &str, column: &str, position: i64) -> MoveIntent {
        MoveIntent {
            task_id: task.to_string(),
            column_id: column.to_string(),
            position,
        }
    }

    fn loaded_store() -> BoardStore {
        let mut store = BoardStore::new();
        store.apply(BoardAction::Loaded(board())).unwrap();
        store
    }

    #[test]
    fn optimistic_move_lands_immediately() {
        let mut store = loaded_store();
        let id = store.request_move(intent("a", "c2", 0)).unwrap();

        assert_eq!(store.move_state(id), MoveState::OptimisticallyApplied);
        let view = store.view().unwrap();
        assert_eq!(view.column("c2").unwrap().tasks[0].id, "a");
        // Baseline untouched until the server answers.
        assert_eq!(store.baseline().unwrap(), &board());
    }

    #[test]
    fn rejection_restores_the_snapshot_exactly() {
        let mut store = loaded_store();
        let before = store.view().unwrap().clone();

        let id = store.request_move(intent("a", "c2", 1)).unwrap();
        assert_ne!(store.view().unwrap(), &before);

        store
            .apply(BoardAction::MoveFailed {
                id,
                error: "task not found".to_string(),
            })
            .unwrap();

        assert_eq!(store.view().unwrap(), &before);
        assert_eq!(store.move_state(id), MoveState::RolledBack);
        assert_eq!(store.last_error(), Some("task not found"));
        assert!(!store.has_pending());
    }

    #[test]
    fn confirmation_advances_the_baseline() {
        let mut store = loaded_store();
        let id = store.request_move(intent("c", "c1", 0)).unwrap();

        store.apply(BoardAction::MoveConfirmed { id }).unwrap();

        assert_eq!(store.move_state(id), MoveState::Confirmed);
        assert_eq!(store.baseline().unwrap(), store.view().unwrap());
        assert!(!store.has_pending());
    }

    #[test]
    fn overlapping_moves_dispatch_in_fifo_order() {
        let mut store = loaded_store();
        let first = store.request_move(intent("a", "c2", 0)).unwrap();
        let second = store.request_move(intent("b", "c2", 1)).unwrap();

        assert_eq!(store.next_dispatch().unwrap().id, first);
        store.apply(BoardAction::MoveConfirmed { id: first }).unwrap();
        assert_eq!(store.next_dispatch().unwrap().id, second);
    }

    #[test]
    fn failure_rolls_back_later_optimistic_moves_too() {
        let mut store = loaded_store();
        let first = store.request_move(intent("a", "c2", 0)).unwrap();
        let second = store.request_move(intent("b", "c2", 0)).unwrap();

        store
            .apply(BoardAction::MoveFailed {
                id: first,
                error: "conflict".to_string(),
            })
            .unwrap();

        // Neither optimistic effect survives; the view is the confirmed
        // baseline, not an intermediate state.
        assert_eq!(store.view().unwrap(), &board());
        assert_eq!(store.move_state(first), MoveState::RolledBack);
        assert_eq!(store.move_state(second), MoveState::RolledBack);
    }

    #[test]
    fn failure_after_a_confirmation_keeps_the_confirmed_move() {
        let mut store = loaded_store();
        let first = store.request_move(intent("a", "c2", 0)).unwrap();
        let second = store.request_move(intent("b", "c2", 0)).unwrap();

        store.apply(BoardAction::MoveConfirmed { id: first }).unwrap();
        store
            .apply(BoardAction::MoveFailed {
                id: second,
                error: "conflict".to_string(),
            })
            .unwrap();

        // Rollback lands on the post-confirmation baseline: "a" stays moved.
        let view = store.view().unwrap();
        assert_eq!(view.column("c2").unwrap().tasks[0].id, "a");
        assert!(view.column("c1").unwrap().tasks.iter().any(|t| t.id == "b"));
    }

    #[test]
    fn settling_after_a_refresh_is_a_no_op() {
        let mut store = loaded_store();
        let id = store.request_move(intent("a", "c2", 0)).unwrap();
        store.apply(BoardAction::MoveConfirmed { id }).unwrap();
        store.apply(BoardAction::Refresh(board())).unwrap();

        let snapshot = store.view().unwrap().clone();
        store.apply(BoardAction::MoveConfirmed { id }).unwrap();
        store
            .apply(BoardAction::MoveFailed {
                id,
                error: "late".to_string(),
            })
            .unwrap();
        assert_eq!(store.view().unwrap(), &snapshot);
    }

    #[test]
    fn refresh_replays_still_pending_moves() {
        let mut store = loaded_store();
        let id = store.request_move(intent("a", "c2", 0)).unwrap();

        store.apply(BoardAction::Refresh(board())).unwrap();

        assert_eq!(store.move_state(id), MoveState::OptimisticallyApplied);
        assert_eq!(store.view().unwrap().column("c2").unwrap().tasks[0].id, "a");
        assert_eq!(store.baseline().unwrap(), &board());
    }

    #[test]
    fn move_before_load_is_rejected() {
        let mut store = BoardStore::new();
        let err = store.request_move(intent("a", "c1", 0)).unwrap_err();
        assert!(matches!(err, EaselError::NoBoard));
    }
}
