//! The pure board model. A [`BoardView`] is a value: cloning one snapshots
//! it, and `==` is structural, which is exactly what rollback needs.

use corkboard_types::Board;

use crate::error::EaselError;

/// Just enough of a task to render a card and track its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub id: String,
    pub title: String,
    pub priority: String,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub id: String,
    pub name: String,
    pub position: i64,
    pub tasks: Vec<TaskCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub project_id: String,
    pub columns: Vec<ColumnView>,
}

impl From<Board> for BoardView {
    fn from(board: Board) -> Self {
        let mut columns: Vec<ColumnView> = board
            .columns
            .into_iter()
            .map(|entry| {
                let mut tasks: Vec<TaskCard> = entry
                    .tasks
                    .into_iter()
                    .map(|task| TaskCard {
                        id: task.id,
                        title: task.title,
                        priority: task.priority,
                        position: task.position,
                    })
                    .collect();
                tasks.sort_by_key(|t| t.position);
                ColumnView {
                    id: entry.column.id,
                    name: entry.column.name,
                    position: entry.column.position,
                    tasks,
                }
            })
            .collect();
        columns.sort_by_key(|c| c.position);
        BoardView {
            project_id: board.project.id,
            columns,
        }
    }
}

impl BoardView {
    pub fn column(&self, id: &str) -> Option<&ColumnView> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Locate a task; returns (column index, task index).
    fn find_task(&self, task_id: &str) -> Option<(usize, usize)> {
        for (ci, column) in self.columns.iter().enumerate() {
            if let Some(ti) = column.tasks.iter().position(|t| t.id == task_id) {
                return Some((ci, ti));
            }
        }
        None
    }

    /// The view after moving `task_id` to `column_id` at `position`, with
    /// dense positions reassigned in every touched column. Pure: `self` is
    /// untouched. Splice semantics match the server's reindexing, so an
    /// optimistic view agrees with the confirmed one.
    pub fn with_move(
        &self,
        task_id: &str,
        column_id: &str,
        position: i64,
    ) -> Result<BoardView, EaselError> {
        let (from_ci, from_ti) = self
            .find_task(task_id)
            .ok_or_else(|| EaselError::UnknownTask(task_id.to_string()))?;
        let to_ci = self
            .columns
            .iter()
            .position(|c| c.id == column_id)
            .ok_or_else(|| EaselError::UnknownColumn(column_id.to_string()))?;

        // Length of the destination list once the task has notionally left
        // its source; `position == len` appends.
        let dest_len = if from_ci == to_ci {
            self.columns[to_ci].tasks.len() - 1
        } else {
            self.columns[to_ci].tasks.len()
        };
        if position < 0 || position as usize > dest_len {
            return Err(EaselError::PositionOutOfRange {
                position,
                len: dest_len,
            });
        }

        let mut next = self.clone();
        let card = next.columns[from_ci].tasks.remove(from_ti);
        next.columns[to_ci].tasks.insert(position as usize, card);
        next.renumber(from_ci);
        if to_ci != from_ci {
            next.renumber(to_ci);
        }
        Ok(next)
    }

    fn renumber(&mut self, column_index: usize) {
        for (i, task) in self.columns[column_index].tasks.iter_mut().enumerate() {
            task.position = i as i64;
        }
    }

    /// True when every column holds positions `0..len` in order.
    pub fn is_dense(&self) -> bool {
        self.columns.iter().all(|column| {
            column
                .tasks
                .iter()
                .enumerate()
                .all(|(i, t)| t.position == i as i64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, position: i64) -> TaskCard {
        TaskCard {
            id: id.to_string(),
            title: format!("task {id}"),
            priority: "medium".to_string(),
            position,
        }
    }

    fn view() -> BoardView {
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

    fn order(view: &BoardView, column: &str) -> Vec<String> {
        view.column(column)
            .unwrap()
            .tasks
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    #[test]
    fn same_column_move_is_a_splice() {
        let moved = view().with_move("c", "c1", 0).unwrap();
        assert_eq!(order(&moved, "c1"), ["c", "a", "b"]);
        assert!(moved.is_dense());
    }

    #[test]
    fn cross_column_move_renumbers_both_sides() {
        let moved = view().with_move("a", "c2", 1).unwrap();
        assert_eq!(order(&moved, "c1"), ["b", "c"]);
        assert_eq!(order(&moved, "c2"), ["d", "a"]);
        assert!(moved.is_dense());
    }

    #[test]
    fn move_to_own_slot_changes_nothing() {
        let before = view();
        let after = before.with_move("b", "c1", 1).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn position_past_end_is_rejected() {
        let err = view().with_move("a", "c2", 2).unwrap_err();
        assert!(matches!(
            err,
            EaselError::PositionOutOfRange { position: 2, len: 1 }
        ));
    }

    #[test]
    fn with_move_leaves_the_original_untouched() {
        let before = view();
        let snapshot = before.clone();
        let _ = before.with_move("a", "c2", 0).unwrap();
        assert_eq!(before, snapshot);
    }
}
