//! Position reindexing engine.
//!
//! Every ordered container (a column's task list, a project's column list)
//! keeps a dense, zero-based `position` on its direct children: the set of
//! positions is exactly `{0, 1, ..., n-1}` between transactions. This module
//! computes the sibling shifts a move requires; the db layer applies them
//! inside a single transaction.
//!
//! The engine never heals a broken ordering. A gap or duplicate discovered at
//! read time is a data integrity bug and is surfaced as
//! [`CorkboardError::CorruptOrdering`].

use crate::error::{CorkboardError, Result};

/// A contiguous range of sibling positions to shift by `delta` (always ±1).
///
/// Bounds are inclusive; `hi = None` means "to the end of the container".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub lo: i64,
    pub hi: Option<i64>,
    pub delta: i64,
}

/// The sibling shifts required by one move, before the moved item itself is
/// assigned its target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePlan {
    /// Same container, same position. Nothing to do.
    NoOp,
    /// Reorder within one container.
    SameContainer { shift: Shift, to: i64 },
    /// Move across containers: close the gap left in the source, open a slot
    /// in the destination.
    CrossContainer {
        close_gap: Shift,
        open_slot: Shift,
        to: i64,
    },
}

/// Validate a target position against the destination container size.
///
/// `len` is the container size the moved item will join: for a same-container
/// move, the size after (notionally) removing the item; for a cross-container
/// move, the current size of the destination. `new_pos == len` appends.
pub fn validate_target(new_pos: i64, len: i64) -> Result<()> {
    if new_pos < 0 || new_pos > len {
        return Err(CorkboardError::PositionOutOfRange {
            position: new_pos,
            len,
        });
    }
    Ok(())
}

/// Plan a reorder within a single container.
pub fn plan_same_container(old_pos: i64, new_pos: i64) -> MovePlan {
    if new_pos == old_pos {
        return MovePlan::NoOp;
    }
    let shift = if new_pos < old_pos {
        // Moving up: siblings in [new_pos, old_pos) slide down one slot.
        Shift {
            lo: new_pos,
            hi: Some(old_pos - 1),
            delta: 1,
        }
    } else {
        // Moving down: siblings in (old_pos, new_pos] slide up one slot.
        Shift {
            lo: old_pos + 1,
            hi: Some(new_pos),
            delta: -1,
        }
    };
    MovePlan::SameContainer {
        shift,
        to: new_pos,
    }
}

/// Plan a move from one container into another.
pub fn plan_cross_container(old_pos: i64, new_pos: i64) -> MovePlan {
    MovePlan::CrossContainer {
        close_gap: Shift {
            lo: old_pos + 1,
            hi: None,
            delta: -1,
        },
        open_slot: Shift {
            lo: new_pos,
            hi: None,
            delta: 1,
        },
        to: new_pos,
    }
}

/// The shift applied to later siblings when an item is removed.
pub fn plan_remove(old_pos: i64) -> Shift {
    Shift {
        lo: old_pos + 1,
        hi: None,
        delta: -1,
    }
}

/// Verify that `positions` (in ascending order of whatever the caller sorted
/// by) is exactly `{0, ..., n-1}`.
pub fn check_dense(container: &str, positions: &[i64]) -> Result<()> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    for (expected, actual) in sorted.iter().enumerate() {
        if *actual != expected as i64 {
            return Err(CorkboardError::CorruptOrdering {
                container: container.to_string(),
                detail: format!(
                    "expected position {} but found {} among {:?}",
                    expected, actual, positions
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Apply a plan to a model Vec of item ids, mirroring what the SQL
    /// shifts do, and return the resulting order.
    fn apply_same(items: &mut Vec<u32>, old_pos: usize, plan: MovePlan) {
        match plan {
            MovePlan::NoOp => {}
            MovePlan::SameContainer { to, .. } => {
                let item = items.remove(old_pos);
                items.insert(to as usize, item);
            }
            MovePlan::CrossContainer { .. } => panic!("expected same-container plan"),
        }
    }

    #[test]
    fn move_toward_front_shifts_intervening_up() {
        let plan = plan_same_container(3, 1);
        assert_eq!(
            plan,
            MovePlan::SameContainer {
                shift: Shift {
                    lo: 1,
                    hi: Some(2),
                    delta: 1
                },
                to: 1,
            }
        );
        let mut items = vec![10, 11, 12, 13];
        apply_same(&mut items, 3, plan);
        assert_eq!(items, vec![10, 13, 11, 12]);
    }

    #[test]
    fn move_toward_back_shifts_intervening_down() {
        let plan = plan_same_container(0, 2);
        assert_eq!(
            plan,
            MovePlan::SameContainer {
                shift: Shift {
                    lo: 1,
                    hi: Some(2),
                    delta: -1
                },
                to: 2,
            }
        );
        let mut items = vec![10, 11, 12, 13];
        apply_same(&mut items, 0, plan);
        assert_eq!(items, vec![11, 12, 10, 13]);
    }

    #[test]
    fn same_position_is_noop() {
        assert_eq!(plan_same_container(2, 2), MovePlan::NoOp);
    }

    #[test]
    fn cross_container_plan_closes_and_opens() {
        let MovePlan::CrossContainer {
            close_gap,
            open_slot,
            to,
        } = plan_cross_container(1, 1)
        else {
            panic!("expected cross-container plan");
        };
        assert_eq!(close_gap, Shift { lo: 2, hi: None, delta: -1 });
        assert_eq!(open_slot, Shift { lo: 1, hi: None, delta: 1 });
        assert_eq!(to, 1);
    }

    #[test]
    fn target_bounds_are_inclusive_of_append() {
        assert!(validate_target(0, 0).is_ok());
        assert!(validate_target(3, 3).is_ok());
        assert!(validate_target(4, 3).is_err());
        assert!(validate_target(-1, 3).is_err());
    }

    #[test]
    fn dense_check_accepts_contiguous_and_rejects_gaps() {
        assert!(check_dense("col", &[0, 1, 2, 3]).is_ok());
        assert!(check_dense("col", &[2, 0, 1]).is_ok());
        assert!(check_dense("col", &[]).is_ok());
        assert!(check_dense("col", &[0, 2, 3]).is_err());
        assert!(check_dense("col", &[0, 1, 1]).is_err());
    }
}
