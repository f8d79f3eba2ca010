//! Local pre-checks for blocker mutations
//!
//! The service enforces the real acyclicity invariant; these checks only
//! reject calls that are certain to be wrong from the task's own lists:
//! bad ids, self-blocking, duplicate edges, and direct two-task cycles.
//! Longer cycles are left to the service.

use thiserror::Error;

use super::task::Task;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockerRejection {
    #[error("blocker id must be a positive integer")]
    InvalidId,

    #[error("a task cannot block itself")]
    SelfBlock,

    #[error("task #{0} is already a blocker")]
    AlreadyBlocker(i64),

    #[error("adding task #{0} as a blocker would create a circular dependency")]
    WouldCycle(i64),

    #[error("task #{0} is not a blocker of this task")]
    NotABlocker(i64),
}

/// Decides whether an add-blocker call may be attempted for `task`.
///
/// Checked in order: the id must be positive, must not be the task
/// itself, must not already be a blocker, and must not be a dependent
/// (which would make the two tasks block each other).
pub fn check_add_blocker(task: &Task, blocker_id: i64) -> Result<(), BlockerRejection> {
    if blocker_id <= 0 {
        return Err(BlockerRejection::InvalidId);
    }
    if blocker_id == task.id {
        return Err(BlockerRejection::SelfBlock);
    }
    if task.blockers.contains(&blocker_id) {
        return Err(BlockerRejection::AlreadyBlocker(blocker_id));
    }
    if task.dependents.contains(&blocker_id) {
        return Err(BlockerRejection::WouldCycle(blocker_id));
    }
    Ok(())
}

/// Decides whether a remove-blocker call may be attempted for `task`.
///
/// The only precondition is that the id is currently a blocker.
pub fn check_remove_blocker(task: &Task, blocker_id: i64) -> Result<(), BlockerRejection> {
    if task.blockers.contains(&blocker_id) {
        Ok(())
    } else {
        Err(BlockerRejection::NotABlocker(blocker_id))
    }
}

/// Parses free-form blocker input (board prompts accept raw text)
pub fn parse_blocker_id(raw: &str) -> Result<i64, BlockerRejection> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| BlockerRejection::InvalidId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::domain::task::TaskState;

    fn task_with(id: i64, blockers: Vec<i64>, dependents: Vec<i64>) -> Task {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Task {
            id,
            title: format!("Task {}", id),
            description: None,
            state: TaskState::Todo,
            due_date: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            blockers,
            dependents,
        }
    }

    #[test]
    fn rejects_non_positive_ids() {
        let task = task_with(5, vec![], vec![]);
        assert_eq!(check_add_blocker(&task, 0), Err(BlockerRejection::InvalidId));
        assert_eq!(check_add_blocker(&task, -3), Err(BlockerRejection::InvalidId));
    }

    #[test]
    fn rejects_self_block() {
        let task = task_with(5, vec![], vec![]);
        assert_eq!(check_add_blocker(&task, 5), Err(BlockerRejection::SelfBlock));
    }

    #[test]
    fn rejects_duplicate_blocker() {
        let task = task_with(5, vec![3], vec![]);
        assert_eq!(
            check_add_blocker(&task, 3),
            Err(BlockerRejection::AlreadyBlocker(3))
        );
    }

    #[test]
    fn rejects_two_task_cycle() {
        // 7 already waits on 5, so 5 must not wait on 7
        let task = task_with(5, vec![], vec![7]);
        assert_eq!(
            check_add_blocker(&task, 7),
            Err(BlockerRejection::WouldCycle(7))
        );
    }

    #[test]
    fn permits_unrelated_task() {
        let task = task_with(5, vec![], vec![]);
        assert_eq!(check_add_blocker(&task, 9), Ok(()));
    }

    #[test]
    fn longer_cycles_are_not_detected_locally() {
        // 1 <- 2 <- 3 exists elsewhere in the graph; adding 3 as a blocker
        // of 1 closes a three-task cycle but nothing in task 1's own lists
        // reveals that, so the call goes through to the service.
        let task = task_with(1, vec![], vec![2]);
        assert_eq!(check_add_blocker(&task, 3), Ok(()));
    }

    #[test]
    fn remove_requires_existing_blocker() {
        let task = task_with(5, vec![3], vec![]);
        assert_eq!(check_remove_blocker(&task, 3), Ok(()));
        assert_eq!(
            check_remove_blocker(&task, 9),
            Err(BlockerRejection::NotABlocker(9))
        );
    }

    #[test]
    fn parses_trimmed_integers() {
        assert_eq!(parse_blocker_id(" 42 "), Ok(42));
        assert_eq!(parse_blocker_id("-1"), Ok(-1));
        assert_eq!(parse_blocker_id("seven"), Err(BlockerRejection::InvalidId));
        assert_eq!(parse_blocker_id(""), Err(BlockerRejection::InvalidId));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // The check must reject exactly the four conditions and
            // nothing else, for any shape of task.
            #[test]
            fn add_check_matches_reject_conditions(
                task_id in 1i64..200,
                blockers in proptest::collection::vec(1i64..200, 0..8),
                dependents in proptest::collection::vec(1i64..200, 0..8),
                candidate in -50i64..250,
            ) {
                let task = task_with(task_id, blockers.clone(), dependents.clone());
                let should_reject = candidate <= 0
                    || candidate == task_id
                    || blockers.contains(&candidate)
                    || dependents.contains(&candidate);

                let verdict = check_add_blocker(&task, candidate);
                prop_assert_eq!(verdict.is_err(), should_reject);
            }

            #[test]
            fn remove_check_matches_membership(
                task_id in 1i64..200,
                blockers in proptest::collection::vec(1i64..200, 0..8),
                candidate in 1i64..250,
            ) {
                let task = task_with(task_id, blockers.clone(), vec![]);
                let verdict = check_remove_blocker(&task, candidate);
                prop_assert_eq!(verdict.is_ok(), blockers.contains(&candidate));
            }
        }
    }
}
