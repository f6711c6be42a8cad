//! Task → Issue status propagation.
//!
//! Every task mutation goes through here so the issue's task list and the
//! task's `issue_id` stay in step. Closing the last open task of an issue
//! moves the issue to `ReadyForClosure`; reopening a task never moves it
//! back.

use tracing::{info, warn};

use crate::error::Result;
use crate::model::{IssueStatus, Task, TaskStatus};
use crate::store::InMemoryStore;
use crate::update::{IssueUpdate, TaskUpdate};

/// What happened to the parent issue after a task update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The parent issue no longer exists; nothing was propagated.
    IssueMissing,
    /// The issue's task list was re-synced; status left alone.
    Synced { issue_id: u64 },
    /// The issue was moved to `ReadyForClosure`.
    Promoted { issue_id: u64 },
}

impl Propagation {
    #[must_use]
    pub const fn promoted(self) -> bool {
        matches!(self, Self::Promoted { .. })
    }
}

/// Result of [`update_task`].
#[derive(Debug, Clone)]
pub struct TaskUpdateOutcome {
    pub task: Task,
    pub propagation: Propagation,
}

/// Store a new task and append it to its issue's task list.
///
/// The caller has already checked that the issue exists.
pub fn create_task(store: &mut InMemoryStore, task: Task) -> Task {
    let task = store.create_task(task);
    if store.link_task(task.issue_id, task.id).is_none() {
        warn!(
            task_id = task.id,
            issue_id = task.issue_id,
            "parent issue vanished while linking new task"
        );
    }
    task
}

/// Apply a task patch and propagate to the parent issue.
///
/// A missing parent issue does not fail the update; it is logged and
/// reported as [`Propagation::IssueMissing`].
///
/// # Errors
///
/// Returns `NotFound` if the task doesn't exist.
pub fn update_task(
    store: &mut InMemoryStore,
    id: u64,
    update: &TaskUpdate,
) -> Result<TaskUpdateOutcome> {
    let task = store.update_task(id, update)?;

    let Some(issue) = store.link_task(task.issue_id, task.id) else {
        warn!(
            task_id = task.id,
            issue_id = task.issue_id,
            "parent issue not found, skipping status propagation"
        );
        return Ok(TaskUpdateOutcome {
            task,
            propagation: Propagation::IssueMissing,
        });
    };

    let closing = update.status.is_some_and(TaskStatus::is_closed);
    if !closing || issue.status == IssueStatus::ReadyForClosure {
        return Ok(TaskUpdateOutcome {
            task,
            propagation: Propagation::Synced { issue_id: issue.id },
        });
    }

    let all_closed = store
        .tasks_of(&issue)
        .iter()
        .all(|t| t.status.is_closed());
    if !all_closed {
        return Ok(TaskUpdateOutcome {
            task,
            propagation: Propagation::Synced { issue_id: issue.id },
        });
    }

    store.update_issue(
        issue.id,
        &IssueUpdate {
            status: Some(IssueStatus::ReadyForClosure),
            ..Default::default()
        },
    )?;
    info!(
        issue_id = issue.id,
        task_id = task.id,
        "all tasks closed, issue is ready for closure"
    );

    Ok(TaskUpdateOutcome {
        task,
        propagation: Propagation::Promoted { issue_id: issue.id },
    })
}

/// Unlink a task from its issue and delete it.
///
/// Returns whether the task existed.
pub fn delete_task(store: &mut InMemoryStore, id: u64) -> bool {
    let Ok(issue_id) = store.get_task(id).map(|t| t.issue_id) else {
        return false;
    };
    if store.unlink_task(issue_id, id).is_none() {
        warn!(task_id = id, issue_id, "deleting task whose issue is gone");
    }
    store.delete_task(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::store::tests::{make_issue, make_task, make_user};

    fn close() -> TaskUpdate {
        TaskUpdate {
            status: Some(TaskStatus::Closed),
            ..Default::default()
        }
    }

    fn setup(task_count: usize) -> (InMemoryStore, u64, Vec<u64>) {
        let mut store = InMemoryStore::new();
        let quality = store.create_user(make_user("q", Role::Quality));
        let worker = store.create_user(make_user("w", Role::User));
        let issue = store.create_issue(make_issue("Line A", quality.id));
        let tasks = (0..task_count)
            .map(|i| create_task(&mut store, make_task(&format!("t{i}"), worker.id, issue.id)).id)
            .collect();
        (store, issue.id, tasks)
    }

    #[test]
    fn create_links_task_exactly_once() {
        let (store, issue_id, tasks) = setup(1);
        let issue = store.get_issue(issue_id).unwrap();
        assert_eq!(issue.task_ids, tasks);
    }

    #[test]
    fn closing_only_task_promotes_issue() {
        let (mut store, issue_id, tasks) = setup(1);
        let outcome = update_task(&mut store, tasks[0], &close()).unwrap();
        assert_eq!(outcome.task.status, TaskStatus::Closed);
        assert_eq!(outcome.propagation, Propagation::Promoted { issue_id });
        assert_eq!(
            store.get_issue(issue_id).unwrap().status,
            IssueStatus::ReadyForClosure
        );
    }

    #[test]
    fn open_sibling_blocks_promotion() {
        let (mut store, issue_id, tasks) = setup(2);
        let outcome = update_task(&mut store, tasks[0], &close()).unwrap();
        assert!(!outcome.propagation.promoted());
        assert_eq!(store.get_issue(issue_id).unwrap().status, IssueStatus::Open);

        let outcome = update_task(&mut store, tasks[1], &close()).unwrap();
        assert!(outcome.propagation.promoted());
    }

    #[test]
    fn reclosing_is_idempotent() {
        let (mut store, issue_id, tasks) = setup(1);
        update_task(&mut store, tasks[0], &close()).unwrap();
        let again = update_task(&mut store, tasks[0], &close()).unwrap();
        assert_eq!(again.propagation, Propagation::Synced { issue_id });
        assert_eq!(
            store.get_issue(issue_id).unwrap().status,
            IssueStatus::ReadyForClosure
        );
    }

    #[test]
    fn reopening_does_not_revert_issue() {
        let (mut store, issue_id, tasks) = setup(1);
        update_task(&mut store, tasks[0], &close()).unwrap();
        let reopen = TaskUpdate {
            status: Some(TaskStatus::Open),
            ..Default::default()
        };
        update_task(&mut store, tasks[0], &reopen).unwrap();
        assert_eq!(
            store.get_issue(issue_id).unwrap().status,
            IssueStatus::ReadyForClosure
        );
    }

    #[test]
    fn non_status_update_does_not_evaluate() {
        let (mut store, issue_id, tasks) = setup(1);
        // Close via a direct store write so the workflow never saw the transition.
        store.update_task(tasks[0], &close()).unwrap();
        let comment = TaskUpdate {
            comments: Some("note".to_string()),
            ..Default::default()
        };
        let outcome = update_task(&mut store, tasks[0], &comment).unwrap();
        assert_eq!(outcome.propagation, Propagation::Synced { issue_id });
        assert_eq!(store.get_issue(issue_id).unwrap().status, IssueStatus::Open);
    }

    #[test]
    fn missing_issue_is_silent() {
        let (mut store, issue_id, tasks) = setup(1);
        assert!(store.delete_issue(issue_id));
        let outcome = update_task(&mut store, tasks[0], &close()).unwrap();
        assert_eq!(outcome.propagation, Propagation::IssueMissing);
        assert_eq!(outcome.task.status, TaskStatus::Closed);
    }

    #[test]
    fn update_refreshes_issue_updated_at() {
        let (mut store, issue_id, tasks) = setup(1);
        let before = store.get_issue(issue_id).unwrap().updated_at;
        update_task(&mut store, tasks[0], &TaskUpdate::default()).unwrap();
        assert!(store.get_issue(issue_id).unwrap().updated_at >= before);
    }

    #[test]
    fn delete_unlinks_from_issue() {
        let (mut store, issue_id, tasks) = setup(2);
        assert!(delete_task(&mut store, tasks[0]));
        assert!(!delete_task(&mut store, tasks[0]));
        assert_eq!(store.get_issue(issue_id).unwrap().task_ids, vec![tasks[1]]);
    }

    #[test]
    fn deleting_open_task_then_closing_last_promotes() {
        let (mut store, issue_id, tasks) = setup(2);
        delete_task(&mut store, tasks[1]);
        let outcome = update_task(&mut store, tasks[0], &close()).unwrap();
        assert_eq!(outcome.propagation, Propagation::Promoted { issue_id });
    }
}
