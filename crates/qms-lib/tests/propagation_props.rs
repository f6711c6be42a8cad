//! Property tests for task → issue status propagation.

use chrono::Utc;
use proptest::prelude::*;
use qms_lib::model::{IssueStatus, TaskStatus};
use qms_lib::update::TaskUpdate;
use qms_lib::workflow::{self, Propagation};
use qms_lib::{InMemoryStore, Issue, Task};

fn store_with_tasks(count: usize) -> (InMemoryStore, u64, Vec<u64>) {
    let mut store = InMemoryStore::new();
    let now = Utc::now();
    let issue = store.create_issue(Issue {
        id: 0,
        title: "Line A".to_string(),
        description: "desc".to_string(),
        status: IssueStatus::Open,
        creator_id: 1,
        defect_ids: Vec::new(),
        task_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    });
    let tasks = (0..count)
        .map(|i| {
            workflow::create_task(
                &mut store,
                Task {
                    id: 0,
                    title: format!("task {i}"),
                    description: "d".to_string(),
                    status: TaskStatus::Open,
                    assignee_id: 2,
                    issue_id: issue.id,
                    comments: String::new(),
                    created_at: now,
                    updated_at: now,
                },
            )
            .id
        })
        .collect();
    (store, issue.id, tasks)
}

fn status_update(status: TaskStatus) -> TaskUpdate {
    TaskUpdate {
        status: Some(status),
        ..Default::default()
    }
}

fn any_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Open),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Closed),
    ]
}

proptest! {
    /// Closing tasks in any order promotes the issue exactly once, and only
    /// when the last open task closes.
    #[test]
    fn prop_promotion_happens_once_when_all_closed(
        count in 1usize..6,
        order in prop::collection::vec(0usize..6, 1..20),
    ) {
        let (mut store, issue_id, tasks) = store_with_tasks(count);
        let mut promotions = 0;

        for pick in order {
            let id = tasks[pick % count];
            let outcome = workflow::update_task(&mut store, id, &status_update(TaskStatus::Closed)).unwrap();
            if outcome.propagation.promoted() {
                promotions += 1;
            }

            let issue = store.get_issue(issue_id).unwrap();
            let all_closed = store.tasks_of(issue).iter().all(|t| t.status.is_closed());
            prop_assert_eq!(issue.status == IssueStatus::ReadyForClosure, all_closed);
        }

        prop_assert!(promotions <= 1);
    }

    /// With at least one task not closed, the issue is never promoted.
    #[test]
    fn prop_open_task_blocks_promotion(
        statuses in prop::collection::vec(any_status(), 2..8),
        holdout in 0usize..8,
    ) {
        let (mut store, issue_id, tasks) = store_with_tasks(statuses.len());
        let holdout = holdout % tasks.len();

        for (i, (id, status)) in tasks.iter().zip(&statuses).enumerate() {
            let status = if i == holdout { TaskStatus::InProgress } else { *status };
            let outcome = workflow::update_task(&mut store, *id, &status_update(status)).unwrap();
            prop_assert_eq!(outcome.propagation, Propagation::Synced { issue_id });
        }

        prop_assert_eq!(store.get_issue(issue_id).unwrap().status, IssueStatus::Open);
        prop_assert_eq!(store.get_issue(issue_id).unwrap().task_ids.len(), tasks.len());
    }
}
