//! Read-side views with references resolved.
//!
//! - [`DefectDetails`] - defect with its creator
//! - [`IssueDetails`] - issue with creator, related defects and linked tasks
//! - [`TaskDetails`] - task with assignee and a summary of its issue
//!
//! A reference to a deleted record renders as `null` (or is skipped in
//! lists) rather than failing the read.

use serde::Serialize;

use crate::model::{Defect, Issue, IssueStatus, Task, User};
use crate::store::InMemoryStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectDetails {
    #[serde(flatten)]
    pub defect: Defect,
    pub creator: Option<User>,
}

impl DefectDetails {
    #[must_use]
    pub fn build(store: &InMemoryStore, defect: &Defect) -> Self {
        Self {
            defect: defect.clone(),
            creator: store.get_user(defect.creator_id).ok().cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetails {
    #[serde(flatten)]
    pub issue: Issue,
    pub creator: Option<User>,
    pub defects: Vec<Defect>,
    pub tasks: Vec<Task>,
}

impl IssueDetails {
    #[must_use]
    pub fn build(store: &InMemoryStore, issue: &Issue) -> Self {
        Self {
            issue: issue.clone(),
            creator: store.get_user(issue.creator_id).ok().cloned(),
            defects: issue
                .defect_ids
                .iter()
                .filter_map(|id| store.get_defect(*id).ok().cloned())
                .collect(),
            tasks: store.tasks_of(issue).into_iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub id: u64,
    pub title: String,
    pub status: IssueStatus,
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title.clone(),
            status: issue.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    pub assignee: Option<User>,
    pub issue: Option<IssueSummary>,
}

impl TaskDetails {
    #[must_use]
    pub fn build(store: &InMemoryStore, task: &Task) -> Self {
        Self {
            task: task.clone(),
            assignee: store.get_user(task.assignee_id).ok().cloned(),
            issue: store.get_issue(task.issue_id).ok().map(IssueSummary::from),
        }
    }
}
