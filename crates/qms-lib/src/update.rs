//! Creation drafts and partial-update patches.
//!
//! Drafts carry the caller-supplied fields of a new record; required fields
//! default to empty so the validators can report them instead of the JSON
//! decoder. Patches hold one `Option` per mutable field and are applied
//! through a single [`Patch::apply`] per entity.

use serde::Deserialize;

use crate::model::{Defect, DefectStatus, Issue, IssueStatus, Role, Task, TaskStatus, User};

/// Field merge for a stored record.
pub trait Patch<T> {
    /// Overwrite the fields present in `self`. Timestamps are the store's job.
    fn apply(&self, target: &mut T);
}

// ============================================================================
// Drafts
// ============================================================================

/// Fields for a new user created by an administrator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(alias = "userGroup")]
    pub role: Option<Role>,
}

/// Self-service registration. The role is always [`Role::User`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDefect {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub defect_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assignee_id: Option<u64>,
    pub issue_id: Option<u64>,
}

// ============================================================================
// Patches
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "userGroup")]
    pub role: Option<Role>,
}

impl Patch<User> for UserUpdate {
    fn apply(&self, user: &mut User) {
        if let Some(ref username) = self.username {
            user.username.clone_from(username);
        }
        if let Some(ref email) = self.email {
            user.email.clone_from(email);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<DefectStatus>,
}

impl Patch<Defect> for DefectUpdate {
    fn apply(&self, defect: &mut Defect) {
        if let Some(ref title) = self.title {
            defect.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            defect.description.clone_from(description);
        }
        if let Some(status) = self.status {
            defect.status = status;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<IssueStatus>,
    pub defect_ids: Option<Vec<u64>>,
}

impl Patch<Issue> for IssueUpdate {
    fn apply(&self, issue: &mut Issue) {
        if let Some(ref title) = self.title {
            issue.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            issue.description.clone_from(description);
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(ref defect_ids) = self.defect_ids {
            issue.defect_ids.clone_from(defect_ids);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<u64>,
    pub comments: Option<String>,
}

impl Patch<Task> for TaskUpdate {
    fn apply(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title.clone_from(title);
        }
        if let Some(ref description) = self.description {
            task.description.clone_from(description);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(ref comments) = self.comments {
            task.comments.clone_from(comments);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn task() -> Task {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: 1,
            title: "Fix".to_string(),
            description: "d".to_string(),
            status: TaskStatus::Open,
            assignee_id: 2,
            issue_id: 1,
            comments: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn task_patch_touches_only_present_fields() {
        let mut t = task();
        let patch = TaskUpdate {
            status: Some(TaskStatus::Closed),
            comments: Some("done".to_string()),
            ..Default::default()
        };
        patch.apply(&mut t);
        assert_eq!(t.status, TaskStatus::Closed);
        assert_eq!(t.comments, "done");
        assert_eq!(t.title, "Fix");
        assert_eq!(t.assignee_id, 2);
    }

    #[test]
    fn drafts_default_missing_fields() {
        let draft: NewTask = serde_json::from_str(r#"{"title":"Fix"}"#).unwrap();
        assert_eq!(draft.title, "Fix");
        assert!(draft.description.is_empty());
        assert!(draft.assignee_id.is_none());

        let patch: IssueUpdate = serde_json::from_str(r#"{"status":"ReadyForClosure"}"#).unwrap();
        assert_eq!(patch.status, Some(IssueStatus::ReadyForClosure));
        assert!(serde_json::from_str::<IssueUpdate>(r#"{"status":"Bogus"}"#).is_err());
    }
}
