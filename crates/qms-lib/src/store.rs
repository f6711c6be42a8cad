//! In-memory entity store.
//!
//! Four insertion-ordered collections with per-collection id counters.
//! Lookups are linear scans; ids are never handed out twice, even after
//! the record that held them is deleted.

use chrono::{DateTime, Utc};

use crate::error::{EntityKind, QmsError, Result};
use crate::model::{Defect, Issue, Task, User};
use crate::update::{DefectUpdate, IssueUpdate, Patch, TaskUpdate, UserUpdate};

/// A stored entity with a store-assigned id and audit timestamps.
pub trait Record: Clone {
    const KIND: EntityKind;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Set both timestamps at creation.
    fn stamp(&mut self, now: DateTime<Utc>);

    /// Refresh `updated_at`.
    fn touch(&mut self, now: DateTime<Utc>);
}

macro_rules! impl_record {
    ($ty:ty, $kind:expr) => {
        impl Record for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }

            fn stamp(&mut self, now: DateTime<Utc>) {
                self.created_at = now;
                self.updated_at = now;
            }

            fn touch(&mut self, now: DateTime<Utc>) {
                self.updated_at = now;
            }
        }
    };
}

impl_record!(User, EntityKind::User);
impl_record!(Defect, EntityKind::Defect);
impl_record!(Issue, EntityKind::Issue);
impl_record!(Task, EntityKind::Task);

/// One entity collection: records in insertion order plus the id counter.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    records: Vec<T>,
    next_id: u64,
}

impl<T: Record> Collection<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Assign the next id, stamp timestamps and append.
    pub fn create(&mut self, mut record: T) -> T {
        record.set_id(self.next_id);
        record.stamp(Utc::now());
        self.next_id += 1;
        self.records.push(record.clone());
        record
    }

    #[must_use]
    pub fn find(&self, id: u64) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Merge `patch` over the record and refresh `updated_at`.
    pub fn update<P: Patch<T>>(&mut self, id: u64, patch: &P) -> Option<T> {
        self.update_with(id, |record| patch.apply(record))
    }

    /// Run `f` against the record, then refresh `updated_at`.
    pub fn update_with(&mut self, id: u64, f: impl FnOnce(&mut T)) -> Option<T> {
        let record = self.records.iter_mut().find(|r| r.id() == id)?;
        f(record);
        record.touch(Utc::now());
        Some(record.clone())
    }

    /// Remove the record; reports whether anything was removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        self.records.len() != before
    }

    #[must_use]
    pub fn list(&self) -> &[T] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory QMS store.
///
/// Owns the four collections. Callers validate input and check permissions
/// before reaching the store; the store only enforces existence.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: Collection<User>,
    defects: Collection<Defect>,
    issues: Collection<Issue>,
    tasks: Collection<Task>,
}

impl InMemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn create_user(&mut self, user: User) -> User {
        self.users.create(user)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the user doesn't exist.
    pub fn get_user(&self, id: u64) -> Result<&User> {
        self.users
            .find(id)
            .ok_or_else(|| QmsError::not_found(EntityKind::User, id))
    }

    #[must_use]
    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.list().iter().find(|u| u.username == username)
    }

    /// True if another user (not `except`) already has this username.
    #[must_use]
    pub fn username_taken(&self, username: &str, except: Option<u64>) -> bool {
        self.users
            .list()
            .iter()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the user doesn't exist.
    pub fn update_user(&mut self, id: u64, update: &UserUpdate) -> Result<User> {
        self.users
            .update(id, update)
            .ok_or_else(|| QmsError::not_found(EntityKind::User, id))
    }

    pub fn delete_user(&mut self, id: u64) -> bool {
        self.users.delete(id)
    }

    #[must_use]
    pub fn list_users(&self) -> &[User] {
        self.users.list()
    }

    // ========================================================================
    // Defects
    // ========================================================================

    pub fn create_defect(&mut self, defect: Defect) -> Defect {
        self.defects.create(defect)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the defect doesn't exist.
    pub fn get_defect(&self, id: u64) -> Result<&Defect> {
        self.defects
            .find(id)
            .ok_or_else(|| QmsError::not_found(EntityKind::Defect, id))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the defect doesn't exist.
    pub fn update_defect(&mut self, id: u64, update: &DefectUpdate) -> Result<Defect> {
        self.defects
            .update(id, update)
            .ok_or_else(|| QmsError::not_found(EntityKind::Defect, id))
    }

    pub fn delete_defect(&mut self, id: u64) -> bool {
        self.defects.delete(id)
    }

    #[must_use]
    pub fn list_defects(&self) -> &[Defect] {
        self.defects.list()
    }

    // ========================================================================
    // Issues
    // ========================================================================

    pub fn create_issue(&mut self, issue: Issue) -> Issue {
        self.issues.create(issue)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the issue doesn't exist.
    pub fn get_issue(&self, id: u64) -> Result<&Issue> {
        self.issues
            .find(id)
            .ok_or_else(|| QmsError::not_found(EntityKind::Issue, id))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the issue doesn't exist.
    pub fn update_issue(&mut self, id: u64, update: &IssueUpdate) -> Result<Issue> {
        self.issues
            .update(id, update)
            .ok_or_else(|| QmsError::not_found(EntityKind::Issue, id))
    }

    pub fn delete_issue(&mut self, id: u64) -> bool {
        self.issues.delete(id)
    }

    #[must_use]
    pub fn list_issues(&self) -> &[Issue] {
        self.issues.list()
    }

    /// Make sure `task_id` is in the issue's task list and refresh the issue.
    ///
    /// Returns `None` when the issue is gone.
    pub fn link_task(&mut self, issue_id: u64, task_id: u64) -> Option<Issue> {
        self.issues.update_with(issue_id, |issue| {
            if !issue.task_ids.contains(&task_id) {
                issue.task_ids.push(task_id);
            }
        })
    }

    /// Drop `task_id` from the issue's task list.
    ///
    /// Returns `None` when the issue is gone.
    pub fn unlink_task(&mut self, issue_id: u64, task_id: u64) -> Option<Issue> {
        self.issues
            .update_with(issue_id, |issue| issue.task_ids.retain(|id| *id != task_id))
    }

    /// Tasks currently linked to an issue, in link order. Ids whose task
    /// no longer exists are skipped.
    #[must_use]
    pub fn tasks_of(&self, issue: &Issue) -> Vec<&Task> {
        issue
            .task_ids
            .iter()
            .filter_map(|id| self.tasks.find(*id))
            .collect()
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    pub fn create_task(&mut self, task: Task) -> Task {
        self.tasks.create(task)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the task doesn't exist.
    pub fn get_task(&self, id: u64) -> Result<&Task> {
        self.tasks
            .find(id)
            .ok_or_else(|| QmsError::not_found(EntityKind::Task, id))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the task doesn't exist.
    pub fn update_task(&mut self, id: u64, update: &TaskUpdate) -> Result<Task> {
        self.tasks
            .update(id, update)
            .ok_or_else(|| QmsError::not_found(EntityKind::Task, id))
    }

    pub fn delete_task(&mut self, id: u64) -> bool {
        self.tasks.delete(id)
    }

    #[must_use]
    pub fn list_tasks(&self) -> &[Task] {
        self.tasks.list()
    }

    // ========================================================================
    // Counts
    // ========================================================================

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn defect_count(&self) -> usize {
        self.defects.len()
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{IssueStatus, Role, TaskStatus};

    pub(crate) fn make_user(username: &str, role: Role) -> User {
        User {
            id: 0,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn make_issue(title: &str, creator_id: u64) -> Issue {
        Issue {
            id: 0,
            title: title.to_string(),
            description: "desc".to_string(),
            status: IssueStatus::Open,
            creator_id,
            defect_ids: Vec::new(),
            task_ids: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn make_task(title: &str, assignee_id: u64, issue_id: u64) -> Task {
        Task {
            id: 0,
            title: title.to_string(),
            description: "d".to_string(),
            status: TaskStatus::Open,
            assignee_id,
            issue_id,
            comments: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut store = InMemoryStore::new();
        let a = store.create_user(make_user("a", Role::User));
        let b = store.create_user(make_user("b", Role::Quality));
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut store = InMemoryStore::new();
        let first = store.create_issue(make_issue("one", 1));
        assert!(store.delete_issue(first.id));
        let second = store.create_issue(make_issue("two", 1));
        assert_eq!(second.id, 2);
        assert_eq!(store.issue_count(), 1);
    }

    #[test]
    fn test_update_merges_and_refreshes_updated_at() {
        let mut store = InMemoryStore::new();
        let issue = store.create_issue(make_issue("Line A", 1));

        let updated = store
            .update_issue(
                issue.id,
                &IssueUpdate {
                    description: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Line A");
        assert_eq!(updated.description, "new");
        assert_eq!(updated.created_at, issue.created_at);
        assert!(updated.updated_at >= issue.updated_at);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut store = InMemoryStore::new();
        let err = store
            .update_task(9, &TaskUpdate::default())
            .unwrap_err();
        assert!(matches!(
            err,
            QmsError::NotFound {
                entity: EntityKind::Task,
                id: 9
            }
        ));
    }

    #[test]
    fn test_delete_reports_removal() {
        let mut store = InMemoryStore::new();
        let defect = store.create_defect(Defect {
            id: 0,
            title: "t".to_string(),
            description: "d".to_string(),
            status: crate::model::DefectStatus::New,
            creator_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        assert!(store.delete_defect(defect.id));
        assert!(!store.delete_defect(defect.id));
        assert!(store.get_defect(defect.id).is_err());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = InMemoryStore::new();
        for name in ["c", "a", "b"] {
            store.create_user(make_user(name, Role::User));
        }
        let names: Vec<&str> = store
            .list_users()
            .iter()
            .map(|u| u.username.as_str())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_username_lookup_and_taken() {
        let mut store = InMemoryStore::new();
        let alice = store.create_user(make_user("alice", Role::User));
        assert_eq!(store.find_user_by_username("alice").unwrap().id, alice.id);
        assert!(store.find_user_by_username("bob").is_none());
        assert!(store.username_taken("alice", None));
        assert!(!store.username_taken("alice", Some(alice.id)));
    }

    #[test]
    fn test_link_and_unlink_task() {
        let mut store = InMemoryStore::new();
        let issue = store.create_issue(make_issue("Line A", 1));
        let task = store.create_task(make_task("Fix", 2, issue.id));

        store.link_task(issue.id, task.id).unwrap();
        store.link_task(issue.id, task.id).unwrap();
        let linked = store.get_issue(issue.id).unwrap();
        assert_eq!(linked.task_ids, vec![task.id]);
        assert_eq!(store.tasks_of(linked).len(), 1);

        store.unlink_task(issue.id, task.id).unwrap();
        assert!(store.get_issue(issue.id).unwrap().task_ids.is_empty());
        assert!(store.link_task(99, task.id).is_none());
    }

    #[test]
    fn test_tasks_of_skips_deleted_tasks() {
        let mut store = InMemoryStore::new();
        let issue = store.create_issue(make_issue("Line A", 1));
        let t1 = store.create_task(make_task("a", 2, issue.id));
        let t2 = store.create_task(make_task("b", 2, issue.id));
        store.link_task(issue.id, t1.id);
        store.link_task(issue.id, t2.id);
        store.delete_task(t1.id);

        let issue = store.get_issue(issue.id).unwrap();
        let tasks = store.tasks_of(issue);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, t2.id);
    }
}
