//! Caller-aware operations over the store.
//!
//! [`Qms`] is what the HTTP layer talks to. Every method takes the
//! authenticated [`Caller`] and applies, in order: existence lookup for
//! updates, the authorization gate, input validation, then the store or
//! workflow write. Nothing is written unless every check passed.

use chrono::Utc;
use tracing::info;

use crate::auth::{self, Caller, Operation};
use crate::error::{EntityKind, QmsError, Result};
use crate::model::{Defect, DefectStatus, Issue, IssueStatus, Role, Task, TaskStatus, User};
use crate::store::InMemoryStore;
use crate::update::{
    DefectUpdate, IssueUpdate, NewDefect, NewIssue, NewTask, NewUser, Registration, TaskUpdate,
    UserUpdate,
};
use crate::validation::{DefectValidator, IssueValidator, TaskValidator, UserValidator};
use crate::view::{DefectDetails, IssueDetails, TaskDetails};
use crate::workflow;

/// The QMS service: owns the store and enforces access rules.
#[derive(Debug, Clone, Default)]
pub struct Qms {
    store: InMemoryStore,
}

impl Qms {
    #[must_use]
    pub const fn new(store: InMemoryStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &InMemoryStore {
        &self.store
    }

    fn ensure_username_free(&self, username: &str, except: Option<u64>) -> Result<()> {
        if self.store.username_taken(username, except) {
            return Err(QmsError::UsernameTaken {
                username: username.to_string(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Look up the account a login request names.
    ///
    /// # Errors
    ///
    /// Returns `UnknownUsername` if no user has this username.
    pub fn login(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username.trim())
            .cloned()
            .ok_or_else(|| QmsError::UnknownUsername {
                username: username.to_string(),
            })
    }

    /// Self-service sign-up. New accounts always get [`Role::User`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad draft, `UsernameTaken` on a
    /// duplicate username.
    pub fn register(&mut self, draft: &Registration) -> Result<User> {
        UserValidator::validate_registration(draft).map_err(QmsError::from_validation_errors)?;
        let username = draft.username.trim();
        self.ensure_username_free(username, None)?;

        let now = Utc::now();
        let user = self.store.create_user(User {
            id: 0,
            username: username.to_string(),
            email: draft.email.trim().to_string(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        });
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// The caller's own account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account was deleted after the token was issued.
    pub fn me(&self, caller: &Caller) -> Result<User> {
        self.store.get_user(caller.id).cloned()
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller manages users.
    pub fn list_users(&self, caller: &Caller) -> Result<Vec<User>> {
        auth::authorize(caller, Operation::ManageUsers)?;
        Ok(self.store.list_users().to_vec())
    }

    /// # Errors
    ///
    /// Returns `Forbidden` or `NotFound`.
    pub fn get_user(&self, caller: &Caller, id: u64) -> Result<User> {
        auth::authorize(caller, Operation::ManageUsers)?;
        self.store.get_user(id).cloned()
    }

    /// # Errors
    ///
    /// Returns `Forbidden`, a validation error, or `UsernameTaken`.
    pub fn create_user(&mut self, caller: &Caller, draft: &NewUser) -> Result<User> {
        auth::authorize(caller, Operation::ManageUsers)?;
        UserValidator::validate_new(draft).map_err(QmsError::from_validation_errors)?;
        let username = draft.username.trim();
        self.ensure_username_free(username, None)?;

        let now = Utc::now();
        let user = self.store.create_user(User {
            id: 0,
            username: username.to_string(),
            email: draft.email.trim().to_string(),
            role: draft.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        });
        info!(user_id = user.id, role = %user.role, by = caller.id, "user created");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` (including a change to the caller's own role),
    /// `NotFound`, a validation error, or `UsernameTaken`.
    pub fn update_user(&mut self, caller: &Caller, id: u64, update: &UserUpdate) -> Result<User> {
        auth::authorize(caller, Operation::ManageUsers)?;
        self.store.get_user(id)?;
        if update.role.is_some() {
            auth::forbid_self(caller, id, "Cannot change your own role")?;
        }
        UserValidator::validate_update(update).map_err(QmsError::from_validation_errors)?;
        let update = UserUpdate {
            username: update.username.as_deref().map(|u| u.trim().to_string()),
            email: update.email.as_deref().map(|e| e.trim().to_string()),
            role: update.role,
        };
        if let Some(ref username) = update.username {
            self.ensure_username_free(username, Some(id))?;
        }
        self.store.update_user(id, &update)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` (including deleting one's own account) or `NotFound`.
    pub fn delete_user(&mut self, caller: &Caller, id: u64) -> Result<()> {
        auth::authorize(caller, Operation::ManageUsers)?;
        auth::forbid_self(caller, id, "Cannot delete your own account")?;
        if !self.store.delete_user(id) {
            return Err(QmsError::not_found(EntityKind::User, id));
        }
        info!(user_id = id, by = caller.id, "user deleted");
        Ok(())
    }

    // ========================================================================
    // Defects
    // ========================================================================

    #[must_use]
    pub fn list_defects(&self, _caller: &Caller) -> Vec<DefectDetails> {
        self.store
            .list_defects()
            .iter()
            .map(|d| DefectDetails::build(&self.store, d))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the defect doesn't exist.
    pub fn get_defect(&self, _caller: &Caller, id: u64) -> Result<DefectDetails> {
        let defect = self.store.get_defect(id)?;
        Ok(DefectDetails::build(&self.store, defect))
    }

    /// # Errors
    ///
    /// Returns a validation error for a bad draft.
    pub fn create_defect(&mut self, caller: &Caller, draft: &NewDefect) -> Result<DefectDetails> {
        DefectValidator::validate_new(draft).map_err(QmsError::from_validation_errors)?;
        let now = Utc::now();
        let defect = self.store.create_defect(Defect {
            id: 0,
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: DefectStatus::New,
            creator_id: caller.id,
            created_at: now,
            updated_at: now,
        });
        info!(defect_id = defect.id, by = caller.id, "defect created");
        Ok(DefectDetails::build(&self.store, &defect))
    }

    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden` for a status change by a
    /// non-quality caller, or a validation error.
    pub fn update_defect(
        &mut self,
        caller: &Caller,
        id: u64,
        update: &DefectUpdate,
    ) -> Result<DefectDetails> {
        self.store.get_defect(id)?;
        if update.status.is_some() {
            auth::authorize(caller, Operation::ChangeDefectStatus)?;
        }
        DefectValidator::validate_update(update).map_err(QmsError::from_validation_errors)?;
        let defect = self.store.update_defect(id, update)?;
        Ok(DefectDetails::build(&self.store, &defect))
    }

    /// # Errors
    ///
    /// Returns `Forbidden` or `NotFound`.
    pub fn delete_defect(&mut self, caller: &Caller, id: u64) -> Result<()> {
        auth::authorize(caller, Operation::DeleteDefect)?;
        if !self.store.delete_defect(id) {
            return Err(QmsError::not_found(EntityKind::Defect, id));
        }
        info!(defect_id = id, by = caller.id, "defect deleted");
        Ok(())
    }

    // ========================================================================
    // Issues
    // ========================================================================

    #[must_use]
    pub fn list_issues(&self, _caller: &Caller) -> Vec<IssueDetails> {
        self.store
            .list_issues()
            .iter()
            .map(|i| IssueDetails::build(&self.store, i))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the issue doesn't exist.
    pub fn get_issue(&self, _caller: &Caller, id: u64) -> Result<IssueDetails> {
        let issue = self.store.get_issue(id)?;
        Ok(IssueDetails::build(&self.store, issue))
    }

    /// New issues start `Open` with the caller as creator.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad draft.
    pub fn create_issue(&mut self, caller: &Caller, draft: &NewIssue) -> Result<IssueDetails> {
        IssueValidator::validate_new(draft).map_err(QmsError::from_validation_errors)?;
        let now = Utc::now();
        let issue = self.store.create_issue(Issue {
            id: 0,
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: IssueStatus::Open,
            creator_id: caller.id,
            defect_ids: draft.defect_ids.clone(),
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        info!(issue_id = issue.id, by = caller.id, "issue created");
        Ok(IssueDetails::build(&self.store, &issue))
    }

    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden` for a status change by a
    /// non-quality caller, or a validation error.
    pub fn update_issue(
        &mut self,
        caller: &Caller,
        id: u64,
        update: &IssueUpdate,
    ) -> Result<IssueDetails> {
        self.store.get_issue(id)?;
        if update.status.is_some() {
            auth::authorize(caller, Operation::ChangeIssueStatus)?;
        }
        IssueValidator::validate_update(update).map_err(QmsError::from_validation_errors)?;
        let issue = self.store.update_issue(id, update)?;
        Ok(IssueDetails::build(&self.store, &issue))
    }

    /// Linked tasks are left in place and render without an issue.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or `NotFound`.
    pub fn delete_issue(&mut self, caller: &Caller, id: u64) -> Result<()> {
        auth::authorize(caller, Operation::DeleteIssue)?;
        if !self.store.delete_issue(id) {
            return Err(QmsError::not_found(EntityKind::Issue, id));
        }
        info!(issue_id = id, by = caller.id, "issue deleted");
        Ok(())
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    /// Quality-equivalent callers see every task; everyone else sees the
    /// tasks assigned to them.
    #[must_use]
    pub fn list_tasks(&self, caller: &Caller) -> Vec<TaskDetails> {
        let all = caller.is_quality_equivalent();
        self.store
            .list_tasks()
            .iter()
            .filter(|t| all || t.assignee_id == caller.id)
            .map(|t| TaskDetails::build(&self.store, t))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `NotFound`, or `Forbidden` unless the caller is the assignee
    /// or quality-equivalent.
    pub fn get_task(&self, caller: &Caller, id: u64) -> Result<TaskDetails> {
        let task = self.store.get_task(id)?;
        auth::authorize_assignee(caller, task.assignee_id)?;
        Ok(TaskDetails::build(&self.store, task))
    }

    /// Create a task and link it to its issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad draft or unresolvable reference.
    pub fn create_task(&mut self, caller: &Caller, draft: &NewTask) -> Result<TaskDetails> {
        TaskValidator::validate_new(draft, &self.store).map_err(QmsError::from_validation_errors)?;
        let (Some(assignee_id), Some(issue_id)) = (draft.assignee_id, draft.issue_id) else {
            return Err(QmsError::validation("issueId", "is required"));
        };

        let now = Utc::now();
        let task = workflow::create_task(
            &mut self.store,
            Task {
                id: 0,
                title: draft.title.clone(),
                description: draft.description.clone(),
                status: TaskStatus::Open,
                assignee_id,
                issue_id,
                comments: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        info!(task_id = task.id, issue_id, assignee_id, by = caller.id, "task created");
        Ok(TaskDetails::build(&self.store, &task))
    }

    /// Update a task and propagate to its issue.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Forbidden` (not the assignee, or a reassignment
    /// by a non-quality caller), or a validation error.
    pub fn update_task(
        &mut self,
        caller: &Caller,
        id: u64,
        update: &TaskUpdate,
    ) -> Result<TaskDetails> {
        let current = self.store.get_task(id)?.assignee_id;
        auth::authorize_assignee(caller, current)?;
        if update.assignee_id.is_some_and(|new| new != current) {
            auth::authorize(caller, Operation::ReassignTask)?;
        }
        TaskValidator::validate_update(update, &self.store)
            .map_err(QmsError::from_validation_errors)?;

        let outcome = workflow::update_task(&mut self.store, id, update)?;
        Ok(TaskDetails::build(&self.store, &outcome.task))
    }

    /// # Errors
    ///
    /// Returns `Forbidden` or `NotFound`.
    pub fn delete_task(&mut self, caller: &Caller, id: u64) -> Result<()> {
        auth::authorize(caller, Operation::DeleteTask)?;
        if !workflow::delete_task(&mut self.store, id) {
            return Err(QmsError::not_found(EntityKind::Task, id));
        }
        info!(task_id = id, by = caller.id, "task deleted");
        Ok(())
    }
}
