//! Validation helpers for qms-lib.
//!
//! These routines check drafts and patches before anything touches the
//! store, and return every failing field at once.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::store::InMemoryStore;
use crate::update::{
    DefectUpdate, IssueUpdate, NewDefect, NewIssue, NewTask, NewUser, Registration, TaskUpdate,
    UserUpdate,
};

const MAX_TITLE_LEN: usize = 500;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern is valid"));

/// Reference lookups the validators need from storage.
pub trait ReferenceStore {
    /// Return true if the user exists.
    fn user_exists(&self, id: u64) -> bool;
    /// Return true if the issue exists.
    fn issue_exists(&self, id: u64) -> bool;
}

impl ReferenceStore for InMemoryStore {
    fn user_exists(&self, id: u64) -> bool {
        self.get_user(id).is_ok()
    }

    fn issue_exists(&self, id: u64) -> bool {
        self.get_issue(id).is_ok()
    }
}

type Checked = Result<(), Vec<ValidationError>>;

fn finish(errors: Vec<ValidationError>) -> Checked {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn require_text(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, "is required"));
    }
}

fn check_title_length(errors: &mut Vec<ValidationError>, title: &str) {
    if title.chars().count() > MAX_TITLE_LEN {
        errors.push(ValidationError::new("title", "exceeds 500 characters"));
    }
}

fn check_title(errors: &mut Vec<ValidationError>, title: &str) {
    require_text(errors, "title", title);
    check_title_length(errors, title);
}

/// Title in a patch: blank and over-long are both rejected.
fn check_patch_title(errors: &mut Vec<ValidationError>, title: Option<&String>) {
    check_present(errors, "title", title);
    if let Some(title) = title {
        check_title_length(errors, title);
    }
}

/// A present patch field must not be blank.
fn check_present(errors: &mut Vec<ValidationError>, field: &str, value: Option<&String>) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        errors.push(ValidationError::new(field, "cannot be empty"));
    }
}

fn check_email(errors: &mut Vec<ValidationError>, email: &str) {
    if email.trim().is_empty() {
        errors.push(ValidationError::new("email", "is required"));
    } else if !EMAIL_RE.is_match(email.trim()) {
        errors.push(ValidationError::new("email", "is not a valid address"));
    }
}

/// Validates user drafts and patches.
pub struct UserValidator;

impl UserValidator {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_new(draft: &NewUser) -> Checked {
        let mut errors = Vec::new();
        require_text(&mut errors, "username", &draft.username);
        check_email(&mut errors, &draft.email);
        if draft.role.is_none() {
            errors.push(ValidationError::new("role", "is required"));
        }
        finish(errors)
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_registration(draft: &Registration) -> Checked {
        let mut errors = Vec::new();
        require_text(&mut errors, "username", &draft.username);
        check_email(&mut errors, &draft.email);
        finish(errors)
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_update(update: &UserUpdate) -> Checked {
        let mut errors = Vec::new();
        check_present(&mut errors, "username", update.username.as_ref());
        if let Some(ref email) = update.email {
            check_email(&mut errors, email);
        }
        finish(errors)
    }
}

/// Validates defect drafts and patches.
pub struct DefectValidator;

impl DefectValidator {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_new(draft: &NewDefect) -> Checked {
        let mut errors = Vec::new();
        check_title(&mut errors, &draft.title);
        require_text(&mut errors, "description", &draft.description);
        finish(errors)
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_update(update: &DefectUpdate) -> Checked {
        let mut errors = Vec::new();
        check_patch_title(&mut errors, update.title.as_ref());
        check_present(&mut errors, "description", update.description.as_ref());
        finish(errors)
    }
}

/// Validates issue drafts and patches.
pub struct IssueValidator;

impl IssueValidator {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_new(draft: &NewIssue) -> Checked {
        let mut errors = Vec::new();
        check_title(&mut errors, &draft.title);
        require_text(&mut errors, "description", &draft.description);
        finish(errors)
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_update(update: &IssueUpdate) -> Checked {
        let mut errors = Vec::new();
        check_patch_title(&mut errors, update.title.as_ref());
        check_present(&mut errors, "description", update.description.as_ref());
        finish(errors)
    }
}

/// Validates task drafts and patches, consulting storage for references.
pub struct TaskValidator;

impl TaskValidator {
    /// # Errors
    ///
    /// Returns every failing field, including unresolvable references.
    pub fn validate_new(draft: &NewTask, store: &impl ReferenceStore) -> Checked {
        let mut errors = Vec::new();
        check_title(&mut errors, &draft.title);
        require_text(&mut errors, "description", &draft.description);

        match draft.assignee_id {
            None => errors.push(ValidationError::new("assigneeId", "is required")),
            Some(id) if !store.user_exists(id) => {
                errors.push(ValidationError::new("assigneeId", "user not found"));
            }
            Some(_) => {}
        }

        match draft.issue_id {
            None => errors.push(ValidationError::new("issueId", "is required")),
            Some(id) if !store.issue_exists(id) => {
                errors.push(ValidationError::new("issueId", "issue not found"));
            }
            Some(_) => {}
        }

        finish(errors)
    }

    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate_update(update: &TaskUpdate, store: &impl ReferenceStore) -> Checked {
        let mut errors = Vec::new();
        check_patch_title(&mut errors, update.title.as_ref());
        check_present(&mut errors, "description", update.description.as_ref());
        if update.assignee_id.is_some_and(|id| !store.user_exists(id)) {
            errors.push(ValidationError::new("assigneeId", "user not found"));
        }
        finish(errors)
    }
}
