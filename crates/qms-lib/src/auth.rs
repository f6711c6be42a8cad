//! Authorization gate.
//!
//! Turns verified credential claims into a [`Caller`] and decides, per
//! [`Operation`], whether that caller may proceed. Every check here runs
//! before the store is touched.

use serde::{Deserialize, Serialize};

use crate::error::{QmsError, Result};
use crate::model::Role;

/// Identity carried by a verified credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default, alias = "userGroup", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Validates a bearer credential and yields its claims.
pub trait CredentialVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `InvalidCredential` when the token is malformed, forged or expired.
    fn verify(&self, token: &str) -> Result<Claims>;
}

/// An authenticated principal with a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn is_quality_equivalent(&self) -> bool {
        self.role.is_quality_equivalent()
    }
}

impl TryFrom<Claims> for Caller {
    type Error = QmsError;

    fn try_from(claims: Claims) -> Result<Self> {
        let role = claims.role.ok_or(QmsError::MissingRole)?;
        Ok(Self {
            id: claims.id,
            username: claims.username,
            email: claims.email,
            role,
        })
    }
}

/// Operations gated by a role allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ChangeDefectStatus,
    DeleteDefect,
    ChangeIssueStatus,
    DeleteIssue,
    DeleteTask,
    ReassignTask,
    /// Viewing or updating a task you are not assigned to.
    ManageOthersTask,
    ManageUsers,
}

const QUALITY_EQUIVALENT: &[Role] = &[Role::Quality, Role::Admin];

impl Operation {
    /// Roles permitted to perform this operation.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::ChangeDefectStatus
            | Self::DeleteDefect
            | Self::ChangeIssueStatus
            | Self::DeleteIssue
            | Self::DeleteTask
            | Self::ReassignTask
            | Self::ManageOthersTask
            | Self::ManageUsers => QUALITY_EQUIVALENT,
        }
    }

    const fn denial(self) -> &'static str {
        match self {
            Self::ChangeDefectStatus => "Only Quality users can update defect status",
            Self::DeleteDefect => "Only Quality users can delete defects",
            Self::ChangeIssueStatus => "Only Quality users can update issue status",
            Self::DeleteIssue => "Only Quality users can delete issues",
            Self::DeleteTask => "Only Quality users can delete tasks",
            Self::ReassignTask => "Only Quality users can reassign tasks",
            Self::ManageOthersTask | Self::ManageUsers => "Access denied",
        }
    }
}

/// Permit or deny `op` for `caller`.
///
/// # Errors
///
/// Returns `Forbidden` when the caller's role is not in the allow-list.
pub fn authorize(caller: &Caller, op: Operation) -> Result<()> {
    if op.allowed_roles().contains(&caller.role) {
        Ok(())
    } else {
        tracing::debug!(
            caller = caller.id,
            role = %caller.role,
            operation = ?op,
            "access denied"
        );
        Err(QmsError::forbidden(op.denial()))
    }
}

/// The task's assignee always passes; anyone else needs `ManageOthersTask`.
///
/// # Errors
///
/// Returns `Forbidden` when the caller is neither the assignee nor privileged.
pub fn authorize_assignee(caller: &Caller, assignee_id: u64) -> Result<()> {
    if caller.id == assignee_id {
        return Ok(());
    }
    authorize(caller, Operation::ManageOthersTask)
}

/// Reject an action a user attempts on their own account.
///
/// # Errors
///
/// Returns `Forbidden` when `target_id` is the caller.
pub fn forbid_self(caller: &Caller, target_id: u64, reason: &str) -> Result<()> {
    if caller.id == target_id {
        Err(QmsError::forbidden(reason))
    } else {
        Ok(())
    }
}
