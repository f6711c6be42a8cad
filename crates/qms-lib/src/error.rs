//! Error types for `qms-lib`.
//!
//! Every variant belongs to exactly one [`ErrorKind`], which is what the
//! HTTP surface uses to pick a status code.

use std::fmt;

use thiserror::Error;

/// Which collection an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Defect,
    Issue,
    Task,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Defect => "Defect",
            Self::Issue => "Issue",
            Self::Task => "Task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a [`QmsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::Validation => "ValidationError",
            Self::Conflict => "Conflict",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary error type for qms-lib operations.
#[derive(Error, Debug)]
pub enum QmsError {
    // === Authentication Errors ===
    /// No bearer credential was presented.
    #[error("No token provided")]
    MissingCredential,

    /// The credential could not be verified (bad signature, expired, malformed).
    #[error("Invalid token: {reason}")]
    InvalidCredential { reason: String },

    /// The credential verified but carries no role claim.
    #[error("User role not found in credential")]
    MissingRole,

    // === Authorization Errors ===
    /// Authenticated, but the role or ownership check failed.
    #[error("{reason}")]
    Forbidden { reason: String },

    // === Lookup Errors ===
    /// Entity with the specified id was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: u64 },

    /// No user with this username.
    #[error("User not found: {username}")]
    UnknownUsername { username: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {}", format_errors(.errors))]
    ValidationErrors { errors: Vec<ValidationError> },

    /// Unknown status tag.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Unknown role tag.
    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    // === Conflict Errors ===
    /// Username already belongs to another user.
    #[error("Username already exists: {username}")]
    UsernameTaken { username: String },
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl QmsError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn not_found(entity: EntityKind, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }

    /// Taxonomy bucket for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential | Self::InvalidCredential { .. } | Self::MissingRole => {
                ErrorKind::Unauthenticated
            }
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } | Self::UnknownUsername { .. } => ErrorKind::NotFound,
            Self::Validation { .. }
            | Self::ValidationErrors { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidRole { .. } => ErrorKind::Validation,
            Self::UsernameTaken { .. } => ErrorKind::Conflict,
        }
    }

    /// Field-level details, if this is a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Vec<ValidationError> {
        match self {
            Self::Validation { field, reason } => vec![ValidationError::new(field, reason)],
            Self::ValidationErrors { errors } => errors.clone(),
            _ => Vec::new(),
        }
    }
}

/// Result type using `QmsError`.
pub type Result<T> = std::result::Result<T, QmsError>;
