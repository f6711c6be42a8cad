//! Core data types for qms-lib.
//!
//! Wire format is camelCase JSON; status and role tags serialize as their
//! PascalCase names so the frontend can compare them directly. Incoming
//! tags go through `FromStr`, so `"closed"` and `"in_progress"` are accepted
//! too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QmsError;

/// Caller capability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum Role {
    #[default]
    User,
    Quality,
    Admin,
    LineSide,
    Others,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::Quality,
        Self::Admin,
        Self::LineSide,
        Self::Others,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Quality => "Quality",
            Self::Admin => "Admin",
            Self::LineSide => "LineSide",
            Self::Others => "Others",
        }
    }

    /// Quality reviewers and administrators share the privileged allow-lists.
    #[must_use]
    pub const fn is_quality_equivalent(self) -> bool {
        matches!(self, Self::Quality | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "quality" => Ok(Self::Quality),
            "admin" => Ok(Self::Admin),
            "lineside" | "line_side" | "line-side" => Ok(Self::LineSide),
            "others" => Ok(Self::Others),
            other => Err(QmsError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// Defect lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum DefectStatus {
    #[default]
    New,
    Working,
    Resolved,
}

impl DefectStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Working => "Working",
            Self::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefectStatus {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "working" => Ok(Self::Working),
            "resolved" => Ok(Self::Resolved),
            other => Err(QmsError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Issue lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    ReadyForClosure,
    Closed,
}

impl IssueStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "InProgress",
            Self::ReadyForClosure => "ReadyForClosure",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "inprogress" | "in_progress" => Ok(Self::InProgress),
            "readyforclosure" | "ready_for_closure" => Ok(Self::ReadyForClosure),
            "closed" => Ok(Self::Closed),
            other => Err(QmsError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "InProgress",
            Self::Closed => "Closed",
        }
    }

    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = QmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "inprogress" | "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(QmsError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

macro_rules! parse_from_string {
    ($($ty:ty),+) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = QmsError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }
        )+
    };
}

parse_from_string!(Role, DefectStatus, IssueStatus, TaskStatus);

/// An account that can create defects/issues and be assigned tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(alias = "userGroup")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reported quality problem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: DefectStatus,
    pub creator_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A root-cause investigation grouping defects and owning tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: IssueStatus,
    pub creator_id: u64,

    /// Related defects, in the order given. Duplicates are kept.
    #[serde(default)]
    pub defect_ids: Vec<u64>,

    /// Tasks linked to this issue. Maintained by the workflow engine.
    #[serde(default)]
    pub task_ids: Vec<u64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A unit of remediation work under exactly one issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub assignee_id: u64,
    pub issue_id: u64,
    #[serde(default)]
    pub comments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("quality".parse::<Role>().unwrap(), Role::Quality);
        assert_eq!("LineSide".parse::<Role>().unwrap(), Role::LineSide);
        assert!(matches!(
            "janitor".parse::<Role>(),
            Err(QmsError::InvalidRole { .. })
        ));
    }

    #[test]
    fn quality_equivalence() {
        let privileged: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| r.is_quality_equivalent())
            .collect();
        assert_eq!(privileged, vec![Role::Quality, Role::Admin]);
    }

    #[test]
    fn status_tags_serialize_pascal_case() {
        assert_eq!(
            serde_json::to_string(&IssueStatus::ReadyForClosure).unwrap(),
            "\"ReadyForClosure\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"InProgress\""
        );
        assert_eq!("ready_for_closure".parse::<IssueStatus>().unwrap(), IssueStatus::ReadyForClosure);
    }

    #[test]
    fn wire_tags_deserialize_through_from_str() {
        let status: TaskStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(status, TaskStatus::Closed);
        let status: IssueStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, IssueStatus::InProgress);
        let role: Role = serde_json::from_str("\"line-side\"").unwrap();
        assert_eq!(role, Role::LineSide);

        let err = serde_json::from_str::<DefectStatus>("\"Bogus\"").unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn user_accepts_user_group_alias() {
        let json = r#"{
            "id": 4,
            "username": "line",
            "email": "line@example.com",
            "userGroup": "LineSide",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::LineSide);

        let out = serde_json::to_value(&user).unwrap();
        assert_eq!(out["role"], "LineSide");
        assert!(out.get("createdAt").is_some());
    }
}
