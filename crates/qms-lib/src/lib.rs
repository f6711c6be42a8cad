//! `qms-lib`: in-process quality management core.
//!
//! Tracks defects, issues and tasks in memory, gates every mutation on the
//! caller's role and keeps issue status in step with its tasks. No HTTP and
//! no async; the `qms` binary wraps this in a REST API.
//!
//! # Quick Start
//!
//! ```
//! use qms_lib::{Caller, InMemoryStore, Qms, Role};
//! use qms_lib::update::{NewIssue, NewTask, TaskUpdate};
//! use qms_lib::model::{IssueStatus, TaskStatus};
//!
//! let mut qms = Qms::new(InMemoryStore::seeded());
//! let quality = Caller {
//!     id: 2,
//!     username: "qualityuser".into(),
//!     email: "quality@example.com".into(),
//!     role: Role::Quality,
//! };
//!
//! let issue = qms
//!     .create_issue(&quality, &NewIssue { title: "Line A".into(), description: "desc".into(), ..Default::default() })
//!     .unwrap();
//! let task = qms
//!     .create_task(&quality, &NewTask {
//!         title: "Fix".into(),
//!         description: "d".into(),
//!         assignee_id: Some(quality.id),
//!         issue_id: Some(issue.issue.id),
//!     })
//!     .unwrap();
//!
//! qms.update_task(&quality, task.task.id, &TaskUpdate { status: Some(TaskStatus::Closed), ..Default::default() })
//!     .unwrap();
//! let issue = qms.get_issue(&quality, issue.issue.id).unwrap();
//! assert_eq!(issue.issue.status, IssueStatus::ReadyForClosure);
//! ```

pub mod auth;
pub mod error;
pub mod model;
pub mod seed;
pub mod service;
pub mod store;
pub mod update;
pub mod validation;
pub mod view;
pub mod workflow;

pub use auth::{Caller, Claims, CredentialVerifier};
pub use error::{ErrorKind, QmsError, Result, ValidationError};
pub use model::{Defect, Issue, Role, Task, User};
pub use service::Qms;
pub use store::InMemoryStore;
pub use workflow::Propagation;
