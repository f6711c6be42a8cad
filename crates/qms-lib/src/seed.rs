//! Demo data loaded at startup.

use chrono::Utc;

use crate::model::{Defect, DefectStatus, Issue, IssueStatus, Role, Task, TaskStatus, User};
use crate::store::InMemoryStore;
use crate::workflow;

const USERS: [(&str, &str, Role); 3] = [
    ("admin", "admin@example.com", Role::Admin),
    ("qualityuser", "quality@example.com", Role::Quality),
    ("user", "user@example.com", Role::User),
];

impl InMemoryStore {
    /// A store holding the demo users, defects, issues and tasks.
    ///
    /// Ids start at 1 in every collection, so `admin` is user 1 and the
    /// first issue is issue 1. Tasks are linked through the workflow
    /// engine like any other new task.
    #[must_use]
    pub fn seeded() -> Self {
        let mut store = Self::new();
        let now = Utc::now();

        let users: Vec<User> = USERS
            .iter()
            .map(|(username, email, role)| {
                store.create_user(User {
                    id: 0,
                    username: (*username).to_string(),
                    email: (*email).to_string(),
                    role: *role,
                    created_at: now,
                    updated_at: now,
                })
            })
            .collect();
        let admin = users[0].id;
        let quality = users[1].id;

        for (title, description, status) in [
            (
                "Production Line A Defect 1",
                "Quality issue in component assembly",
                DefectStatus::New,
            ),
            (
                "Production Line B Defect",
                "Material quality below specification",
                DefectStatus::Working,
            ),
        ] {
            store.create_defect(Defect {
                id: 0,
                title: title.to_string(),
                description: description.to_string(),
                status,
                creator_id: admin,
                created_at: now,
                updated_at: now,
            });
        }

        let issue = |title: &str, description: &str, status, creator_id| Issue {
            id: 0,
            title: title.to_string(),
            description: description.to_string(),
            status,
            creator_id,
            defect_ids: Vec::new(),
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let line_a = store.create_issue(issue(
            "Production Line A Issue",
            "Multiple defects reported in Line A production batch",
            IssueStatus::Open,
            admin,
        ));
        let review = store.create_issue(issue(
            "Quality Check Process Review",
            "Review and update quality check procedures",
            IssueStatus::InProgress,
            quality,
        ));

        workflow::create_task(
            &mut store,
            Task {
                id: 0,
                title: "Investigate Assembly Line Issue".to_string(),
                description: "Check and report on assembly line misalignment causes".to_string(),
                status: TaskStatus::Open,
                assignee_id: admin,
                issue_id: line_a.id,
                comments: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        workflow::create_task(
            &mut store,
            Task {
                id: 0,
                title: "Update Quality Check Documentation".to_string(),
                description: "Review and update quality check procedures documentation"
                    .to_string(),
                status: TaskStatus::InProgress,
                assignee_id: quality,
                issue_id: review.id,
                comments: "Documentation draft in progress".to_string(),
                created_at: now,
                updated_at: now,
            },
        );

        tracing::debug!(
            users = store.user_count(),
            defects = store.defect_count(),
            issues = store.issue_count(),
            tasks = store.task_count(),
            "seeded demo data"
        );
        store
    }
}
