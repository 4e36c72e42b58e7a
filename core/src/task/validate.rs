//! Task input validation
//!
//! Input-shape rules applied before a create or update reaches the
//! service. Violations carry wire-level field names so they can be
//! returned to the client as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{NewTask, TaskStatus};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Wire-shaped task payload for create and update requests
///
/// `due_date` is optional here so a missing date is representable; it is
/// required by validation before the payload converts to a [`NewTask`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

fn violation(field: &'static str, message: impl Into<String>) -> Violation {
    Violation {
        field,
        message: message.into(),
    }
}

/// Check a payload against the input-shape rules
///
/// Returns every violation at once; an empty list means the payload is
/// valid.
pub fn validate(input: &TaskInput) -> Vec<Violation> {
    let mut violations = Vec::new();

    if input.title.trim().is_empty() {
        violations.push(violation("title", "Title is required."));
    } else if input.title.chars().count() > TITLE_MAX_CHARS {
        violations.push(violation(
            "title",
            format!("Title must be at most {} characters.", TITLE_MAX_CHARS),
        ));
    }

    if input.description.trim().is_empty() {
        violations.push(violation("description", "Description is required."));
    } else if input.description.chars().count() > DESCRIPTION_MAX_CHARS {
        violations.push(violation(
            "description",
            format!(
                "Description must be at most {} characters.",
                DESCRIPTION_MAX_CHARS
            ),
        ));
    }

    if input.due_date.is_none() {
        violations.push(violation("dueDate", "Due date is required."));
    }

    violations
}

impl TaskInput {
    /// Validate and convert into the fields accepted by the repository
    pub fn into_new_task(self) -> std::result::Result<NewTask, Vec<Violation>> {
        let violations = validate(&self);
        match self.due_date {
            Some(due_date) if violations.is_empty() => Ok(NewTask {
                title: self.title,
                description: self.description,
                status: self.status,
                due_date,
            }),
            _ => Err(violations),
        }
    }
}
