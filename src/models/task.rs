use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::account::AccountId;
use super::datetime;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "low")]
    Low,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Keeps an explicit `null` apart from an absent key: with `#[serde(default)]` the
/// latter stays `None`, the former becomes `Some(None)`.
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Input structure for creating a task.
///
/// `title` defaults to empty when absent so that a missing title surfaces as a
/// validation failure rather than a deserialization one.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200),
        custom(function = "validate_not_blank", message = "Title is required")
    )]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, deserialize_with = "datetime::deserialize_optional")]
    pub deadline: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_completed: bool,
}

/// Partial update for a task. Only the keys present in the request are applied.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "validate_not_blank", message = "Title must not be blank")
    )]
    pub title: Option<String>,

    /// `Some(None)` clears the description.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(length(max = 1000))]
    pub description: Option<Option<String>>,

    pub priority: Option<Priority>,

    /// `Some(None)` clears the deadline.
    #[serde(default, deserialize_with = "datetime::deserialize_patch")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    pub is_completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.is_completed.is_none()
    }
}

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    /// The account that created the task. Never changes.
    pub owner_id: AccountId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filters for listing tasks. Listing is always scoped to the caller.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    /// Case-insensitive substring matched against title and description.
    pub search: Option<String>,
}

impl Task {
    pub fn new(input: NewTask, owner_id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title.trim().to_string(),
            description: input.description,
            priority: input.priority,
            deadline: input.deadline,
            is_completed: input.is_completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the fields present in `patch`. The owner is not part of the patch.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(done) = patch.is_completed {
            self.is_completed = done;
        }
        self.updated_at = Utc::now();
    }

    pub fn matches(&self, query: &TaskQuery) -> bool {
        if query.priority.is_some_and(|p| p != self.priority) {
            return false;
        }
        if query.completed.is_some_and(|c| c != self.is_completed) {
            return false;
        }
        match query.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                self.title.to_lowercase().contains(&term)
                    || self
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}
