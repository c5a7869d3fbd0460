//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its closed value sets.
//! - Own string <-> enum mapping for priority/category/status.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is never empty once validated.
//! - Enum string forms are lowercase and stable across restarts.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Manifest of accepted priority strings, in display order.
pub const PRIORITY_VALUES: &[&str] = &["high", "medium", "low"];
/// Manifest of accepted category strings, in display order.
pub const CATEGORY_VALUES: &[&str] = &["work", "study", "health", "personal"];

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Stable lowercase string id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(TaskValidationError::InvalidPriority(value.to_string())),
        }
    }
}

/// Grouping tag of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Study,
    Health,
    Personal,
}

impl Category {
    /// Stable lowercase string id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Study => "study",
            Self::Health => "health",
            Self::Personal => "personal",
        }
    }
}

impl FromStr for Category {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "study" => Ok(Self::Study),
            "health" => Ok(Self::Health),
            "personal" => Ok(Self::Personal),
            _ => Err(TaskValidationError::InvalidCategory(value.to_string())),
        }
    }
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Initial state.
    #[default]
    Pending,
    /// Done; can be flipped back to `Pending` by a toggle.
    Completed,
}

impl TaskStatus {
    /// Stable lowercase string id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

impl FromStr for TaskStatus {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(TaskValidationError::InvalidStatus(value.to_string())),
        }
    }
}

/// Validation failures for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Priority is outside `PRIORITY_VALUES`. Carries the raw input.
    InvalidPriority(String),
    /// Category is outside `CATEGORY_VALUES`. Carries the raw input.
    InvalidCategory(String),
    /// Status is neither `pending` nor `completed`. Carries the raw input.
    InvalidStatus(String),
}

impl TaskValidationError {
    /// Stable machine-readable code, safe to log.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::InvalidPriority(_) => "invalid_priority",
            Self::InvalidCategory(_) => "invalid_category",
            Self::InvalidStatus(_) => "invalid_status",
        }
    }
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title is required"),
            Self::InvalidPriority(value) => write!(
                f,
                "invalid priority `{value}`; allowed values: {}",
                PRIORITY_VALUES.join(", ")
            ),
            Self::InvalidCategory(value) => write!(
                f,
                "invalid category `{value}`; allowed values: {}",
                CATEGORY_VALUES.join(", ")
            ),
            Self::InvalidStatus(value) => {
                write!(f, "invalid status `{value}`; allowed values: pending, completed")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Validated mutable fields of a task, as handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub due_at: i64,
    pub priority: Priority,
    pub category: Category,
    pub status: TaskStatus,
}

/// Canonical persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub due_at: i64,
    pub priority: Priority,
    pub category: Category,
    pub status: TaskStatus,
}

impl Task {
    /// Builds a record from an id and a set of fields.
    pub fn from_fields(id: TaskId, fields: TaskFields) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            due_at: fields.due_at,
            priority: fields.priority,
            category: fields.category,
            status: fields.status,
        }
    }

    /// Returns a copy of the mutable fields.
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            due_at: self.due_at,
            priority: self.priority,
            category: self.category,
            status: self.status,
        }
    }

    /// Whether the task is past due and still open at `now_ms`.
    ///
    /// Display-only; recompute on every render.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        self.due_at < now_ms && !self.status.is_completed()
    }
}
