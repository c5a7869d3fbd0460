//! Display-only projections over fetched tasks.
//!
//! # Responsibility
//! - Derive list-row fields (overdue flag, priority classification) at
//!   render time.
//!
//! # Invariants
//! - Nothing here is persisted or cached on the entity.
//! - Classification of raw priority strings never fails.

use crate::model::task::{Priority, Task};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Visual urgency bucket for a priority value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityClass {
    Urgent,
    Normal,
    Low,
    /// Unrecognized legacy value.
    Neutral,
}

impl PriorityClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Neutral => "neutral",
        }
    }
}

impl From<Priority> for PriorityClass {
    fn from(value: Priority) -> Self {
        match value {
            Priority::High => Self::Urgent,
            Priority::Medium => Self::Normal,
            Priority::Low => Self::Low,
        }
    }
}

/// Classifies a raw priority string, case-insensitively.
///
/// Anything outside the known set maps to `Neutral`.
pub fn classify_priority(raw: &str) -> PriorityClass {
    raw.parse::<Priority>()
        .map_or(PriorityClass::Neutral, PriorityClass::from)
}

/// One row of the task list, with derived fields computed at `now`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListItem {
    #[serde(flatten)]
    pub task: Task,
    pub overdue: bool,
    pub priority_class: PriorityClass,
}

impl TaskListItem {
    /// Projects `task` as seen at `now_ms`.
    pub fn at(task: Task, now_ms: i64) -> Self {
        Self {
            overdue: task.is_overdue(now_ms),
            priority_class: PriorityClass::from(task.priority),
            task,
        }
    }

    /// Secondary line shown under the title: `<category> • <due>`.
    ///
    /// Date formatting is left to the caller.
    pub fn detail_line(&self, formatted_due: &str) -> String {
        format!("{} \u{2022} {}", self.task.category.as_str(), formatted_due)
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clamps to `0` if the system clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{classify_priority, now_epoch_ms, PriorityClass, TaskListItem};
    use crate::model::task::{Category, Priority, Task, TaskStatus};
    use uuid::Uuid;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn task_due(due_at: i64, status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Stretch".to_string(),
            description: String::new(),
            due_at,
            priority: Priority::Low,
            category: Category::Health,
            status,
        }
    }

    #[test]
    fn classify_priority_is_case_insensitive_with_neutral_default() {
        assert_eq!(classify_priority("HIGH"), PriorityClass::Urgent);
        assert_eq!(classify_priority("Medium"), PriorityClass::Normal);
        assert_eq!(classify_priority("low"), PriorityClass::Low);
        assert_eq!(classify_priority("someday"), PriorityClass::Neutral);
        assert_eq!(classify_priority(""), PriorityClass::Neutral);
    }

    #[test]
    fn overdue_requires_past_due_and_open_status() {
        let now = now_epoch_ms();
        let yesterday = now - DAY_MS;

        assert!(TaskListItem::at(task_due(yesterday, TaskStatus::Pending), now).overdue);
        assert!(!TaskListItem::at(task_due(yesterday, TaskStatus::Completed), now).overdue);
        assert!(!TaskListItem::at(task_due(now + DAY_MS, TaskStatus::Pending), now).overdue);
        assert!(!TaskListItem::at(task_due(now, TaskStatus::Pending), now).overdue);
    }

    #[test]
    fn detail_line_joins_category_and_due_text() {
        let item = TaskListItem::at(task_due(0, TaskStatus::Pending), 0);
        assert_eq!(item.detail_line("Jan 1, 1970"), "health \u{2022} Jan 1, 1970");
        assert_eq!(item.priority_class, PriorityClass::Low);
    }
}
