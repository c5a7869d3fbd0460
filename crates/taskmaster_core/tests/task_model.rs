use taskmaster_core::{Category, Priority, Task, TaskStatus, TaskValidationError};
use uuid::Uuid;

fn sample_task() -> Task {
    Task {
        id: Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap(),
        title: "Write report".to_string(),
        description: "Q3 numbers".to_string(),
        due_at: 1_700_000_000_000,
        priority: Priority::Medium,
        category: Category::Work,
        status: TaskStatus::Pending,
    }
}

#[test]
fn task_serialization_uses_lowercase_enum_strings() {
    let task = sample_task();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["title"], "Write report");
    assert_eq!(json["due_at"], 1_700_000_000_000_i64);
    assert_eq!(json["priority"], "medium");
    assert_eq!(json["category"], "work");
    assert_eq!(json["status"], "pending");

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn deserialize_rejects_unknown_priority() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "t",
        "description": "",
        "due_at": 0,
        "priority": "urgent",
        "category": "work",
        "status": "pending"
    });

    assert!(serde_json::from_value::<Task>(value).is_err());
}

#[test]
fn fields_roundtrip_through_from_fields() {
    let task = sample_task();
    let rebuilt = Task::from_fields(task.id, task.fields());
    assert_eq!(rebuilt, task);
}

#[test]
fn overdue_ignores_completed_tasks() {
    let mut task = sample_task();
    let now = task.due_at + 1;

    assert!(task.is_overdue(now));
    task.status = TaskStatus::Completed;
    assert!(!task.is_overdue(now));
}

#[test]
fn enum_parsing_normalizes_case() {
    for raw in ["HIGH", "High", "high"] {
        assert_eq!(raw.parse::<Priority>().unwrap().as_str(), "high");
    }
    assert_eq!("Personal".parse::<Category>().unwrap(), Category::Personal);
    assert_eq!("COMPLETED".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
    assert_eq!(
        "urgent".parse::<Priority>().unwrap_err(),
        TaskValidationError::InvalidPriority("urgent".to_string())
    );
}
