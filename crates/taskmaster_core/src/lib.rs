//! Core domain logic for Task Master.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    Category, Priority, Task, TaskFields, TaskId, TaskStatus, TaskValidationError,
    CATEGORY_VALUES, PRIORITY_VALUES,
};
pub use repo::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore};
pub use service::task_service::{ServiceResult, TaskInput, TaskService, TaskServiceError};
pub use service::task_view::{classify_priority, now_epoch_ms, PriorityClass, TaskListItem};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
