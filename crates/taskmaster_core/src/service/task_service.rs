//! Task use-case service.
//!
//! # Responsibility
//! - Validate and normalize raw caller input before any storage access.
//! - Encode completion rules (`mark_completed`, `toggle_completion`).
//! - Serialize in-process mutations; status flips and status carry-over
//!   run as single store writes so separate processes cannot interleave them.
//!
//! # Invariants
//! - Validation failures never reach the store.
//! - The service keeps no task state between calls; reads always re-fetch.
//! - Store `NotFound` surfaces as `TaskServiceError::NotFound`; every other
//!   store failure surfaces unchanged as `TaskServiceError::Storage`.

use crate::model::task::{Task, TaskFields, TaskId, TaskStatus, TaskValidationError};
use crate::repo::task_store::{StoreError, TaskStore};
use crate::service::task_view::TaskListItem;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type ServiceResult<T> = Result<T, TaskServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Input rejected before storage access.
    Validation(TaskValidationError),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Persistence-layer failure.
    Storage(StoreError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TaskServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Raw, unvalidated task input as collected from a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub due_at: i64,
    pub priority: String,
    pub category: String,
    /// `None` means `pending` on create and "keep stored status" on update.
    pub status: Option<String>,
}

impl TaskInput {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_at: i64,
        priority: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_at,
            priority: priority.into(),
            category: category.into(),
            status: None,
        }
    }

    /// Sets an explicit status string.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Validates and normalizes this input.
    ///
    /// Checks run in order: title, priority, category, status. The first
    /// failure wins. `fallback_status` fills in a missing status.
    pub fn validate(
        &self,
        fallback_status: TaskStatus,
    ) -> Result<TaskFields, TaskValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }

        let priority = self.priority.parse()?;
        let category = self.category.parse()?;
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => fallback_status,
        };

        Ok(TaskFields {
            title: title.to_string(),
            description: self.description.clone(),
            due_at: self.due_at,
            priority,
            category,
            status,
        })
    }
}

/// Task service facade over a store implementation.
///
/// The store is injected at construction; share one service through `Arc`
/// when several callers need it.
pub struct TaskService<S: TaskStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: TaskStore> TaskService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates input and creates one task.
    ///
    /// # Contract
    /// - Status defaults to `pending` when the input carries none.
    /// - Returns the stored representation.
    pub fn create_task(&self, input: &TaskInput) -> ServiceResult<Task> {
        let fields = validated("task_create", input, TaskStatus::Pending)?;
        let _guard = self.write_guard();
        let task = self
            .store
            .create(&fields)
            .map_err(|err| failed("task_create", err))?;
        info!(
            "event=task_create module=service status=ok task_id={} priority={} category={}",
            task.id,
            task.priority.as_str(),
            task.category.as_str()
        );
        Ok(task)
    }

    /// Validates input and overwrites all mutable fields of one task.
    ///
    /// Without an explicit status in `input`, the stored status is kept.
    pub fn update_task(&self, id: TaskId, input: &TaskInput) -> ServiceResult<Task> {
        let fields = validated("task_update", input, TaskStatus::Pending)?;
        let _guard = self.write_guard();
        let stored = if input.status.is_some() {
            self.store.update(id, &fields)
        } else {
            self.store.update_details(id, &fields)
        };
        let task = stored.map_err(|err| failed("task_update", err))?;
        info!("event=task_update module=service status=ok task_id={id}");
        Ok(task)
    }

    /// Sets `completed` unconditionally. Idempotent.
    pub fn mark_completed(&self, id: TaskId) -> ServiceResult<Task> {
        let _guard = self.write_guard();
        let task = self
            .store
            .set_status(id, TaskStatus::Completed)
            .map_err(|err| failed("task_complete", err))?;
        info!("event=task_complete module=service status=ok task_id={id}");
        Ok(task)
    }

    /// Flips `completed` <-> `pending`; no other field changes.
    pub fn toggle_completion(&self, id: TaskId) -> ServiceResult<Task> {
        let _guard = self.write_guard();
        let task = self
            .store
            .toggle_status(id)
            .map_err(|err| failed("task_toggle", err))?;
        info!(
            "event=task_toggle module=service status=ok task_id={} task_status={}",
            id,
            task.status.as_str()
        );
        Ok(task)
    }

    /// Deletes one task; the id never resolves again.
    pub fn delete_task(&self, id: TaskId) -> ServiceResult<()> {
        let _guard = self.write_guard();
        self.store
            .delete(id)
            .map_err(|err| failed("task_delete", err))?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Gets one task by id.
    pub fn get_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.require(id)
    }

    /// Lists every stored task, freshly fetched.
    pub fn list_tasks(&self) -> ServiceResult<Vec<Task>> {
        let tasks = self
            .store
            .fetch_all()
            .map_err(|err| failed("task_list", err))?;
        debug!(
            "event=task_list module=service status=ok count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    /// Lists tasks with display-only fields derived at `now_ms`.
    pub fn list_items(&self, now_ms: i64) -> ServiceResult<Vec<TaskListItem>> {
        Ok(self
            .list_tasks()?
            .into_iter()
            .map(|task| TaskListItem::at(task, now_ms))
            .collect())
    }

    fn require(&self, id: TaskId) -> ServiceResult<Task> {
        self.store
            .get(id)
            .map_err(|err| failed("task_get", err))?
            .ok_or(TaskServiceError::NotFound(id))
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn validated(
    event: &'static str,
    input: &TaskInput,
    fallback_status: TaskStatus,
) -> ServiceResult<TaskFields> {
    input.validate(fallback_status).map_err(|err| {
        debug!(
            "event={event} module=service status=rejected reason={}",
            err.code()
        );
        TaskServiceError::from(err)
    })
}

fn failed(event: &'static str, err: StoreError) -> TaskServiceError {
    let err = TaskServiceError::from(err);
    match &err {
        TaskServiceError::NotFound(id) => {
            warn!("event={event} module=service status=not_found task_id={id}")
        }
        other => warn!("event={event} module=service status=error error={other}"),
    }
    err
}
