//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `tasks` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - The store trusts its caller: no business validation happens here.
//! - Every write touches exactly one row in a single statement or transaction.
//! - Read paths reject undecodable persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::{Task, TaskFields, TaskId, TaskStatus};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    due_at,
    priority,
    category,
    status
FROM tasks";

const REQUIRED_TASK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "due_at",
    "priority",
    "category",
    "status",
];

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for task persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable CRUD contract over task records.
pub trait TaskStore {
    /// Persists a new record under a freshly generated id.
    fn create(&self, fields: &TaskFields) -> StoreResult<Task>;
    /// Returns every stored task in insertion order.
    fn fetch_all(&self) -> StoreResult<Vec<Task>>;
    fn get(&self, id: TaskId) -> StoreResult<Option<Task>>;
    /// Overwrites all mutable fields of one record.
    fn update(&self, id: TaskId, fields: &TaskFields) -> StoreResult<Task>;
    /// Overwrites every mutable field except `status`, which keeps its
    /// stored value.
    fn update_details(&self, id: TaskId, fields: &TaskFields) -> StoreResult<Task>;
    /// Writes only the status column of one record.
    fn set_status(&self, id: TaskId, status: TaskStatus) -> StoreResult<Task>;
    /// Flips `pending` <-> `completed` as one atomic write.
    fn toggle_status(&self, id: TaskId) -> StoreResult<Task>;
    fn delete(&self, id: TaskId) -> StoreResult<()>;
}

/// SQLite-backed task store.
///
/// Owns its connection behind a mutex, so one store can be shared across
/// threads and every statement sees a consistent snapshot.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Wraps a migrated connection, rejecting unexpected schema shapes.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (and migrates) a database file, then wraps it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database, mainly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    fn update_row(
        &self,
        id: TaskId,
        fields: &TaskFields,
        status: Option<TaskStatus>,
    ) -> StoreResult<Task> {
        // NULL status keeps the stored value inside the same statement.
        self.write_row(
            id,
            "UPDATE tasks
             SET
                title = ?2,
                description = ?3,
                due_at = ?4,
                priority = ?5,
                category = ?6,
                status = COALESCE(?7, status)
             WHERE id = ?1;",
            params![
                id.to_string(),
                fields.title.as_str(),
                fields.description.as_str(),
                fields.due_at,
                fields.priority.as_str(),
                fields.category.as_str(),
                status.map(TaskStatus::as_str),
            ],
        )
    }

    /// Runs one single-row write and reads the row back, both inside an
    /// IMMEDIATE transaction so other connections to the file queue behind it.
    fn write_row(&self, id: TaskId, sql: &str, params: &[&dyn ToSql]) -> StoreResult<Task> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if tx.execute(sql, params)? == 0 {
            return Err(StoreError::NotFound(id));
        }

        let task = select_task(&tx, id)?.ok_or(StoreError::NotFound(id))?;
        tx.commit()?;
        Ok(task)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // SQLite rolls back an interrupted statement; the connection stays usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for SqliteTaskStore {
    fn create(&self, fields: &TaskFields) -> StoreResult<Task> {
        let task = Task::from_fields(Uuid::new_v4(), fields.clone());
        let conn = self.lock();

        conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                due_at,
                priority,
                category,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.due_at,
                task.priority.as_str(),
                task.category.as_str(),
                task.status.as_str(),
            ],
        )?;

        Ok(task)
    }

    fn fetch_all(&self) -> StoreResult<Vec<Task>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.lock();
        select_task(&conn, id)
    }

    fn update(&self, id: TaskId, fields: &TaskFields) -> StoreResult<Task> {
        self.update_row(id, fields, Some(fields.status))
    }

    fn update_details(&self, id: TaskId, fields: &TaskFields) -> StoreResult<Task> {
        self.update_row(id, fields, None)
    }

    fn set_status(&self, id: TaskId, status: TaskStatus) -> StoreResult<Task> {
        self.write_row(
            id,
            "UPDATE tasks SET status = ?2 WHERE id = ?1;",
            params![id.to_string(), status.as_str()],
        )
    }

    fn toggle_status(&self, id: TaskId) -> StoreResult<Task> {
        self.write_row(
            id,
            "UPDATE tasks
             SET status = CASE status WHEN 'completed' THEN 'pending' ELSE 'completed' END
             WHERE id = ?1;",
            params![id.to_string()],
        )
    }

    fn delete(&self, id: TaskId) -> StoreResult<()> {
        let conn = self.lock();
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}

fn select_task(conn: &Connection, id: TaskId) -> StoreResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id.to_string()], |row| Ok(parse_task_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in tasks.id"))
    })?;

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        due_at: row.get("due_at")?,
        priority: decode_column(row, "priority")?,
        category: decode_column(row, "category")?,
        status: decode_column(row, "status")?,
    })
}

fn decode_column<T: std::str::FromStr>(row: &Row<'_>, column: &str) -> StoreResult<T> {
    let value: String = row.get(column)?;
    value.parse().map_err(|_| {
        StoreError::InvalidData(format!("invalid value `{value}` in tasks.{column}"))
    })
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(StoreError::MissingRequiredTable("tasks"));
    }

    for &column in REQUIRED_TASK_COLUMNS {
        if !table_has_column(conn, "tasks", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
