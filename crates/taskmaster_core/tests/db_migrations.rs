use rusqlite::Connection;
use taskmaster_core::db::migrations::latest_version;
use taskmaster_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "tasks");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskmaster.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "tasks");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tasks_table_has_exactly_the_task_columns() {
    let conn = open_db_in_memory().unwrap();

    let mut stmt = conn.prepare("PRAGMA table_info(tasks);").unwrap();
    let columns: Vec<(String, bool)> = stmt
        .query_map([], |row| Ok((row.get("name")?, row.get("notnull")?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        ["id", "title", "description", "due_at", "priority", "category", "status"]
    );
    assert!(columns.iter().all(|(_, not_null)| *not_null));
}

#[test]
fn tasks_table_defaults_status_and_description() {
    let conn = open_db_in_memory().unwrap();
    insert_task(&conn, "high", "work", None).unwrap();

    let (description, status): (String, String) = conn
        .query_row("SELECT description, status FROM tasks;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(description, "");
    assert_eq!(status, "pending");
}

#[test]
fn tasks_table_rejects_values_outside_closed_sets() {
    let conn = open_db_in_memory().unwrap();

    let cases = [
        ("urgent", "work", None, "priority"),
        ("HIGH", "work", None, "uppercase priority"),
        ("high", "errands", None, "category"),
        ("high", "work", Some("archived"), "status"),
        ("high", "work", Some("Completed"), "uppercase status"),
    ];
    for (priority, category, status, label) in cases {
        let err = insert_task(&conn, priority, category, status).unwrap_err();
        assert!(
            err.to_string().contains("CHECK constraint failed"),
            "{label}: {err}"
        );
    }

    insert_task(&conn, "low", "health", Some("completed")).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn due_at_is_indexed() {
    let conn = open_db_in_memory().unwrap();

    let indexed_column: String = conn
        .query_row(
            "SELECT name FROM pragma_index_info('idx_tasks_due_at');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexed_column, "due_at");
}

fn insert_task(
    conn: &Connection,
    priority: &str,
    category: &str,
    status: Option<&str>,
) -> rusqlite::Result<usize> {
    let id = uuid::Uuid::new_v4().to_string();
    match status {
        Some(status) => conn.execute(
            "INSERT INTO tasks (id, title, due_at, priority, category, status)
             VALUES (?1, 't', 0, ?2, ?3, ?4);",
            rusqlite::params![id, priority, category, status],
        ),
        None => conn.execute(
            "INSERT INTO tasks (id, title, due_at, priority, category)
             VALUES (?1, 't', 0, ?2, ?3);",
            rusqlite::params![id, priority, category],
        ),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
