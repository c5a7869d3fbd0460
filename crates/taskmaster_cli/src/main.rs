//! Command-line driver for the task core.
//!
//! # Responsibility
//! - Parse arguments, build the service, and render results as text or JSON.
//! - Keep all validation inside `taskmaster_core`; this layer only forwards
//!   raw strings.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use clap::{Args, Parser, Subcommand};
use log::error;
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskmaster_core::{
    init_logging, now_epoch_ms, CoreConfig, SqliteTaskStore, Task, TaskId, TaskInput,
    TaskListItem, TaskService, TaskStatus, CATEGORY_VALUES, PRIORITY_VALUES,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "taskmaster", version, about = "Personal task tracker")]
struct Cli {
    /// Database file; overrides TASKMASTER_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a task (status starts as pending).
    Add(TaskArgs),
    /// List all tasks.
    List {
        /// Emit JSON instead of text rows.
        #[arg(long)]
        json: bool,
    },
    /// Show one task.
    Show { id: TaskId },
    /// Replace all editable fields of a task.
    Edit {
        id: TaskId,
        #[command(flatten)]
        task: TaskArgs,
        /// pending | completed; keeps the current status when omitted.
        #[arg(long)]
        status: Option<String>,
    },
    /// Mark a task completed.
    Done { id: TaskId },
    /// Flip a task between pending and completed.
    Toggle { id: TaskId },
    /// Delete a task.
    Delete { id: TaskId },
}

#[derive(Debug, Args)]
struct TaskArgs {
    title: String,
    /// RFC 3339, `YYYY-MM-DD HH:MM`, or `YYYY-MM-DD` (all day).
    #[arg(long)]
    due: String,
    #[arg(long, help = format!("one of: {}", PRIORITY_VALUES.join(", ")))]
    priority: String,
    #[arg(long, help = format!("one of: {}", CATEGORY_VALUES.join(", ")))]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
}

impl TaskArgs {
    fn to_input(&self) -> CliResult<TaskInput> {
        Ok(TaskInput::new(
            self.title.as_str(),
            self.description.as_str(),
            parse_due(&self.due)?,
            self.priority.as_str(),
            self.category.as_str(),
        ))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CoreConfig::from_env();
    let result = start_logging(&config)
        .and_then(|()| run(cli, &config.db_path, &mut io::stdout().lock()));
    report(result, &mut io::stderr().lock())
}

fn start_logging(config: &CoreConfig) -> CliResult<()> {
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }
    Ok(())
}

/// Maps a command outcome to the process exit code; failures go to `err_out`.
fn report(result: CliResult<()>, err_out: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            // Nothing left to report to if stderr itself is gone.
            let _ = writeln!(err_out, "error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Executes one parsed command against `--db` or `default_db`.
fn run(cli: Cli, default_db: &Path, out: &mut impl Write) -> CliResult<()> {
    let db_path = cli.db.unwrap_or_else(|| default_db.to_path_buf());
    let service = TaskService::new(SqliteTaskStore::open(&db_path)?);

    match cli.command {
        Command::Add(args) => {
            let task = service.create_task(&args.to_input()?)?;
            writeln!(out, "created {}", task.id)?;
        }
        Command::List { json } => {
            let items = service.list_items(now_epoch_ms())?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?;
            } else if items.is_empty() {
                writeln!(out, "No tasks.")?;
            } else {
                for item in &items {
                    writeln!(out, "{}", render_row(item))?;
                }
            }
        }
        Command::Show { id } => {
            let task = service.get_task(id)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?;
        }
        Command::Edit { id, task, status } => {
            let mut input = task.to_input()?;
            input.status = status;
            let task = service.update_task(id, &input)?;
            writeln!(out, "updated {}", task.id)?;
        }
        Command::Done { id } => {
            let task = service.mark_completed(id)?;
            writeln!(out, "{} {}", task.id, task.status.as_str())?;
        }
        Command::Toggle { id } => {
            let task = service.toggle_completion(id)?;
            writeln!(out, "{} {}", task.id, task.status.as_str())?;
        }
        Command::Delete { id } => {
            service.delete_task(id)?;
            writeln!(out, "deleted {id}")?;
        }
    }

    Ok(())
}

fn render_row(item: &TaskListItem) -> String {
    let task: &Task = &item.task;
    let mark = match task.status {
        TaskStatus::Completed => "[x]",
        TaskStatus::Pending => "[ ]",
    };
    let overdue = if item.overdue { " OVERDUE" } else { "" };
    format!(
        "{mark} {} {:<7} {}{overdue}\n      {}",
        task.id,
        item.priority_class.as_str(),
        task.title,
        item.detail_line(&format_due(task.due_at)),
    )
}

fn parse_due(raw: &str) -> CliResult<i64> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.timestamp_millis());
    }
    let naive = match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        Ok(naive) => naive,
        Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| format!("unrecognized due date `{raw}`"))?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("unrecognized due date `{raw}`"))?,
    };
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("due date `{raw}` does not exist in the local time zone"))?;
    Ok(local.timestamp_millis())
}

fn format_due(due_at: i64) -> String {
    Local
        .timestamp_millis_opt(due_at)
        .single()
        .map_or_else(|| due_at.to_string(), |due| due.format("%b %-d, %Y %H:%M").to_string())
}
