pub mod clear;
pub mod create;
pub mod delete;
pub mod init;
pub mod lifecycle;
pub mod list;
pub mod show;
pub mod stats;
pub mod suggest;
pub mod users;
pub mod watch;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use serde::Serialize;
use smarttask_core::config::{ProjectConfig, find_data_dir, load_project_config};
use smarttask_core::error::ErrorCode;
use smarttask_core::projection::relative_age;
use smarttask_core::{FileStorage, Roster, SystemClock, Task, TaskId, TaskStore};

use crate::output::{CliError, OutputMode, fail};

/// The board every command works against: files under `.smarttask/`, wall clock time.
pub type Board = TaskStore<FileStorage, SystemClock>;

/// An opened project: its data directory, config, and loaded board.
pub struct Project {
    pub data_dir: PathBuf,
    pub config: ProjectConfig,
    pub store: Board,
}

/// Locate `.smarttask/` above `project_root`, load its config, and open the board.
///
/// # Errors
///
/// Renders and returns an error if no project is found, the config is invalid,
/// or the snapshot exists but cannot be read.
pub fn open_project(project_root: &Path, output: OutputMode) -> anyhow::Result<Project> {
    let data_dir = find_data_dir(project_root).ok_or_else(|| {
        fail(
            output,
            CliError::from_code(
                "Not a smarttask project: .smarttask directory not found",
                ErrorCode::NotInitialized,
            ),
        )
    })?;

    let config = load_project_config(&data_dir)
        .map_err(|e| fail(output, CliError::from_code(e.to_string(), e.code())))?;

    let store = TaskStore::open_with_config(FileStorage::new(&data_dir), SystemClock, &config);
    if store.read_failed() {
        return Err(fail(
            output,
            CliError::from_code(
                format!("cannot read the task snapshot in {}", data_dir.display()),
                ErrorCode::StorageReadFailed,
            ),
        ));
    }
    Ok(Project {
        data_dir,
        config,
        store,
    })
}

/// Retry any write the store could not complete and surface the failure.
///
/// # Errors
///
/// Renders and returns an error if the snapshot still cannot be written.
pub fn flush(store: &mut Board, output: OutputMode) -> anyhow::Result<()> {
    store
        .flush()
        .map_err(|e| fail(output, CliError::from_code(e.to_string(), e.code())))
}

/// Resolve user input to a task id.
///
/// Accepts the full id, the id without its leading `t`, or any unique prefix
/// of either. Returns `Ok(None)` when nothing matches.
///
/// # Errors
///
/// Returns an error if the prefix matches more than one task.
pub fn resolve_task_id(tasks: &[Task], input: &str) -> anyhow::Result<Option<TaskId>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Some(task) = tasks.iter().find(|t| t.id.as_str() == input) {
        return Ok(Some(task.id.clone()));
    }

    let prefixed = if input.starts_with('t') {
        input.to_string()
    } else {
        format!("t{input}")
    };

    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.id.as_str().starts_with(input) || t.id.as_str().starts_with(&prefixed))
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(only.id.clone())),
        many => {
            let ids: Vec<&str> = many.iter().map(|t| t.id.as_str()).collect();
            anyhow::bail!("ambiguous id '{input}' matches: {}", ids.join(", "))
        }
    }
}

/// Resolve an id or render a `TaskNotFound` error.
///
/// # Errors
///
/// Renders and returns an error if the id is unknown or ambiguous.
pub fn require_task_id(tasks: &[Task], input: &str, output: OutputMode) -> anyhow::Result<TaskId> {
    match resolve_task_id(tasks, input) {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(fail(
            output,
            CliError::from_code(format!("task '{input}' not found"), ErrorCode::TaskNotFound),
        )),
        Err(e) => Err(fail(
            output,
            CliError::from_code(e.to_string(), ErrorCode::TaskNotFound),
        )),
    }
}

/// Task row as rendered by commands: the stored record plus derived fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    #[serde(flatten)]
    pub task: Task,
    pub assignee_name: String,
    pub age: String,
}

impl TaskRow {
    pub fn new(task: &Task, roster: &Roster, now: i64) -> Self {
        Self {
            task: task.clone(),
            assignee_name: roster.display_name(&task.assignee_id).to_string(),
            age: relative_age(task.created_at, now).to_string(),
        }
    }
}

/// Format epoch milliseconds as local `YYYY-MM-DD HH:MM`.
pub fn format_local(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map_or_else(|| ms.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

/// Single-line text rendering shared by `list`, `create`, and `show`.
pub fn write_text_row(row: &TaskRow, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}",
        row.task.id,
        row.task.status,
        if row.task.is_late { "late" } else { "-" },
        row.task.assignee_id,
        row.task.title
    )
}

/// Card rendering used by pretty `list` output.
pub fn write_pretty_card(row: &TaskRow, w: &mut dyn Write) -> io::Result<()> {
    let late = if row.task.is_late { "  [LATE]" } else { "" };
    writeln!(w, "{}  {}{late}", row.task.id, row.task.title)?;
    let mut meta = format!("  {} | {} | {}", row.task.status, row.assignee_name, row.age);
    if let Some(deadline) = row.task.deadline {
        meta.push_str(&format!(" | due {}", format_local(deadline)));
    }
    writeln!(w, "{meta}")?;
    if !row.task.description.is_empty() {
        writeln!(w, "  {}", row.task.description)?;
    }
    Ok(())
}
