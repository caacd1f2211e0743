use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use clap::Args;
use smarttask_core::assign::suggest_assignee;
use smarttask_core::error::ErrorCode;
use smarttask_core::{Clock, NewTask, UserId};

use crate::cmd::{TaskRow, flush, open_project, write_pretty_card, write_text_row};
use crate::output::{CliError, OutputMode, fail, render_mode};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Task title (required, surrounding whitespace is trimmed).
    #[arg(short, long)]
    pub title: String,

    /// Optional free-text description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Assignee user id (see `st users`). Omit to leave the task unassigned.
    #[arg(short, long, conflicts_with = "auto")]
    pub assignee: Option<String>,

    /// Assign to the roster member with the fewest in-progress tasks.
    #[arg(long)]
    pub auto: bool,

    /// Deadline: RFC 3339, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, or `YYYY-MM-DD`.
    ///
    /// Times without an offset are local. A bare date means the end of that day.
    #[arg(long)]
    pub deadline: Option<String>,
}

/// Parse a deadline into epoch milliseconds.
///
/// # Errors
///
/// Returns an error if `raw` matches none of the accepted formats.
pub fn parse_deadline(raw: &str) -> anyhow::Result<i64> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }

    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local_millis(naive, raw);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| anyhow::anyhow!("invalid end-of-day time"))?;
        return local_millis(date.and_time(end_of_day), raw);
    }

    anyhow::bail!(
        "invalid deadline '{raw}': expected RFC 3339, YYYY-MM-DDTHH:MM, YYYY-MM-DD HH:MM, or YYYY-MM-DD"
    )
}

fn local_millis(naive: NaiveDateTime, raw: &str) -> anyhow::Result<i64> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| anyhow::anyhow!("deadline '{raw}' does not exist in the local timezone"))
}

pub fn run_create(args: &CreateArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut project = open_project(project_root, output)?;
    let store = &mut project.store;

    let deadline = args
        .deadline
        .as_deref()
        .map(parse_deadline)
        .transpose()
        .map_err(|e| fail(output, CliError::from_code(e.to_string(), ErrorCode::InvalidDeadline)))?;

    let assignee = if args.auto {
        suggest_assignee(store.roster(), store.tasks())
            .map(|u| u.id.clone())
            .unwrap_or_default()
    } else {
        let id = UserId::new(args.assignee.clone().unwrap_or_default());
        if !id.as_str().is_empty() && store.roster().get(&id).is_none() {
            tracing::warn!(assignee = %id, "assignee is not on the roster");
        }
        id
    };

    let mut new = NewTask::new(&args.title).assignee(assignee).deadline(deadline);
    if let Some(description) = &args.description {
        new = new.description(description);
    }

    let task = store
        .create(new)
        .map_err(|e| fail(output, CliError::from_code(e.to_string(), e.code())))?;
    flush(store, output)?;

    tracing::info!(id = %task.id, "task created");

    let row = TaskRow::new(&task, store.roster(), store.clock().now_millis());
    render_mode(output, &row, write_text_row, |r, w| {
        writeln!(w, "Created task")?;
        write_pretty_card(r, w)
    })
}
