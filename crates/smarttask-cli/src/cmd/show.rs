use std::path::Path;

use clap::Args;
use smarttask_core::Clock;

use crate::cmd::{TaskRow, format_local, open_project, require_task_id, write_text_row};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task ID to show (supports unique prefixes).
    pub id: String,
}

pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = open_project(project_root, output)?;
    let store = &project.store;

    let id = require_task_id(store.tasks(), &args.id, output)?;
    let Some(task) = store.get(&id) else {
        anyhow::bail!("task '{id}' disappeared while reading");
    };
    let row = TaskRow::new(task, store.roster(), store.clock().now_millis());

    render_mode(output, &row, write_text_row, |r, w| {
        pretty_section(w, &format!("{}  {}", r.task.id, r.task.title))?;
        pretty_kv(w, "Status", r.task.status.to_string())?;
        pretty_kv(w, "Assignee", &r.assignee_name)?;
        pretty_kv(w, "Created", format!("{} ({})", format_local(r.task.created_at), r.age))?;
        if let Some(started) = r.task.started_at {
            pretty_kv(w, "Started", format_local(started))?;
        }
        if let Some(completed) = r.task.completed_at {
            pretty_kv(w, "Completed", format_local(completed))?;
        }
        if let Some(deadline) = r.task.deadline {
            let late = if r.task.is_late { "  LATE" } else { "" };
            pretty_kv(w, "Deadline", format!("{}{late}", format_local(deadline)))?;
        }
        if !r.task.description.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", r.task.description)?;
        }
        Ok(())
    })
}
