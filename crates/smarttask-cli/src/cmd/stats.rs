use std::path::Path;

use clap::Args;
use serde::Serialize;
use smarttask_core::Status;
use smarttask_core::projection::Aggregates;

use crate::cmd::open_project;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

#[derive(Debug, Serialize)]
struct StatsOutput {
    #[serde(flatten)]
    aggregates: Aggregates,
    pending: usize,
    done: usize,
}

/// Execute `st stats`: whole-board counts, ignoring any filter.
pub fn run_stats(_args: &StatsArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = open_project(project_root, output)?;
    let tasks = project.store.tasks();

    let count = |status: Status| tasks.iter().filter(|t| t.status == status).count();
    let payload = StatsOutput {
        aggregates: Aggregates::of(tasks),
        pending: count(Status::Pending),
        done: count(Status::Done),
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            writeln!(w, "total\t{}", p.aggregates.total)?;
            writeln!(w, "pending\t{}", p.pending)?;
            writeln!(w, "in_progress\t{}", p.aggregates.in_progress)?;
            writeln!(w, "done\t{}", p.done)?;
            writeln!(w, "late\t{}", p.aggregates.late)
        },
        |p, w| {
            pretty_section(w, "Board")?;
            pretty_kv(w, "Total", p.aggregates.total.to_string())?;
            pretty_kv(w, "Pending", p.pending.to_string())?;
            pretty_kv(w, "In progress", p.aggregates.in_progress.to_string())?;
            pretty_kv(w, "Done", p.done.to_string())?;
            pretty_kv(w, "Late", p.aggregates.late.to_string())
        },
    )
}
