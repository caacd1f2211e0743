use std::path::Path;

use clap::Args;
use serde::Serialize;
use smarttask_core::Clock;
use smarttask_core::error::ErrorCode;
use smarttask_core::projection::{Aggregates, StatusFilter, ViewQuery, project};

use crate::cmd::{TaskRow, open_project, write_pretty_card, write_text_row};
use crate::output::{CliError, OutputMode, fail, pretty_rule, render_mode};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show only tasks in this status: all, pending, in_progress, done.
    #[arg(short, long, default_value = "all")]
    pub status: String,

    /// Case-insensitive text matched against title, description, and assignee name.
    #[arg(short = 'q', long)]
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    filter: String,
    search: String,
    aggregates: Aggregates,
    tasks: Vec<TaskRow>,
}

pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let filter = args.status.parse::<StatusFilter>().map_err(|e| {
        fail(output, CliError::from_code(e.to_string(), ErrorCode::InvalidEnumValue))
    })?;

    let opened = open_project(project_root, output)?;
    let store = &opened.store;
    let now = store.clock().now_millis();

    let query = ViewQuery::new(filter, args.search.clone().unwrap_or_default());
    let view = project(store.tasks(), store.roster(), &query);

    let payload = ListOutput {
        filter: filter.to_string(),
        search: query.search.clone(),
        aggregates: view.aggregates,
        tasks: view
            .tasks
            .iter()
            .map(|t| TaskRow::new(t, store.roster(), now))
            .collect(),
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for row in &p.tasks {
                write_text_row(row, w)?;
            }
            Ok(())
        },
        |p, w| {
            writeln!(
                w,
                "Total {}  |  In progress {}  |  Late {}",
                p.aggregates.total, p.aggregates.in_progress, p.aggregates.late
            )?;
            pretty_rule(w)?;
            if p.tasks.is_empty() {
                writeln!(w, "No tasks match.")?;
            }
            for row in &p.tasks {
                write_pretty_card(row, w)?;
            }
            Ok(())
        },
    )
}
