use std::path::Path;

use clap::Args;
use serde::Serialize;
use smarttask_core::error::ErrorCode;

use crate::cmd::{flush, open_project};
use crate::output::{CliError, OutputMode, fail, render};

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm removal of every task.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct ClearOutput {
    removed: usize,
}

/// Execute `st clear`. Refuses to run without `--yes`.
///
/// The empty board is persisted, so the seed tasks do not come back on the
/// next run.
///
/// # Errors
///
/// Returns an error without `--yes`, or if the snapshot cannot be written.
pub fn run_clear(args: &ClearArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut project = open_project(project_root, output)?;

    if !args.yes {
        return Err(fail(
            output,
            CliError::from_code(
                format!("refusing to delete {} task(s) without confirmation", project.store.len()),
                ErrorCode::ConfirmationRequired,
            ),
        ));
    }

    let removed = project.store.clear();
    flush(&mut project.store, output)?;
    tracing::info!(removed, "board cleared");

    render(output, &ClearOutput { removed }, |p, w| {
        writeln!(w, "Removed {} task(s)", p.removed)
    })
}
