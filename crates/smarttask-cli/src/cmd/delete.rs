use std::path::Path;

use clap::Args;
use serde::Serialize;
use smarttask_core::error::ErrorCode;

use crate::cmd::{flush, open_project, resolve_task_id};
use crate::output::{CliError, OutputMode, fail, render_mode};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Task ID to delete (supports unique prefixes).
    pub id: String,

    /// Additional task IDs to delete in the same command.
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeleteResult {
    id: String,
    deleted: bool,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    results: Vec<DeleteResult>,
    remaining: usize,
}

/// Execute `st delete`. Unknown ids are reported but are not an error.
///
/// # Errors
///
/// Returns an error if the project cannot be opened, an id prefix is
/// ambiguous, or the snapshot cannot be written.
pub fn run_delete(args: &DeleteArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut project = open_project(project_root, output)?;
    let store = &mut project.store;

    let mut results = Vec::new();
    for raw_id in std::iter::once(&args.id).chain(&args.ids) {
        let resolved = resolve_task_id(store.tasks(), raw_id).map_err(|e| {
            fail(
                output,
                CliError::from_code(e.to_string(), ErrorCode::TaskNotFound),
            )
        })?;
        let deleted = match resolved {
            Some(id) => store.delete(&id),
            None => false,
        };
        if !deleted {
            tracing::debug!(id = %raw_id, "nothing to delete");
        }
        results.push(DeleteResult {
            id: raw_id.clone(),
            deleted,
        });
    }
    flush(store, output)?;

    let payload = DeleteOutput {
        results,
        remaining: store.len(),
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for r in &p.results {
                writeln!(w, "{}\t{}", r.id, if r.deleted { "deleted" } else { "absent" })?;
            }
            Ok(())
        },
        |p, w| {
            for r in &p.results {
                if r.deleted {
                    writeln!(w, "Deleted {}", r.id)?;
                } else {
                    writeln!(w, "No task {} (nothing to delete)", r.id)?;
                }
            }
            writeln!(w, "{} task(s) remaining", p.remaining)
        },
    )
}
