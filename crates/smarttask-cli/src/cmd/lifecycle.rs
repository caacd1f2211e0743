//! `st start`, `st done`, `st reopen`: move tasks between statuses.
//!
//! All three share one batch runner. Each id is resolved and transitioned
//! independently; failures are reported per id and the command exits non-zero
//! if any id failed. Under the default permissive policy any target status is
//! accepted, including the current one (re-marking a done task re-stamps
//! `completedAt`). With `transitions = "strict"` in `config.toml` only
//! pending → in_progress → done → pending is allowed.

use std::path::Path;

use clap::Args;
use serde::Serialize;
use smarttask_core::Status;
use smarttask_core::error::ErrorCode;

use crate::cmd::{Board, flush, open_project, resolve_task_id};
use crate::output::{CliError, OutputMode, fail, render_mode};

#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Task ID to transition (supports unique prefixes).
    pub id: String,

    /// Additional task IDs to transition in the same command.
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,
}

impl TransitionArgs {
    fn task_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.ids.iter().map(String::as_str))
    }
}

#[derive(Debug, Serialize)]
struct TransitionResult {
    id: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    #[serde(skip)]
    code: Option<ErrorCode>,
}

#[derive(Debug, Serialize)]
struct TransitionBatchOutput {
    status: Status,
    results: Vec<TransitionResult>,
}

fn transition_one(store: &mut Board, raw_id: &str, target: Status) -> TransitionResult {
    let failed = |message: String, code: ErrorCode| TransitionResult {
        id: raw_id.to_string(),
        ok: false,
        previous_status: None,
        new_status: None,
        error: Some(message),
        error_code: Some(code.code()),
        code: Some(code),
    };

    let id = match resolve_task_id(store.tasks(), raw_id) {
        Ok(Some(id)) => id,
        Ok(None) => return failed(format!("task '{raw_id}' not found"), ErrorCode::TaskNotFound),
        Err(e) => return failed(e.to_string(), ErrorCode::TaskNotFound),
    };

    match store.transition(&id, target) {
        Ok(Some(t)) => TransitionResult {
            id: t.id.to_string(),
            ok: true,
            previous_status: Some(t.from),
            new_status: Some(t.to),
            error: None,
            error_code: None,
            code: None,
        },
        Ok(None) => failed(format!("task '{id}' not found"), ErrorCode::TaskNotFound),
        Err(e) => failed(e.to_string(), e.code()),
    }
}

/// Transition every id in `args` to `target` and report the outcome per id.
///
/// # Errors
///
/// Returns an error if the project cannot be opened, the snapshot cannot be
/// written, or any single transition failed.
pub fn run_transition(
    args: &TransitionArgs,
    target: Status,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut project = open_project(project_root, output)?;
    let store = &mut project.store;

    let results: Vec<TransitionResult> = args
        .task_ids()
        .map(|raw_id| transition_one(store, raw_id, target))
        .collect();
    flush(store, output)?;

    let failures: Vec<&TransitionResult> = results.iter().filter(|r| !r.ok).collect();
    let failure_count = failures.len();
    let first_failure = failures.first().map(|r| {
        CliError::from_code(
            r.error.clone().unwrap_or_default(),
            r.code.unwrap_or(ErrorCode::InternalUnexpected),
        )
    });

    let payload = TransitionBatchOutput {
        status: target,
        results,
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for r in &p.results {
                match (r.previous_status, r.new_status) {
                    (Some(from), Some(to)) => writeln!(w, "ok\t{}\t{from}\t{to}", r.id)?,
                    _ => writeln!(
                        w,
                        "err\t{}\t{}",
                        r.id,
                        r.error.as_deref().unwrap_or("unknown error")
                    )?,
                }
            }
            Ok(())
        },
        |p, w| {
            writeln!(w, "Moved to {}", p.status)?;
            writeln!(w, "{:-<72}", "")?;
            for r in &p.results {
                match (r.previous_status, r.new_status) {
                    (Some(from), Some(to)) => {
                        writeln!(w, "ok    {:<10}  {from} -> {to}", r.id)?;
                    }
                    _ => writeln!(
                        w,
                        "err   {:<10}  {}",
                        r.id,
                        r.error.as_deref().unwrap_or("unknown error")
                    )?,
                }
            }
            Ok(())
        },
    )?;

    match (failure_count, first_failure) {
        (0, _) | (_, None) => Ok(()),
        (1, Some(err)) => Err(fail(output, err)),
        (n, Some(_)) => anyhow::bail!("{n} task(s) failed"),
    }
}
