//! `st watch`: run the lateness check on a fixed cadence.
//!
//! Each pass re-reads the snapshot (other `st` invocations may have written
//! it), recomputes lateness, persists when a flag flipped, and reports the
//! board counts. JSON output is one compact object per line.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use clap::Args;
use serde::Serialize;
use smarttask_core::Clock;
use smarttask_core::projection::Aggregates;
use smarttask_core::schedule::StalenessSchedule;

use crate::cmd::{Board, flush, format_local, open_project};
use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between checks. Defaults to `[staleness] interval_secs`.
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Run a single check and exit.
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchPass {
    at: i64,
    changed: bool,
    #[serde(flatten)]
    aggregates: Aggregates,
}

fn schedule_for(args: &WatchArgs, configured: StalenessSchedule) -> StalenessSchedule {
    args.interval.map_or(configured, |secs| {
        StalenessSchedule::new(Duration::from_secs(secs.max(1)))
    })
}

/// One check: pick up external writes, then re-evaluate lateness.
///
/// Lateness flipped during the reload leaves the store dirty; the caller's
/// flush writes it. A pass whose reload failed writes nothing.
fn run_pass(store: &mut Board) -> WatchPass {
    let reloaded = store.reload();
    let ticked = if store.read_failed() {
        tracing::warn!("snapshot unreadable, skipping this pass");
        false
    } else {
        store.tick()
    };
    WatchPass {
        at: store.clock().now_millis(),
        changed: reloaded || ticked,
        aggregates: Aggregates::of(store.tasks()),
    }
}

fn report(output: OutputMode, pass: &WatchPass, first: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string(pass)?)?,
        OutputMode::Text => writeln!(
            out,
            "{}\t{}\t{}\t{}",
            pass.at, pass.aggregates.total, pass.aggregates.in_progress, pass.aggregates.late
        )?,
        OutputMode::Pretty => {
            if pass.changed || first {
                writeln!(
                    out,
                    "[{}] total {}  in progress {}  late {}",
                    format_local(pass.at),
                    pass.aggregates.total,
                    pass.aggregates.in_progress,
                    pass.aggregates.late
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Execute `st watch`. Runs until interrupted unless `--once` is given.
///
/// # Errors
///
/// Returns an error if the project cannot be opened or output cannot be written.
/// Failed snapshot writes are retried on the next pass.
pub fn run_watch(args: &WatchArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut project = open_project(project_root, output)?;
    let schedule = schedule_for(args, StalenessSchedule::from_config(&project.config.staleness));

    tracing::info!(
        dir = %project.data_dir.display(),
        interval_secs = schedule.interval().as_secs(),
        "watching for late tasks"
    );

    let mut last_run: Option<i64> = None;
    let mut first = true;
    loop {
        let now = project.store.clock().now_millis();
        if !schedule.is_due(last_run, now) {
            std::thread::sleep(schedule.wait(last_run, now));
            continue;
        }

        let pass = run_pass(&mut project.store);
        last_run = Some(pass.at);
        report(output, &pass, first)?;
        first = false;

        if args.once {
            return flush(&mut project.store, output);
        }
        if let Err(e) = project.store.flush() {
            tracing::warn!(error = %e, "snapshot write failed, retrying next pass");
        }
    }
}
