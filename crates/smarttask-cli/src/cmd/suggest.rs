use std::path::Path;

use clap::Args;
use serde::Serialize;
use smarttask_core::User;
use smarttask_core::assign::{suggest_assignee, workload};

use crate::cmd::open_project;
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug, Default)]
pub struct SuggestArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestOutput<'a> {
    suggested: Option<&'a User>,
    in_progress: usize,
}

/// Execute `st suggest`: who `st create --auto` would pick right now.
pub fn run_suggest(_args: &SuggestArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = open_project(project_root, output)?;
    let store = &project.store;

    let suggested = suggest_assignee(store.roster(), store.tasks());
    let in_progress = suggested
        .and_then(|user| {
            workload(store.roster(), store.tasks())
                .into_iter()
                .find(|w| w.user.id == user.id)
        })
        .map_or(0, |w| w.in_progress);

    let payload = SuggestOutput {
        suggested,
        in_progress,
    };

    render_mode(
        output,
        &payload,
        |p, w| match p.suggested {
            Some(user) => writeln!(w, "{}\t{}", user.id, p.in_progress),
            None => writeln!(w, "-"),
        },
        |p, w| match p.suggested {
            Some(user) => writeln!(
                w,
                "Suggested assignee: {} ({}), {} task(s) in progress",
                user.display_name, user.id, p.in_progress
            ),
            None => writeln!(w, "No users on the roster."),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::init::{InitArgs, run_init};
    use tempfile::TempDir;

    #[test]
    fn suggest_runs_without_mutating() {
        let dir = TempDir::new().unwrap();
        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).unwrap();
        let path = dir.path().join(".smarttask/smarttask_tasks_v1.json");
        let before = std::fs::read_to_string(&path).unwrap();

        run_suggest(&SuggestArgs::default(), OutputMode::Json, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
