use std::path::Path;

use clap::Args;
use smarttask_core::assign::{Workload, workload};

use crate::cmd::open_project;
use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct UsersArgs {}

/// Execute `st users`: the roster with each member's in-progress count.
pub fn run_users(_args: &UsersArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = open_project(project_root, output)?;
    let store = &project.store;
    let load: Vec<Workload<'_>> = workload(store.roster(), store.tasks());

    render_mode(
        output,
        &load,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}\t{}\t{}", row.user.id, row.in_progress, row.user.display_name)?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, "Roster")?;
            writeln!(w, "{:<6} {:<28} IN PROGRESS", "ID", "NAME")?;
            for row in rows {
                writeln!(
                    w,
                    "{:<6} {:<28} {}",
                    row.user.id.as_str(),
                    row.user.display_name,
                    row.in_progress
                )?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::init::{InitArgs, run_init};
    use tempfile::TempDir;

    #[test]
    fn users_lists_roster() {
        let dir = TempDir::new().unwrap();
        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).unwrap();
        run_users(&UsersArgs::default(), OutputMode::Text, dir.path()).unwrap();
    }
}
