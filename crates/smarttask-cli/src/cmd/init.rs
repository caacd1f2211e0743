use std::path::Path;

use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use smarttask_core::config::{DATA_DIR, load_project_config, write_default_project_config};
use smarttask_core::{FileStorage, SystemClock, TaskStore};

use crate::cmd::flush;
use crate::output::{CliError, OutputMode, fail, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `config.toml` with defaults even if one exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitOutput {
    data_dir: String,
    config_written: bool,
    tasks: usize,
}

/// Execute `st init`. Creates the project skeleton:
///
/// ```text
/// .smarttask/
///   config.toml              (default project config)
///   smarttask_tasks_v1.json  (task snapshot, seeded on first open)
/// ```
///
/// Running it again is harmless: existing config and tasks are kept.
///
/// # Errors
///
/// Returns an error if the directory or config cannot be written.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let data_dir = project_root.join(DATA_DIR);

    if args.force {
        let config_path = data_dir.join("config.toml");
        if config_path.exists() {
            std::fs::remove_file(&config_path)
                .with_context(|| format!("Failed to remove {}", config_path.display()))?;
        }
    }

    let config_written = write_default_project_config(&data_dir)
        .map_err(|e| fail(output, CliError::from_code(e.to_string(), e.code())))?;

    let config = load_project_config(&data_dir)
        .map_err(|e| fail(output, CliError::from_code(e.to_string(), e.code())))?;

    // Opening the board seeds and persists it when no snapshot exists yet.
    let mut store = TaskStore::open_with_config(FileStorage::new(&data_dir), SystemClock, &config);
    flush(&mut store, output)?;

    tracing::info!(dir = %data_dir.display(), config_written, "project initialized");

    let payload = InitOutput {
        data_dir: data_dir.display().to_string(),
        config_written,
        tasks: store.len(),
    };

    render_mode(
        output,
        &payload,
        |p, w| writeln!(w, "{}\t{}", p.data_dir, p.tasks),
        |p, w| {
            pretty_section(w, "Initialized smarttask project")?;
            pretty_kv(w, "Directory", &p.data_dir)?;
            pretty_kv(
                w,
                "Config",
                if p.config_written { "written" } else { "kept existing" },
            )?;
            pretty_kv(w, "Tasks", p.tasks.to_string())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use smarttask_core::config::DEFAULT_STORAGE_KEY;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: InitArgs,
    }

    #[test]
    fn init_args_parse_force() {
        let w = Wrapper::parse_from(["test", "--force"]);
        assert!(w.args.force);
        let w = Wrapper::parse_from(["test"]);
        assert!(!w.args.force);
    }

    #[test]
    fn init_creates_config_and_seeded_snapshot() {
        let dir = TempDir::new().unwrap();
        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).unwrap();

        let data_dir = dir.path().join(DATA_DIR);
        assert!(data_dir.join("config.toml").is_file());

        let raw =
            std::fs::read_to_string(data_dir.join(format!("{DEFAULT_STORAGE_KEY}.json"))).unwrap();
        let tasks: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).unwrap();

        let config_path = dir.path().join(DATA_DIR).join("config.toml");
        std::fs::write(&config_path, "[staleness]\ninterval_secs = 5\n").unwrap();

        run_init(&InitArgs { force: false }, OutputMode::Json, dir.path()).unwrap();
        let kept = std::fs::read_to_string(&config_path).unwrap();
        assert!(kept.contains("interval_secs = 5"));

        run_init(&InitArgs { force: true }, OutputMode::Json, dir.path()).unwrap();
        let rewritten = std::fs::read_to_string(&config_path).unwrap();
        assert!(rewritten.contains("interval_secs = 30"));
    }
}
