#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use smarttask_core::Status;
use smarttask_core::config::{UserConfig, load_user_config};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "st: a small task board with auto-assignment and lateness tracking",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment, and user config.
    fn output_mode(&self, user_output: Option<&str>) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, user_output)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a smarttask project",
        long_about = "Create .smarttask/ with a default config and the seed tasks.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    st init\n\n    # Reset config.toml to defaults\n    st init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Create a task",
        long_about = "Create a pending task. The title is required; everything else is optional.",
        after_help = "EXAMPLES:\n    # Create a task for a specific user\n    st create --title \"Restock cart 3\" --assignee u3\n\n    # Let the board pick the least-loaded user\n    st create --title \"Review area B\" --auto --deadline \"2026-05-01 17:00\"\n\n    # Emit machine-readable output\n    st create --title \"Check lobby\" --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tasks",
        long_about = "List tasks, newest first, with whole-board counts.",
        after_help = "EXAMPLES:\n    # Everything\n    st list\n\n    # Only tasks in progress that mention a cart\n    st list --status in_progress --search cart\n\n    # Emit machine-readable output\n    st list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one task",
        long_about = "Show full details for a single task by ID.",
        after_help = "EXAMPLES:\n    # Show a task\n    st show t1a2b3c4\n\n    # Use a short prefix when unique\n    st show 1a2"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Mark tasks as in progress",
        after_help = "EXAMPLES:\n    st start t1a2b3c4"
    )]
    Start(cmd::lifecycle::TransitionArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Mark tasks as done",
        after_help = "EXAMPLES:\n    st done t1a2b3c4 t5d6e7f8"
    )]
    Done(cmd::lifecycle::TransitionArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Move tasks back to pending",
        after_help = "EXAMPLES:\n    st reopen t1a2b3c4"
    )]
    Reopen(cmd::lifecycle::TransitionArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Delete tasks",
        long_about = "Delete tasks by ID. Unknown IDs are reported and skipped.",
        after_help = "EXAMPLES:\n    st delete t1a2b3c4"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Delete every task",
        after_help = "EXAMPLES:\n    st clear --yes"
    )]
    Clear(cmd::clear::ClearArgs),

    #[command(next_help_heading = "Read", about = "Show whole-board counts")]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Read",
        about = "Suggest an assignee",
        long_about = "Show the roster member with the fewest tasks in progress."
    )]
    Suggest(cmd::suggest::SuggestArgs),

    #[command(next_help_heading = "Read", about = "List the roster and its workload")]
    Users(cmd::users::UsersArgs),

    #[command(
        next_help_heading = "Background",
        about = "Re-check lateness on an interval",
        long_about = "Re-evaluate lateness every [staleness] interval_secs and persist changes.",
        after_help = "EXAMPLES:\n    # Run until interrupted\n    st watch\n\n    # One pass, then exit\n    st watch --once --json"
    )]
    Watch(cmd::watch::WatchArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SMARTTASK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "smarttask=debug,info"
        } else {
            "smarttask=info,warn"
        })
    });

    let format = env::var("SMARTTASK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays parseable.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user_config = load_user_config().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable user config");
        UserConfig::default()
    });

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode(user_config.output.as_deref());

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &project_root),
        Commands::Create(ref args) => cmd::create::run_create(args, output, &project_root),
        Commands::List(ref args) => cmd::list::run_list(args, output, &project_root),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &project_root),
        Commands::Start(ref args) => {
            cmd::lifecycle::run_transition(args, Status::InProgress, output, &project_root)
        }
        Commands::Done(ref args) => {
            cmd::lifecycle::run_transition(args, Status::Done, output, &project_root)
        }
        Commands::Reopen(ref args) => {
            cmd::lifecycle::run_transition(args, Status::Pending, output, &project_root)
        }
        Commands::Delete(ref args) => cmd::delete::run_delete(args, output, &project_root),
        Commands::Clear(ref args) => cmd::clear::run_clear(args, output, &project_root),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, output, &project_root),
        Commands::Suggest(ref args) => cmd::suggest::run_suggest(args, output, &project_root),
        Commands::Users(ref args) => cmd::users::run_users(args, output, &project_root),
        Commands::Watch(ref args) => cmd::watch::run_watch(args, output, &project_root),
    }
}
