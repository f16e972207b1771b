use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use gitops_console::api::ApiClient;
use gitops_console::logging::{self, LogTarget};
use gitops_console::model::{ConsoleConfig, Mode};

mod cli_exec;

#[derive(Parser)]
#[command(name = "gitops-console")]
#[command(about = "Operator console for GitOps-managed nginx hosts", long_about = None)]
struct Cli {
    /// Config file (defaults to $GITOPS_CONSOLE_CONFIG or ~/.config/gitops-console/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://127.0.0.1:8080/api/v1
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct TargetArgs {
    #[arg(long)]
    pub(crate) group: String,
    #[arg(long)]
    pub(crate) host: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive terminal console (default)
    Tui,

    /// List groups and hosts
    Groups {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the change tree for a host
    Tree {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, default_value = "preview")]
        mode: Mode,
        /// Hide unchanged files
        #[arg(long)]
        changed_only: bool,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the triple diff for one file
    Diff {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        path: String,
        #[arg(long, default_value = "preview")]
        mode: Mode,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the nginx configuration check
    Check {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, default_value = "preview")]
        mode: Mode,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Prepare a production update, optionally applying it if the check passes
    Update {
        #[command(flatten)]
        target: TargetArgs,
        /// Apply after a passing prepare
        #[arg(long)]
        apply: bool,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show repository drift
    GitStatus {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = ConsoleConfig::load(cli.config.as_deref(), cli.api.as_deref())?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let target = match cfg.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Off,
            };
            logging::init(target, "info")?;
            gitops_console::tui_shell::run(&cfg)
        }
        Commands::Groups { json } => with_client(&cfg, |c| cli_exec::groups(c, json)),
        Commands::Tree {
            target,
            mode,
            changed_only,
            json,
        } => with_client(&cfg, |c| cli_exec::tree(c, &target, mode, !changed_only, json)),
        Commands::Diff {
            target,
            path,
            mode,
            json,
        } => with_client(&cfg, |c| cli_exec::diff(c, &target, &path, mode, json)),
        Commands::Check { target, mode, json } => {
            with_client(&cfg, |c| cli_exec::check(c, &target, mode, json))
        }
        Commands::Update {
            target,
            apply,
            json,
        } => with_client(&cfg, |c| cli_exec::update(c, &target, apply, json)),
        Commands::GitStatus { json } => with_client(&cfg, |c| cli_exec::git_status(c, json)),
    }
}

/// One-shot commands log to stderr and talk to the backend directly.
fn with_client(cfg: &ConsoleConfig, f: impl FnOnce(&ApiClient) -> Result<()>) -> Result<()> {
    logging::init(LogTarget::Stderr, "warn")?;
    let client = ApiClient::new(&cfg.api_base)?;
    f(&client)
}
