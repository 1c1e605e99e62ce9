//! verso - per-file version history for plain text files.
//!
//! This is the main entry point for the verso CLI. Each command treats the
//! file on disk as the editor buffer.

mod commands;
mod host;

use clap::{Parser, Subcommand};
use commands::*;
use std::path::PathBuf;
use std::process::ExitCode;
use verso_core::Config;

#[derive(Parser)]
#[command(name = "verso")]
#[command(author, version, about = "Per-file version history for text files", long_about = None)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra configuration file (JSON or JSONC)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History root directory (overrides configuration)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the versions of a file, oldest first
    Log {
        /// Tracked file
        file: PathBuf,
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },
    /// Snapshot the file's current content
    Commit {
        /// Tracked file
        file: PathBuf,
        /// Commit message
        #[arg(short, long)]
        message: String,
        /// Overwrite an existing version instead of adding one
        #[arg(long, value_name = "VERSION")]
        amend: Option<String>,
    },
    /// Print the content of a stored version
    Show {
        /// Tracked file
        file: PathBuf,
        /// Version: number from `log`, timestamp, label or `latest`
        version: String,
    },
    /// Diff a stored version against the file, or against another version
    Diff {
        /// Tracked file
        file: PathBuf,
        /// Version to diff from (default: latest)
        version: Option<String>,
        /// Compare with this stored version instead of the file
        #[arg(long, value_name = "VERSION")]
        against: Option<String>,
    },
    /// Replace the file's content with a stored version
    Restore {
        /// Tracked file
        file: PathBuf,
        /// Version to restore
        version: String,
    },
    /// Print the directory holding a file's history
    Dir {
        /// Tracked file
        file: PathBuf,
    },
    /// Show configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = Config::load(cli.config.as_deref());
    let level = loaded
        .as_ref()
        .map(|(config, _)| config.log_level())
        .unwrap_or_default();
    let log_file = init_logging(cli.verbose, level);
    if let Some(path) = &log_file {
        tracing::debug!(path = %path.display(), "Logging to file");
    }

    match run(cli, loaded) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Notices were already printed by the host.
            if e.downcast_ref::<Reported>().is_none() {
                eprintln!("Error: {e:#}");
            }
            tracing::debug!(error = %format!("{e:#}"), "Command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(
    cli: Cli,
    loaded: verso_core::CoreResult<(Config, Vec<PathBuf>)>,
) -> anyhow::Result<()> {
    let (mut config, sources) = loaded?;
    if let Some(root) = cli.root {
        config.root_dir = Some(root);
    }

    match cli.command {
        Commands::Log { file, json } => show_log(&config, &file, json),
        Commands::Commit {
            file,
            message,
            amend,
        } => commit(&config, &file, &message, amend.as_deref()),
        Commands::Show { file, version } => show_version(&config, &file, &version),
        Commands::Diff {
            file,
            version,
            against,
        } => diff(&config, &file, version.as_deref(), against.as_deref()),
        Commands::Restore { file, version } => restore(&config, &file, &version),
        Commands::Dir { file } => show_dir(&config, &file),
        Commands::Config => show_config(&config, &sources),
    }
}
