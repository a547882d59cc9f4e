use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cadence",
    version,
    about = "Cadence: schedule text, IST/UTC times and due-today views for the task dashboard"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Path to cadence.toml; defaults to CADENCE_CONFIG, ./cadence.toml,
    /// then the user config directory.
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert an IST time of day (HH:MM) to UTC.
    ToUtc {
        time: String,
        /// Use the configured fallback instead of failing on bad input.
        #[arg(long)]
        fallback: bool,
    },
    /// Convert a UTC time of day (HH:MM) to IST.
    ToIst {
        time: String,
        #[arg(long)]
        fallback: bool,
    },
    /// Print the schedule text for a repetition config (or a task).
    Describe {
        /// JSON file, or `-` for stdin.
        input: PathBuf,
        /// Input is a whole task rather than a bare repetition config.
        #[arg(long)]
        task: bool,
    },
    /// List the assignments from a snapshot that are due today.
    Today {
        /// JSON array or JSON-lines file of assignments, or `-` for stdin.
        input: PathBuf,
        /// Instant to treat as now (RFC3339, YYYY-MM-DD, ...).
        #[arg(long)]
        now: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Also write the selected assignments to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Strictly validate a repetition config before it is sent upstream.
    Validate { input: PathBuf },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
