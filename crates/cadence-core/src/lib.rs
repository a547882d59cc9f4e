pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod datetime;
pub mod describe;
pub mod due;
pub mod error;
pub mod parameter;
pub mod render;
pub mod repetition;
pub mod task;

use std::ffi::OsString;

use clap::Parser;
use tracing::{
  debug,
  info
};

pub use crate::clock::{
  ClockTime,
  convert_ist_to_utc,
  convert_utc_to_ist
};
pub use crate::describe::describe;
pub use crate::due::due_today;
pub use crate::error::CoreError;
pub use crate::repetition::RepetitionConfig;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting cadence CLI"
  );

  let cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  debug!(
    timezone = cfg.timezone.name(),
    files = ?cfg.loaded_files,
    "resolved config"
  );

  let renderer =
    render::Renderer::for_stdout(
      !cli.no_color,
      cfg.timezone,
      cfg.local_time.as_str()
    );

  let now = chrono::Utc::now();
  let mut out =
    std::io::stdout().lock();
  commands::dispatch(
    &cfg,
    &renderer,
    cli.command,
    now,
    &mut out
  )?;

  info!("done");
  Ok(())
}
