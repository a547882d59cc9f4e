use std::io::Write;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cli::Command;
use crate::clock::{convert_ist_to_utc, convert_utc_to_ist, ist_to_utc_or, utc_to_ist_or};
use crate::config::Config;
use crate::datastore::{Source, load_assignments, load_json, save_json_atomic};
use crate::datetime::parse_instant;
use crate::describe::{describe_task_in, describe_with_fallback};
use crate::due::{due_today_in, today_in};
use crate::render::Renderer;
use crate::repetition::RepetitionConfig;
use crate::task::Task;

/// Runs one CLI command. `now` is read once by the caller.
#[tracing::instrument(skip(cfg, renderer, out, now))]
pub fn dispatch<W: Write>(
    cfg: &Config,
    renderer: &Renderer,
    command: Command,
    now: DateTime<Utc>,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::ToUtc { time, fallback } => {
            let utc = if fallback {
                ist_to_utc_or(&time, &cfg.utc_time)
            } else {
                convert_ist_to_utc(&time)?
            };
            writeln!(out, "{utc}")?;
        }
        Command::ToIst { time, fallback } => {
            let ist = if fallback {
                utc_to_ist_or(&time, &cfg.local_time)
            } else {
                convert_utc_to_ist(&time)?
            };
            writeln!(out, "{ist}")?;
        }
        Command::Describe { input, task } => {
            let source = Source::from_arg(&input);
            let text = if task {
                let task: Task = load_json(&source)?;
                describe_task_in(&task, cfg.timezone, &cfg.local_time)
            } else {
                let config: RepetitionConfig = load_json(&source)?;
                describe_with_fallback(&config, &cfg.local_time)
            };
            writeln!(out, "{text}")?;
        }
        Command::Today {
            input,
            now: now_override,
            json,
            output,
        } => {
            let now = match now_override {
                Some(raw) => parse_instant(&raw, now, cfg.timezone)
                    .with_context(|| format!("invalid --now value: {raw}"))?,
                None => now,
            };
            let source = Source::from_arg(&input);
            let assignments = load_assignments(&source)?;
            let selected = due_today_in(&assignments, now, cfg.timezone);
            info!(
                today = %today_in(now, cfg.timezone),
                total = assignments.len(),
                due = selected.len(),
                "selected due-today assignments"
            );

            if let Some(path) = output {
                save_json_atomic(&path, &selected)
                    .with_context(|| format!("failed writing {}", path.display()))?;
                debug!(file = %path.display(), "wrote due-today snapshot");
            }

            if json {
                serde_json::to_writer_pretty(&mut *out, &selected)?;
                writeln!(out)?;
            } else {
                renderer.write_assignment_table(&mut *out, &selected)?;
            }
        }
        Command::Validate { input } => {
            let source = Source::from_arg(&input);
            let config: RepetitionConfig = load_json(&source)?;
            config
                .validate()
                .with_context(|| format!("{source} is not a valid repetition config"))?;
            writeln!(
                out,
                "ok: {}",
                describe_with_fallback(&config, &cfg.local_time)
            )?;
        }
    }

    Ok(())
}
