use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::clock::{
  DEFAULT_IST_TIME,
  DEFAULT_UTC_TIME,
  is_valid_time,
  ist_to_utc_or,
  utc_to_ist_or
};
use crate::datetime::{
  DEFAULT_DISPLAY_TIMEZONE,
  display_timezone,
  parse_timezone
};

const CONFIG_FILE: &str =
  "cadence.toml";
const CONFIG_ENV_VAR: &str =
  "CADENCE_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "CADENCE_TIMEZONE";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
  timezone: Option<String>,
  defaults: Option<DefaultsSection>
}

#[derive(Debug, Default, Deserialize)]
struct DefaultsSection {
  local_time: Option<String>,
  utc_time:   Option<String>
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Zone used for "today" and for
  /// rendering dates.
  pub timezone:     Tz,
  /// Shown when a stored UTC time cannot
  /// be read.
  pub local_time:   String,
  /// Stored when a local time cannot be
  /// read.
  pub utc_time:     String,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      timezone:     display_timezone(),
      local_time:   DEFAULT_IST_TIME
        .to_string(),
      utc_time:     DEFAULT_UTC_TIME
        .to_string(),
      loaded_files: vec![]
    }
  }
}

impl Config {
  /// Resolves the config file and the
  /// timezone environment override.
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let path = resolve_config_path(
      config_override
    );
    let tz_env =
      std::env::var(TIMEZONE_ENV_VAR)
        .ok();
    Self::from_sources(
      path.as_deref(),
      tz_env.as_deref()
    )
  }

  pub fn from_sources(
    path: Option<&Path>,
    tz_env: Option<&str>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    if let Some(path) = path {
      info!(file = %path.display(), "loading config");
      cfg.load_file(path)?;
    } else {
      debug!(
        "no config file found; using \
         defaults"
      );
    }

    if let Some(raw) = tz_env
      && let Some(tz) =
        parse_timezone(
          raw,
          TIMEZONE_ENV_VAR
        )
    {
      cfg.timezone = tz;
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let parsed: ConfigFile =
      toml::from_str(&raw)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.to_path_buf());

    if let Some(timezone) =
      parsed.timezone
    {
      let source = format!(
        "file:{}",
        path.display()
      );
      self.timezone = parse_timezone(
        &timezone, &source
      )
      .unwrap_or_else(|| {
        warn!(
          fallback = DEFAULT_DISPLAY_TIMEZONE,
          "using fallback timezone"
        );
        display_timezone()
      });
    }

    let defaults =
      parsed.defaults.unwrap_or_default();
    let local_time = defaults
      .local_time
      .and_then(|value| {
        checked_time(
          value,
          "defaults.local_time"
        )
      });
    let utc_time = defaults
      .utc_time
      .and_then(|value| {
        checked_time(
          value,
          "defaults.utc_time"
        )
      });
    self.set_default_times(
      local_time, utc_time
    );

    Ok(())
  }

  /// Keeps the two fallbacks naming the
  /// same instant: a lone value derives
  /// the other one.
  fn set_default_times(
    &mut self,
    local_time: Option<String>,
    utc_time: Option<String>
  ) {
    match (local_time, utc_time) {
      | (Some(local), Some(utc)) => {
        let expected = ist_to_utc_or(
          &local,
          DEFAULT_UTC_TIME
        );
        if expected != utc {
          warn!(
            local_time = %local,
            utc_time = %utc,
            expected = %expected,
            "defaults.local_time and \
             defaults.utc_time name \
             different instants"
          );
        }
        self.local_time = local;
        self.utc_time = utc;
      }
      | (Some(local), None) => {
        self.utc_time = ist_to_utc_or(
          &local,
          DEFAULT_UTC_TIME
        );
        self.local_time = local;
      }
      | (None, Some(utc)) => {
        self.local_time = utc_to_ist_or(
          &utc,
          DEFAULT_IST_TIME
        );
        self.utc_time = utc;
      }
      | (None, None) => {}
    }
  }
}

fn checked_time(
  value: String,
  key: &str
) -> Option<String> {
  if is_valid_time(&value) {
    return Some(value);
  }
  warn!(
    key,
    value = %value,
    "ignoring invalid time in config"
  );
  None
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  let local = std::env::current_dir()
    .ok()
    .map(|dir| dir.join(CONFIG_FILE));
  if let Some(path) = local
    && path.exists()
  {
    return Some(path);
  }

  dirs::config_dir()
    .map(|dir| {
      dir
        .join("cadence")
        .join(CONFIG_FILE)
    })
    .filter(|path| path.exists())
}
