use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::task::Assignment;

/// Where a snapshot fetched from the backend is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// `-` means standard input.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(arg.to_path_buf())
        }
    }

    #[tracing::instrument]
    pub fn read_to_string(&self) -> anyhow::Result<String> {
        match self {
            Self::Stdin => {
                let mut raw = String::new();
                io::stdin()
                    .read_to_string(&mut raw)
                    .context("failed reading stdin")?;
                Ok(raw)
            }
            Self::File(path) => fs::read_to_string(path)
                .with_context(|| format!("failed reading {}", path.display())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[tracing::instrument]
pub fn load_json<T: DeserializeOwned>(source: &Source) -> anyhow::Result<T> {
    let raw = source.read_to_string()?;
    serde_json::from_str(&raw).with_context(|| format!("failed parsing {source}"))
}

#[tracing::instrument]
pub fn load_assignments(source: &Source) -> anyhow::Result<Vec<Assignment>> {
    let raw = source.read_to_string()?;
    parse_records(&raw, &source.to_string())
}

/// Accepts either a JSON array or one JSON object per line.
#[tracing::instrument(skip(raw))]
pub fn parse_records<T: DeserializeOwned>(raw: &str, label: &str) -> anyhow::Result<Vec<T>> {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() {
        return Ok(vec![]);
    }

    if trimmed.starts_with('[') {
        let out: Vec<T> =
            serde_json::from_str(trimmed).with_context(|| format!("failed parsing {label}"))?;
        debug!(count = out.len(), "loaded records from json array");
        return Ok(out);
    }

    let mut out = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(line)
            .with_context(|| format!("failed parsing {label} line {}", idx + 1))?;
        out.push(record);
    }

    debug!(count = out.len(), "loaded records from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, records))]
pub fn save_json_atomic<T: Serialize>(path: &Path, records: &[T]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = records.len(), "saving json atomically");

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, records)?;
    writeln!(temp)?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
