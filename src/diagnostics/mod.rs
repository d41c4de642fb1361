//! Diagnostic log and submission history.
//!
//! Two append-only files under `~/.bharatlens/`:
//!
//! - `client.log`: one plain-text line per event
//!   (`<rfc3339> <LEVEL> <message>`). Transport failures land here with their
//!   full error chain; the user only ever sees the fixed network message.
//! - `history.jsonl`: one [`SubmissionRecord`] per started submission,
//!   read back by `bharatlens history`.
//!
//! All writes are best-effort. A full disk or read-only home directory must
//! never change what a submission renders.

use std::fmt;
use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;

use crate::config;
use crate::config::schema::LoggingConfig;

mod history;

pub use history::SubmissionRecord;

const LOG_FILE: &str = "client.log";
const HISTORY_FILE: &str = "history.jsonl";

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Handle to the diagnostic files. Cheap to clone.
///
/// A disabled handle (no directory) turns every call into a no-op.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    dir: Option<PathBuf>,
}

impl Diagnostics {
    /// Log under `~/.bharatlens/` unless logging is switched off.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            dir: config::data_dir(),
        }
    }

    /// Log into an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(LOG_FILE))
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(HISTORY_FILE))
    }

    /// Append one line to `client.log`.
    pub fn log(&self, level: Level, message: &str) {
        let Some(path) = self.log_path() else {
            return;
        };
        // Keep one event per line.
        let message = message.replace(['\r', '\n'], " ");
        let line = format!("{} {level} {message}", Utc::now().to_rfc3339());
        let _ = append_line(&path, &line);
    }

    /// Append a submission to `history.jsonl`.
    pub fn record_submission(&self, record: &SubmissionRecord) {
        let Some(path) = self.history_path() else {
            return;
        };
        if let Ok(json) = serde_json::to_string(record) {
            let _ = append_line(&path, &json);
        }
    }

    /// The most recent `limit` submissions, oldest first.
    ///
    /// Malformed lines are skipped; a missing file yields an empty list.
    pub fn recent_submissions(&self, limit: usize) -> Vec<SubmissionRecord> {
        let Some(path) = self.history_path() else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        let records: Vec<SubmissionRecord> = BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        let skip = records.len().saturating_sub(limit);
        records.into_iter().skip(skip).collect()
    }
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
