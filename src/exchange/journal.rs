//! JSONL journal of exchanges for later auditing.
//!
//! Appends one JSON object per line to `exchange-log.jsonl` inside the prompt
//! directory. Uses synchronous `std::fs`: entries are small and flushed after
//! each write.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use super::ExchangeKind;

pub const JOURNAL_FILE: &str = "exchange-log.jsonl";

/// Returns the current UTC time as an ISO 8601 string with milliseconds.
fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// A journal line, tagged with `event_type`.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum JournalEntry {
    ExchangeStart {
        timestamp: String,
        kind: ExchangeKind,
        response_path: String,
    },
    PromptWritten {
        timestamp: String,
        kind: ExchangeKind,
        prompt_paths: Vec<String>,
    },
    ResponseAccepted {
        timestamp: String,
        kind: ExchangeKind,
        response_path: String,
        bytes: usize,
    },
    ExchangeFailed {
        timestamp: String,
        kind: ExchangeKind,
        message: String,
    },
}

impl JournalEntry {
    pub fn start(kind: ExchangeKind, response_path: &Path) -> Self {
        Self::ExchangeStart {
            timestamp: now_iso(),
            kind,
            response_path: response_path.display().to_string(),
        }
    }

    pub fn prompt_written(kind: ExchangeKind, prompt_paths: &[PathBuf]) -> Self {
        Self::PromptWritten {
            timestamp: now_iso(),
            kind,
            prompt_paths: prompt_paths.iter().map(|p| p.display().to_string()).collect(),
        }
    }

    pub fn response_accepted(kind: ExchangeKind, response_path: &Path, bytes: usize) -> Self {
        Self::ResponseAccepted {
            timestamp: now_iso(),
            kind,
            response_path: response_path.display().to_string(),
            bytes,
        }
    }

    pub fn failed(kind: ExchangeKind, message: String) -> Self {
        Self::ExchangeFailed {
            timestamp: now_iso(),
            kind,
            message,
        }
    }
}

/// Append-only JSONL writer.
pub struct ExchangeJournal {
    writer: BufWriter<fs::File>,
    path: PathBuf,
}

impl ExchangeJournal {
    /// Open (or create) the journal inside `prompt_dir`, creating the
    /// directory if needed.
    pub fn open(prompt_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(prompt_dir)?;
        let path = prompt_dir.join(JOURNAL_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn record(&mut self, entry: &JournalEntry) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
