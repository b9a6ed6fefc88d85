//! Interaction history
//!
//! Every answered question is persisted as an [`InteractionRecord`]. Two
//! on-disk layouts are supported:
//!
//! - `json`: one pretty-printed JSON array holding the whole history. Each
//!   append reads the array, pushes the record and atomically replaces the
//!   file (temp file + rename).
//! - `jsonl`: one compact record per line, appended in place.
//!
//! All access goes through a single async mutex owned by [`HistoryStore`],
//! so concurrent requests never interleave their read-modify-write cycles.
//! The file work itself runs on the blocking thread pool.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────

/// One agent's answer within an interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub agent: String,
    pub message: String,
}

impl ConversationTurn {
    pub fn new(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// `[agent]: message`, the block used to build the final answer
    pub fn render(&self) -> String {
        format!("[{}]: {}", self.agent, self.message)
    }
}

/// Snapshot of one full request/response cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub user_prompt: String,
    pub agents_involved: Vec<String>,
    pub conversation: Vec<ConversationTurn>,
    pub final_answer: String,
}

impl InteractionRecord {
    /// Build a record from the turns, deriving `agents_involved` and
    /// `final_answer` so both always agree with `conversation`.
    pub fn from_turns(
        timestamp: DateTime<Utc>,
        user_prompt: impl Into<String>,
        conversation: Vec<ConversationTurn>,
    ) -> Self {
        let agents_involved = conversation.iter().map(|t| t.agent.clone()).collect();
        let final_answer = join_answer(&conversation);

        Self {
            timestamp,
            user_prompt: user_prompt.into(),
            agents_involved,
            conversation,
            final_answer,
        }
    }
}

/// Join rendered turns with a blank line between each block
pub fn join_answer(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(ConversationTurn::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ─────────────────────────────────────────────────────────────────
// Format
// ─────────────────────────────────────────────────────────────────

/// On-disk layout of the history file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFormat {
    /// Single JSON array, rewritten on every append
    #[default]
    Json,
    /// One JSON record per line
    Jsonl,
}

impl fmt::Display for HistoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryFormat::Json => write!(f, "json"),
            HistoryFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl FromStr for HistoryFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(HistoryFormat::Json),
            "jsonl" | "ndjson" => Ok(HistoryFormat::Jsonl),
            _ => Err(format!("Unknown history format '{}'. Valid: json, jsonl", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────

/// Persistent, append-only interaction history
pub struct HistoryStore {
    file: HistoryFile,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, format: HistoryFormat) -> Self {
        Self {
            file: HistoryFile {
                path: path.into(),
                format,
            },
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    pub fn format(&self) -> HistoryFormat {
        self.file.format
    }

    /// Append one record. Returns once the record is on disk.
    pub async fn append(&self, record: &InteractionRecord) -> Result<()> {
        let _guard = self.lock.lock().await;

        let file = self.file.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || file.append(&record))
            .await
            .map_err(|e| Error::Internal(format!("History writer task failed: {}", e)))?
    }

    /// Load the whole history in append order. A missing file is empty history.
    pub async fn load(&self) -> Result<Vec<InteractionRecord>> {
        let _guard = self.lock.lock().await;

        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.read_all())
            .await
            .map_err(|e| Error::Internal(format!("History reader task failed: {}", e)))?
    }

    /// The last `limit` records, oldest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
        let mut history = self.load().await?;
        let skip = history.len().saturating_sub(limit);
        Ok(history.split_off(skip))
    }
}

/// Blocking file operations, run off the async runtime by [`HistoryStore`]
#[derive(Debug, Clone)]
struct HistoryFile {
    path: PathBuf,
    format: HistoryFormat,
}

impl HistoryFile {
    fn append(&self, record: &InteractionRecord) -> Result<()> {
        self.ensure_parent()?;
        match self.format {
            HistoryFormat::Json => {
                let mut history = self.read_all()?;
                history.push(record.clone());
                self.replace_array(&history)?;
                debug!(path = %self.path.display(), records = history.len(), "History rewritten");
            }
            HistoryFormat::Jsonl => {
                self.append_line(record)?;
                debug!(path = %self.path.display(), "History line appended");
            }
        }

        Ok(())
    }

    fn read_all(&self) -> Result<Vec<InteractionRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::HistoryRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match self.format {
            HistoryFormat::Json => {
                if content.trim().is_empty() {
                    return Ok(Vec::new());
                }
                serde_json::from_str(&content).map_err(|e| self.corrupt(e))
            }
            HistoryFormat::Jsonl => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| serde_json::from_str(line).map_err(|e| self.corrupt(e)))
                .collect(),
        }
    }

    fn replace_array(&self, history: &[InteractionRecord]) -> Result<()> {
        let body = serde_json::to_string_pretty(history)?;
        let tmp = self.temp_path();

        fs::write(&tmp, body).map_err(|source| self.write_error(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.write_error(source))
    }

    /// Sibling of the history file, always distinct from it
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn append_line(&self, record: &InteractionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;
        file.write_all(line.as_bytes())
            .map_err(|source| self.write_error(source))
    }

    fn ensure_parent(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|source| self.write_error(source))
            }
            _ => Ok(()),
        }
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        Error::HistoryWrite {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, e: serde_json::Error) -> Error {
        Error::HistoryCorrupt {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
