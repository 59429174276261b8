//! JSON save/load of the conversation history.
//!
//! Files are a JSON array of message objects written with 2-space
//! indentation. Loading validates the whole file before anything is handed
//! back, so a failed load never leaves a half-replaced history behind.

use std::io;
use std::path::{Path, PathBuf};

use parlor_types::Message;
use thiserror::Error;

use crate::History;
use crate::atomic_write::atomic_write;

pub const DEFAULT_HISTORY_FILE: &str = "messages.json";
const JSON_SUFFIX: &str = ".json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no history file at {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} is not a valid message history: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Turn a user-supplied argument into a history file path.
///
/// Empty input means [`DEFAULT_HISTORY_FILE`]; a missing `.json` suffix is
/// appended. Relative paths stay relative to the working directory.
#[must_use]
pub fn resolve_history_path(argument: &str) -> PathBuf {
    let argument = argument.trim();
    if argument.is_empty() {
        return PathBuf::from(DEFAULT_HISTORY_FILE);
    }
    if argument.ends_with(JSON_SUFFIX) {
        PathBuf::from(argument)
    } else {
        PathBuf::from(format!("{argument}{JSON_SUFFIX}"))
    }
}

/// Absolute form of `path` for user-facing reports. Falls back to the path as
/// given if the working directory cannot be determined.
#[must_use]
pub fn display_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

pub fn to_json(history: &History) -> Result<String, PersistError> {
    serde_json::to_string_pretty(history.as_slice()).map_err(PersistError::Serialize)
}

pub fn save_history(history: &History, path: &Path) -> Result<(), PersistError> {
    let json = to_json(history)?;
    atomic_write(path, json.as_bytes()).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), messages = history.len(), "Saved history");
    Ok(())
}

/// Read and validate a history file. The caller decides when to install it.
pub fn load_history(path: &Path) -> Result<History, PersistError> {
    let raw = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            PersistError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            PersistError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let messages: Vec<Message> =
        serde_json::from_str(&raw).map_err(|source| PersistError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), messages = messages.len(), "Loaded history");
    Ok(History::from_messages(messages))
}
