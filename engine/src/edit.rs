//! `%edit`: hand the latest code block to an external editor and resubmit it.
//!
//! The foreground task owns the history throughout. While the user edits,
//! a background watcher reports saves; it is stopped through a watch
//! channel and joined before the file is read back, so the reload never
//! races the watcher.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use parlor_types::Message;
use thiserror::Error;
use tokio::sync::watch;

use crate::host::{Ack, Host};
use crate::watcher::{modified_at, watch_modifications};
use crate::Session;

pub const SCRATCH_FILE_NAME: &str = "editing_text_block";
pub const MONITORING_PROMPT: &str = "Monitoring file changes. Press Enter to continue.";
pub const SUBMITTED_NOTICE: &str = "Code edit submitted.";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOptions {
    pub poll_interval: Duration,
    /// Give up waiting for confirmation after this long. `None` waits forever.
    pub ack_timeout: Option<Duration>,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            ack_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Extracted,
    EditorLaunched,
    Watching,
    AckReceived,
    Reloaded,
    Resubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The history holds no code block.
    NothingToEdit,
    Resubmitted { edits_detected: u32 },
    /// No confirmation before the timeout; the history is as it was.
    Abandoned,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Failed to write {}: {source}", path.display())]
    Scratch { path: PathBuf, source: io::Error },
    #[error("Failed to open {} in an editor: {source}", path.display())]
    Opener { path: PathBuf, source: io::Error },
    #[error("Failed while waiting for confirmation: {0}")]
    Ack(#[source] io::Error),
    #[error("Edit watcher failed: {0}")]
    Watcher(#[source] tokio::task::JoinError),
    #[error("Failed to reload {}: {source}", path.display())]
    Reload { path: PathBuf, source: io::Error },
    #[error("Failed to generate a response: {0}")]
    Respond(String),
}

/// One run of the edit workflow.
#[derive(Debug)]
pub struct EditWorkflow<'a> {
    options: &'a EditOptions,
    state: EditState,
}

impl<'a> EditWorkflow<'a> {
    #[must_use]
    pub fn new(options: &'a EditOptions) -> Self {
        Self {
            options,
            state: EditState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> EditState {
        self.state
    }

    fn advance(&mut self, next: EditState) {
        tracing::debug!(from = ?self.state, to = ?next, "Edit workflow transition");
        self.state = next;
    }

    /// Every failure puts the removed messages back, so the history is
    /// either untouched or holds the edited block as its last entry.
    pub async fn run<H: Host + ?Sized>(
        &mut self,
        session: &mut Session,
        host: &mut H,
    ) -> Result<EditOutcome, EditError> {
        let Some(index) = session.history().last_code_index() else {
            return Ok(EditOutcome::NothingToEdit);
        };
        // The code block and everything after it.
        let mut held = session.history_mut().truncate_from(Some(index));
        self.advance(EditState::Extracted);

        let original = held
            .first()
            .and_then(Message::content)
            .unwrap_or_default()
            .to_string();
        let path = match write_scratch(host.storage_path(), &original).await {
            Ok(path) => path,
            Err(err) => {
                session.history_mut().restore(held);
                return Err(err);
            }
        };

        let baseline = modified_at(&path).await;

        if let Err(source) = host.open_in_editor(&path).await {
            tracing::warn!(path = %path.display(), error = %source, "Opener failed");
            session.history_mut().restore(held);
            return Err(EditError::Opener { path, source });
        }
        self.advance(EditState::EditorLaunched);

        let (stop_tx, stop_rx) = watch::channel(false);
        let watcher = tokio::spawn(watch_modifications(
            path.clone(),
            baseline,
            self.options.poll_interval,
            stop_rx,
            host.notice_sink(),
        ));
        self.advance(EditState::Watching);

        host.print(MONITORING_PROMPT);
        let ack = host.wait_for_ack(self.options.ack_timeout).await;

        // Err only means the watcher already exited.
        let _ = stop_tx.send(true);
        let report = match watcher.await {
            Ok(report) => report,
            Err(err) => {
                session.history_mut().restore(held);
                return Err(EditError::Watcher(err));
            }
        };

        match ack {
            Ok(Ack::Received) => {}
            Ok(Ack::TimedOut) => {
                tracing::info!(path = %path.display(), "Edit confirmation timed out");
                session.history_mut().restore(held);
                return Ok(EditOutcome::Abandoned);
            }
            Err(source) => {
                session.history_mut().restore(held);
                return Err(EditError::Ack(source));
            }
        }
        self.advance(EditState::AckReceived);
        host.print(SUBMITTED_NOTICE);

        let edited = match tokio::fs::read_to_string(&path).await {
            Ok(edited) => edited,
            Err(source) => {
                session.history_mut().restore(held);
                return Err(EditError::Reload { path, source });
            }
        };
        held.truncate(1);
        if let Some(block) = held.first_mut() {
            block.set_content(edited);
        }
        session.history_mut().restore(held);
        self.advance(EditState::Reloaded);

        host.respond(session)
            .await
            .map_err(|err| EditError::Respond(format!("{err:#}")))?;
        self.advance(EditState::Resubmitted);

        Ok(EditOutcome::Resubmitted {
            edits_detected: report.changes,
        })
    }
}

async fn write_scratch(storage: PathBuf, content: &str) -> Result<PathBuf, EditError> {
    let path = storage.join(SCRATCH_FILE_NAME);
    let written = async {
        tokio::fs::create_dir_all(&storage).await?;
        tokio::fs::write(&path, content).await
    }
    .await;
    match written {
        Ok(()) => Ok(path),
        Err(source) => Err(EditError::Scratch { path, source }),
    }
}
