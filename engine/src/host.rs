//! The collaborators a command handler reaches through.
//!
//! The engine never touches the terminal, the shell, the network or the
//! desktop directly. Everything observable goes through a [`Host`], which the
//! binary implements for a real terminal and tests implement with recorders.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parlor_context::TokenEstimator;

use crate::Session;

/// Boxed future returned by the async [`Host`] methods.
pub type HostFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Line printer usable from a background task.
pub type NoticeSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Result of waiting for the user to confirm an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Received,
    TimedOut,
}

pub trait Host {
    /// Render a markdown fragment.
    fn display(&mut self, markdown: &str);

    /// Print plain text followed by a newline.
    fn print(&mut self, text: &str);

    /// A printer the edit watcher can own while it runs in the background.
    fn notice_sink(&self) -> NoticeSink;

    /// Execute `code` with the runner for `language` (only `"shell"` is
    /// used today).
    fn run<'a>(
        &'a mut self,
        language: &'a str,
        code: &'a str,
        stream: bool,
        display: bool,
    ) -> HostFut<'a, anyhow::Result<()>>;

    /// Report platform and session details.
    fn system_info(&mut self, session: &Session) {
        let report = crate::info::system_report(session);
        self.display(&report);
    }

    /// Directory for scratch files such as the code being edited.
    fn storage_path(&self) -> PathBuf;

    fn estimator(&self) -> &dyn TokenEstimator;

    /// Hand `path` to the platform's default opener.
    fn open_in_editor<'a>(&'a mut self, path: &'a Path) -> HostFut<'a, io::Result<()>> {
        Box::pin(crate::opener::open_path(path))
    }

    /// Block until the user confirms, or until `timeout` elapses.
    fn wait_for_ack(&mut self, timeout: Option<Duration>) -> HostFut<'_, io::Result<Ack>>;

    /// Generate the assistant's reply to the current history and store it.
    fn respond<'a>(&'a mut self, session: &'a mut Session) -> HostFut<'a, anyhow::Result<()>>;

    fn sleep(&mut self, duration: Duration) -> HostFut<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    /// Host-side cleanup when the session is reset.
    fn reset(&mut self) {}
}
