//! Background modification watcher for the file being edited.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::watch;

use crate::host::NoticeSink;

pub const EDITED_NOTICE: &str = "Code has been edited successfully";

/// What the watcher saw before it was stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchReport {
    /// Number of distinct modification-time changes observed.
    pub changes: u32,
}

/// Current modification time of `path`, if it can be read.
pub(crate) async fn modified_at(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// Poll `path` every `interval` until `stop` flips to `true` (or its sender
/// is dropped), printing [`EDITED_NOTICE`] through `notices` each time the
/// modification time moves away from `baseline`.
///
/// `baseline` is taken by the caller before the file is handed to the
/// editor; a save that lands before this task is first polled still counts.
///
/// A file that briefly disappears (editors that save by rename) is not a
/// change; the baseline is kept until the file is readable again.
pub async fn watch_modifications(
    path: PathBuf,
    mut baseline: Option<SystemTime>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
    notices: NoticeSink,
) -> WatchReport {
    let mut report = WatchReport::default();
    tracing::debug!(path = %path.display(), ?interval, "Watching for edits");

    loop {
        if *stop.borrow() {
            break;
        }
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
                continue;
            }
        }

        let Some(current) = modified_at(&path).await else {
            continue;
        };
        if baseline != Some(current) {
            report.changes += 1;
            tracing::debug!(path = %path.display(), changes = report.changes, "Edit detected");
            notices(EDITED_NOTICE);
            baseline = Some(current);
        }
    }

    tracing::debug!(path = %path.display(), changes = report.changes, "Watcher stopped");
    report
}
