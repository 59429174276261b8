//! Crash-safe file replacement.
//!
//! The payload goes to a sibling temp file which is then renamed over the
//! target, so readers only ever see the old or the new content. Windows
//! refuses to rename onto an existing file, so there the old file is moved to
//! `.bak` first and put back if the second rename fails.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// The temp file is `sync_all()`ed before it is renamed into place.
pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;

    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    let Err(err) = tmp.persist(path) else {
        return Ok(());
    };
    if !path.exists() {
        return Err(err.error);
    }

    let backup = path.with_extension("bak");
    let _ = fs::remove_file(&backup);
    fs::rename(path, &backup)?;
    if let Err(retry) = err.file.persist(path) {
        let _ = fs::rename(&backup, path);
        return Err(retry.error);
    }
    if let Err(e) = fs::remove_file(&backup) {
        tracing::warn!(path = %backup.display(), "Failed to remove .bak after atomic write: {e}");
    }
    Ok(())
}
