//! Opening a file with the desktop's default application.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

/// The program and leading arguments used to open a file on this platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opener {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

#[cfg(windows)]
#[must_use]
pub fn platform_opener() -> Opener {
    // `start` is a cmd builtin; the empty string is the window title.
    Opener {
        program: "cmd",
        args: &["/C", "start", ""],
    }
}

#[cfg(target_os = "macos")]
#[must_use]
pub fn platform_opener() -> Opener {
    Opener {
        program: "open",
        args: &[],
    }
}

#[cfg(not(any(windows, target_os = "macos")))]
#[must_use]
pub fn platform_opener() -> Opener {
    Opener {
        program: "xdg-open",
        args: &[],
    }
}

/// Launch the platform opener on `path` and wait for it to exit.
///
/// The opener returning is not the same as the user being done: most
/// openers hand the file to a GUI application and exit immediately.
pub async fn open_path(path: &Path) -> io::Result<()> {
    open_with(&platform_opener(), path).await
}

pub async fn open_with(opener: &Opener, path: &Path) -> io::Result<()> {
    if which::which(opener.program).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("`{}` was not found on PATH", opener.program),
        ));
    }

    tracing::debug!(program = opener.program, path = %path.display(), "Launching opener");
    let status = Command::new(opener.program)
        .args(opener.args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "`{}` exited with {status}",
            opener.program
        )))
    }
}
