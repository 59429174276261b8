//! Shell detection and execution for `%%` lines.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail};

/// Detected shell for command execution.
#[derive(Debug, Clone)]
pub struct DetectedShell {
    pub binary: PathBuf,
    /// Arguments placed before the command (e.g., `["-c"]` or `["/C"]`).
    pub args: Vec<String>,
    pub name: String,
}

impl std::fmt::Display for DetectedShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(windows)]
pub fn detect_shell() -> DetectedShell {
    for name in ["pwsh", "powershell"] {
        if which::which(name).is_ok() {
            return DetectedShell {
                binary: name.into(),
                args: vec!["-NoProfile".to_string(), "-Command".to_string()],
                name: name.to_string(),
            };
        }
    }

    DetectedShell {
        binary: "cmd.exe".into(),
        args: vec!["/C".to_string()],
        name: "cmd".to_string(),
    }
}

#[cfg(not(windows))]
pub fn detect_shell() -> DetectedShell {
    // $SHELL first, it's the user's choice.
    if let Ok(shell) = std::env::var("SHELL") {
        let path = std::path::Path::new(&shell);
        if path.exists() {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("user-shell")
                .to_string();
            return DetectedShell {
                binary: PathBuf::from(&shell),
                args: vec!["-c".to_string()],
                name,
            };
        }
    }

    if which::which("bash").is_ok() {
        return DetectedShell {
            binary: "bash".into(),
            args: vec!["-c".to_string()],
            name: "bash".to_string(),
        };
    }

    DetectedShell {
        binary: "sh".into(),
        args: vec!["-c".to_string()],
        name: "sh".to_string(),
    }
}

/// Run `code` in `shell`.
///
/// With `stream`, the child shares this process's terminal and output
/// appears as it is produced. Otherwise output is collected and printed
/// afterwards, and only when `display` is set.
pub async fn run_shell(shell: &DetectedShell, code: &str, stream: bool, display: bool) -> Result<()> {
    let mut command = tokio::process::Command::new(&shell.binary);
    command.args(&shell.args).arg(code).stdin(Stdio::inherit());
    tracing::debug!(shell = %shell, stream, "Running shell command");

    let status = if stream {
        if !display {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        command
            .status()
            .await
            .with_context(|| format!("failed to start {shell}"))?
    } else {
        let output = command
            .output()
            .await
            .with_context(|| format!("failed to start {shell}"))?;
        if display {
            print!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
        }
        output.status
    };

    if !status.success() {
        bail!("{shell} exited with {status}");
    }
    Ok(())
}
