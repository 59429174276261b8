//! `%info` report.

use std::fmt::Write as _;

use parlor_types::MessageKind;

use crate::Session;

/// Markdown summary of the platform and the current session.
#[must_use]
pub fn system_report(session: &Session) -> String {
    let history = session.history();
    let code_blocks = history
        .iter()
        .filter(|message| message.kind() == MessageKind::Code)
        .count();
    let cwd = std::env::current_dir()
        .map_or_else(|_| "(unavailable)".to_string(), |dir| dir.display().to_string());

    let mut out = String::from("> **System Info**\n\n");
    let _ = writeln!(out, "- Parlor version: `{}`", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(
        out,
        "- Platform: `{} ({}, {})`",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::env::consts::FAMILY
    );
    let _ = writeln!(out, "- Working directory: `{cwd}`");
    out.push_str("\n> **Session**\n\n");
    let _ = writeln!(out, "- Model: `{}`", session.model());
    let _ = writeln!(out, "- Verbose: `{}`", session.verbose());
    let _ = writeln!(
        out,
        "- Messages: `{}` ({code_blocks} code blocks)",
        history.len()
    );
    let _ = writeln!(
        out,
        "- System message: `{} chars`",
        session.system_message().chars().count()
    );
    out
}
