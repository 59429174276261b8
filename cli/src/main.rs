//! Parlor CLI - binary entry point and REPL loop.
//!
//! ```text
//! main() -> init_tracing() -> ParlorConfig::load() -> repl()
//!                                                      |
//!                   "%..." line ──► Dispatcher::dispatch(session, host, line)
//!                   other line ──► append user turn ──► Host::respond
//! ```
//!
//! All output goes to stdout; logs go to `~/.parlor/logs/parlor.log` so
//! they never interleave with the conversation.

mod host;
mod markdown;
mod shell;

use std::{
    env,
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use parlor_engine::{
    COMMAND_PREFIX, ChatClient, ChatResponder, DEFAULT_BASE_URL, Dispatcher, Host, Message,
    ParlorConfig, Session, storage_path,
};

use crate::host::TerminalHost;

const PROMPT: &str = "> ";
const WELCOME: &str = "**Parlor** ready. Type `%help` for commands, Ctrl-D to exit.";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_parlor_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: drop logs rather than interleave them with the REPL.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_parlor_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in parlor_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn parlor_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.parlor/logs/parlor.log
    if let Some(dir) = parlor_engine::parlor_dir() {
        candidates.push(dir.join("logs").join("parlor.log"));
    }

    // Fallback: ./.parlor/logs/parlor.log
    candidates.push(PathBuf::from(".parlor").join("logs").join("parlor.log"));

    candidates
}

fn build_responder(config: &ParlorConfig, model: &str) -> Option<ChatResponder> {
    let Some(api_key) = config.api_key() else {
        tracing::warn!("No API key configured; replies are disabled");
        return None;
    };
    let base_url = config
        .base_url()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    match ChatClient::new(&base_url, api_key, model) {
        Ok(client) => Some(ChatResponder::new(client)),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to create chat client");
            None
        }
    }
}

async fn repl(mut session: Session, mut host: TerminalHost, dispatcher: Dispatcher) -> Result<()> {
    host.display(WELCOME);

    while let Some(line) = host.read_line(PROMPT).await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(COMMAND_PREFIX) {
            dispatcher.dispatch(&mut session, &mut host, line).await;
            continue;
        }

        session.history_mut().append(Message::user(line));
        if let Err(err) = host.respond(&mut session).await {
            tracing::warn!(error = %err, "Response failed");
            host.display(&format!("> {err:#}"));
        }
    }

    tracing::info!(messages = session.history().len(), "Input closed, exiting");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match ParlorConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("Ignoring config at {}: {err}", err.path().display());
            ParlorConfig::default()
        }
    };

    let model = config.model();
    let mut session = Session::new(model.clone(), config.system_message());
    if env::args().skip(1).any(|arg| arg == "--verbose") {
        session.set_verbose(true);
    }

    let host = TerminalHost::new(storage_path(), build_responder(&config, &model));
    let dispatcher = Dispatcher::new(config.dispatch_options());
    tracing::info!(model = %model, "Starting REPL");

    repl(session, host, dispatcher).await
}
