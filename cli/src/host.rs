//! The terminal implementation of [`Host`].

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use parlor_engine::{
    Ack, ChatResponder, Host, HostFut, Message, MessageKind, NoticeSink, Session,
    TiktokenEstimator, TokenEstimator,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::markdown::render_markdown;
use crate::shell::{DetectedShell, detect_shell, run_shell};

pub struct TerminalHost {
    input: Lines<BufReader<Stdin>>,
    color: bool,
    storage: PathBuf,
    estimator: TiktokenEstimator,
    responder: Option<ChatResponder>,
    shell: DetectedShell,
}

impl TerminalHost {
    pub fn new(storage: PathBuf, responder: Option<ChatResponder>) -> Self {
        let shell = detect_shell();
        tracing::info!(shell = %shell, storage = %storage.display(), "Terminal host ready");
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            color: io::stdout().is_terminal(),
            storage,
            estimator: TiktokenEstimator::new(),
            responder,
            shell,
        }
    }

    /// Next line of user input, or `None` at end of input.
    pub async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        self.input.next_line().await
    }
}

/// Markdown for a stored turn, re-fencing code so it renders as a block.
fn turn_markdown(turn: &Message) -> String {
    let content = turn.content().unwrap_or_default();
    match turn.kind() {
        MessageKind::Code => format!("```{}\n{content}\n```", turn.format().unwrap_or_default()),
        MessageKind::Message | MessageKind::Image => content.to_string(),
    }
}

impl Host for TerminalHost {
    fn display(&mut self, markdown: &str) {
        println!("{}", render_markdown(markdown, self.color));
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }

    fn notice_sink(&self) -> NoticeSink {
        Arc::new(|line: &str| println!("{line}"))
    }

    fn run<'a>(
        &'a mut self,
        language: &'a str,
        code: &'a str,
        stream: bool,
        display: bool,
    ) -> HostFut<'a, anyhow::Result<()>> {
        Box::pin(async move {
            if language != "shell" {
                return Err(anyhow!("no runner for language `{language}`"));
            }
            run_shell(&self.shell, code, stream, display).await
        })
    }

    fn storage_path(&self) -> PathBuf {
        self.storage.clone()
    }

    fn estimator(&self) -> &dyn TokenEstimator {
        &self.estimator
    }

    fn wait_for_ack(&mut self, timeout: Option<Duration>) -> HostFut<'_, io::Result<Ack>> {
        Box::pin(async move {
            let read = self.input.next_line();
            // End of input counts as confirmation.
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, read).await {
                    Ok(line) => line.map(|_| Ack::Received),
                    Err(_) => Ok(Ack::TimedOut),
                },
                None => read.await.map(|_| Ack::Received),
            }
        })
    }

    fn respond<'a>(&'a mut self, session: &'a mut Session) -> HostFut<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let Some(responder) = self.responder.as_ref() else {
                return Err(anyhow!(
                    "No API key configured. Set PARLOR_API_KEY or [api].api_key in ~/.parlor/config.toml."
                ));
            };
            let turns = responder.respond(session).await?;
            for turn in &turns {
                let markdown = turn_markdown(turn);
                self.display(&markdown);
            }
            Ok(())
        })
    }
}
