//! Routing a raw `%` line to its handler.

use std::time::Duration;

use crate::command::{Command, DEPRECATED_ALIASES, Invocation, deprecation_notice, parse_line};
use crate::edit::EditOptions;
use crate::error::CommandError;
use crate::handlers;
use crate::host::Host;
use crate::Session;

const DEFAULT_ALIAS_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Pause after a deprecated-keyword notice so the user can read it.
    pub alias_delay: Duration,
    pub edit: EditOptions,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            alias_delay: DEFAULT_ALIAS_DELAY,
            edit: EditOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    options: DispatchOptions,
}

impl Dispatcher {
    #[must_use]
    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Run one command line against `session`.
    ///
    /// Failures are reported through `host` as `> ` notices and never
    /// propagate; the session stays usable after any command.
    pub async fn dispatch<H: Host + ?Sized>(&self, session: &mut Session, host: &mut H, line: &str) {
        match parse_line(line) {
            Invocation::Shell(code) => {
                tracing::debug!(code, "Shell escape");
                if let Err(err) = host.run("shell", code, true, true).await {
                    report(host, "%%", &CommandError::Shell(format!("{err:#}")));
                }
                host.print("");
            }
            Invocation::Command { keyword, arguments } => {
                let keyword = self.resolve_alias(host, keyword).await;
                let command = Command::parse(keyword, arguments);
                tracing::debug!(command = command.keyword(), arguments, "Dispatching command");
                if let Err(err) =
                    handlers::execute(command, session, host, &self.options.edit).await
                {
                    report(host, command.keyword(), &err);
                }
            }
        }
    }

    async fn resolve_alias<'k, H: Host + ?Sized>(&self, host: &mut H, keyword: &'k str) -> &'k str {
        let Some(&(old, new)) = DEPRECATED_ALIASES.iter().find(|(old, _)| *old == keyword) else {
            return keyword;
        };
        tracing::info!(old, new, "Deprecated command keyword");
        host.print(&deprecation_notice(old, new));
        host.sleep(self.options.alias_delay).await;
        new
    }
}

fn report<H: Host + ?Sized>(host: &mut H, command: &str, err: &CommandError) {
    tracing::warn!(command, error = %err, "Command failed");
    host.display(&format!("> {err}"));
}
