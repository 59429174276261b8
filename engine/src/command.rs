//! Parsing of `%` command lines.

/// Marks a line as a command.
pub const COMMAND_PREFIX: char = '%';

/// Marks a line whose remainder goes straight to the system shell.
pub const SHELL_ESCAPE: &str = "%%";

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub usage: &'static str,
    pub description: &'static str,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        usage: "%% [commands]",
        description: "Run commands in system shell",
    },
    CommandSpec {
        usage: "%verbose [true/false]",
        description: "Toggle verbose mode. Without arguments or with 'true', it enters verbose mode. With 'false', it exits verbose mode.",
    },
    CommandSpec {
        usage: "%reset",
        description: "Resets the current session.",
    },
    CommandSpec {
        usage: "%undo",
        description: "Remove previous messages and its response from the message history.",
    },
    CommandSpec {
        usage: "%save_message [path]",
        description: "Saves messages to a specified JSON path. If no path is provided, it defaults to 'messages.json'.",
    },
    CommandSpec {
        usage: "%load_message [path]",
        description: "Loads messages from a specified JSON path. If no path is provided, it defaults to 'messages.json'.",
    },
    CommandSpec {
        usage: "%tokens [prompt]",
        description: "EXPERIMENTAL: Calculate the tokens used by the next request based on the current conversation's messages and estimate the cost of that request; optionally provide a prompt to also calculate the tokens used by that prompt and the total amount of tokens that will be sent with the next request",
    },
    CommandSpec {
        usage: "%edit",
        description: "Edit the previous code block",
    },
    CommandSpec {
        usage: "%help",
        description: "Show this help message.",
    },
    CommandSpec {
        usage: "%info",
        description: "Show system and interpreter information",
    },
];

const HELP_FOOTER: &str = "For further assistance, run with `RUST_LOG=debug` and check `~/.parlor/logs/parlor.log`, or open an issue on the project tracker.";

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

/// The `%help` text, one bullet per command in table order.
#[must_use]
pub fn help_markdown() -> String {
    let mut out = String::from("> **Available Commands:**\n\n");
    for spec in COMMAND_SPECS {
        out.push_str(&format!("- `{}`: {}\n", spec.usage, spec.description));
    }
    out.push_str("\n\n");
    out.push_str(HELP_FOOTER);
    out
}

/// Renamed keywords still accepted, as `(old, new)`.
pub(crate) const DEPRECATED_ALIASES: &[(&str, &str)] = &[("debug", "verbose")];

pub(crate) fn deprecation_notice(old: &str, new: &str) -> String {
    format!("\n`%{old}` / `--{old}_mode` has been renamed to `%{new}` / `--{new}`.\n")
}

/// A raw input line, split but not yet interpreted.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation<'a> {
    /// `%%<code>`; the code is trimmed.
    Shell(&'a str),
    Command {
        keyword: &'a str,
        arguments: &'a str,
    },
}

/// Split a command line into a keyword and its (trimmed) arguments.
///
/// One leading [`COMMAND_PREFIX`] is stripped if present; the keyword runs to
/// the first whitespace.
#[must_use]
pub fn parse_line(line: &str) -> Invocation<'_> {
    if let Some(code) = line.strip_prefix(SHELL_ESCAPE) {
        return Invocation::Shell(code.trim());
    }
    let body = line.strip_prefix(COMMAND_PREFIX).unwrap_or(line).trim();
    match body.split_once(char::is_whitespace) {
        Some((keyword, arguments)) => Invocation::Command {
            keyword,
            arguments: arguments.trim(),
        },
        None => Invocation::Command {
            keyword: body,
            arguments: "",
        },
    }
}

/// Parsed command with its argument string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Verbose(&'a str),
    Reset,
    Undo,
    SaveMessage(&'a str),
    LoadMessage(&'a str),
    Tokens(&'a str),
    Edit,
    Info,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    #[must_use]
    pub fn parse(keyword: &'a str, arguments: &'a str) -> Self {
        match keyword {
            "help" => Command::Help,
            "verbose" => Command::Verbose(arguments),
            "reset" => Command::Reset,
            "undo" => Command::Undo,
            "save_message" => Command::SaveMessage(arguments),
            "load_message" => Command::LoadMessage(arguments),
            "tokens" => Command::Tokens(arguments),
            "edit" => Command::Edit,
            "info" => Command::Info,
            other => Command::Unknown(other),
        }
    }

    #[must_use]
    pub fn keyword(&self) -> &'a str {
        match self {
            Command::Help => "help",
            Command::Verbose(_) => "verbose",
            Command::Reset => "reset",
            Command::Undo => "undo",
            Command::SaveMessage(_) => "save_message",
            Command::LoadMessage(_) => "load_message",
            Command::Tokens(_) => "tokens",
            Command::Edit => "edit",
            Command::Info => "info",
            Command::Unknown(keyword) => keyword,
        }
    }
}
