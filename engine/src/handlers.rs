//! One function per `%` command.

use parlor_context::{display_path, load_history, resolve_history_path, save_history};
use parlor_types::{Message, elide_middle, preview};

use crate::command::{Command, help_markdown};
use crate::edit::{EditOptions, EditOutcome, EditWorkflow};
use crate::error::CommandError;
use crate::host::Host;
use crate::Session;

const UNDO_PREVIEW_CHARS: usize = 30;
const IMAGE_HEAD_CHARS: usize = 30;
const IMAGE_TAIL_CHARS: usize = 30;

pub const TOKENS_DISCLAIMER: &str = "**Note**: This functionality is currently experimental and may not be accurate. Please report any issues you find on the project tracker.";

pub(crate) async fn execute<H: Host + ?Sized>(
    command: Command<'_>,
    session: &mut Session,
    host: &mut H,
    edit_options: &EditOptions,
) -> Result<(), CommandError> {
    match command {
        Command::Verbose(arguments) => verbose(session, host, arguments),
        Command::SaveMessage(arguments) => save_message(session, host, arguments),
        Command::LoadMessage(arguments) => load_message(session, host, arguments),
        Command::Tokens(prompt) => tokens(session, host, prompt),
        Command::Edit => edit(session, host, edit_options).await,
        Command::Help => {
            help(host);
            Ok(())
        }
        Command::Reset => {
            reset(session, host);
            Ok(())
        }
        Command::Undo => {
            undo(session, host);
            Ok(())
        }
        Command::Info => {
            host.system_info(session);
            Ok(())
        }
        Command::Unknown(keyword) => {
            tracing::debug!(keyword, "Unknown command");
            host.display("> Unknown command");
            help(host);
            Ok(())
        }
    }
}

fn help<H: Host + ?Sized>(host: &mut H) {
    host.display(&help_markdown());
}

/// Drop the last user message and everything after it.
fn undo<H: Host + ?Sized>(session: &mut Session, host: &mut H) {
    if session.history().is_empty() {
        return;
    }
    let index = session.history().last_user_index();
    let removed = session.history_mut().truncate_from(index);
    tracing::debug!(removed = removed.len(), "Undo");

    host.print("");
    for message in &removed {
        if let Some(content) = message.content() {
            let quoted = format!("\"{}\"", preview(content, UNDO_PREVIEW_CHARS));
            host.display(&format!("**Removed message:** {}", code_span(&quoted)));
        } else if message.is_function_call() {
            host.display("**Removed codeblock**");
        }
    }
    host.print("");
}

/// Inline code span holding `text` on one line. The fence is one backtick
/// longer than the longest run inside, so embedded backticks stay literal.
fn code_span(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let mut longest = 0;
    let mut run = 0;
    for c in flat.chars() {
        run = if c == '`' { run + 1 } else { 0 };
        longest = longest.max(run);
    }
    let fence = "`".repeat(longest + 1);
    let pad = if flat.starts_with('`') || flat.ends_with('`') {
        " "
    } else {
        ""
    };
    format!("{fence}{pad}{flat}{pad}{fence}")
}

fn verbose<H: Host + ?Sized>(
    session: &mut Session,
    host: &mut H,
    arguments: &str,
) -> Result<(), CommandError> {
    match arguments {
        "" | "true" => {
            host.display("> Entered verbose mode");
            host.print("\n\nCurrent messages:\n");
            for message in session.history() {
                host.print(&format!("{}\n", dump_message(message)));
            }
            host.print("\n");
            session.set_verbose(true);
        }
        "false" => {
            host.display("> Exited verbose mode");
            session.set_verbose(false);
        }
        _ => return Err(CommandError::UnknownVerboseArgument),
    }
    Ok(())
}

/// JSON form of a message for the verbose dump, with inline image data
/// shortened to its ends.
fn dump_message(message: &Message) -> String {
    let mut shown = message.clone();
    if let Some(content) = message.content().filter(|_| message.is_inline_image()) {
        shown.set_content(elide_middle(content, IMAGE_HEAD_CHARS, IMAGE_TAIL_CHARS));
    }
    serde_json::to_string(&shown).unwrap_or_else(|_| format!("{shown:?}"))
}

fn reset<H: Host + ?Sized>(session: &mut Session, host: &mut H) {
    session.reset();
    host.reset();
    host.display("> Reset Done");
}

fn save_message<H: Host + ?Sized>(
    session: &Session,
    host: &mut H,
    arguments: &str,
) -> Result<(), CommandError> {
    let path = display_path(&resolve_history_path(arguments));
    save_history(session.history(), &path)?;
    host.display(&format!("> messages json export to {}", path.display()));
    Ok(())
}

/// Replace the history from a file. Nothing changes unless the whole file
/// parses.
fn load_message<H: Host + ?Sized>(
    session: &mut Session,
    host: &mut H,
    arguments: &str,
) -> Result<(), CommandError> {
    let path = display_path(&resolve_history_path(arguments));
    let loaded = load_history(&path)?;
    session.history_mut().replace_all(loaded);
    host.display(&format!("> messages json loaded from {}", path.display()));
    Ok(())
}

fn tokens<H: Host + ?Sized>(
    session: &Session,
    host: &mut H,
    prompt: &str,
) -> Result<(), CommandError> {
    let estimator = host.estimator();
    let model = session.model();

    let conversation = estimator.estimate(&session.request_view(), model)?;
    let mut lines = vec![format!(
        "> Tokens sent with next request as context: {} (Estimated Cost: ${})",
        conversation.tokens,
        format_cost(conversation.cost)
    )];

    if !prompt.is_empty() {
        let prompt_only = estimator.estimate(&[Message::user(prompt)], model)?;
        lines.push(format!(
            "> Tokens used by this prompt: {} (Estimated Cost: ${})",
            prompt_only.tokens,
            format_cost(prompt_only.cost)
        ));
        let total = conversation.combined(prompt_only);
        lines.push(format!(
            "> Total tokens for next request with this prompt: {} (Estimated Cost: ${})",
            total.tokens,
            format_cost(total.cost)
        ));
    }
    lines.push(TOKENS_DISCLAIMER.to_string());

    host.display(&lines.join("\n"));
    Ok(())
}

fn format_cost(cost: f64) -> String {
    format!("{cost:.6}")
}

async fn edit<H: Host + ?Sized>(
    session: &mut Session,
    host: &mut H,
    options: &EditOptions,
) -> Result<(), CommandError> {
    let mut workflow = EditWorkflow::new(options);
    match workflow.run(session, host).await? {
        EditOutcome::NothingToEdit => host.display("> No code block to edit."),
        EditOutcome::Abandoned => host.display(
            "> Edit abandoned: no confirmation received. The code block was left unchanged.",
        ),
        EditOutcome::Resubmitted { edits_detected } => {
            tracing::info!(edits_detected, "Edited code block resubmitted");
        }
    }
    Ok(())
}
