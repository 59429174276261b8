//! Splitting an assistant reply into prose and code turns.

use parlor_types::Message;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// Break `reply` into history records: prose between fences becomes
/// assistant messages, each fenced code block becomes a code message whose
/// `format` is the fence's language tag.
///
/// Indented code blocks stay part of the surrounding prose.
#[must_use]
pub fn split_reply(reply: &str) -> Vec<Message> {
    let mut out = Vec::new();
    let mut cursor = 0;
    let mut open: Option<(Option<String>, String)> = None;

    for (event, range) in Parser::new(reply).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                push_prose(&mut out, &reply[cursor..range.start]);
                let language = info
                    .split_whitespace()
                    .next()
                    .map(str::to_string);
                open = Some((language, String::new()));
            }
            Event::Text(text) => {
                if let Some((_, body)) = open.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, body)) = open.take() {
                    out.push(Message::code(language, body.trim_end_matches('\n')));
                    cursor = range.end;
                }
            }
            _ => {}
        }
    }

    if let Some((language, body)) = open {
        // Unterminated fence at end of input.
        out.push(Message::code(language, body.trim_end_matches('\n')));
    } else if cursor < reply.len() {
        push_prose(&mut out, &reply[cursor..]);
    }
    out
}

fn push_prose(out: &mut Vec<Message>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        out.push(Message::assistant(text));
    }
}
