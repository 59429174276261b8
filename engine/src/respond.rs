//! Turning the history into a chat request and storing the reply.

use parlor_providers::{ChatClient, ChatMessage, ProviderError};
use parlor_types::{Message, MessageKind};

use crate::Session;
use crate::reply::split_reply;

/// Generates assistant turns through an OpenAI-compatible endpoint.
#[derive(Debug)]
pub struct ChatResponder {
    client: ChatClient,
}

impl ChatResponder {
    #[must_use]
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// Request a reply for the current history, append it (split into prose
    /// and code turns), and return the appended records.
    pub async fn respond(&self, session: &mut Session) -> Result<Vec<Message>, ProviderError> {
        let request = chat_messages(session);
        let reply = self.client.complete(&request).await?;
        let turns = split_reply(&reply);
        tracing::info!(
            model = self.client.model(),
            turns = turns.len(),
            "Stored assistant reply"
        );
        for turn in &turns {
            session.history_mut().append(turn.clone());
        }
        Ok(turns)
    }
}

/// Wire messages for the next request.
///
/// Code turns are re-fenced so the model sees them as it wrote them.
/// Function-call records and images have no text form and are left out.
#[must_use]
pub fn chat_messages(session: &Session) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(session.history().len() + 1);
    if !session.system_message().is_empty() {
        out.push(ChatMessage::new("system", session.system_message()));
    }

    for message in session.history() {
        let Some(content) = message.content() else {
            continue;
        };
        let text = match message.kind() {
            MessageKind::Message => content.to_string(),
            MessageKind::Code => {
                format!("```{}\n{content}\n```", message.format().unwrap_or_default())
            }
            MessageKind::Image => {
                tracing::debug!(role = %message.role(), "Skipping image turn in chat request");
                continue;
            }
        };
        out.push(ChatMessage::new(message.role().as_str(), text));
    }
    out
}

#[cfg(test)]
mod tests {
    use parlor_providers::{ChatClient, ChatMessage};
    use parlor_types::{Message, Role};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ChatResponder, chat_messages};
    use crate::Session;

    #[test]
    fn code_turns_are_fenced_and_calls_skipped() {
        let mut session = Session::new("gpt-4o", "Be brief.");
        let history = session.history_mut();
        history.append(Message::user("list files"));
        history.append(Message::code(Some("shell".into()), "ls"));
        history.append(Message::function_call(
            Role::Assistant,
            json!({"name": "execute", "arguments": "{}"}),
        ));
        history.append(Message::image(Role::User, "base64.png", "iVBORw0KGgo"));

        let wire = chat_messages(&session);

        assert_eq!(
            wire,
            vec![
                ChatMessage::new("system", "Be brief."),
                ChatMessage::new("user", "list files"),
                ChatMessage::new("assistant", "```shell\nls\n```"),
            ]
        );
    }

    #[test]
    fn empty_system_message_is_omitted() {
        let mut session = Session::new("gpt-4o", "");
        session.history_mut().append(Message::user("hi"));
        assert_eq!(chat_messages(&session), vec![ChatMessage::new("user", "hi")]);
    }

    #[tokio::test]
    async fn reply_is_split_and_appended() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [{"role": "user", "content": "print one"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": "Sure:\n\n```python\nprint(1)\n```"
                }}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "key", "gpt-4o").expect("client");
        let responder = ChatResponder::new(client);
        let mut session = Session::new("gpt-4o", "");
        session.history_mut().append(Message::user("print one"));

        let turns = responder.respond(&mut session).await.expect("respond");

        assert_eq!(turns.len(), 2);
        assert_eq!(session.history().len(), 3);
        assert_eq!(
            session.history().last(),
            Some(&Message::code(Some("python".into()), "print(1)"))
        );
    }
}
