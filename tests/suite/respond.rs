//! Reply generation against a mock chat-completions endpoint

use parlor_engine::{ChatClient, ChatResponder, Host, Message, MessageKind, Session};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{ScriptedHost, mount_chat_response, test_dispatcher};

fn responder_for(server: &MockServer) -> ChatResponder {
    let client = ChatClient::new(&server.uri(), "test-key", "gpt-4o").expect("client");
    ChatResponder::new(client)
}

#[tokio::test]
async fn reply_is_stored_as_prose_and_code() {
    let server = MockServer::start().await;
    mount_chat_response(&server, "Here you go:\n\n```shell\nls -la\n```\n\nThat lists files.").await;

    let mut session = Session::new("gpt-4o", "Be helpful.");
    session.history_mut().append(Message::user("list files"));
    let mut host = ScriptedHost::new();
    host.responder = Some(responder_for(&server));

    host.respond(&mut session).await.expect("respond");

    let kinds: Vec<MessageKind> = session.history().iter().map(Message::kind).collect();
    assert_eq!(
        kinds,
        vec![
            MessageKind::Message,
            MessageKind::Message,
            MessageKind::Code,
            MessageKind::Message,
        ]
    );
    assert_eq!(session.history().last_code_index(), Some(2));
}

#[tokio::test]
async fn edit_resubmits_edited_code_to_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "user", "content": "print something"},
                {"role": "assistant", "content": "```python\nprint('edited')\n```"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Looks good."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::new("gpt-4o", "");
    session.history_mut().append(Message::user("print something"));
    session
        .history_mut()
        .append(Message::code(Some("python".into()), "print('original')"));
    let mut host = ScriptedHost::new();
    host.responder = Some(responder_for(&server));
    host.edit_to = Some("print('edited')".to_string());

    test_dispatcher().dispatch(&mut session, &mut host, "%edit").await;

    assert!(host.displayed.is_empty(), "{:?}", host.displayed);
    assert_eq!(
        session.history().last(),
        Some(&Message::assistant("Looks good."))
    );
}

#[tokio::test]
async fn provider_error_after_edit_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let mut session = Session::new("gpt-4o", "");
    session
        .history_mut()
        .append(Message::code(Some("python".into()), "print(1)"));
    let mut host = ScriptedHost::new();
    host.responder = Some(responder_for(&server));

    test_dispatcher().dispatch(&mut session, &mut host, "%edit").await;

    assert_eq!(host.displayed.len(), 1);
    assert!(host.displayed[0].starts_with("> Failed to generate a response"));
    assert!(host.displayed[0].contains("upstream exploded"));
    // The resubmitted block stays in place for a retry.
    assert_eq!(session.history().len(), 1);
}
