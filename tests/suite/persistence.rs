//! `%save_message` / `%load_message` against real files

use std::path::Path;

use parlor_engine::{Message, Role, Session};
use serde_json::{Value, json};

use crate::common::{ScriptedHost, test_dispatcher};

fn sample_session() -> Session {
    let mut session = Session::new("gpt-4o", "");
    let history = session.history_mut();
    history.append(Message::user("list the files"));
    history.append(Message::code(Some("shell".into()), "ls -la"));
    history.append(Message::function_call(
        Role::Assistant,
        json!({"name": "execute", "arguments": {"language": "shell", "code": "ls -la"}}),
    ));
    history.append(Message::assistant("Done."));
    session
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

#[tokio::test]
async fn save_then_load_restores_every_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = sample_session();
    let saved = session.history().clone();
    let mut host = ScriptedHost::new();
    let dispatcher = test_dispatcher();

    let target = dir.path().join("notes");
    dispatcher
        .dispatch(&mut session, &mut host, &format!("%save_message {}", arg(&target)))
        .await;
    dispatcher.dispatch(&mut session, &mut host, "%reset").await;
    assert!(session.history().is_empty());

    dispatcher
        .dispatch(&mut session, &mut host, &format!("%load_message {}", arg(&target)))
        .await;

    assert_eq!(session.history(), &saved);
    let json_path = dir.path().join("notes.json");
    assert!(
        host.all_displayed()
            .contains(&format!("> messages json loaded from {}", json_path.display()))
    );
}

#[tokio::test]
async fn saved_file_is_two_space_indented_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = sample_session();
    let mut host = ScriptedHost::new();
    let target = dir.path().join("chat.json");

    test_dispatcher()
        .dispatch(&mut session, &mut host, &format!("%save_message {}", arg(&target)))
        .await;

    let raw = std::fs::read_to_string(&target).expect("read");
    assert!(raw.starts_with("[\n  {\n    \"role\": \"user\""));
    let value: Value = serde_json::from_str(&raw).expect("json");
    let entries = value.as_array().expect("array");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[1]["type"], "code");
    assert_eq!(entries[1]["format"], "shell");
    assert!(entries[2]["function_call"].is_object());
    assert_eq!(
        host.displayed,
        vec![format!("> messages json export to {}", target.display())]
    );
}

#[tokio::test]
async fn unknown_fields_survive_a_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("external.json");
    std::fs::write(
        &source,
        r#"[{"role": "user", "type": "message", "content": "hi", "recipient": "bob"}]"#,
    )
    .expect("write");
    let mut session = Session::new("gpt-4o", "");
    let mut host = ScriptedHost::new();
    let dispatcher = test_dispatcher();

    dispatcher
        .dispatch(&mut session, &mut host, &format!("%load_message {}", arg(&source)))
        .await;
    let copy = dir.path().join("copy.json");
    dispatcher
        .dispatch(&mut session, &mut host, &format!("%save_message {}", arg(&copy)))
        .await;

    let value: Value =
        serde_json::from_str(&std::fs::read_to_string(&copy).expect("read")).expect("json");
    assert_eq!(value[0]["recipient"], "bob");
}

#[tokio::test]
async fn failed_loads_are_distinct_and_harmless() {
    let dir = tempfile::tempdir().expect("tempdir");
    let not_json = dir.path().join("garbage.json");
    std::fs::write(&not_json, "{ not json").expect("write");
    let wrong_shape = dir.path().join("object.json");
    std::fs::write(&wrong_shape, r#"{"role": "user"}"#).expect("write");
    let missing = dir.path().join("missing");

    let mut session = sample_session();
    let before = session.history().clone();
    let mut host = ScriptedHost::new();
    let dispatcher = test_dispatcher();

    for path in [&not_json, &wrong_shape, &missing] {
        dispatcher
            .dispatch(&mut session, &mut host, &format!("%load_message {}", arg(path)))
            .await;
    }

    assert_eq!(session.history(), &before);
    assert_eq!(host.displayed.len(), 3);
    assert!(host.displayed[0].contains("garbage.json"));
    assert!(host.displayed[1].contains("object.json"));
    assert!(host.displayed[2].contains("missing.json"));
    assert!(host.displayed.iter().all(|line| line.starts_with("> ")));
    assert!(!host.displayed.iter().any(|line| line.contains("loaded from")));
}
