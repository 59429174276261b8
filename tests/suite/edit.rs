//! `%edit` end to end with a scripted editor

use parlor_engine::{
    Ack, EDITED_NOTICE, MONITORING_PROMPT, Message, SCRATCH_FILE_NAME, SUBMITTED_NOTICE, Session,
};

use crate::common::{ScriptedHost, test_dispatcher};

fn with_code_block() -> Session {
    let mut session = Session::new("gpt-4o", "");
    let history = session.history_mut();
    history.append(Message::user("sum two numbers"));
    history.append(Message::code(Some("python".into()), "print(1 + 1)"));
    history.append(Message::assistant("That prints 2."));
    session
}

#[tokio::test]
async fn edited_code_replaces_block_and_triggers_reply() {
    let mut session = with_code_block();
    let mut host = ScriptedHost::new();
    host.edit_to = Some("print(2 + 2)".to_string());

    test_dispatcher().dispatch(&mut session, &mut host, "%edit").await;

    let scratch = host.storage_dir().join(SCRATCH_FILE_NAME);
    assert_eq!(host.opened, vec![scratch]);
    assert_eq!(
        session.history().as_slice(),
        [
            Message::user("sum two numbers"),
            Message::code(Some("python".into()), "print(2 + 2)"),
        ]
    );
    assert_eq!(host.respond_calls, 1);
    assert_eq!(host.printed, vec![MONITORING_PROMPT, SUBMITTED_NOTICE]);
    assert_eq!(host.notices.lock().expect("lock").as_slice(), [EDITED_NOTICE]);
    assert!(host.displayed.is_empty(), "{:?}", host.displayed);
}

#[tokio::test]
async fn scratch_file_holds_original_code() {
    let mut session = with_code_block();
    let mut host = ScriptedHost::new();

    test_dispatcher().dispatch(&mut session, &mut host, "%edit").await;

    let scratch = host.storage_dir().join(SCRATCH_FILE_NAME);
    assert_eq!(
        std::fs::read_to_string(scratch).expect("scratch"),
        "print(1 + 1)"
    );
    // Unchanged content is still resubmitted.
    assert_eq!(
        session.history().last(),
        Some(&Message::code(Some("python".into()), "print(1 + 1)"))
    );
    assert!(host.notices.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn nothing_to_edit_writes_no_file() {
    let mut session = Session::new("gpt-4o", "");
    session.history_mut().append(Message::user("hello"));
    let mut host = ScriptedHost::new();

    test_dispatcher().dispatch(&mut session, &mut host, "%edit").await;

    assert!(!host.storage_dir().join(SCRATCH_FILE_NAME).exists());
    assert_eq!(host.displayed, vec!["> No code block to edit.".to_string()]);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn opener_failure_keeps_history_and_skips_watch() {
    let mut session = with_code_block();
    let before = session.history().clone();
    let mut host = ScriptedHost::new();
    host.fail_open = true;

    test_dispatcher().dispatch(&mut session, &mut host, "%edit").await;

    assert_eq!(session.history(), &before);
    assert!(host.printed.is_empty());
    assert_eq!(host.respond_calls, 0);
    assert!(host.displayed[0].contains("no opener"));
}

#[tokio::test]
async fn timed_out_edit_is_abandoned() {
    let mut session = with_code_block();
    let before = session.history().clone();
    let mut host = ScriptedHost::new();
    host.ack = Ack::TimedOut;
    host.edit_to = Some("print('ignored')".to_string());

    test_dispatcher().dispatch(&mut session, &mut host, "%edit").await;

    assert_eq!(session.history(), &before);
    assert_eq!(host.respond_calls, 0);
    assert_eq!(host.printed, vec![MONITORING_PROMPT]);
    assert!(host.displayed[0].starts_with("> Edit abandoned"));
}
