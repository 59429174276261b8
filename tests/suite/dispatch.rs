//! Command dispatch through the public engine API

use parlor_engine::{Message, Role, Session, TOKENS_DISCLAIMER, help_markdown};

use crate::common::{ScriptedHost, test_dispatcher};

fn conversation() -> Session {
    let mut session = Session::new("gpt-4o", "You are a helpful assistant.");
    let history = session.history_mut();
    history.append(Message::user("hi"));
    history.append(Message::assistant("hello"));
    history.append(Message::code(Some("python".into()), "print(1)"));
    session
}

#[tokio::test]
async fn unknown_keyword_shows_help_and_keeps_history() {
    let mut session = conversation();
    let before = session.history().clone();
    let mut host = ScriptedHost::new();

    test_dispatcher()
        .dispatch(&mut session, &mut host, "%nonsense arg")
        .await;

    assert_eq!(host.displayed, vec!["> Unknown command".to_string(), help_markdown()]);
    assert_eq!(session.history(), &before);
}

#[tokio::test]
async fn help_is_pure() {
    let mut session = conversation();
    let before = session.history().clone();
    let mut host = ScriptedHost::new();

    test_dispatcher().dispatch(&mut session, &mut host, "%help").await;

    assert_eq!(host.displayed, vec![help_markdown()]);
    assert_eq!(session.history(), &before);
    assert!(!session.verbose());
}

#[tokio::test]
async fn tokens_on_empty_session_reports_only_context() {
    let mut session = Session::new("gpt-4o", "");
    let mut host = ScriptedHost::new();

    test_dispatcher().dispatch(&mut session, &mut host, "%tokens").await;

    let lines: Vec<&str> = host.displayed[0].lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("> Tokens sent with next request as context: "));
    assert_eq!(lines[1], TOKENS_DISCLAIMER);
}

#[tokio::test]
async fn tokens_with_prompt_totals_both_parts() {
    let mut session = conversation();
    let mut host = ScriptedHost::new();

    test_dispatcher()
        .dispatch(&mut session, &mut host, "%tokens what does this cost?")
        .await;

    let lines: Vec<&str> = host.displayed[0].lines().collect();
    assert_eq!(lines.len(), 4);

    let count = |line: &str, label: &str| -> u32 {
        line.strip_prefix(label)
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|n| n.parse().ok())
            .expect("token count")
    };
    let context = count(lines[0], "> Tokens sent with next request as context: ");
    let prompt = count(lines[1], "> Tokens used by this prompt: ");
    let total = count(lines[2], "> Total tokens for next request with this prompt: ");

    assert!(context > 0 && prompt > 0);
    assert_eq!(total, context + prompt);
    assert!(lines[0].contains("(Estimated Cost: $"));
}

#[tokio::test]
async fn debug_is_verbose_after_notice() {
    for argument in ["", " true", " false", " nope"] {
        let mut aliased = conversation();
        let mut aliased_host = ScriptedHost::new();
        test_dispatcher()
            .dispatch(&mut aliased, &mut aliased_host, &format!("%debug{argument}"))
            .await;

        let mut direct = conversation();
        let mut direct_host = ScriptedHost::new();
        test_dispatcher()
            .dispatch(&mut direct, &mut direct_host, &format!("%verbose{argument}"))
            .await;

        assert!(aliased_host.printed[0].contains("has been renamed to `%verbose`"));
        assert_eq!(&aliased_host.printed[1..], direct_host.printed.as_slice());
        assert_eq!(aliased_host.displayed, direct_host.displayed);
        assert_eq!(aliased.verbose(), direct.verbose());
    }
}

#[tokio::test]
async fn verbose_elides_inline_images_only() {
    let inline = format!("{}{}", "a".repeat(50), "z".repeat(50));
    let on_disk = format!("/home/user/pictures/{}.png", "p".repeat(60));
    let mut session = Session::new("gpt-4o", "");
    session
        .history_mut()
        .append(Message::image(Role::User, "base64.png", inline.clone()));
    session
        .history_mut()
        .append(Message::image(Role::User, "path", on_disk.clone()));
    let mut host = ScriptedHost::new();

    test_dispatcher().dispatch(&mut session, &mut host, "%verbose true").await;

    let dump = host.printed.join("\n");
    assert!(!dump.contains(&inline));
    assert!(dump.contains(&format!("{}...{}", "a".repeat(30), "z".repeat(30))));
    assert!(dump.contains(&on_disk));
    // The stored record is not modified by the dump.
    assert_eq!(session.history().as_slice()[0].content(), Some(inline.as_str()));
}

#[tokio::test]
async fn shell_escape_bypasses_registry() {
    let mut session = conversation();
    let before = session.history().clone();
    let mut host = ScriptedHost::new();

    test_dispatcher()
        .dispatch(&mut session, &mut host, "%%undo")
        .await;

    assert_eq!(session.history(), &before);
    assert_eq!(host.printed, vec![String::new()]);
}
