//! Shared test utilities and fixtures
//!
//! A scripted [`Host`] that records everything the engine shows and lets a
//! test play the part of the user and the editor.

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use parlor_engine::{
    Ack, ChatResponder, DispatchOptions, Dispatcher, EditOptions, Host, HostFut, NoticeSink,
    Session, TiktokenEstimator, TokenEstimator,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct ScriptedHost {
    pub displayed: Vec<String>,
    pub printed: Vec<String>,
    pub notices: Arc<Mutex<Vec<String>>>,
    pub opened: Vec<PathBuf>,
    pub fail_open: bool,
    /// Replaces the opened file's contents before the ack, as an editor would.
    pub edit_to: Option<String>,
    pub ack: Ack,
    pub respond_calls: usize,
    pub responder: Option<ChatResponder>,
    estimator: TiktokenEstimator,
    storage: tempfile::TempDir,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            displayed: Vec::new(),
            printed: Vec::new(),
            notices: Arc::new(Mutex::new(Vec::new())),
            opened: Vec::new(),
            fail_open: false,
            edit_to: None,
            ack: Ack::Received,
            respond_calls: 0,
            responder: None,
            estimator: TiktokenEstimator::new(),
            storage: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        self.storage.path()
    }

    pub fn all_displayed(&self) -> String {
        self.displayed.join("\n")
    }
}

impl Host for ScriptedHost {
    fn display(&mut self, markdown: &str) {
        self.displayed.push(markdown.to_string());
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }

    fn notice_sink(&self) -> NoticeSink {
        let notices = Arc::clone(&self.notices);
        Arc::new(move |line: &str| notices.lock().expect("lock").push(line.to_string()))
    }

    fn run<'a>(
        &'a mut self,
        _language: &'a str,
        _code: &'a str,
        _stream: bool,
        _display: bool,
    ) -> HostFut<'a, anyhow::Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn storage_path(&self) -> PathBuf {
        self.storage.path().to_path_buf()
    }

    fn estimator(&self) -> &dyn TokenEstimator {
        &self.estimator
    }

    fn open_in_editor<'a>(&'a mut self, path: &'a Path) -> HostFut<'a, io::Result<()>> {
        let result = if self.fail_open {
            Err(io::Error::new(io::ErrorKind::NotFound, "no opener"))
        } else {
            self.opened.push(path.to_path_buf());
            Ok(())
        };
        Box::pin(std::future::ready(result))
    }

    fn wait_for_ack(&mut self, _timeout: Option<Duration>) -> HostFut<'_, io::Result<Ack>> {
        let edit = self.edit_to.clone();
        let target = self.opened.last().cloned();
        let ack = self.ack;
        Box::pin(async move {
            if let (Some(content), Some(path)) = (edit, target) {
                // Let the watcher see the save before confirming.
                tokio::time::sleep(Duration::from_millis(20)).await;
                std::fs::write(&path, content)?;
                // Coarse filesystem clocks may not move on their own.
                let file = std::fs::OpenOptions::new().write(true).open(&path)?;
                file.set_modified(std::time::SystemTime::now() + Duration::from_secs(60))?;
                drop(file);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(ack)
        })
    }

    fn respond<'a>(&'a mut self, session: &'a mut Session) -> HostFut<'a, anyhow::Result<()>> {
        Box::pin(async move {
            self.respond_calls += 1;
            if let Some(responder) = self.responder.as_ref() {
                responder.respond(session).await?;
            }
            Ok(())
        })
    }

    fn sleep(&mut self, _duration: Duration) -> HostFut<'_, ()> {
        Box::pin(async {})
    }
}

/// Dispatcher with no alias pause and a fast edit watcher.
pub fn test_dispatcher() -> Dispatcher {
    Dispatcher::new(DispatchOptions {
        alias_delay: Duration::ZERO,
        edit: EditOptions {
            poll_interval: Duration::from_millis(5),
            ack_timeout: None,
        },
    })
}

/// Mount a non-streaming chat completion reply.
pub async fn mount_chat_response(server: &MockServer, response_content: &str) {
    let body = serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_234_567_890,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": response_content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
