//! Per-REPL conversation state.

use parlor_context::History;
use parlor_types::Message;

/// Everything a command handler may read or mutate.
///
/// The model and system message are fixed for the lifetime of a session;
/// handlers only read them (the system message is used for token accounting).
#[derive(Debug, Clone)]
pub struct Session {
    history: History,
    verbose: bool,
    model: String,
    system_message: String,
}

impl Session {
    #[must_use]
    pub fn new(model: impl Into<String>, system_message: impl Into<String>) -> Self {
        Self {
            history: History::new(),
            verbose: false,
            model: model.into(),
            system_message: system_message.into(),
        }
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Messages as the next request would see them: the system message
    /// followed by the whole history.
    #[must_use]
    pub fn request_view(&self) -> Vec<Message> {
        std::iter::once(Message::system(self.system_message.clone()))
            .chain(self.history.iter().cloned())
            .collect()
    }

    /// Drop the conversation and leave verbose mode.
    pub fn reset(&mut self) {
        self.history.clear();
        self.verbose = false;
        tracing::info!(model = %self.model, "Session reset");
    }
}
