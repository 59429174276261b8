//! Token counting using tiktoken.
//!
//! Counts are **approximate**. The `o200k_base` encoding matches current
//! OpenAI models and is a reasonable stand-in for others, whose proprietary
//! tokenizers typically land within 5-10%. The fixed 4-token per-message
//! overhead approximates role markers and delimiters.

use std::sync::OnceLock;

use parlor_types::Message;
use tiktoken_rs::{CoreBPE, o200k_base};

/// Loading the vocabulary is expensive, so one encoder is shared process-wide.
static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn get_encoder() -> Option<&'static CoreBPE> {
    ENCODER.get_or_init(|| o200k_base().ok()).as_ref()
}

const MESSAGE_OVERHEAD: u32 = 4;

/// Approximate token counter backed by a shared `o200k_base` encoder.
///
/// If the encoder cannot be loaded the counter degrades to byte length;
/// [`TokenCounter::is_exact`] reports which mode is active.
///
/// ```
/// use parlor_context::TokenCounter;
///
/// let counter = TokenCounter::new();
/// assert!(counter.count_str("Hello, world!") > 0);
/// ```
#[derive(Clone, Copy)]
pub struct TokenCounter {
    encoder: Option<&'static CoreBPE>,
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoder", &self.encoder.as_ref().map(|_| "<CoreBPE>"))
            .finish()
    }
}

impl TokenCounter {
    #[must_use]
    pub fn new() -> Self {
        let encoder = get_encoder();
        if encoder.is_none() {
            tracing::error!(
                "Failed to initialize tiktoken o200k_base encoder. Falling back to byte-length estimates."
            );
        }

        Self { encoder }
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.encoder.is_some()
    }

    #[must_use]
    pub fn count_str(&self, text: &str) -> u32 {
        let len = match self.encoder {
            Some(encoder) => encoder.encode_ordinary(text).len(),
            None => text.len(),
        };

        u32::try_from(len).unwrap_or(u32::MAX)
    }

    /// Tokens for one message: role, content (or the serialized function
    /// call), any `format` tag, plus [`MESSAGE_OVERHEAD`].
    #[must_use]
    pub fn count_message(&self, msg: &Message) -> u32 {
        let role_tokens = self.count_str(msg.role().as_str());

        let body_tokens = match (msg.content(), msg.function_call_payload()) {
            (Some(content), _) => self.count_str(content),
            (None, Some(payload)) => match serde_json::to_string(payload) {
                Ok(s) => self.count_str(&s),
                Err(_) => 0,
            },
            (None, None) => 0,
        };
        let format_tokens = msg.format().map_or(0, |f| self.count_str(f));

        role_tokens + body_tokens + format_tokens + MESSAGE_OVERHEAD
    }

    #[must_use]
    pub fn count_messages(&self, messages: &[Message]) -> u32 {
        messages.iter().map(|msg| self.count_message(msg)).sum()
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}
