//! Core message domain model.
//!
//! A [`Message`] is one turn of the conversation: a user prompt, an assistant
//! reply, a code block the assistant proposed, an image, or a function-call
//! record. The serialized shape is a flat JSON object with `role`, `type` and
//! `content` keys so that saved histories stay readable and editable by hand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The semantic type of a message. Serialized under the `type` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Message,
    Code,
    Image,
}

impl MessageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::Code => "code",
            MessageKind::Image => "image",
        }
    }
}

/// Image payloads stored as a filesystem path rather than inline data.
pub const IMAGE_FORMAT_PATH: &str = "path";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageShapeError {
    #[error("{role} {kind} entry has neither content nor a function_call")]
    MissingContent {
        role: &'static str,
        kind: &'static str,
    },
}

/// Wire representation. Validated into [`Message`] on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageRecord {
    role: Role,
    #[serde(rename = "type", default)]
    kind: MessageKind,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A single conversation turn.
///
/// # Invariants
///
/// - Exactly one semantic [`MessageKind`].
/// - `content` is `None` only when a `function_call` payload is present.
///
/// Fields the model does not know about are kept in `extra` and written back
/// on save, so a load/save cycle never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MessageRecord", into = "MessageRecord")]
pub struct Message {
    role: Role,
    kind: MessageKind,
    content: Option<String>,
    format: Option<String>,
    function_call: Option<Value>,
    extra: Map<String, Value>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = MessageShapeError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        if record.content.is_none() && record.function_call.is_none() {
            return Err(MessageShapeError::MissingContent {
                role: record.role.as_str(),
                kind: record.kind.as_str(),
            });
        }
        Ok(Self {
            role: record.role,
            kind: record.kind,
            content: record.content,
            format: record.format,
            function_call: record.function_call,
            extra: record.extra,
        })
    }
}

impl From<Message> for MessageRecord {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            kind: message.kind,
            content: message.content,
            format: message.format,
            function_call: message.function_call,
            extra: message.extra,
        }
    }
}

impl Message {
    fn text(role: Role, kind: MessageKind, content: String, format: Option<String>) -> Self {
        Self {
            role,
            kind,
            content: Some(content),
            format,
            function_call: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, MessageKind::Message, content.into(), None)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, MessageKind::Message, content.into(), None)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, MessageKind::Message, content.into(), None)
    }

    /// A code block proposed by the assistant. `language` lands in `format`.
    #[must_use]
    pub fn code(language: Option<String>, content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, MessageKind::Code, content.into(), language)
    }

    /// An image, either inline (e.g. `base64.png`) or by path ([`IMAGE_FORMAT_PATH`]).
    #[must_use]
    pub fn image(role: Role, format: impl Into<String>, content: impl Into<String>) -> Self {
        Self::text(role, MessageKind::Image, content.into(), Some(format.into()))
    }

    /// A tool-invocation record. These are the only entries allowed to omit content.
    #[must_use]
    pub fn function_call(role: Role, payload: Value) -> Self {
        Self {
            role,
            kind: MessageKind::Message,
            content: None,
            format: None,
            function_call: Some(payload),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    #[must_use]
    pub fn function_call_payload(&self) -> Option<&Value> {
        self.function_call.as_ref()
    }

    #[must_use]
    pub fn is_function_call(&self) -> bool {
        self.function_call.is_some()
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    #[must_use]
    pub fn is_code(&self) -> bool {
        self.kind == MessageKind::Code
    }

    /// Inline image data that would flood a terminal if printed in full.
    #[must_use]
    pub fn is_inline_image(&self) -> bool {
        self.kind == MessageKind::Image && self.format() != Some(IMAGE_FORMAT_PATH)
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    /// Unknown fields carried through from a loaded file.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
