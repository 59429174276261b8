//! In-memory conversation history.
//!
//! The history is an ordered list of [`Message`]s, oldest first. It only grows
//! by appending; the mutations that shrink it (truncation, bulk replace,
//! clear) always leave the surviving prefix in its original order.

use parlor_types::Message;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Index of the newest message matching `predicate`.
    #[must_use]
    pub fn find_last(&self, predicate: impl Fn(&Message) -> bool) -> Option<usize> {
        self.messages.iter().rposition(predicate)
    }

    #[must_use]
    pub fn last_user_index(&self) -> Option<usize> {
        self.find_last(Message::is_user)
    }

    #[must_use]
    pub fn last_code_index(&self) -> Option<usize> {
        self.find_last(Message::is_code)
    }

    /// Remove and return `[index, len)`.
    ///
    /// `None` and out-of-range indices are no-ops returning an empty list.
    pub fn truncate_from(&mut self, index: Option<usize>) -> Vec<Message> {
        match index {
            Some(index) if index < self.messages.len() => self.messages.split_off(index),
            _ => Vec::new(),
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Re-append a suffix previously taken with [`History::truncate_from`].
    pub fn restore(&mut self, suffix: Vec<Message>) {
        self.messages.extend(suffix);
    }

    /// Swap in a whole new history. The caller validates `other` first;
    /// this cannot fail halfway.
    pub fn replace_all(&mut self, other: History) {
        self.messages = other.messages;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
