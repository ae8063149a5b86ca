//! Append-only in-memory transcript.

use hrdesk_core::types::{DeliveryState, Message, MessageId};

use crate::rules::WELCOME_MESSAGE;

/// Messages of one conversation, oldest first.
///
/// Entries are never removed or reordered; only the delivery state of a
/// user message can change after it is appended.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// A transcript that opens with the assistant's greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::bot(WELCOME_MESSAGE)],
        }
    }

    pub fn push_user(&mut self, id: MessageId, text: impl Into<String>, delivery: DeliveryState) {
        self.messages.push(Message::user(id, text, delivery));
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.messages.push(Message::bot(text));
    }

    /// Update the delivery state of a message. Returns false if `id` is unknown.
    pub fn set_delivery(&mut self, id: MessageId, delivery: DeliveryState) -> bool {
        match self.messages.iter_mut().rev().find(|m| m.id == id) {
            Some(message) => {
                message.delivery = delivery;
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages appended at or after position `from`.
    pub fn since(&self, from: usize) -> &[Message] {
        &self.messages[from.min(self.messages.len())..]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
