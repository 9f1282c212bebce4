//! Chat transport contract consumed by the core.
//!
//! # Responsibility
//! - Describe where an inbound message came from.
//! - Define the single outbound primitive: send text to a chat.
//!
//! # Invariants
//! - Only group chats carry a group id; private chats never do.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Origin of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    /// Transport-level chat identifier used for replies.
    pub id: String,
    /// Whether the chat is a group. Birthdays are scoped to groups.
    pub is_group: bool,
}

impl Chat {
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_group: true,
        }
    }

    pub fn private(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_group: false,
        }
    }

    /// Group identifier, or `None` for private chats.
    pub fn group_id(&self) -> Option<&str> {
        self.is_group.then_some(self.id.as_str())
    }
}

/// Delivery failure for one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendError {
    pub chat_id: String,
    pub reason: String,
}

impl SendError {
    pub fn new(chat_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            reason: reason.into(),
        }
    }
}

impl Display for SendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to send to chat {}: {}", self.chat_id, self.reason)
    }
}

impl Error for SendError {}

/// Outbound side of the chat transport.
pub trait Transport {
    /// Sends `text` to `chat_id`.
    fn send_text(&self, chat_id: &str, text: &str) -> Result<(), SendError>;
}
