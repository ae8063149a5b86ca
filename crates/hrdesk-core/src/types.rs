use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who authored a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The employee typing into the assistant.
    User,
    /// The HR assistant.
    Bot,
}

/// Delivery progress of a message.
///
/// Only user messages move through the states; bot messages are created
/// as `Delivered`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Submitted locally, not yet acknowledged.
    #[default]
    Sending,
    /// Handed to the HR backend.
    Sent,
    /// The backend answered.
    Delivered,
    /// The backend call failed.
    Error,
}

// =============================================================================
// Newtype Wrappers - Identifiers
// =============================================================================

/// Unique identifier for a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a chat session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Newtype Wrappers - Temporal
// =============================================================================

/// Unix timestamp in milliseconds since epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }

    /// Local wall-clock label (`HH:MM`) used next to transcript lines.
    pub fn clock_label(&self) -> String {
        self.to_datetime()
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}

// =============================================================================
// Message
// =============================================================================

/// A single transcript entry. Held in memory for the session only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub sent_at: Timestamp,
    pub delivery: DeliveryState,
}

impl Message {
    /// A user message with an explicit id, as assigned at submission.
    pub fn user(id: MessageId, text: impl Into<String>, delivery: DeliveryState) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            sent_at: Timestamp::now(),
            delivery,
        }
    }

    /// A bot message. Bot messages are always delivered.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            sender: Sender::Bot,
            sent_at: Timestamp::now(),
            delivery: DeliveryState::Delivered,
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

// =============================================================================
// Tests
// =============================================================================
