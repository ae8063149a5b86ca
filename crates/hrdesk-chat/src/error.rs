//! Error types for the conversational core.

use hrdesk_core::error::HrDeskError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("unknown quick action: {0}")]
    UnknownQuickAction(usize),
    #[error("rule set error: {0}")]
    RulesError(String),
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("backend error: {0}")]
    BackendError(String),
    #[error("hand-off error: {0}")]
    HandoffError(String),
    #[error("a previous message is still being answered")]
    Busy,
    #[error("chat session is closed")]
    SessionClosed,
}

impl From<HrDeskError> for ChatError {
    fn from(err: HrDeskError) -> Self {
        match err {
            HrDeskError::Rules(msg) | HrDeskError::Serialization(msg) => {
                ChatError::RulesError(msg)
            }
            HrDeskError::Config(msg) => ChatError::ConfigError(msg),
            HrDeskError::Io(e) => ChatError::IoError(e.to_string()),
            other => ChatError::ConfigError(other.to_string()),
        }
    }
}
