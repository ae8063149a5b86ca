//! Escalation hand-off to human support.
//!
//! The real support channel is left to the integrator; the bundled
//! implementation only logs the request.

use async_trait::async_trait;
use hrdesk_core::types::{SessionId, Timestamp};

use crate::error::ChatError;

/// Context passed to the support channel when a user accepts escalation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationRequest {
    pub session_id: SessionId,
    pub requested_at: Timestamp,
    /// The unmatched question that triggered the offer, if known.
    pub last_unmatched: Option<String>,
}

/// Notifies an external support channel that a user needs a human.
#[async_trait]
pub trait EscalationHandoff: Send + Sync {
    async fn escalate(&self, request: &EscalationRequest) -> Result<(), ChatError>;
}

/// Hand-off stub that records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandoff;

#[async_trait]
impl EscalationHandoff for LoggingHandoff {
    async fn escalate(&self, request: &EscalationRequest) -> Result<(), ChatError> {
        tracing::info!(
            session = %request.session_id,
            requested_at = request.requested_at.0,
            last_unmatched = request.last_unmatched.as_deref().unwrap_or(""),
            "Escalation requested: routing user to support team"
        );
        Ok(())
    }
}
