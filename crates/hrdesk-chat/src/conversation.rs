//! Conversation reducer.
//!
//! All conversation state changes go through [`reduce`], a pure
//! `(state, event) -> (state, effects)` function. The session driver
//! performs the effects (transcript writes, backend calls, hand-off) and
//! feeds the results back as events.

use hrdesk_core::types::{DeliveryState, MessageId};

use crate::escalation::{EscalationTracker, Mode, TrackerOutput};
use crate::matcher::MatchOutcome;

pub const ERROR_TITLE: &str = "Connection Error";
pub const ERROR_DESCRIPTION: &str = "Failed to connect to HR system. Please try again.";

// =============================================================================
// State
// =============================================================================

/// A user turn waiting on the HR backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub id: MessageId,
    pub text: String,
}

/// Everything the reducer needs to decide the next turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    tracker: EscalationTracker,
    pending: Option<PendingTurn>,
    last_unmatched: Option<String>,
}

impl ConversationState {
    pub fn new(escalation_threshold: u32) -> Self {
        Self {
            tracker: EscalationTracker::new(escalation_threshold),
            pending: None,
            last_unmatched: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.tracker.mode()
    }

    pub fn irrelevant_streak(&self) -> u32 {
        self.tracker.streak()
    }

    pub fn pending(&self) -> Option<&PendingTurn> {
        self.pending.as_ref()
    }

    /// True while a backend call is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// The unmatched input that triggered the open (or last) escalation offer.
    pub fn last_unmatched(&self) -> Option<&str> {
        self.last_unmatched.as_deref()
    }
}

// =============================================================================
// Events and effects
// =============================================================================

/// Inputs to the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user submitted text (typed or a quick action).
    Submitted { id: MessageId, text: String },
    /// The user message was handed to the backend.
    Dispatched { id: MessageId },
    /// The backend answered the pending turn.
    BackendReplied { id: MessageId, outcome: MatchOutcome },
    /// The backend call for the pending turn failed.
    BackendFailed { id: MessageId, reason: String },
    /// The pending turn was abandoned before the backend answered.
    Cancelled { id: MessageId },
}

/// Work the driver must carry out, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AppendUser {
        id: MessageId,
        text: String,
        delivery: DeliveryState,
    },
    AppendBot {
        text: String,
    },
    SetDelivery {
        id: MessageId,
        delivery: DeliveryState,
    },
    CallBackend {
        id: MessageId,
        text: String,
    },
    /// Notify the external support channel.
    Escalate {
        last_unmatched: Option<String>,
    },
    NotifyError {
        title: String,
        description: String,
    },
    /// The submission was refused because a turn is still in flight.
    Busy,
}

// =============================================================================
// Reducer
// =============================================================================

/// Apply one event to the conversation.
pub fn reduce(mut state: ConversationState, event: Event) -> (ConversationState, Vec<Effect>) {
    let mut effects = Vec::new();

    match event {
        Event::Submitted { id, text } => {
            if text.trim().is_empty() {
                return (state, effects);
            }
            if state.is_busy() {
                effects.push(Effect::Busy);
                return (state, effects);
            }

            if state.tracker.is_awaiting_confirmation() {
                // Consumed as a yes/no answer only; never matched.
                effects.push(Effect::AppendUser {
                    id,
                    text: text.clone(),
                    delivery: DeliveryState::Delivered,
                });
                let output = state.tracker.answer(&text);
                push_tracker_message(&mut effects, output);
                if output == TrackerOutput::Confirmed {
                    effects.push(Effect::Escalate {
                        last_unmatched: state.last_unmatched.take(),
                    });
                } else if output == TrackerOutput::Declined {
                    state.last_unmatched = None;
                }
                return (state, effects);
            }

            effects.push(Effect::AppendUser {
                id,
                text: text.clone(),
                delivery: DeliveryState::Sending,
            });
            effects.push(Effect::CallBackend {
                id,
                text: text.clone(),
            });
            state.pending = Some(PendingTurn { id, text });
        }

        Event::Dispatched { id } => {
            if is_pending(&state, id) {
                effects.push(Effect::SetDelivery {
                    id,
                    delivery: DeliveryState::Sent,
                });
            }
        }

        Event::BackendReplied { id, outcome } => {
            if !is_pending(&state, id) {
                tracing::warn!(message_id = %id, "reply for a turn that is not pending; ignored");
                return (state, effects);
            }
            let turn = state.pending.take();

            effects.push(Effect::AppendBot { text: outcome.text });
            effects.push(Effect::SetDelivery {
                id,
                delivery: DeliveryState::Delivered,
            });

            let output = state.tracker.record(outcome.irrelevant);
            if output == TrackerOutput::EscalationOffered {
                state.last_unmatched = turn.map(|t| t.text);
            }
            push_tracker_message(&mut effects, output);
        }

        Event::BackendFailed { id, reason } => {
            if !is_pending(&state, id) {
                tracing::warn!(message_id = %id, "failure for a turn that is not pending; ignored");
                return (state, effects);
            }
            tracing::warn!(message_id = %id, reason = %reason, "HR backend call failed");
            state.pending = None;

            effects.push(Effect::SetDelivery {
                id,
                delivery: DeliveryState::Error,
            });
            effects.push(Effect::NotifyError {
                title: ERROR_TITLE.to_string(),
                description: ERROR_DESCRIPTION.to_string(),
            });
        }

        Event::Cancelled { id } => {
            if !is_pending(&state, id) {
                return (state, effects);
            }
            tracing::warn!(message_id = %id, "pending turn abandoned before the reply");
            state.pending = None;
            effects.push(Effect::SetDelivery {
                id,
                delivery: DeliveryState::Error,
            });
        }
    }

    (state, effects)
}

fn is_pending(state: &ConversationState, id: MessageId) -> bool {
    state.pending.as_ref().is_some_and(|p| p.id == id)
}

fn push_tracker_message(effects: &mut Vec<Effect>, output: TrackerOutput) {
    if let Some(text) = output.message() {
        effects.push(Effect::AppendBot {
            text: text.to_string(),
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
