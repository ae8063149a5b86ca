//! Conversational core of HR Desk.
//!
//! Keyword-based response matching, the escalation tracker, the pure
//! conversation reducer, and the session driver that runs it against the
//! HR backend and the support hand-off.

pub mod backend;
pub mod conversation;
pub mod error;
pub mod escalation;
pub mod handoff;
pub mod matcher;
pub mod rules;
pub mod session;
pub mod transcript;

pub use backend::{HrBackend, SimulatedBackend};
pub use conversation::{reduce, ConversationState, Effect, Event};
pub use error::ChatError;
pub use escalation::{ConfirmationReply, EscalationTracker, Mode, TrackerOutput};
pub use handoff::{EscalationHandoff, EscalationRequest, LoggingHandoff};
pub use matcher::{MatchOutcome, ResponseMatcher};
pub use rules::{ResponseRule, RuleBook, QUICK_ACTIONS, WELCOME_MESSAGE};
pub use session::{ChatService, ChatSession, Notice, SessionOptions, TurnOutcome};
pub use transcript::Transcript;
