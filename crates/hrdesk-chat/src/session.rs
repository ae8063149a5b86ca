//! Chat session driver.
//!
//! `ChatSession` runs the conversation reducer against the HR backend, the
//! escalation hand-off, and the transcript. `ChatService` puts one session
//! behind an mpsc queue so that submissions from any number of callers are
//! applied one turn at a time.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use hrdesk_core::config::ChatConfig;
use hrdesk_core::types::{Message, MessageId, SessionId, Timestamp};
use tokio::sync::{mpsc, oneshot};

use crate::backend::HrBackend;
use crate::conversation::{reduce, ConversationState, Effect, Event};
use crate::error::ChatError;
use crate::escalation::DEFAULT_ESCALATION_THRESHOLD;
use crate::handoff::{EscalationHandoff, EscalationRequest};
use crate::rules::QUICK_ACTIONS;
use crate::transcript::Transcript;

/// Capacity of the submission queue in front of a session.
const COMMAND_QUEUE_CAPACITY: usize = 32;

// =============================================================================
// Options and turn results
// =============================================================================

/// Per-session tunables.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub escalation_threshold: u32,
    pub max_message_length: usize,
    /// Pause before a user message is marked as sent.
    pub delivery_delay: Duration,
}

impl SessionOptions {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            escalation_threshold: config.escalation_threshold,
            max_message_length: config.max_message_length,
            delivery_delay: Duration::from_millis(config.delivery_delay_ms),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            max_message_length: 2000,
            delivery_delay: Duration::ZERO,
        }
    }
}

/// A user-facing error notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

/// What one submission changed.
#[derive(Debug, Clone, Default)]
pub struct TurnOutcome {
    /// Messages appended during the turn, in their final delivery state.
    pub messages: Vec<Message>,
    /// Error notifications raised during the turn.
    pub notices: Vec<Notice>,
    /// True if the support hand-off was invoked.
    pub escalated: bool,
}

// =============================================================================
// ChatSession
// =============================================================================

/// One conversation with its state, transcript, and collaborators.
pub struct ChatSession {
    id: SessionId,
    state: ConversationState,
    transcript: Transcript,
    backend: Arc<dyn HrBackend>,
    handoff: Arc<dyn EscalationHandoff>,
    options: SessionOptions,
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn HrBackend>,
        handoff: Arc<dyn EscalationHandoff>,
        options: SessionOptions,
    ) -> Self {
        let id = SessionId::new();
        tracing::info!(
            session = %id,
            threshold = options.escalation_threshold,
            "Chat session started"
        );
        Self {
            id,
            state: ConversationState::new(options.escalation_threshold),
            transcript: Transcript::new(),
            backend,
            handoff,
            options,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Submit free text and run the turn to completion.
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.options.max_message_length {
            return Err(ChatError::MessageTooLong(self.options.max_message_length));
        }

        self.abandon_stale_turn().await?;

        let mark = self.transcript.len();
        let mut outcome = TurnOutcome::default();
        self.run(
            Event::Submitted {
                id: MessageId::new(),
                text: text.to_string(),
            },
            &mut outcome,
        )
        .await?;
        outcome.messages = self.transcript.since(mark).to_vec();
        Ok(outcome)
    }

    /// Submit one of the preset quick actions by index.
    pub async fn quick_action(&mut self, index: usize) -> Result<TurnOutcome, ChatError> {
        let action = QUICK_ACTIONS
            .get(index)
            .ok_or(ChatError::UnknownQuickAction(index))?;
        self.submit(action).await
    }

    /// `submit` holds `&mut self`, so a turn still pending on entry belongs
    /// to a previous call whose future was dropped mid-turn.
    async fn abandon_stale_turn(&mut self) -> Result<(), ChatError> {
        let Some(id) = self.state.pending().map(|turn| turn.id) else {
            return Ok(());
        };
        self.run(Event::Cancelled { id }, &mut TurnOutcome::default())
            .await
    }

    /// Feed `first` and every follow-up event through the reducer,
    /// performing effects in order.
    async fn run(&mut self, first: Event, outcome: &mut TurnOutcome) -> Result<(), ChatError> {
        let mut queue = VecDeque::from([first]);

        while let Some(event) = queue.pop_front() {
            let (state, effects) = reduce(std::mem::take(&mut self.state), event);
            self.state = state;

            for effect in effects {
                match effect {
                    Effect::AppendUser { id, text, delivery } => {
                        self.transcript.push_user(id, text, delivery);
                    }
                    Effect::AppendBot { text } => self.transcript.push_bot(text),
                    Effect::SetDelivery { id, delivery } => {
                        if !self.transcript.set_delivery(id, delivery) {
                            tracing::warn!(message_id = %id, "delivery update for unknown message");
                        }
                    }
                    Effect::CallBackend { id, text } => {
                        if !self.options.delivery_delay.is_zero() {
                            tokio::time::sleep(self.options.delivery_delay).await;
                        }
                        queue.push_back(Event::Dispatched { id });
                        let reply = match self.backend.ask(&text).await {
                            Ok(answer) => Event::BackendReplied {
                                id,
                                outcome: answer,
                            },
                            Err(e) => Event::BackendFailed {
                                id,
                                reason: e.to_string(),
                            },
                        };
                        queue.push_back(reply);
                    }
                    Effect::Escalate { last_unmatched } => {
                        let request = EscalationRequest {
                            session_id: self.id,
                            requested_at: Timestamp::now(),
                            last_unmatched,
                        };
                        // The acknowledgment is already in the transcript; a
                        // failed hand-off does not roll the conversation back.
                        if let Err(e) = self.handoff.escalate(&request).await {
                            tracing::warn!(
                                session = %self.id,
                                error = %e,
                                "Escalation hand-off failed"
                            );
                        }
                        outcome.escalated = true;
                    }
                    Effect::NotifyError { title, description } => {
                        outcome.notices.push(Notice { title, description });
                    }
                    Effect::Busy => return Err(ChatError::Busy),
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// ChatService
// =============================================================================

enum Command {
    Submit {
        text: String,
        reply: oneshot::Sender<Result<TurnOutcome, ChatError>>,
    },
    QuickAction {
        index: usize,
        reply: oneshot::Sender<Result<TurnOutcome, ChatError>>,
    },
    Transcript {
        reply: oneshot::Sender<Vec<Message>>,
    },
    State {
        reply: oneshot::Sender<ConversationState>,
    },
}

/// Cloneable handle to a session running on its own task.
///
/// The task is the single writer of the session: commands are applied in
/// arrival order and each submission runs to completion before the next
/// one starts.
#[derive(Clone)]
pub struct ChatService {
    session_id: SessionId,
    tx: mpsc::Sender<Command>,
}

impl ChatService {
    /// Move `session` onto a new tokio task.
    pub fn spawn(session: ChatSession) -> Self {
        let session_id = session.id();
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        tokio::spawn(serve(session, rx));
        Self { session_id, tx }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<TurnOutcome, ChatError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit {
            text: text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| ChatError::SessionClosed)?
    }

    pub async fn quick_action(&self, index: usize) -> Result<TurnOutcome, ChatError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::QuickAction { index, reply }).await?;
        rx.await.map_err(|_| ChatError::SessionClosed)?
    }

    pub async fn transcript(&self) -> Result<Vec<Message>, ChatError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Transcript { reply }).await?;
        rx.await.map_err(|_| ChatError::SessionClosed)
    }

    pub async fn state(&self) -> Result<ConversationState, ChatError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::State { reply }).await?;
        rx.await.map_err(|_| ChatError::SessionClosed)
    }

    async fn send(&self, command: Command) -> Result<(), ChatError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| ChatError::SessionClosed)
    }
}

async fn serve(mut session: ChatSession, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Submit { text, reply } => {
                let _ = reply.send(session.submit(&text).await);
            }
            Command::QuickAction { index, reply } => {
                let _ = reply.send(session.quick_action(index).await);
            }
            Command::Transcript { reply } => {
                let _ = reply.send(session.transcript().messages().to_vec());
            }
            Command::State { reply } => {
                let _ = reply.send(session.state().clone());
            }
        }
    }
    tracing::debug!(session = %session.id(), "Chat session closed");
}

// =============================================================================
// Tests
// =============================================================================
