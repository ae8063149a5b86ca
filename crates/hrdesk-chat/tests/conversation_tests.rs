//! End-to-end conversation tests.
//!
//! Drive full sessions through the public API with an instant simulated
//! backend and a recording hand-off, checking the matching and escalation
//! behavior as a user would observe it in the transcript.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use hrdesk_chat::escalation::{
    CONNECTING_MESSAGE, DECLINED_MESSAGE, ESCALATION_PROMPT, REPROMPT_MESSAGE,
};
use hrdesk_chat::{
    ChatError, ChatService, ChatSession, EscalationHandoff, EscalationRequest, HrBackend,
    MatchOutcome, Mode, ResponseMatcher, ResponseRule, RuleBook, SessionOptions,
    SimulatedBackend,
};
use hrdesk_core::types::{DeliveryState, Sender};

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct RecordingHandoff {
    requests: Mutex<Vec<EscalationRequest>>,
}

impl RecordingHandoff {
    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl EscalationHandoff for RecordingHandoff {
    async fn escalate(&self, request: &EscalationRequest) -> Result<(), ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Backend that counts how often the matcher is consulted.
struct CountingBackend {
    matcher: ResponseMatcher,
    calls: AtomicUsize,
}

#[async_trait]
impl HrBackend for CountingBackend {
    async fn ask(&self, text: &str) -> Result<MatchOutcome, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.matcher.respond(text))
    }
}

fn leave_rules() -> Arc<RuleBook> {
    Arc::new(
        RuleBook::new(
            vec![
                ResponseRule::new(["leave balance"], "You have 12 days left."),
                ResponseRule::new(["payroll", "salary"], "Payroll runs monthly."),
            ],
            "I don't know about \"{message}\" yet.",
        )
        .unwrap(),
    )
}

struct Harness {
    session: ChatSession,
    handoff: Arc<RecordingHandoff>,
    backend: Arc<CountingBackend>,
}

fn harness() -> Harness {
    let handoff = Arc::new(RecordingHandoff::default());
    let backend = Arc::new(CountingBackend {
        matcher: ResponseMatcher::new(leave_rules()),
        calls: AtomicUsize::new(0),
    });
    let session = ChatSession::new(backend.clone(), handoff.clone(), SessionOptions::default());
    Harness {
        session,
        handoff,
        backend,
    }
}

async fn reach_confirmation(h: &mut Harness) {
    for _ in 0..3 {
        h.session.submit("purple elephant").await.unwrap();
    }
    assert_eq!(h.session.state().mode(), Mode::AwaitingConfirmation);
}

// =============================================================================
// Matching
// =============================================================================

#[tokio::test]
async fn test_keyword_input_gets_rule_response() {
    let mut h = harness();
    let turn = h.session.submit("What's my leave balance?").await.unwrap();
    let bot = turn.messages.last().unwrap();
    assert_eq!(bot.sender, Sender::Bot);
    assert_eq!(bot.text, "You have 12 days left.");
    assert_eq!(h.session.state().irrelevant_streak(), 0);
}

#[tokio::test]
async fn test_unmatched_input_echoed_in_default() {
    let mut h = harness();
    let turn = h.session.submit("Purple Elephant").await.unwrap();
    assert_eq!(
        turn.messages.last().unwrap().text,
        "I don't know about \"Purple Elephant\" yet."
    );
    assert_eq!(h.session.state().irrelevant_streak(), 1);
}

#[tokio::test]
async fn test_user_message_ends_delivered() {
    let mut h = harness();
    let turn = h.session.submit("salary").await.unwrap();
    assert_eq!(turn.messages[0].sender, Sender::User);
    assert_eq!(turn.messages[0].delivery, DeliveryState::Delivered);
}

// =============================================================================
// Escalation
// =============================================================================

#[tokio::test]
async fn test_third_irrelevant_turn_ends_with_prompt() {
    let mut h = harness();
    let first = h.session.submit("purple elephant").await.unwrap();
    let second = h.session.submit("purple elephant").await.unwrap();
    let third = h.session.submit("purple elephant").await.unwrap();

    assert_ne!(first.messages.last().unwrap().text, ESCALATION_PROMPT);
    assert_ne!(second.messages.last().unwrap().text, ESCALATION_PROMPT);
    assert_eq!(third.messages.last().unwrap().text, ESCALATION_PROMPT);
    assert_eq!(h.session.state().mode(), Mode::AwaitingConfirmation);
    assert_eq!(h.session.state().irrelevant_streak(), 0);

    let prompts = h
        .session
        .transcript()
        .messages()
        .iter()
        .filter(|m| m.text == ESCALATION_PROMPT)
        .count();
    assert_eq!(prompts, 1);
}

#[tokio::test]
async fn test_relevant_turn_resets_streak() {
    let mut h = harness();
    h.session.submit("purple elephant").await.unwrap();
    h.session.submit("purple elephant").await.unwrap();
    h.session.submit("payroll").await.unwrap();
    let turn = h.session.submit("purple elephant").await.unwrap();
    assert_ne!(turn.messages.last().unwrap().text, ESCALATION_PROMPT);
    assert_eq!(h.session.state().irrelevant_streak(), 1);
}

#[tokio::test]
async fn test_unclear_answer_reprompts_without_matching() {
    let mut h = harness();
    reach_confirmation(&mut h).await;
    let calls_before = h.backend.calls.load(Ordering::SeqCst);

    for input in ["What's my leave balance?", "maybe", "y", "yes please"] {
        let turn = h.session.submit(input).await.unwrap();
        assert_eq!(turn.messages.last().unwrap().text, REPROMPT_MESSAGE);
        assert_eq!(h.session.state().mode(), Mode::AwaitingConfirmation);
        assert_eq!(h.session.state().irrelevant_streak(), 0);
    }

    assert_eq!(h.backend.calls.load(Ordering::SeqCst), calls_before);
    assert_eq!(h.handoff.count(), 0);
}

#[tokio::test]
async fn test_yes_invokes_handoff_exactly_once() {
    let mut h = harness();
    reach_confirmation(&mut h).await;

    let turn = h.session.submit("  Yes ").await.unwrap();
    assert_eq!(turn.messages.last().unwrap().text, CONNECTING_MESSAGE);
    assert!(turn.escalated);
    assert_eq!(h.handoff.count(), 1);
    assert_eq!(h.session.state().mode(), Mode::Normal);
    assert_eq!(h.session.state().irrelevant_streak(), 0);

    let request = h.handoff.requests.lock().unwrap()[0].clone();
    assert_eq!(request.session_id, h.session.id());
    assert_eq!(request.last_unmatched.as_deref(), Some("purple elephant"));

    // Back in normal mode: the next input is matched again.
    let next = h.session.submit("payroll").await.unwrap();
    assert_eq!(next.messages.last().unwrap().text, "Payroll runs monthly.");
    assert_eq!(h.handoff.count(), 1);
}

#[tokio::test]
async fn test_no_declines_and_resumes() {
    let mut h = harness();
    reach_confirmation(&mut h).await;

    let turn = h.session.submit("NO").await.unwrap();
    assert_eq!(turn.messages.last().unwrap().text, DECLINED_MESSAGE);
    assert!(!turn.escalated);
    assert_eq!(h.handoff.count(), 0);
    assert_eq!(h.session.state().mode(), Mode::Normal);
}

#[tokio::test]
async fn test_quick_action_answers_escalation_prompt() {
    let mut h = harness();
    reach_confirmation(&mut h).await;
    let turn = h.session.quick_action(0).await.unwrap();
    assert_eq!(turn.messages.last().unwrap().text, REPROMPT_MESSAGE);
}

// =============================================================================
// Backend failure
// =============================================================================

struct FlakyBackend {
    fail: AtomicUsize,
    matcher: ResponseMatcher,
}

#[async_trait]
impl HrBackend for FlakyBackend {
    async fn ask(&self, text: &str) -> Result<MatchOutcome, ChatError> {
        if self.fail.load(Ordering::SeqCst) > 0 {
            self.fail.fetch_sub(1, Ordering::SeqCst);
            return Err(ChatError::BackendError("HR API unreachable".to_string()));
        }
        Ok(self.matcher.respond(text))
    }
}

#[tokio::test]
async fn test_failure_keeps_streak_and_allows_next_turn() {
    let backend = Arc::new(FlakyBackend {
        fail: AtomicUsize::new(0),
        matcher: ResponseMatcher::new(leave_rules()),
    });
    let mut session = ChatSession::new(
        backend.clone(),
        Arc::new(RecordingHandoff::default()),
        SessionOptions::default(),
    );

    session.submit("purple elephant").await.unwrap();
    session.submit("purple elephant").await.unwrap();

    backend.fail.store(1, Ordering::SeqCst);
    let failed = session.submit("purple elephant").await.unwrap();
    assert_eq!(failed.messages.len(), 1);
    assert_eq!(failed.messages[0].delivery, DeliveryState::Error);
    assert_eq!(failed.notices[0].title, "Connection Error");
    assert_eq!(
        failed.notices[0].description,
        "Failed to connect to HR system. Please try again."
    );
    assert_eq!(session.state().irrelevant_streak(), 2);
    assert_eq!(session.state().mode(), Mode::Normal);

    let retry = session.submit("purple elephant").await.unwrap();
    assert_eq!(retry.messages.last().unwrap().text, ESCALATION_PROMPT);
}

// =============================================================================
// Service
// =============================================================================

#[tokio::test]
async fn test_service_concurrent_yes_answers_escalate_once() {
    let handoff = Arc::new(RecordingHandoff::default());
    let service = ChatService::spawn(ChatSession::new(
        Arc::new(SimulatedBackend::instant(ResponseMatcher::new(leave_rules()))),
        handoff.clone(),
        SessionOptions::default(),
    ));

    for _ in 0..3 {
        service.submit("purple elephant").await.unwrap();
    }

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let svc = service.clone();
        tasks.push(tokio::spawn(async move { svc.submit("yes").await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // The first "yes" resolves the offer; the rest are ordinary unmatched input.
    assert_eq!(handoff.count(), 1);
    let state = service.state().await.unwrap();
    assert_eq!(state.mode(), Mode::AwaitingConfirmation);
    assert_eq!(state.irrelevant_streak(), 0);
}
