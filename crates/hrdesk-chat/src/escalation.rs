//! Escalation tracker.
//!
//! Counts consecutive unmatched inputs and, at the threshold, offers a
//! hand-off to human support. While the offer is open the next input is
//! consumed as a yes/no answer.

use serde::{Deserialize, Serialize};

/// Consecutive unmatched inputs before escalation is offered.
pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 3;

pub const ESCALATION_PROMPT: &str =
    "I can't understand. Would you like to connect to our support team? (yes/no)";
pub const CONNECTING_MESSAGE: &str = "Connecting you to our support team...";
pub const DECLINED_MESSAGE: &str = "Okay, please continue asking your HR questions.";
pub const REPROMPT_MESSAGE: &str =
    "Please answer \"yes\" or \"no\". Would you like to connect to our support team?";

/// Tracker mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Normal,
    AwaitingConfirmation,
}

// =============================================================================
// ConfirmationReply
// =============================================================================

/// Interpretation of an answer to the escalation offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationReply {
    Yes,
    No,
    Unclear,
}

impl ConfirmationReply {
    /// Exact match on the trimmed, lowercased input. No synonyms.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "yes" => ConfirmationReply::Yes,
            "no" => ConfirmationReply::No,
            _ => ConfirmationReply::Unclear,
        }
    }
}

// =============================================================================
// TrackerOutput
// =============================================================================

/// What the tracker decided for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutput {
    /// Nothing to add to the conversation.
    Continue,
    /// Threshold reached; the escalation offer is now open.
    EscalationOffered,
    /// The user accepted; the hand-off must be invoked.
    Confirmed,
    /// The user declined.
    Declined,
    /// The answer was neither yes nor no; the offer stays open.
    Reprompt,
}

impl TrackerOutput {
    /// Bot message that accompanies this output, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            TrackerOutput::Continue => None,
            TrackerOutput::EscalationOffered => Some(ESCALATION_PROMPT),
            TrackerOutput::Confirmed => Some(CONNECTING_MESSAGE),
            TrackerOutput::Declined => Some(DECLINED_MESSAGE),
            TrackerOutput::Reprompt => Some(REPROMPT_MESSAGE),
        }
    }
}

// =============================================================================
// EscalationTracker
// =============================================================================

/// Two-state machine: `Normal` and `AwaitingConfirmation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationTracker {
    threshold: u32,
    streak: u32,
    mode: Mode,
}

impl EscalationTracker {
    /// Create a tracker. A threshold of 0 is treated as 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            streak: 0,
            mode: Mode::Normal,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.mode == Mode::AwaitingConfirmation
    }

    /// Record the classification of a matched turn.
    ///
    /// Only meaningful in `Normal`; while awaiting confirmation inputs go
    /// through [`answer`](Self::answer) instead and this is a no-op.
    pub fn record(&mut self, irrelevant: bool) -> TrackerOutput {
        if self.is_awaiting_confirmation() {
            tracing::warn!("match result recorded while awaiting confirmation; ignored");
            return TrackerOutput::Continue;
        }

        if !irrelevant {
            self.streak = 0;
            return TrackerOutput::Continue;
        }

        self.streak += 1;
        if self.streak >= self.threshold {
            self.streak = 0;
            self.mode = Mode::AwaitingConfirmation;
            tracing::debug!(threshold = self.threshold, "escalation offered");
            return TrackerOutput::EscalationOffered;
        }
        TrackerOutput::Continue
    }

    /// Consume an answer to the open escalation offer.
    pub fn answer(&mut self, input: &str) -> TrackerOutput {
        if !self.is_awaiting_confirmation() {
            return TrackerOutput::Continue;
        }

        match ConfirmationReply::parse(input) {
            ConfirmationReply::Yes => {
                self.reset();
                TrackerOutput::Confirmed
            }
            ConfirmationReply::No => {
                self.reset();
                TrackerOutput::Declined
            }
            ConfirmationReply::Unclear => TrackerOutput::Reprompt,
        }
    }

    fn reset(&mut self) {
        self.streak = 0;
        self.mode = Mode::Normal;
    }
}

impl Default for EscalationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ESCALATION_THRESHOLD)
    }
}

// =============================================================================
// Tests
// =============================================================================
