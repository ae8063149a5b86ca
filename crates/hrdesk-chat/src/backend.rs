//! HR backend seam.
//!
//! The only backend is simulated: it waits out a fixed latency and then
//! runs the keyword matcher. No retry, timeout, or cancellation.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ChatError;
use crate::matcher::{MatchOutcome, ResponseMatcher};

/// Answers a user question.
#[async_trait]
pub trait HrBackend: Send + Sync {
    async fn ask(&self, text: &str) -> Result<MatchOutcome, ChatError>;
}

/// Keyword matcher behind an artificial network delay.
pub struct SimulatedBackend {
    matcher: ResponseMatcher,
    latency: Duration,
}

impl SimulatedBackend {
    pub fn new(matcher: ResponseMatcher, latency: Duration) -> Self {
        Self { matcher, latency }
    }

    /// Same matcher, no delay.
    pub fn instant(matcher: ResponseMatcher) -> Self {
        Self::new(matcher, Duration::ZERO)
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl HrBackend for SimulatedBackend {
    async fn ask(&self, text: &str) -> Result<MatchOutcome, ChatError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let outcome = self.matcher.respond(text);
        tracing::debug!(irrelevant = outcome.irrelevant, "simulated HR backend answered");
        Ok(outcome)
    }
}
