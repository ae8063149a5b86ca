//! Keyword response matcher.
//!
//! Linear first-match scan over the ordered rule book. Rule order is the
//! only disambiguation between overlapping keywords.

use std::sync::Arc;

use crate::rules::RuleBook;

/// Result of matching one input against the rule book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Response text to show the user.
    pub text: String,
    /// True when no rule matched and the fallback template was used.
    pub irrelevant: bool,
}

impl MatchOutcome {
    pub fn relevant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            irrelevant: false,
        }
    }

    pub fn irrelevant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            irrelevant: true,
        }
    }
}

/// Matches free text against a shared, immutable rule book.
#[derive(Debug, Clone)]
pub struct ResponseMatcher {
    rules: Arc<RuleBook>,
}

impl ResponseMatcher {
    pub fn new(rules: Arc<RuleBook>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Match `input` against the rules.
    ///
    /// Comparison is done on a lowercase copy; the raw input is what gets
    /// substituted into the fallback template.
    pub fn respond(&self, input: &str) -> MatchOutcome {
        match self.find_rule(input) {
            Some(index) => MatchOutcome::relevant(self.rules.rules()[index].response.clone()),
            None => MatchOutcome::irrelevant(self.rules.render_default(input)),
        }
    }

    /// Index of the first rule matching `input`, if any.
    pub fn find_rule(&self, input: &str) -> Option<usize> {
        let normalized = input.to_lowercase();
        self.rules
            .rules()
            .iter()
            .position(|rule| rule.matches(&normalized))
    }
}

impl Default for ResponseMatcher {
    fn default() -> Self {
        Self::new(Arc::new(RuleBook::builtin()))
    }
}

// =============================================================================
// Tests
// =============================================================================
