//! Static HR rule set.
//!
//! An ordered list of keyword-tagged canned responses plus the fallback
//! template, loaded once at startup and never mutated afterwards.

use std::path::Path;

use hrdesk_core::error::{HrDeskError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Placeholder in the default template replaced by the raw user input.
pub const MESSAGE_PLACEHOLDER: &str = "{message}";

/// Greeting the assistant opens every conversation with.
pub const WELCOME_MESSAGE: &str = "Hello! I'm your HR Assistant. I can help you with employee queries, leave requests, payroll information, and company policies. How can I assist you today?";

/// Preset one-click prompts offered next to the input field.
pub const QUICK_ACTIONS: [&str; 6] = [
    "Check my leave balance",
    "Submit expense report",
    "View company holidays",
    "Update personal information",
    "IT support request",
    "Payroll inquiry",
];

// =============================================================================
// ResponseRule
// =============================================================================

/// A keyword set mapped to a canned response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRule {
    pub keywords: Vec<String>,
    pub response: String,
}

impl ResponseRule {
    /// Build a rule. Keywords are stored lowercase.
    pub fn new<K, S>(keywords: K, response: impl Into<String>) -> Self
    where
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            response: response.into(),
        }
    }

    /// True when any keyword is a substring of the already-lowercased input.
    pub fn matches(&self, normalized_input: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| normalized_input.contains(keyword.as_str()))
    }
}

// =============================================================================
// RuleBook
// =============================================================================

/// Ordered rules plus the fallback template. First matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    responses: Vec<ResponseRule>,
    #[serde(rename = "defaultResponse")]
    default_response: String,
}

impl RuleBook {
    /// Build and validate a rule book.
    pub fn new(rules: Vec<ResponseRule>, default_response: impl Into<String>) -> Result<Self> {
        let book = Self {
            responses: rules,
            default_response: default_response.into(),
        };
        book.validated()
    }

    /// Parse a rule book from its JSON form:
    /// `{"responses": [{"keywords": [..], "response": ".."}], "defaultResponse": ".."}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let book: RuleBook = serde_json::from_str(json)?;
        book.validated()
    }

    /// Load a rule book from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let book = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            rules = book.len(),
            "Rule set loaded"
        );
        Ok(book)
    }

    /// The bundled HR rule set.
    pub fn builtin() -> Self {
        let rules = builtin_rules()
            .iter()
            .map(|(keywords, response)| ResponseRule::new(keywords.iter(), *response))
            .collect();
        Self {
            responses: rules,
            default_response: BUILTIN_DEFAULT_RESPONSE.to_string(),
        }
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.responses
    }

    pub fn default_template(&self) -> &str {
        &self.default_response
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Substitute the raw input into the first placeholder of the template.
    pub fn render_default(&self, raw_input: &str) -> String {
        self.default_response.replacen(MESSAGE_PLACEHOLDER, raw_input, 1)
    }

    fn validated(mut self) -> Result<Self> {
        for (index, rule) in self.responses.iter_mut().enumerate() {
            if rule.keywords.is_empty() {
                return Err(HrDeskError::Rules(format!("rule {} has no keywords", index)));
            }
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                // An empty keyword matches every input and shadows all later rules.
                return Err(HrDeskError::Rules(format!(
                    "rule {} has an empty keyword",
                    index
                )));
            }
            for keyword in rule.keywords.iter_mut() {
                *keyword = keyword.to_lowercase();
            }
        }
        if !self.default_response.contains(MESSAGE_PLACEHOLDER) {
            warn!(
                "Default response has no {} placeholder; input will not be echoed",
                MESSAGE_PLACEHOLDER
            );
        }
        Ok(self)
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// Bundled data
// =============================================================================

const BUILTIN_DEFAULT_RESPONSE: &str = "I understand you're asking about \"{message}\". I couldn't find a specific answer for that. You can rephrase your question, pick one of the quick actions, or contact HR directly at hr@company.com.";

fn builtin_rules() -> &'static [(&'static [&'static str], &'static str)] {
    &[
        (
            &["leave balance", "leave", "vacation", "time off", "pto"],
            "You currently have 12 days of annual leave and 5 days of sick leave remaining. Would you like to submit a leave request?",
        ),
        (
            &["expense", "reimbursement", "receipt"],
            "To submit an expense report, upload your receipts in the Expenses section of the employee portal. Reports submitted before the 20th are reimbursed with that month's payroll.",
        ),
        (
            &["holiday", "public holidays"],
            "Upcoming company holidays: Thanksgiving (Nov 27-28), Christmas Eve and Christmas Day (Dec 24-25), and New Year's Day (Jan 1).",
        ),
        (
            &[
                "personal information",
                "personal details",
                "address change",
                "emergency contact",
                "bank details",
            ],
            "You can update your personal information, address, emergency contacts, and bank details under My Profile in the employee portal. Changes to bank details take effect from the next pay cycle.",
        ),
        (
            &["it support", "laptop", "password", "vpn", "computer"],
            "For IT support, raise a ticket at helpdesk.company.com or call extension 4357. Password resets can be done self-service from the login page.",
        ),
        (
            &["payroll", "salary", "payslip", "pay slip", "paycheck"],
            "Payroll runs on the last working day of each month. Your payslips are available under Payroll > Payslips in the employee portal. For discrepancies, contact payroll@company.com.",
        ),
        (
            &["benefit", "insurance", "health plan", "pension", "401k"],
            "Your benefits package includes medical, dental, and vision coverage, a 401k with 5% company match, and an annual wellness allowance. Details are in the Benefits section of the portal.",
        ),
        (
            &["policy", "policies", "handbook", "code of conduct", "remote work"],
            "Company policies, including the remote work policy and code of conduct, are published in the Employee Handbook on the intranet. Is there a specific policy you'd like to know about?",
        ),
        (
            &["hello", "good morning", "good afternoon"],
            "Hello! How can I help you with your HR questions today?",
        ),
        (
            &["thank"],
            "You're welcome! Let me know if there's anything else I can help you with.",
        ),
    ]
}

// =============================================================================
// Tests
// =============================================================================
