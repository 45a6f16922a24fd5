//! Response classification: defect, or testnet limitation?
//!
//! Classification is first-match over a fixed order:
//!
//! 1. no error: [`Classification::Success`]
//! 2. HTTP 400: [`Classification::BadRequest`], before and regardless of any rule
//! 3. the first [`SkipRule`] in the [`RuleTable`] that matches: [`Classification::Skip`]
//! 4. anything else: [`Classification::Failure`]

mod issues;
mod rules;

pub use issues::{SdkIssue, SdkIssueTracker};
pub use rules::{
    BodyPattern, MessagePattern, NOT_FOUND_MESSAGE_PATTERNS, OPTIONS_MESSAGE_PATTERNS,
    PORTFOLIO_MARGIN_MESSAGE_PATTERNS, RuleMatch, RuleTable, SkipRule, StatusPattern,
    TESTNET_MESSAGE_PATTERNS, is_html_document,
};

use std::fmt;

use crate::client::CallError;

const BAD_REQUEST: u16 = 400;

/// Outcome of one SDK call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Success,
    /// Environment limitation; not counted as a failure.
    Skip { reason: String },
    /// HTTP 400. Never downgraded to a skip.
    BadRequest { body: String },
    /// Unclassified error, treated as a defect.
    Failure { reason: String },
}

impl Classification {
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Classification::Skip { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Classification::BadRequest { .. } | Classification::Failure { .. }
        )
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Success => f.write_str("success"),
            Classification::Skip { reason } => write!(f, "skipped: {}", reason),
            Classification::BadRequest { body } => {
                write!(f, "400 Bad Request - Response: {}", body)
            }
            Classification::Failure { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Applies the 400 guard and a [`RuleTable`] to call results.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleTable,
    tracker: SdkIssueTracker,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(RuleTable::testnet_defaults())
    }
}

impl Classifier {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            tracker: SdkIssueTracker::new(),
        }
    }

    /// Record SDK issues into an existing tracker.
    pub fn with_tracker(mut self, tracker: SdkIssueTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn tracker(&self) -> &SdkIssueTracker {
        &self.tracker
    }

    pub fn classify(&self, endpoint: &str, result: Result<(), &CallError>) -> Classification {
        self.classify_recorded(endpoint, result).0
    }

    /// Like [`Classifier::classify`], also returning the SDK issue this call
    /// recorded, if any.
    pub fn classify_recorded(
        &self,
        endpoint: &str,
        result: Result<(), &CallError>,
    ) -> (Classification, Option<SdkIssue>) {
        let err = match result {
            Ok(()) => return (Classification::Success, None),
            Err(err) => err,
        };

        log_error(endpoint, err);

        if err.status == Some(BAD_REQUEST) {
            let body = if err.body.is_empty() {
                err.message.clone()
            } else {
                err.body.clone()
            };
            tracing::error!(endpoint, body = %body, "400 Bad Request requires investigation");
            return (Classification::BadRequest { body }, None);
        }

        match self.rules.first_match(err) {
            Some(hit) => {
                let issue = hit
                    .issue(endpoint, err)
                    .map(|description| self.tracker.record(endpoint, description));
                let reason = hit.reason(endpoint, err);
                tracing::info!(endpoint, rule = %hit.rule.name, %reason, "Skipping");
                (Classification::Skip { reason }, issue)
            }
            None => (
                Classification::Failure {
                    reason: err.to_string(),
                },
                None,
            ),
        }
    }
}

fn log_error(endpoint: &str, err: &CallError) {
    match err.exchange_error() {
        Some(parsed) => tracing::debug!(
            endpoint,
            status = ?err.status,
            code = parsed.code,
            msg = %parsed.msg,
            "API error response"
        ),
        None => tracing::debug!(
            endpoint,
            status = ?err.status,
            body = %err.body,
            error = %err.message,
            timed_out = err.timed_out,
            "Call failed"
        ),
    }
}
