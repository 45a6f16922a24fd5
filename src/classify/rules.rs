//! Data-driven skip rules for testnet limitations.

use crate::client::CallError;

const HTML_MIN_BODY_LEN: usize = 50;

/// Whether a response is an HTML document rather than an API payload.
///
/// True for a `text/html` content type, or a body longer than 50 bytes that
/// opens with `<!DOCTYPE html>` or `<html` (case-insensitive).
pub fn is_html_document(content_type: Option<&str>, body: &str) -> bool {
    if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html")) {
        return true;
    }
    if body.len() <= HTML_MIN_BODY_LEN {
        return false;
    }
    let head: String = body.trim_start().chars().take(16).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// HTTP status condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPattern {
    Any,
    OneOf(Vec<u16>),
    /// Inclusive range.
    Range(u16, u16),
}

impl StatusPattern {
    fn matches(&self, status: Option<u16>) -> bool {
        match self {
            StatusPattern::Any => true,
            StatusPattern::OneOf(codes) => status.is_some_and(|s| codes.contains(&s)),
            StatusPattern::Range(lo, hi) => status.is_some_and(|s| (*lo..=*hi).contains(&s)),
        }
    }
}

/// Response body condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPattern {
    Any,
    /// Body is an HTML document.
    Html,
    /// Body is an HTML document containing every fragment.
    HtmlContaining(Vec<String>),
    /// Body contains every fragment.
    Contains(Vec<String>),
}

impl BodyPattern {
    fn matches(&self, err: &CallError) -> bool {
        let html = || is_html_document(err.content_type.as_deref(), &err.body);
        match self {
            BodyPattern::Any => true,
            BodyPattern::Html => html(),
            BodyPattern::HtmlContaining(parts) => {
                html() && parts.iter().all(|p| err.body.contains(p.as_str()))
            }
            BodyPattern::Contains(parts) => parts.iter().all(|p| err.body.contains(p.as_str())),
        }
    }
}

/// Error message condition of a rule. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePattern {
    Any,
    ContainsAny(Vec<String>),
}

impl MessagePattern {
    /// `Some(matched)` on a match; `matched` is the pattern that hit, if any.
    fn matches<'a>(&'a self, message: &str) -> Option<Option<&'a str>> {
        match self {
            MessagePattern::Any => Some(None),
            MessagePattern::ContainsAny(patterns) => patterns
                .iter()
                .find(|p| contains_ignore_case(message, p))
                .map(|p| Some(p.as_str())),
        }
    }
}

/// One `(status, body, message) -> skip` row.
///
/// `reason` and `issue` are templates; `{endpoint}`, `{status}` and
/// `{pattern}` are substituted when the rule fires. A rule with an `issue`
/// also records an SDK issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRule {
    pub name: String,
    pub status: StatusPattern,
    pub body: BodyPattern,
    pub message: MessagePattern,
    pub reason: String,
    pub issue: Option<String>,
}

impl SkipRule {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StatusPattern::Any,
            body: BodyPattern::Any,
            message: MessagePattern::Any,
            reason: reason.into(),
            issue: None,
        }
    }

    pub fn status(mut self, pattern: StatusPattern) -> Self {
        self.status = pattern;
        self
    }

    pub fn body(mut self, pattern: BodyPattern) -> Self {
        self.body = pattern;
        self
    }

    pub fn message<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message = MessagePattern::ContainsAny(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn issue(mut self, template: impl Into<String>) -> Self {
        self.issue = Some(template.into());
        self
    }

    pub fn matches<'a>(&'a self, err: &CallError) -> Option<RuleMatch<'a>> {
        if !self.status.matches(err.status) || !self.body.matches(err) {
            return None;
        }
        self.message
            .matches(&err.message)
            .map(|pattern| RuleMatch { rule: self, pattern })
    }
}

/// A rule that fired, with the message pattern that triggered it.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a SkipRule,
    pub pattern: Option<&'a str>,
}

impl RuleMatch<'_> {
    pub fn reason(&self, endpoint: &str, err: &CallError) -> String {
        self.render(&self.rule.reason, endpoint, err)
    }

    pub fn issue(&self, endpoint: &str, err: &CallError) -> Option<String> {
        self.rule
            .issue
            .as_ref()
            .map(|template| self.render(template, endpoint, err))
    }

    fn render(&self, template: &str, endpoint: &str, err: &CallError) -> String {
        let status = err.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
        template
            .replace("{endpoint}", endpoint)
            .replace("{status}", &status)
            .replace("{pattern}", self.pattern.unwrap_or(""))
    }
}

/// Testnet limitation phrases shared by every REST family.
pub const TESTNET_MESSAGE_PATTERNS: &[&str] = &[
    "This service is not available",
    "Feature not supported",
    "not available in testnet",
    "testnet not supported",
    "Service temporarily unavailable",
    "Function not supported",
];

pub const OPTIONS_MESSAGE_PATTERNS: &[&str] = &[
    "options trading not enabled",
    "insufficient options permissions",
    "options account not found",
    "underlying asset not supported",
    "option symbol not found",
    "option expired",
    "option not tradeable",
    "block trade not supported",
    "market maker protection not enabled",
];

pub const PORTFOLIO_MARGIN_MESSAGE_PATTERNS: &[&str] = &[
    "portfolio margin not enabled",
    "account not enabled for portfolio margin",
    "pmargin account required",
    "insufficient portfolio margin permissions",
    "portfolio margin account not found",
    "PM account required",
    "cross margin not supported",
    "margin account not found",
];

pub const NOT_FOUND_MESSAGE_PATTERNS: &[&str] = &[
    "404",
    "not found",
    "endpoint not found",
    "page not found",
    "resource not found",
    "url not found",
];

/// Ordered skip rules; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<SkipRule>,
}

impl RuleTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules common to every testnet REST family.
    pub fn testnet_defaults() -> Self {
        Self::empty()
            .with_rule(
                SkipRule::new(
                    "http-not-found",
                    "{endpoint} endpoint not available on testnet (HTTP {status})",
                )
                .status(StatusPattern::OneOf(vec![404]))
                .issue("HTTP 404 - endpoint not found or incorrect URL"),
            )
            .with_rule(
                SkipRule::new(
                    "http-forbidden",
                    "{endpoint} endpoint not available on testnet (HTTP {status})",
                )
                .status(StatusPattern::OneOf(vec![403])),
            )
            .with_rule(
                SkipRule::new(
                    "html-404-page",
                    "{endpoint} endpoint has incorrect URL in SDK (returns HTML 404) - not available on testnet",
                )
                .body(BodyPattern::HtmlContaining(vec![
                    "404".into(),
                    "This page could not be found".into(),
                ]))
                .issue("endpoint returns HTML 404 page - incorrect URL in SDK"),
            )
            .with_rule(
                SkipRule::new(
                    "html-resource-not-found",
                    "{endpoint} endpoint has incorrect URL in SDK (Resource not found) - not available on testnet",
                )
                .body(BodyPattern::HtmlContaining(vec!["Resource not found".into()]))
                .issue("endpoint returns 'Resource not found' HTML page - incorrect URL in SDK"),
            )
            .with_rule(
                SkipRule::new(
                    "html-page",
                    "{endpoint} returns HTML error page - not available on testnet",
                )
                .body(BodyPattern::Html),
            )
            .with_rule(
                SkipRule::new(
                    "undefined-response-type",
                    "{endpoint} endpoint has response parsing issues - likely not available on testnet",
                )
                .message(["undefined response type"]),
            )
            .with_rule(
                SkipRule::new(
                    "testnet-limitation",
                    "{endpoint} endpoint not available on testnet: {pattern}",
                )
                .message(TESTNET_MESSAGE_PATTERNS.iter().copied()),
            )
    }

    /// Defaults plus options-permission phrases.
    pub fn options() -> Self {
        Self::testnet_defaults().with_rule(
            SkipRule::new(
                "options-permissions",
                "{endpoint} requires options trading permissions: {pattern}",
            )
            .message(OPTIONS_MESSAGE_PATTERNS.iter().copied()),
        )
    }

    /// Defaults plus portfolio-margin account phrases.
    pub fn portfolio_margin() -> Self {
        Self::testnet_defaults().with_rule(
            SkipRule::new(
                "portfolio-margin-account",
                "{endpoint} requires portfolio margin account: {pattern}",
            )
            .message(PORTFOLIO_MARGIN_MESSAGE_PATTERNS.iter().copied()),
        )
    }

    /// Defaults plus not-found phrases that also record SDK issues.
    pub fn with_not_found_messages(self) -> Self {
        self.with_rule(
            SkipRule::new(
                "not-found-message",
                "{endpoint} endpoint likely not found or incorrect URL: {pattern}",
            )
            .message(NOT_FOUND_MESSAGE_PATTERNS.iter().copied())
            .issue("error contains '{pattern}' - likely endpoint not found"),
        )
    }

    pub fn with_rule(mut self, rule: SkipRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: SkipRule) {
        self.rules.push(rule);
    }

    /// Append another table's rules after this one's.
    pub fn extend(mut self, other: RuleTable) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn first_match<'a>(&'a self, err: &CallError) -> Option<RuleMatch<'a>> {
        self.rules.iter().find_map(|rule| rule.matches(err))
    }

    pub fn rules(&self) -> &[SkipRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
