//! SDK issues spotted while classifying responses.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A finding that points at the SDK rather than the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkIssue {
    pub endpoint: String,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for SdkIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.description)
    }
}

/// Shared, append-only list of [`SdkIssue`]s. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct SdkIssueTracker {
    issues: Arc<Mutex<Vec<SdkIssue>>>,
}

impl SdkIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue and return a copy of it.
    pub fn record(&self, endpoint: impl Into<String>, description: impl Into<String>) -> SdkIssue {
        let issue = SdkIssue {
            endpoint: endpoint.into(),
            description: description.into(),
            recorded_at: Utc::now(),
        };
        tracing::warn!(endpoint = %issue.endpoint, issue = %issue.description, "SDK issue detected");
        self.issues
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(issue.clone());
        issue
    }

    /// Snapshot of everything recorded so far.
    pub fn issues(&self) -> Vec<SdkIssue> {
        self.issues.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.issues.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return all issues.
    pub fn drain(&self) -> Vec<SdkIssue> {
        std::mem::take(&mut *self.issues.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
