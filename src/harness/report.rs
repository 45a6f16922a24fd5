//! Per-test results and the run summary.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::classify::SdkIssue;

/// Final state of one (configuration, endpoint) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

impl TestOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TestOutcome::Passed => "passed",
            TestOutcome::Failed { .. } => "failed",
            TestOutcome::Skipped { .. } => "skipped",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub config: String,
    pub category: String,
    pub outcome: TestOutcome,
    pub duration: Duration,
}

impl TestResult {
    pub fn skipped(
        name: impl Into<String>,
        config: impl Into<String>,
        category: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            config: config.into(),
            category: category.into(),
            outcome: TestOutcome::Skipped {
                reason: reason.into(),
            },
            duration: Duration::ZERO,
        }
    }
}

/// Aggregate of one orchestrator run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteSummary {
    pub run_id: Uuid,
    pub title: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Rate limiter grants during the run.
    pub request_count: u64,
    pub results: Vec<TestResult>,
    pub sdk_issues: Vec<SdkIssue>,
}

impl SuiteSummary {
    pub fn new(
        title: impl Into<String>,
        started_at: DateTime<Utc>,
        results: Vec<TestResult>,
        request_count: u64,
        sdk_issues: Vec<SdkIssue>,
    ) -> Self {
        let count = |label: &str| results.iter().filter(|r| r.outcome.label() == label).count();
        Self {
            run_id: Uuid::new_v4(),
            title: title.into(),
            total: results.len(),
            passed: count("passed"),
            failed: count("failed"),
            skipped: count("skipped"),
            started_at,
            finished_at: Utc::now(),
            request_count,
            sdk_issues,
            results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.outcome.is_failed())
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// 1 when any test failed, 0 otherwise. Skips never count.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    /// Machine-readable report for CI artifacts.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

impl fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} Summary ===", self.title)?;
        writeln!(f, "Total tests: {}", self.total)?;
        writeln!(f, "Passed: {}", self.passed)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Skipped: {}", self.skipped)?;
        writeln!(f, "Total API requests: {}", self.request_count)?;
        writeln!(f, "Duration: {:.2}s", self.elapsed().as_secs_f64())?;

        if self.failed > 0 {
            writeln!(f)?;
            writeln!(f, "Failed tests:")?;
            for result in self.failures() {
                if let TestOutcome::Failed { error } = &result.outcome {
                    writeln!(f, "  - [{}] {}: {}", result.config, result.name, error)?;
                }
            }
        }

        if !self.sdk_issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "SDK issues ({}):", self.sdk_issues.len())?;
            for (i, issue) in self.sdk_issues.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, issue)?;
            }
        }
        Ok(())
    }
}
