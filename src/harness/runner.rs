//! The orchestrator run loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{EndpointSuite, EndpointTest, SuiteSummary, TestOutcome, TestResult};
use crate::auth::{AuthContext, AuthLevel, CredentialConfig};
use crate::classify::{Classification, Classifier, SdkIssue};
use crate::client::{CallError, RateLimiter, RequestContext};
use crate::config::HarnessSettings;
use crate::observability::EndpointSpan;

pub const NO_AUTH_REASON: &str = "no authentication";
pub const RUN_CANCELLED_REASON: &str = "run cancelled";
pub const AUTH_SETUP_TEST: &str = "Auth Context";

/// Runs endpoint suites across credential configurations.
///
/// Tests run sequentially per configuration. Every attempted call first
/// waits on the shared [`RateLimiter`], runs under the request timeout, and
/// is classified; panics are caught and recorded as failures.
pub struct Orchestrator {
    settings: HarnessSettings,
    limiter: Arc<RateLimiter>,
    classifier: Classifier,
    cancellation: CancellationToken,
}

impl Orchestrator {
    pub fn new(settings: HarnessSettings, limiter: Arc<RateLimiter>) -> Self {
        Self {
            settings,
            limiter,
            classifier: Classifier::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub async fn run<C>(
        &self,
        client: Arc<C>,
        configs: &[CredentialConfig],
        suite: &EndpointSuite<C>,
    ) -> SuiteSummary
    where
        C: Send + Sync + 'static,
    {
        let started_at = Utc::now();

        tracing::info!(
            suite = suite.title(),
            endpoints = suite.len(),
            configs = configs.len(),
            "Running integration suite"
        );
        warn_unreachable(configs, suite);

        let mut tally = RunTally::default();
        for config in configs {
            self.run_config(&client, config, suite, &mut tally).await;
        }

        let summary = SuiteSummary::new(
            suite.title(),
            started_at,
            tally.results,
            tally.requests,
            tally.issues,
        );
        tracing::info!(
            suite = suite.title(),
            run_id = %summary.run_id,
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            requests = summary.request_count,
            "Suite completed"
        );
        summary
    }

    async fn run_config<C>(
        &self,
        client: &Arc<C>,
        config: &CredentialConfig,
        suite: &EndpointSuite<C>,
        tally: &mut RunTally,
    ) where
        C: Send + Sync + 'static,
    {
        tracing::info!(config = config.name(), level = %config.level(), "Testing configuration");

        let auth = match AuthContext::build_with(config, self.settings.auth_fallback) {
            Ok(auth) => auth,
            Err(err) => {
                tracing::error!(config = config.name(), error = %err, "Configuration unusable");
                tally.results.push(TestResult {
                    name: AUTH_SETUP_TEST.to_string(),
                    config: config.name().to_string(),
                    category: "Setup".to_string(),
                    outcome: TestOutcome::Failed {
                        error: err.to_string(),
                    },
                    duration: Duration::ZERO,
                });
                return;
            }
        };

        let base = RequestContext::new(auth)
            .with_timeout(self.settings.request_timeout)
            .with_server_override(self.settings.server_override.clone());

        for endpoint in suite.endpoints() {
            if self.cancellation.is_cancelled() {
                tally.results.push(TestResult::skipped(
                    endpoint.name(),
                    config.name(),
                    endpoint.category(),
                    RUN_CANCELLED_REASON,
                ));
                continue;
            }
            if !config.permits(endpoint.required_level()) {
                tracing::debug!(
                    config = config.name(),
                    endpoint = endpoint.name(),
                    required = %endpoint.required_level(),
                    "Skipping, insufficient auth level"
                );
                tally.results.push(TestResult::skipped(
                    endpoint.name(),
                    config.name(),
                    endpoint.category(),
                    NO_AUTH_REASON,
                ));
                continue;
            }

            let result = self.run_endpoint(client, config, endpoint, &base, tally).await;
            tally.results.push(result);
        }
    }

    async fn run_endpoint<C>(
        &self,
        client: &Arc<C>,
        config: &CredentialConfig,
        endpoint: &EndpointTest<C>,
        base: &RequestContext,
        tally: &mut RunTally,
    ) -> TestResult
    where
        C: Send + Sync + 'static,
    {
        self.limiter.wait().await;
        tally.requests += 1;

        let span = EndpointSpan::new(config.name(), endpoint.name(), endpoint.category());
        let token = self.cancellation.child_token();
        let ctx = base.clone().with_cancellation(token.clone());
        let timeout = ctx.timeout;
        // Closures may panic before returning their future; invoke under the guard.
        let client = Arc::clone(client);
        let call = AssertUnwindSafe(async move { endpoint.invoke(client, ctx).await }).catch_unwind();

        let result = match tokio::time::timeout(timeout, call)
            .instrument(span.span().clone())
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(CallError::new(format!(
                "endpoint panicked: {}",
                panic_message(panic.as_ref())
            ))),
            Err(_) => {
                token.cancel();
                Err(CallError::timeout(timeout))
            }
        };

        let (classification, issue) = self
            .classifier
            .classify_recorded(endpoint.name(), result.as_ref().map(|_| ()));
        tally.issues.extend(issue);
        let outcome = match (classification, &result) {
            (Classification::Success, _) => TestOutcome::Passed,
            (Classification::Skip { reason }, _) => TestOutcome::Skipped { reason },
            (Classification::BadRequest { body }, Err(err)) => TestOutcome::Failed {
                error: format!("400 Bad Request - Response: {} - Error: {}", body, err),
            },
            (Classification::BadRequest { body }, Ok(())) => TestOutcome::Failed {
                error: format!("400 Bad Request - Response: {}", body),
            },
            (Classification::Failure { reason }, _) => TestOutcome::Failed { error: reason },
        };

        let duration = span.finish(outcome.label());
        match &outcome {
            TestOutcome::Passed => tracing::info!(
                config = config.name(),
                endpoint = endpoint.name(),
                elapsed_ms = duration.as_millis() as u64,
                "PASSED"
            ),
            TestOutcome::Skipped { reason } => tracing::info!(
                config = config.name(),
                endpoint = endpoint.name(),
                %reason,
                "SKIPPED"
            ),
            TestOutcome::Failed { error } => tracing::error!(
                config = config.name(),
                endpoint = endpoint.name(),
                %error,
                "FAILED"
            ),
        }

        TestResult {
            name: endpoint.name().to_string(),
            config: config.name().to_string(),
            category: endpoint.category().to_string(),
            outcome,
            duration,
        }
    }
}

/// What one run has produced so far.
#[derive(Default)]
struct RunTally {
    results: Vec<TestResult>,
    /// Limiter grants taken by this run only.
    requests: u64,
    issues: Vec<SdkIssue>,
}

fn warn_unreachable<C>(configs: &[CredentialConfig], suite: &EndpointSuite<C>) {
    let max_level = configs
        .iter()
        .map(|c| c.level())
        .max()
        .unwrap_or(AuthLevel::None);
    for endpoint in suite.endpoints() {
        if !max_level.permits(endpoint.required_level()) {
            tracing::warn!(
                endpoint = endpoint.name(),
                required = %endpoint.required_level(),
                "No configuration can run this endpoint"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
