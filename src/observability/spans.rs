//! Span for a single endpoint test.

use tokio::time::Instant;
use tracing::{Level, Span, field, span};

/// Tracks one endpoint invocation under one configuration.
pub struct EndpointSpan {
    span: Span,
    start: Instant,
}

impl EndpointSpan {
    pub fn new(config: &str, endpoint: &str, category: &str) -> Self {
        let span = span!(
            Level::INFO,
            "endpoint.test",
            config = config,
            endpoint = endpoint,
            category = category,
            outcome = field::Empty,
            duration_ms = field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Record the outcome label and elapsed time.
    pub fn finish(self, outcome: &str) -> std::time::Duration {
        let elapsed = self.start.elapsed();
        self.span.record("outcome", outcome);
        self.span.record("duration_ms", elapsed.as_millis() as u64);
        elapsed
    }
}
