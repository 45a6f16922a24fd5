//! Per-request context handed to SDK calls.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use super::CallError;
use crate::auth::AuthContext;
use crate::config::settings::DEFAULT_REQUEST_TIMEOUT;

/// Everything an SDK call needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub auth: AuthContext,
    pub timeout: Duration,
    pub cancellation: CancellationToken,
    /// Replaces the SDK's default server when set.
    pub server_override: Option<Url>,
}

impl RequestContext {
    pub fn new(auth: AuthContext) -> Self {
        Self {
            auth,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            cancellation: CancellationToken::new(),
            server_override: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_server_override(mut self, url: Option<Url>) -> Self {
        self.server_override = url;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolve `path` against the override server, or `default_base`.
    pub fn endpoint_url(&self, default_base: &Url, path: &str) -> Result<Url, CallError> {
        let base = self.server_override.as_ref().unwrap_or(default_base);
        base.join(path)
            .map_err(|e| CallError::new(format!("invalid endpoint path '{}': {}", path, e)))
    }
}
