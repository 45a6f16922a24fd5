//! # exchange-harness
//!
//! Shared test-execution core for integration harnesses that drive generated
//! exchange SDK clients against a live or testnet server.
//!
//! The crate owns the three pieces every SDK harness needs and nothing else:
//!
//! - credential resolution for HMAC, RSA and Ed25519 keys plus per-request
//!   authentication contexts,
//! - a shared [`RateLimiter`] that serializes outbound calls,
//! - a [`Classifier`] that separates genuine defects from testnet
//!   limitations.
//!
//! Per-SDK harnesses are plain data: an [`EndpointSuite`] listing endpoint
//! calls and the [`AuthLevel`] each one needs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use exchange_harness::{
//!     AuthLevel, CallError, CredentialResolver, EndpointSuite, HarnessSettings, Orchestrator,
//!     RateLimiter,
//! };
//! use exchange_harness::config::EnvConfigProvider;
//!
//! struct SpotClient;
//!
//! impl SpotClient {
//!     async fn ping(&self) -> Result<(), CallError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), exchange_harness::Error> {
//!     let provider = EnvConfigProvider::new();
//!     let settings = HarnessSettings::load(&provider).await?;
//!     let configs = CredentialResolver::new(&provider)
//!         .all_schemes(settings.test_all_auth_types)
//!         .resolve()
//!         .await?;
//!
//!     let suite = EndpointSuite::new("Spot REST").endpoint(
//!         "Ping",
//!         "General",
//!         AuthLevel::None,
//!         |client: Arc<SpotClient>, _ctx| async move { client.ping().await },
//!     );
//!
//!     let limiter = Arc::new(RateLimiter::new(settings.rate_limit_interval));
//!     let summary = Orchestrator::new(settings, limiter)
//!         .run(Arc::new(SpotClient), &configs, &suite)
//!         .await;
//!     println!("{summary}");
//!     std::process::exit(summary.exit_code());
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod classify;
pub mod client;
pub mod config;
pub mod harness;
pub mod observability;
pub mod prelude;
pub mod stream;

pub use auth::{
    AuthContext, AuthFallback, AuthLevel, AuthStrategy, CredentialConfig, CredentialResolver,
    Ed25519Strategy, HmacStrategy, RsaStrategy, SignatureScheme,
};
pub use classify::{Classification, Classifier, RuleTable, SdkIssue, SdkIssueTracker, SkipRule};
pub use client::{CallError, ExchangeErrorBody, RateLimiter, RequestContext};
pub use config::{ConfigError, ConfigProvider, HarnessSettings};
pub use harness::{
    EndpointSuite, EndpointTest, Orchestrator, SuiteSummary, TestOutcome, TestResult,
};
pub use stream::{SerializedStream, SharedStreams, StreamClient};

use std::time::Duration;

/// Error type for harness setup and infrastructure failures.
///
/// Failures of the calls under test are not errors of the harness; they are
/// [`Classification`] values routed into the summary.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An authentication context could not be built for a configuration.
    #[error("Cannot build authentication for '{config}': {message}")]
    AuthConstruction { config: String, message: String },

    /// A private key file could not be read or parsed.
    #[error("Cannot load private key from {path}: {message}")]
    KeyLoad { path: String, message: String },

    /// The rate limiter reached a state it should never be in.
    #[error("Rate limiter invariant violated: {0}")]
    RateLimitInternal(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Operation exceeded timeout.
    #[error("Operation timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credentials, keys or configuration; stops a configuration from running.
    Setup,
    /// Programming invariant violated inside the harness.
    Invariant,
    /// Network or timeout while talking to the server.
    Transport,
}

impl Error {
    pub fn auth(config: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AuthConstruction {
            config: config.into(),
            message: message.into(),
        }
    }

    pub fn key_load(path: impl Into<String>, message: impl ToString) -> Self {
        Error::KeyLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::AuthConstruction { .. }
            | Error::KeyLoad { .. }
            | Error::Config(_)
            | Error::Io(_)
            | Error::Json(_) => ErrorCategory::Setup,
            Error::RateLimitInternal(_) => ErrorCategory::Invariant,
            Error::Network(_) | Error::Timeout(_) => ErrorCategory::Transport,
        }
    }

    pub fn is_setup_error(&self) -> bool {
        self.category() == ErrorCategory::Setup
    }

    pub fn is_transport_error(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::Config(format!("Key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Env(e) => Error::Config(e.to_string()),
            config::ConfigError::Provider { message } => Error::Config(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
