//! Prelude module for convenient imports.
//!
//! Re-exports what a per-SDK harness declaration typically needs.
//!
//! # Usage
//!
//! ```rust
//! use exchange_harness::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::Result;

// Configuration
pub use crate::config::{ConfigProvider, EnvConfigProvider, HarnessSettings, MemoryConfigProvider};

// Authentication
pub use crate::auth::{
    AuthContext, AuthFallback, AuthLevel, CredentialConfig, CredentialResolver, SignatureScheme,
};

// Calls
pub use crate::client::{CallError, RateLimiter, RequestContext, timestamp_ms};

// Classification
pub use crate::classify::{Classification, Classifier, RuleTable, SkipRule};

// Orchestration
pub use crate::harness::{EndpointSuite, Orchestrator, SuiteSummary, TestOutcome};

// Streams
pub use crate::stream::{SerializedStream, SharedStreams, StreamClient};
