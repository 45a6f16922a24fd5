//! Test orchestration: endpoint declarations, the run loop and its summary.

mod endpoint;
mod report;
mod runner;

pub use endpoint::{CallFuture, EndpointCall, EndpointSuite, EndpointTest};
pub use report::{SuiteSummary, TestOutcome, TestResult};
pub use runner::{AUTH_SETUP_TEST, NO_AUTH_REASON, Orchestrator, RUN_CANCELLED_REASON};
