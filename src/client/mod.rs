//! Plumbing shared by SDK calls under test: request context, call errors and
//! the rate limiter.

mod context;
mod error;
mod rate_limit;

pub use context::RequestContext;
pub use error::{CallError, ExchangeErrorBody};
pub use rate_limit::RateLimiter;

/// Current wall-clock time in milliseconds, as used for request timestamps.
pub fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
