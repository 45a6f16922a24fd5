//! Streaming clients shared across tests.
//!
//! WebSocket SDK clients are expensive to connect and some servers limit
//! concurrent connections per key, so harnesses keep one client per
//! configuration in [`SharedStreams`] and tear them all down at the end of
//! the run. [`SerializedStream`] makes `connect`/`disconnect` safe to call
//! from concurrent tests.

mod guard;
mod registry;

pub use guard::SerializedStream;
pub use registry::SharedStreams;

use async_trait::async_trait;

use crate::client::CallError;

/// Connection lifecycle of a streaming SDK client.
#[async_trait]
pub trait StreamClient: Send + Sync {
    async fn connect(&mut self) -> Result<(), CallError>;

    async fn disconnect(&mut self) -> Result<(), CallError>;

    fn is_connected(&self) -> bool;
}
