//! Serialized connect/disconnect for one streaming client.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use super::StreamClient;
use crate::client::CallError;

struct State<S> {
    client: S,
    connected: bool,
}

/// A streaming client whose lifecycle calls are serialized and idempotent.
pub struct SerializedStream<S> {
    state: Mutex<State<S>>,
}

impl<S: StreamClient> SerializedStream<S> {
    pub fn new(client: S) -> Self {
        Self {
            state: Mutex::new(State {
                client,
                connected: false,
            }),
        }
    }

    /// Connect unless already connected.
    pub async fn connect(&self) -> Result<(), CallError> {
        let mut state = self.state.lock().await;
        if state.connected && state.client.is_connected() {
            return Ok(());
        }
        state.client.connect().await?;
        state.connected = true;
        Ok(())
    }

    /// Disconnect if connected. A panic inside the client's disconnect is
    /// contained; the stream is marked disconnected either way.
    pub async fn disconnect(&self) -> Result<(), CallError> {
        let mut state = self.state.lock().await;
        if !state.connected {
            return Ok(());
        }
        state.connected = false;

        match AssertUnwindSafe(state.client.disconnect()).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Recovered from panic during stream disconnect");
                Ok(())
            }
        }
    }

    pub async fn is_connected(&self) -> bool {
        let state = self.state.lock().await;
        state.connected && state.client.is_connected()
    }

    /// Exclusive access to the wrapped client for subscribe/unsubscribe calls.
    pub async fn client(&self) -> MappedMutexGuard<'_, S> {
        MutexGuard::map(self.state.lock().await, |state| &mut state.client)
    }
}
