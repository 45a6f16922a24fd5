//! Per-configuration registry of shared streaming clients.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{SerializedStream, StreamClient};
use crate::client::CallError;

/// One connected streaming client per configuration name.
pub struct SharedStreams<S> {
    clients: Mutex<HashMap<String, Arc<SerializedStream<S>>>>,
}

impl<S: StreamClient> Default for SharedStreams<S> {
    fn default() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl<S: StreamClient> SharedStreams<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the configuration's client, creating and connecting it on
    /// first use. A client that fails to connect is not registered.
    pub async fn get_or_connect<F, Fut>(
        &self,
        config_name: &str,
        factory: F,
    ) -> Result<Arc<SerializedStream<S>>, CallError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S, CallError>>,
    {
        let mut clients = self.clients.lock().await;
        if let Some(existing) = clients.get(config_name) {
            let existing = Arc::clone(existing);
            drop(clients);
            existing.connect().await?;
            return Ok(existing);
        }

        let stream = Arc::new(SerializedStream::new(factory().await?));
        if let Err(e) = stream.connect().await {
            tracing::warn!(config = config_name, error = %e, "Failed to set up shared stream client");
            return Err(e);
        }
        clients.insert(config_name.to_string(), Arc::clone(&stream));
        tracing::debug!(config = config_name, "Shared stream client connected");
        Ok(stream)
    }

    pub async fn get(&self, config_name: &str) -> Option<Arc<SerializedStream<S>>> {
        self.clients.lock().await.get(config_name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Disconnect and forget every client. Returns how many were removed.
    pub async fn disconnect_all(&self) -> usize {
        let drained: Vec<_> = self.clients.lock().await.drain().collect();
        let count = drained.len();
        for (name, stream) in drained {
            if let Err(e) = stream.disconnect().await {
                tracing::warn!(config = %name, error = %e, "Stream disconnect failed");
            }
        }
        tracing::debug!(count, "Disconnected shared stream clients");
        count
    }
}
