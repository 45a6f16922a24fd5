use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use exchange_harness::{CallError, SharedStreams, StreamClient};

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

struct WsClient {
    counters: Arc<Counters>,
    connected: bool,
}

#[async_trait]
impl StreamClient for WsClient {
    async fn connect(&mut self) -> Result<(), CallError> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), CallError> {
        self.counters.disconnects.fetch_add(1, Ordering::SeqCst);
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

async fn connect_shared(
    streams: &SharedStreams<WsClient>,
    config: &str,
    counters: &Arc<Counters>,
) -> Result<(), CallError> {
    let counters = Arc::clone(counters);
    streams
        .get_or_connect(config, || async move {
            counters.created.fetch_add(1, Ordering::SeqCst);
            Ok(WsClient {
                counters,
                connected: false,
            })
        })
        .await
        .map(drop)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tests_share_one_connection() {
    let streams = Arc::new(SharedStreams::new());
    let counters = Arc::new(Counters::default());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let streams = Arc::clone(&streams);
            let counters = Arc::clone(&counters);
            tokio::spawn(async move {
                connect_shared(&streams, "HMAC Authentication", &counters).await
            })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(counters.created.load(Ordering::SeqCst), 1);
    assert_eq!(counters.connects.load(Ordering::SeqCst), 1);
    assert_eq!(streams.len().await, 1);

    let stream = streams.get("HMAC Authentication").await.unwrap();
    assert!(stream.is_connected().await);
}

#[tokio::test]
async fn test_one_client_per_configuration_and_teardown() {
    let streams = SharedStreams::new();
    let counters = Arc::new(Counters::default());

    connect_shared(&streams, "HMAC Authentication", &counters).await.unwrap();
    connect_shared(&streams, "Ed25519 Authentication", &counters).await.unwrap();
    connect_shared(&streams, "HMAC Authentication", &counters).await.unwrap();
    assert_eq!(counters.created.load(Ordering::SeqCst), 2);

    assert_eq!(streams.disconnect_all().await, 2);
    assert_eq!(streams.disconnect_all().await, 0);
    assert_eq!(counters.disconnects.load(Ordering::SeqCst), 2);
    assert!(streams.is_empty().await);
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let streams = SharedStreams::new();
    let counters = Arc::new(Counters::default());
    connect_shared(&streams, "RSA Authentication", &counters).await.unwrap();

    let stream = streams.get("RSA Authentication").await.unwrap();
    stream.disconnect().await.unwrap();
    stream.disconnect().await.unwrap();
    assert_eq!(counters.disconnects.load(Ordering::SeqCst), 1);
    assert!(!stream.is_connected().await);

    stream.connect().await.unwrap();
    assert_eq!(counters.connects.load(Ordering::SeqCst), 2);
    assert!(stream.client().await.is_connected());
}
