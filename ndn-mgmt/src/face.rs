//! `Face`: the abstraction a dispatcher, client, or content store sits
//! behind to send/receive Interests and Data without knowing what
//! carries them to the other side.
//!
//! Actual network transport is out of scope here; what's kept from the
//! teacher's QUIC `Face` is its shape — an async request/response
//! surface (`express_interest`/`put`), a filter-callback registration
//! surface (`set_interest_filter`), events multiplexed over a channel,
//! and `Arc`-shared metrics — generalized away from any one wire
//! protocol. [`InProcessFace`] provides a same-process implementation
//! connecting two endpoints over channels, useful for driving a
//! [`crate::dispatcher::Dispatcher`] in tests or in the CLI demo without
//! a real network.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ndn_core::metrics::NdnMetrics;
use ndn_core::{Data, Interest, Name};
use tokio::sync::{mpsc, oneshot, Mutex};

/// Invoked when an Interest arrives under a registered prefix.
pub type InterestHandler = Arc<dyn Fn(Interest) + Send + Sync>;

/// Events a [`Face`] implementation may deliver out-of-band, alongside
/// the direct request/response methods.
#[derive(Debug, Clone)]
pub enum FaceEvent {
    InterestReceived(Interest),
    DataReceived(Data),
    Closed,
}

/// A transport-agnostic NDN face.
#[async_trait]
pub trait Face: Send + Sync {
    /// Registers interest in Interests under `prefix`, invoking `handler`
    /// for each one received. Replaces any handler previously registered
    /// for the same prefix.
    async fn set_interest_filter(&self, prefix: Name, handler: InterestHandler) -> Result<()>;

    async fn unset_interest_filter(&self, prefix: &Name) -> Result<()>;

    /// Sends `data` out this face, satisfying whatever Interest (local
    /// or remote) is waiting for it.
    async fn put(&self, data: Data) -> Result<()>;

    /// Sends `interest` and waits up to `timeout` for satisfying Data.
    async fn express_interest(&self, interest: Interest, timeout: Duration) -> Result<Data>;
}

enum Message {
    Interest(Interest),
    Data(Data),
}

/// One endpoint of an in-process Face pair. The other endpoint (created
/// alongside it by [`InProcessFace::pair`]) receives everything sent
/// here and vice versa — a loopback transport standing in for an actual
/// network connection.
pub struct InProcessFace {
    outbox: mpsc::UnboundedSender<Message>,
    filters: Arc<Mutex<HashMap<Name, InterestHandler>>>,
    pending_interests: Arc<Mutex<HashMap<Name, oneshot::Sender<Data>>>>,
    metrics: Arc<NdnMetrics>,
}

impl InProcessFace {
    /// Creates two faces wired to each other: anything `put`/expressed on
    /// one arrives as a [`Message`] processed by the other's background
    /// task.
    pub fn pair() -> (Arc<InProcessFace>, Arc<InProcessFace>) {
        let (tx_a_to_b, rx_a_to_b) = mpsc::unbounded_channel();
        let (tx_b_to_a, rx_b_to_a) = mpsc::unbounded_channel();

        let a = Arc::new(InProcessFace {
            outbox: tx_a_to_b,
            filters: Arc::new(Mutex::new(HashMap::new())),
            pending_interests: Arc::new(Mutex::new(HashMap::new())),
            metrics: Arc::new(NdnMetrics::new()),
        });
        let b = Arc::new(InProcessFace {
            outbox: tx_b_to_a,
            filters: Arc::new(Mutex::new(HashMap::new())),
            pending_interests: Arc::new(Mutex::new(HashMap::new())),
            metrics: Arc::new(NdnMetrics::new()),
        });

        spawn_receive_loop(Arc::clone(&a), rx_b_to_a);
        spawn_receive_loop(Arc::clone(&b), rx_a_to_b);

        (a, b)
    }

    pub fn metrics(&self) -> Arc<NdnMetrics> {
        Arc::clone(&self.metrics)
    }

    async fn deliver(&self, message: Message) {
        match message {
            Message::Interest(interest) => {
                self.metrics.interests_sent.increment();
                let filters = self.filters.lock().await;
                if let Some(handler) = filters
                    .iter()
                    .find(|(prefix, _)| prefix.is_prefix_of(interest.name()))
                    .map(|(_, handler)| Arc::clone(handler))
                {
                    drop(filters);
                    handler(interest);
                }
            }
            Message::Data(data) => {
                self.metrics.data_received.increment();
                let full_name = data.name().clone();
                let mut pending = self.pending_interests.lock().await;
                if let Some(sender) = pending.remove(&full_name) {
                    let _ = sender.send(data);
                }
            }
        }
    }
}

fn spawn_receive_loop(face: Arc<InProcessFace>, mut rx: mpsc::UnboundedReceiver<Message>) {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            face.deliver(message).await;
        }
    });
}

#[async_trait]
impl Face for InProcessFace {
    async fn set_interest_filter(&self, prefix: Name, handler: InterestHandler) -> Result<()> {
        self.filters.lock().await.insert(prefix, handler);
        Ok(())
    }

    async fn unset_interest_filter(&self, prefix: &Name) -> Result<()> {
        self.filters.lock().await.remove(prefix);
        Ok(())
    }

    async fn put(&self, data: Data) -> Result<()> {
        self.metrics.data_sent.increment();
        self.outbox.send(Message::Data(data)).map_err(|_| anyhow!("face closed"))
    }

    async fn express_interest(&self, interest: Interest, timeout: Duration) -> Result<Data> {
        let (sender, receiver) = oneshot::channel();
        self.pending_interests.lock().await.insert(interest.name().clone(), sender);
        self.outbox
            .send(Message::Interest(interest.clone()))
            .map_err(|_| anyhow!("face closed"))?;

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(data)) => {
                self.metrics.interests_satisfied.increment();
                Ok(data)
            }
            Ok(Err(_)) => Err(anyhow!("face closed while waiting for Data")),
            Err(_) => {
                self.pending_interests.lock().await.remove(interest.name());
                self.metrics.interests_timed_out.increment();
                Err(anyhow!("Interest timed out: {}", interest.name()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use ndn_core::ContentType;

    #[tokio::test]
    async fn interest_is_delivered_to_matching_filter_and_satisfied() {
        let (client, server) = InProcessFace::pair();

        let responder_server = Arc::clone(&server);
        server
            .set_interest_filter(
                Name::from_uri("/a").unwrap(),
                Arc::new(move |interest: Interest| {
                    let responder = Arc::clone(&responder_server);
                    let name = interest.name().clone();
                    tokio::spawn(async move {
                        let mut data = Data::new(name);
                        data.set_content(Bytes::from_static(b"hello"));
                        data.set_content_type(ContentType::Blob);
                        data.sign_digest_sha256().unwrap();
                        data.encode().unwrap();
                        responder.put(data).await.unwrap();
                    });
                }),
            )
            .await
            .unwrap();

        let interest = Interest::new(Name::from_uri("/a/b").unwrap());
        let data = client.express_interest(interest, Duration::from_secs(1)).await.unwrap();
        assert_eq!(data.content(), &Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn unsatisfied_interest_times_out() {
        let (client, _server) = InProcessFace::pair();
        let interest = Interest::new(Name::from_uri("/nowhere").unwrap());
        let result = client.express_interest(interest, Duration::from_millis(20)).await;
        assert!(result.is_err());
    }
}
