use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use relay_pubsub::Broker;
use relay_transport::TransportError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};

/// An in-process stand-in for a channel-based pub/sub broker, shared by every
/// clone of a given [`MemoryPubSubBroker`].
///
/// Exact-match subscribers are delivered by channel name; pattern
/// subscribers are delivered by a dot-segmented glob match where `*` stands
/// for exactly one segment, mirroring the single-wildcard glob that
/// [`PubSubTransport`](relay_pubsub::PubSubTransport) itself emits via
/// `to_broker_glob`.
#[derive(Default)]
struct Switchboard {
    exact: HashMap<String, Vec<UnboundedSender<Vec<u8>>>>,
    patterns: Vec<(String, UnboundedSender<(String, Vec<u8>)>)>,
}

/// An in-memory [`Broker`](relay_pubsub::Broker) implementation for tests:
/// no network I/O, just local fan-out over `tokio::sync::mpsc` channels.
#[derive(Clone, Default)]
pub struct MemoryPubSubBroker {
    switchboard: Arc<Mutex<Switchboard>>,
}

fn glob_matches(glob: &str, channel: &str) -> bool {
    let glob_segments: Vec<_> = glob.split('.').collect();
    let channel_segments: Vec<_> = channel.split('.').collect();

    glob_segments.len() == channel_segments.len()
        && glob_segments
            .iter()
            .zip(channel_segments.iter())
            .all(|(glob, channel)| *glob == "*" || glob == channel)
}

#[async_trait]
impl Broker for MemoryPubSubBroker {
    type Config = ();

    async fn connect(_config: &Self::Config) -> Result<Self, TransportError> {
        Ok(Self::default())
    }

    async fn close(&self) {}

    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        let switchboard = self.switchboard.lock();

        if let Some(subscribers) = switchboard.exact.get(channel) {
            for subscriber in subscribers {
                let _ = subscriber.send(payload.clone());
            }
        }

        for (pattern, subscriber) in &switchboard.patterns {
            if glob_matches(pattern, channel) {
                let _ = subscriber.send((channel.to_string(), payload.clone()));
            }
        }

        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<BoxStream<'static, Vec<u8>>, TransportError> {
        let (sender, receiver) = mpsc::unbounded_channel();

        self.switchboard
            .lock()
            .exact
            .entry(channel.to_string())
            .or_default()
            .push(sender);

        Ok(tokio_stream_from_unbounded(receiver).boxed())
    }

    async fn psubscribe(
        &self,
        pattern: &str,
    ) -> Result<BoxStream<'static, (String, Vec<u8>)>, TransportError> {
        let (sender, receiver) = mpsc::unbounded_channel();

        self.switchboard
            .lock()
            .patterns
            .push((pattern.to_string(), sender));

        Ok(tokio_stream_from_unbounded(receiver).boxed())
    }

    async fn pubsub_channels(&self) -> Result<Vec<String>, TransportError> {
        Ok(self
            .switchboard
            .lock()
            .exact
            .iter()
            .filter(|(_, subscribers)| !subscribers.is_empty())
            .map(|(channel, _)| channel.clone())
            .collect())
    }

    async fn pubsub_numsub(&self, channel: &str) -> Result<usize, TransportError> {
        Ok(self
            .switchboard
            .lock()
            .exact
            .get(channel)
            .map(Vec::len)
            .unwrap_or(0))
    }
}

fn tokio_stream_from_unbounded<T: Send + 'static>(
    receiver: mpsc::UnboundedReceiver<T>,
) -> impl futures::Stream<Item = T> + Send + 'static {
    futures::stream::unfold(receiver, |mut receiver| async move {
        let item = receiver.recv().await?;
        Some((item, receiver))
    })
}
