use crate::{Broker, ChannelNaming, Connector, Gateway, PubSubTransportConfig};
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use relay_core::AppContext;
use relay_dispatch::Dispatcher;
use relay_message::{Envelope, Serializer};
use relay_routing::Pattern;
use relay_transport::{routing_key_for, Transport, TransportError};
use relay_util::Backoff;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A broadcast/fan-out transport over a generic channel-based pub/sub broker
/// (§4.6).
///
/// Routes decoded envelopes matching each active subscription's [`Pattern`]
/// to the given [`Dispatcher`]. Outgoing envelopes are published under a
/// channel name derived per [`ChannelNaming`]; [dual publish](PubSubTransportConfig::dual_publish)
/// optionally publishes under both names at once, for a rollout period where
/// both old and new subscribers must keep receiving traffic.
pub struct PubSubTransport<B: Broker> {
    name: Arc<str>,
    gateway: Gateway<B>,
    dispatcher: Arc<Dispatcher>,
    serializer: Arc<dyn Serializer>,
    config: PubSubTransportConfig,
    connected: Arc<AtomicBool>,
    subscriptions: Mutex<HashMap<Box<str>, JoinHandle<()>>>,
}

impl<B: Broker> PubSubTransport<B> {
    /// Builds a transport over a freshly started [`Connector`] for the given
    /// broker configuration.
    pub fn new(
        name: impl Into<Arc<str>>,
        broker_config: B::Config,
        dispatcher: Arc<Dispatcher>,
        serializer: Arc<dyn Serializer>,
        config: PubSubTransportConfig,
    ) -> Self {
        let name: Arc<str> = name.into();
        let backoff = Backoff::new(config.backoff());
        let gateway = Connector::<B>::start(Arc::clone(&name), broker_config, backoff);

        Self {
            name,
            gateway,
            dispatcher,
            serializer,
            config,
            connected: Arc::new(AtomicBool::new(false)),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    fn basic_channel(class: &str) -> String {
        class.to_string()
    }

    fn enhanced_channel(class: &str, envelope: &Envelope) -> Result<String, TransportError> {
        routing_key_for(class, envelope.header())
            .map(|key| key.as_str().to_string())
            .map_err(|error| TransportError::Broker(Box::from(error.to_string())))
    }

    fn channels_for(&self, class: &str, envelope: &Envelope) -> Result<Vec<String>, TransportError> {
        let basic = Self::basic_channel(class);

        match (self.config.channel_naming(), self.config.dual_publish()) {
            (ChannelNaming::Basic, false) => Ok(vec![basic]),
            (ChannelNaming::Enhanced, false) => Ok(vec![Self::enhanced_channel(class, envelope)?]),
            // Enhanced first, basic second (§4.6): the enhanced channel is
            // the migration target, so it is the one that should win the
            // "first published" ordering while dual-publish is still on.
            (_, true) => Ok(vec![Self::enhanced_channel(class, envelope)?, basic]),
        }
    }

    /// Translates a routing [`Pattern`] into the broker's own glob syntax.
    ///
    /// Most pub/sub brokers only understand a single per-character `*`
    /// wildcard, not our segment-aware `*`/`#` distinction, so both are
    /// translated to `*` here (over-matching), and the receive loop
    /// re-validates every message against the original [`Pattern`]
    /// client-side before routing it to the dispatcher (Design Notes).
    fn to_broker_glob(pattern: &Pattern) -> String {
        use relay_routing::Segment;

        pattern
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) => literal.to_string(),
                Segment::Star | Segment::Hash => "*".to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[async_trait]
impl<B: Broker> Transport for PubSubTransport<B> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, class: &str, envelope: &Envelope) -> Result<(), TransportError> {
        let channels = self.channels_for(class, envelope)?;
        let bytes = self
            .serializer
            .encode(envelope)
            .map_err(|error| TransportError::Broker(Box::from(error.to_string())))?;

        let connection = self.gateway.connection().await;
        self.connected.store(true, Ordering::Relaxed);

        // §4.6: the broker need only acknowledge one of the published
        // channels for the publish to count as successful; a failure is
        // raised only once every channel has failed.
        let mut failures = Vec::new();
        let mut successes = 0usize;

        for channel in channels {
            match connection.publish(&channel, bytes.clone()).await {
                Ok(()) => successes += 1,
                Err(error) => failures.push((Arc::from(channel.as_str()), error)),
            }
        }

        if successes > 0 || failures.is_empty() {
            return Ok(());
        }

        match failures.len() {
            1 => Err(failures.into_iter().next().expect("checked len == 1").1),
            _ => Err(TransportError::aggregate(failures)),
        }
    }

    async fn subscribe(&self, pattern: Pattern) -> Result<(), TransportError> {
        let glob = Self::to_broker_glob(&pattern);
        let connection = self.gateway.connection().await;
        self.connected.store(true, Ordering::Relaxed);

        let mut stream = connection.psubscribe(&glob).await?;

        let name = Arc::clone(&self.name);
        let dispatcher = Arc::clone(&self.dispatcher);
        let serializer = Arc::clone(&self.serializer);
        let pattern_for_task = pattern.clone();

        let handle = tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    _ = AppContext::terminated() => break,
                    next = stream.next() => {
                        let Some((_channel, bytes)) = next else { break };

                        match serializer.decode(&bytes) {
                            Ok(envelope) => {
                                let class = envelope.header().message_class().to_string();

                                if let Ok(key) = routing_key_for(&class, envelope.header()) {
                                    if !pattern_for_task.matches(&key) {
                                        continue;
                                    }
                                }

                                dispatcher.route(&class, envelope).await;
                            }
                            Err(error) => {
                                warn!(
                                    alert = true,
                                    name = name.as_ref(),
                                    %error,
                                    "failed to decode pub/sub message",
                                );
                            }
                        }
                    }
                }
            }

            info!(name = name.as_ref(), pattern = %pattern_for_task, "pub/sub receive loop stopped");
        });

        self.subscriptions
            .lock()
            .insert(Box::from(pattern.as_str()), handle);

        Ok(())
    }

    async fn unsubscribe(&self, pattern: &Pattern) -> Result<(), TransportError> {
        if let Some(handle) = self.subscriptions.lock().remove(pattern.as_str()) {
            handle.abort();
        }

        Ok(())
    }

    async fn unsubscribe_all(&self) -> Result<(), TransportError> {
        for (_, handle) in self.subscriptions.lock().drain() {
            handle.abort();
        }

        Ok(())
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn shutdown(&self, timeout: Duration) -> Result<(), TransportError> {
        self.unsubscribe_all().await?;

        let connection = tokio::time::timeout(timeout, self.gateway.connection())
            .await
            .ok();

        if let Some(connection) = connection {
            connection.close().await;
        }

        self.connected.store(false, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::{self, BoxStream};
    use relay_dispatch::{Dispatcher, DispatcherConfig, Filters, Handler, HandlerError};
    use relay_message::{JsonSerializer, Message, MessageClass};
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use test_util::MemoryPubSubBroker;

    /// A [`Broker`] stub that records every channel it is asked to publish
    /// to, in order, and fails publishes to a configured set of channels —
    /// used to exercise the dual-publish ordering and partial-failure
    /// semantics of §4.6 without a real broker.
    #[derive(Clone, Default)]
    struct FailureLedger {
        published: Arc<Mutex<Vec<String>>>,
        fail: Arc<Mutex<HashSet<String>>>,
    }

    #[derive(Clone, Default)]
    struct RecordingBroker {
        ledger: FailureLedger,
    }

    #[async_trait]
    impl Broker for RecordingBroker {
        type Config = FailureLedger;

        async fn connect(config: &Self::Config) -> Result<Self, TransportError> {
            Ok(Self { ledger: config.clone() })
        }

        async fn close(&self) {}

        async fn publish(&self, channel: &str, _payload: Vec<u8>) -> Result<(), TransportError> {
            self.ledger.published.lock().push(channel.to_string());

            if self.ledger.fail.lock().contains(channel) {
                Err(TransportError::Broker(Box::from(format!("{channel} rejected"))))
            } else {
                Ok(())
            }
        }

        async fn subscribe(&self, _channel: &str) -> Result<BoxStream<'static, Vec<u8>>, TransportError> {
            Ok(stream::empty().boxed())
        }

        async fn psubscribe(
            &self,
            _pattern: &str,
        ) -> Result<BoxStream<'static, (String, Vec<u8>)>, TransportError> {
            Ok(stream::empty().boxed())
        }

        async fn pubsub_channels(&self) -> Result<Vec<String>, TransportError> {
            Ok(Vec::new())
        }

        async fn pubsub_numsub(&self, _channel: &str) -> Result<usize, TransportError> {
            Ok(0)
        }
    }

    fn dual_publish_transport(ledger: FailureLedger) -> PubSubTransport<RecordingBroker> {
        PubSubTransport::new(
            "test-pubsub-dual",
            ledger,
            Arc::new(Dispatcher::new("pubsub-dual", DispatcherConfig::default())),
            Arc::new(JsonSerializer),
            PubSubTransportConfig {
                channel_naming: ChannelNaming::Enhanced,
                dual_publish: true,
                ..PubSubTransportConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn dual_publish_tries_the_enhanced_channel_before_the_basic_one() {
        // Given
        let ledger = FailureLedger::default();
        let transport = dual_publish_transport(ledger.clone());

        // When
        transport
            .publish(
                "demo.announcement",
                &envelope("demo.announcement", "system", "everyone"),
            )
            .await
            .unwrap();

        // Then
        assert_eq!(
            *ledger.published.lock(),
            vec![
                "demo.announcement.system.everyone".to_string(),
                "demo.announcement".to_string(),
            ],
        );
    }

    #[tokio::test]
    async fn dual_publish_succeeds_if_only_one_channel_is_acknowledged() {
        // Given
        let ledger = FailureLedger::default();
        ledger.fail.lock().insert("demo.announcement".to_string());
        let transport = dual_publish_transport(ledger.clone());

        // When / Then
        transport
            .publish(
                "demo.announcement",
                &envelope("demo.announcement", "system", "everyone"),
            )
            .await
            .unwrap();
        assert_eq!(ledger.published.lock().len(), 2);
    }

    #[tokio::test]
    async fn dual_publish_fails_only_if_both_channels_are_rejected() {
        // Given
        let ledger = FailureLedger::default();
        ledger.fail.lock().insert("demo.announcement".to_string());
        ledger.fail.lock().insert("demo.announcement.system.everyone".to_string());
        let transport = dual_publish_transport(ledger.clone());

        // When
        let result = transport
            .publish(
                "demo.announcement",
                &envelope("demo.announcement", "system", "everyone"),
            )
            .await;

        // Then
        assert!(result.is_err());
    }

    fn envelope(class: &str, from: &str, to: &str) -> Envelope {
        let class = Arc::new(MessageClass::builder(class).build());
        Message::builder(class)
            .with_from(from)
            .with_to(to)
            .build()
            .to_envelope()
    }

    /// Enhanced naming publishes under the full routing key, so the broker
    /// channel and the subscribing [`Pattern`] share the same segment count;
    /// Basic naming publishes under the bare class name instead, which a
    /// multi-segment pattern could never match.
    fn transport(dispatcher: Arc<Dispatcher>) -> PubSubTransport<MemoryPubSubBroker> {
        PubSubTransport::new(
            "test-pubsub",
            (),
            dispatcher,
            Arc::new(JsonSerializer),
            PubSubTransportConfig {
                channel_naming: ChannelNaming::Enhanced,
                ..PubSubTransportConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn broadcasts_to_every_subscriber_matching_the_pattern() {
        // Given
        let dispatcher = Arc::new(Dispatcher::new("pubsub-fanout", DispatcherConfig::default()));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        for (id, counter) in [("first", Arc::clone(&first)), ("second", Arc::clone(&second))] {
            dispatcher.subscribe(
                "demo.announcement",
                Handler::new(id, move |_envelope| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<(), HandlerError>(())
                    }
                }),
                Filters::none(),
            );
        }

        let transport = transport(Arc::clone(&dispatcher));
        transport
            .subscribe(Pattern::parse("demo.announcement.*.*").unwrap())
            .await
            .unwrap();

        // When
        transport
            .publish(
                "demo.announcement",
                &envelope("demo.announcement", "system", "everyone"),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        dispatcher.drain(Duration::from_secs(1)).await;

        // Then
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert!(transport.connected());
    }

    #[tokio::test]
    async fn unsubscribe_stops_further_delivery() {
        // Given
        let dispatcher = Arc::new(Dispatcher::new("pubsub-unsub", DispatcherConfig::default()));
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);

        dispatcher.subscribe(
            "demo.announcement",
            Handler::new("counter", move |_envelope| {
                let hits = Arc::clone(&hits_clone);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), HandlerError>(())
                }
            }),
            Filters::none(),
        );

        let transport = transport(Arc::clone(&dispatcher));
        let pattern = Pattern::parse("demo.announcement.*.*").unwrap();
        transport.subscribe(pattern.clone()).await.unwrap();

        transport
            .publish(
                "demo.announcement",
                &envelope("demo.announcement", "system", "everyone"),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // When
        transport.unsubscribe(&pattern).await.unwrap();
        transport
            .publish(
                "demo.announcement",
                &envelope("demo.announcement", "system", "everyone"),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        dispatcher.drain(Duration::from_secs(1)).await;

        // Then
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
