use crate::{
    derive_queue_name, worker, Broker, Connector, ConsumerGroup, Gateway, QueueSubscriptionBuilder,
    QueueTransportConfig, RoutingTable,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use relay_dispatch::Dispatcher;
use relay_message::{Envelope, Serializer};
use relay_routing::Pattern;
use relay_transport::{routing_key_for, Transport, TransportError};
use relay_util::Backoff;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// A point-in-time read of one queue's state (§3, §4.7): how many encoded
/// envelopes are waiting, the pattern it was derived from, and the consumers
/// currently bound to it.
#[derive(Debug, Clone)]
pub struct QueueStats {
    /// The number of encoded envelopes currently queued.
    pub length: usize,
    /// The pattern this queue was derived from.
    pub pattern: Pattern,
    /// The consumers currently bound to this queue.
    pub consumers: Vec<ConsumerGroup>,
}

/// A work-queue transport over a generic list-based broker (§4.7).
///
/// Unlike [`PubSubTransport`](relay_pubsub::PubSubTransport), which fans a
/// publish out to every live subscriber, this transport publishes into a
/// small, deduplicated set of named queues (one per distinct subscribed
/// [`Pattern`]) and lets any number of competing workers pop from each —
/// messages are load-balanced across a queue's consumers, not broadcast to
/// them.
pub struct QueueTransport<B: Broker> {
    name: Arc<str>,
    gateway: Gateway<B>,
    dispatcher: Arc<Dispatcher>,
    serializer: Arc<dyn Serializer>,
    config: QueueTransportConfig,
    routing_table: Arc<RoutingTable>,
    connected: Arc<AtomicBool>,
    workers: Mutex<HashMap<(Box<str>, ConsumerGroup), JoinHandle<()>>>,
}

impl<B: Broker> QueueTransport<B> {
    /// Builds a transport over a freshly started [`Connector`] for the given
    /// broker configuration.
    pub fn new(
        name: impl Into<Arc<str>>,
        broker_config: B::Config,
        dispatcher: Arc<Dispatcher>,
        serializer: Arc<dyn Serializer>,
        config: QueueTransportConfig,
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
            routing_table: Arc::new(RoutingTable::new()),
            connected: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// This transport's routing table, shared with the management surface
    /// (`queue_stats`, `routing_table`) and the subscription builder.
    pub fn routing_table(&self) -> &Arc<RoutingTable> {
        &self.routing_table
    }

    /// This transport's configuration.
    pub fn config(&self) -> &QueueTransportConfig {
        &self.config
    }

    /// The dispatcher this transport routes decoded envelopes to, shared
    /// with [`QueueSubscriptionBuilder`](crate::QueueSubscriptionBuilder) so
    /// it can register handlers directly.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The serializer this transport encodes and decodes envelopes with.
    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.serializer
    }

    /// Subscribes under an explicit consumer group, rather than this
    /// transport's configured default. Used by
    /// [`QueueSubscriptionBuilder`](crate::QueueSubscriptionBuilder) to honor
    /// a per-subscription `.consumer_group(...)` override.
    pub async fn subscribe_as(
        &self,
        pattern: Pattern,
        consumer_group: impl Into<Arc<str>>,
    ) -> Result<(), TransportError> {
        let consumer = ConsumerGroup::new(consumer_group.into(), Arc::from(self.config.consumer_id()));
        let queue_name = self
            .routing_table
            .bind(self.config.queue_prefix(), pattern, consumer.clone());

        let key = (Box::from(queue_name.as_ref()), consumer.clone());

        if self.workers.lock().contains_key(&key) {
            return Ok(());
        }

        if self.config.test_mode() {
            return Ok(());
        }

        self.connected.store(true, Ordering::Relaxed);

        let worker_name: Arc<str> = Arc::from(format!(
            "{}:{}:{}",
            self.name,
            consumer.group_id(),
            consumer.consumer_id(),
        ));

        let handle = worker::spawn(
            worker_name,
            Arc::clone(&queue_name),
            self.gateway.clone(),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.serializer),
            self.config.block_time(),
            Arc::new(Backoff::new(self.config.backoff())),
        );

        self.workers.lock().insert(key, handle);

        Ok(())
    }

    /// Unsubscribes an explicit consumer group. See
    /// [`subscribe_as`](Self::subscribe_as).
    pub async fn unsubscribe_as(
        &self,
        pattern: &Pattern,
        consumer_group: impl Into<Arc<str>>,
    ) -> Result<(), TransportError> {
        let consumer = ConsumerGroup::new(consumer_group.into(), Arc::from(self.config.consumer_id()));

        if let Some(queue_name) = self.routing_table.unbind(pattern, &consumer) {
            let key = (Box::from(queue_name.as_ref()), consumer);

            if let Some(handle) = self.workers.lock().remove(&key) {
                handle.abort();
            }
        }

        Ok(())
    }

    /// The queue name a pattern is, or would be, bound to.
    pub fn queue_name_for(&self, pattern: &Pattern) -> Arc<str> {
        derive_queue_name(self.config.queue_prefix(), pattern)
    }

    /// A live gateway to this transport's broker connection, used by the
    /// management surface to query queue lengths directly.
    pub fn gateway(&self) -> &Gateway<B> {
        &self.gateway
    }

    /// Starts a fluent subscription for `class` (§4.7):
    /// `transport.where_class("demo.order_created").from("api").to("billing").subscribe(handler)`.
    ///
    /// This is the only reachable entry point for the dead-letter wrapping
    /// `QueueSubscriptionBuilder::subscribe` applies, since only there is a
    /// handler known at the same time as the pattern it is bound to.
    pub fn where_class(&self, class: impl Into<Arc<str>>) -> QueueSubscriptionBuilder<'_, B> {
        QueueSubscriptionBuilder::new(self, class)
    }

    /// Returns a snapshot of every known queue's `{length, pattern,
    /// consumers}` (§3, §4.7's read-only management surface).
    ///
    /// Length is queried live from the broker, so a drained queue reports
    /// `0` (§8 scenario 2).
    pub async fn queue_stats(&self) -> Result<HashMap<Arc<str>, QueueStats>, TransportError> {
        let bindings = self.routing_table.bindings();
        let connection = self.gateway.connection().await;
        let mut stats = HashMap::with_capacity(bindings.len());

        for binding in bindings {
            let length = connection.len(binding.queue_name()).await?;

            stats.insert(
                Arc::from(binding.queue_name()),
                QueueStats {
                    length,
                    pattern: binding.pattern().clone(),
                    consumers: binding.consumers().cloned().collect(),
                },
            );
        }

        Ok(stats)
    }

    /// Deletes `queue` outright. Destructive; reserved for administrative
    /// use (§4.7) — it does not unbind any pattern still routing to it.
    pub async fn clear_queue(&self, queue: &str) -> Result<(), TransportError> {
        let connection = self.gateway.connection().await;
        connection.clear(queue).await
    }
}

#[async_trait]
impl<B: Broker> Transport for QueueTransport<B> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, class: &str, envelope: &Envelope) -> Result<(), TransportError> {
        let key = routing_key_for(class, envelope.header())
            .map_err(|error| TransportError::Broker(Box::from(error.to_string())))?;

        let queues = self.routing_table.matching_queues(&key);

        if queues.is_empty() {
            return Ok(());
        }

        let bytes = self
            .serializer
            .encode(envelope)
            .map_err(|error| TransportError::Broker(Box::from(error.to_string())))?;

        let connection = self.gateway.connection().await;
        self.connected.store(true, Ordering::Relaxed);

        for queue in queues {
            connection.lpush(&queue, bytes.clone()).await?;
            connection.ltrim(&queue, self.config.max_queue_length()).await?;
        }

        Ok(())
    }

    async fn subscribe(&self, pattern: Pattern) -> Result<(), TransportError> {
        self.subscribe_as(pattern, Arc::from(self.config.consumer_group())).await
    }

    async fn unsubscribe(&self, pattern: &Pattern) -> Result<(), TransportError> {
        self.unsubscribe_as(pattern, Arc::from(self.config.consumer_group())).await
    }

    async fn unsubscribe_all(&self) -> Result<(), TransportError> {
        for queue_name in self.routing_table.clear() {
            let mut workers = self.workers.lock();
            let keys: Vec<_> = workers
                .keys()
                .filter(|(queue, _)| queue.as_ref() == queue_name.as_ref())
                .cloned()
                .collect();

            for key in keys {
                if let Some(handle) = workers.remove(&key) {
                    handle.abort();
                }
            }
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
        info!(name = self.name.as_ref(), "queue transport shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_dispatch::{Dispatcher, DispatcherConfig, Filters, Handler, HandlerError};
    use relay_message::{JsonSerializer, Message, MessageClass};
    use std::sync::atomic::AtomicUsize;
    use test_util::MemoryQueueBroker;

    fn envelope(class: &str, from: &str, to: &str) -> Envelope {
        let message_class = Arc::new(MessageClass::builder(class).build());
        Message::builder(message_class)
            .with_from(from)
            .with_to(to)
            .build()
            .to_envelope()
    }

    fn fast_config(consumer_group: &str, consumer_id: &str) -> QueueTransportConfig {
        QueueTransportConfig {
            consumer_group: Box::from(consumer_group),
            consumer_id: Box::from(consumer_id),
            block_time: Duration::from_millis(20),
            ..QueueTransportConfig::default()
        }
    }

    #[tokio::test]
    async fn routes_published_envelopes_to_the_matching_queue_subscriber() {
        // Given
        let dispatcher = Arc::new(Dispatcher::new("queue-routing", DispatcherConfig::default()));
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);

        dispatcher.subscribe(
            "demo.order_created",
            Handler::new("counter", move |_envelope| {
                let hits = Arc::clone(&hits_clone);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), HandlerError>(())
                }
            }),
            Filters::none(),
        );

        let transport = QueueTransport::<MemoryQueueBroker>::new(
            "test-queue",
            MemoryQueueBroker::new_shared_config(),
            Arc::clone(&dispatcher),
            Arc::new(JsonSerializer),
            fast_config("default", "solo"),
        );

        transport
            .subscribe(Pattern::parse("demo.order_created.*.*").unwrap())
            .await
            .unwrap();

        // When
        transport
            .publish(
                "demo.order_created",
                &envelope("demo.order_created", "api", "customer"),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        dispatcher.drain(Duration::from_secs(1)).await;

        // Then
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(transport.connected());
    }

    #[tokio::test]
    async fn consumer_group_load_balances_without_duplicating_delivery() {
        // Given
        let shared_config = MemoryQueueBroker::new_shared_config();
        let pattern = Pattern::parse("demo.task_created.*.*").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let dispatcher_a = Arc::new(Dispatcher::new("queue-consumer-a", DispatcherConfig::default()));
        let dispatcher_b = Arc::new(Dispatcher::new("queue-consumer-b", DispatcherConfig::default()));

        for dispatcher in [&dispatcher_a, &dispatcher_b] {
            let hits = Arc::clone(&hits);
            dispatcher.subscribe(
                "demo.task_created",
                Handler::new("counter", move |_envelope| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Ok::<(), HandlerError>(())
                    }
                }),
                Filters::none(),
            );
        }

        let transport_a = QueueTransport::<MemoryQueueBroker>::new(
            "consumer-a",
            Arc::clone(&shared_config),
            Arc::clone(&dispatcher_a),
            Arc::new(JsonSerializer),
            fast_config("workers", "a"),
        );
        let transport_b = QueueTransport::<MemoryQueueBroker>::new(
            "consumer-b",
            Arc::clone(&shared_config),
            Arc::clone(&dispatcher_b),
            Arc::new(JsonSerializer),
            fast_config("workers", "b"),
        );

        transport_a.subscribe(pattern.clone()).await.unwrap();
        transport_b.subscribe(pattern.clone()).await.unwrap();

        // When
        const MESSAGE_COUNT: usize = 10;
        for _ in 0..MESSAGE_COUNT {
            transport_a
                .publish(
                    "demo.task_created",
                    &envelope("demo.task_created", "api", "worker_pool"),
                )
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        dispatcher_a.drain(Duration::from_secs(1)).await;
        dispatcher_b.drain(Duration::from_secs(1)).await;

        // Then
        assert_eq!(hits.load(Ordering::SeqCst), MESSAGE_COUNT);
    }

    #[tokio::test]
    async fn queue_stats_reports_length_pattern_and_consumers_and_zero_after_drain() {
        // Given
        let dispatcher = Arc::new(Dispatcher::new("queue-stats", DispatcherConfig::default()));
        dispatcher.subscribe(
            "demo.order_created",
            Handler::new("counter", |_envelope| async { Ok::<(), HandlerError>(()) }),
            Filters::none(),
        );

        let transport = QueueTransport::<MemoryQueueBroker>::new(
            "test-queue",
            MemoryQueueBroker::new_shared_config(),
            Arc::clone(&dispatcher),
            Arc::new(JsonSerializer),
            fast_config("default", "solo"),
        );

        let pattern = Pattern::parse("demo.order_created.*.*").unwrap();
        transport.subscribe(pattern.clone()).await.unwrap();

        transport
            .publish(
                "demo.order_created",
                &envelope("demo.order_created", "api", "customer"),
            )
            .await
            .unwrap();

        // When
        let stats = transport.queue_stats().await.unwrap();

        // Then
        let queue_name = transport.queue_name_for(&pattern);
        let entry = stats.get(queue_name.as_ref()).expect("queue is tracked");
        assert_eq!(entry.length, 1);
        assert_eq!(entry.pattern, pattern);
        assert_eq!(entry.consumers.len(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        dispatcher.drain(Duration::from_secs(1)).await;

        let drained_stats = transport.queue_stats().await.unwrap();
        assert_eq!(drained_stats.get(queue_name.as_ref()).unwrap().length, 0);
    }

    #[tokio::test]
    async fn clear_queue_empties_a_queue_outright() {
        // Given
        let dispatcher = Arc::new(Dispatcher::new("queue-clear", DispatcherConfig::default()));
        let transport = QueueTransport::<MemoryQueueBroker>::new(
            "test-queue",
            MemoryQueueBroker::new_shared_config(),
            Arc::clone(&dispatcher),
            Arc::new(JsonSerializer),
            fast_config("default", "solo"),
        );

        let pattern = Pattern::parse("demo.order_created.*.*").unwrap();
        let queue_name = transport.queue_name_for(&pattern);
        transport.routing_table().bind(
            transport.config().queue_prefix(),
            pattern,
            ConsumerGroup::new(Arc::from("default"), Arc::from("solo")),
        );

        transport
            .publish(
                "demo.order_created",
                &envelope("demo.order_created", "api", "customer"),
            )
            .await
            .unwrap();
        assert_eq!(
            transport.gateway().connection().await.len(&queue_name).await.unwrap(),
            1
        );

        // When
        transport.clear_queue(&queue_name).await.unwrap();

        // Then
        assert_eq!(
            transport.gateway().connection().await.len(&queue_name).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn where_class_subscription_wires_the_dead_letter_path() {
        // Given
        let dispatcher = Arc::new(Dispatcher::new("queue-dlq", DispatcherConfig::default()));
        let config = QueueTransportConfig {
            consumer_group: Box::from("default"),
            consumer_id: Box::from("solo"),
            block_time: Duration::from_millis(20),
            max_retries: 0,
            dead_letter_queue: true,
            ..QueueTransportConfig::default()
        };

        let transport = QueueTransport::<MemoryQueueBroker>::new(
            "test-queue",
            MemoryQueueBroker::new_shared_config(),
            Arc::clone(&dispatcher),
            Arc::new(JsonSerializer),
            config,
        );

        transport
            .where_class("demo.order_created")
            .from("api")
            .unwrap()
            .to("billing")
            .unwrap()
            .subscribe(Handler::new("always_fails", |_envelope| async {
                Err::<(), HandlerError>(HandlerError::new("boom"))
            }))
            .await
            .unwrap();

        // When
        transport
            .publish(
                "demo.order_created",
                &envelope("demo.order_created", "api", "billing"),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        dispatcher.drain(Duration::from_secs(1)).await;

        // Then
        let queue_name = transport.queue_name_for(&Pattern::parse("#.api.billing").unwrap());
        let dlq_name = format!("{}.{}", transport.config().dead_letter_prefix(), queue_name);
        let connection = transport.gateway().connection().await;
        let (popped_from, payload) = connection
            .brpop(&[dlq_name.clone()], Duration::from_millis(50))
            .await
            .unwrap()
            .expect("a dead-lettered record was pushed");
        assert_eq!(popped_from, dlq_name);

        let record = DeadLetterRecord::from_json(&payload).unwrap();
        assert_eq!(record.origin_queue.as_ref(), queue_name.as_ref());
        assert_eq!(record.retry_count, 1);
    }
}
