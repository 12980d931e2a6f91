use crate::{Broker, DeadLetterRecord, QueueTransport};
use parking_lot::Mutex as SyncMutex;
use relay_dispatch::{Filters, Handler, HandlerError, SubscriptionHandle};
use relay_routing::{InvalidRouting, PatternBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

/// Fluently constrains and registers a queue subscription (§4.7):
/// `queue_transport.where_class("demo.order_created").from("api").to("billing").subscribe(handler)`.
///
/// Every call goes through this builder rather than `Transport::subscribe`
/// directly, because only here is the handler known at the same time as the
/// pattern — which is what lets the dead-letter wrapping below capture the
/// one queue a given handler's messages are consumed from.
pub struct QueueSubscriptionBuilder<'a, B: Broker> {
    transport: &'a QueueTransport<B>,
    class: Arc<str>,
    pattern_builder: PatternBuilder,
    consumer_group: Option<Arc<str>>,
}

impl<'a, B: Broker> QueueSubscriptionBuilder<'a, B> {
    pub(crate) fn new(transport: &'a QueueTransport<B>, class: impl Into<Arc<str>>) -> Self {
        Self {
            transport,
            class: class.into(),
            pattern_builder: PatternBuilder::new(),
            consumer_group: None,
        }
    }

    /// Constrains the namespace segment to the given class-derived type.
    pub fn type_of(mut self, type_: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        self.pattern_builder = self.pattern_builder.type_of(type_)?;
        Ok(self)
    }

    /// Constrains the `from` segment.
    pub fn from(mut self, from: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        self.pattern_builder = self.pattern_builder.from(from)?;
        Ok(self)
    }

    /// Constrains the `to` segment.
    pub fn to(mut self, to: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        self.pattern_builder = self.pattern_builder.to(to)?;
        Ok(self)
    }

    /// Overrides the consumer group this subscription registers under,
    /// rather than the transport's configured default.
    pub fn consumer_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.consumer_group = Some(group.into());
        self
    }

    /// Compiles the accumulated predicates, binds the resulting pattern to a
    /// queue, and registers `handler` with the dispatcher.
    ///
    /// `handler` is wrapped so a failure past
    /// [`max_retries`](crate::QueueTransportConfig::max_retries) pushes a
    /// [`DeadLetterRecord`] onto this queue's dead-letter queue, if enabled
    /// (§4.7, `DESIGN.md`). The wrapping is transparent to the dispatcher:
    /// `relay_dispatch` sees one ordinary handler and records its usual
    /// counters against it.
    pub async fn subscribe(
        self,
        handler: Handler,
    ) -> Result<SubscriptionHandle, relay_transport::TransportError> {
        let pattern = self.pattern_builder.build();
        let queue_name = self.transport.queue_name_for(&pattern);
        let config = self.transport.config().clone();
        let gateway = self.transport.gateway().clone();
        let serializer = Arc::clone(self.transport.serializer());
        let class_for_wrapper = Arc::clone(&self.class);
        let handler_id = handler.id().clone();
        let dispatcher = Arc::clone(self.transport.dispatcher());
        let first_failures: Arc<SyncMutex<HashMap<Uuid, OffsetDateTime>>> =
            Arc::new(SyncMutex::new(HashMap::new()));

        let wrapped = Handler::new(handler_id.clone(), move |envelope| {
            let handler = handler.clone();
            let config = config.clone();
            let gateway = gateway.clone();
            let serializer = Arc::clone(&serializer);
            let class = Arc::clone(&class_for_wrapper);
            let handler_id = handler_id.clone();
            let queue_name = Arc::clone(&queue_name);
            let first_failures = Arc::clone(&first_failures);
            let dispatcher = Arc::clone(&dispatcher);

            async move {
                let uuid = envelope.header().uuid();
                let result = handler.invoke(envelope.clone()).await;

                match &result {
                    Ok(()) => {
                        first_failures.lock().remove(&uuid);
                    }
                    Err(error) => {
                        let now = OffsetDateTime::now_utc();
                        let first_failure_at =
                            *first_failures.lock().entry(uuid).or_insert(now);

                        if config.dead_letter_queue() {
                            dead_letter_if_exhausted(
                                &config,
                                &gateway,
                                serializer.as_ref(),
                                dispatcher.as_ref(),
                                &class,
                                handler_id.as_str(),
                                &queue_name,
                                &envelope,
                                error,
                                first_failure_at,
                                now,
                            )
                            .await;

                            first_failures.lock().remove(&uuid);
                        }
                    }
                }

                result
            }
        });

        let subscription_handle =
            self.transport
                .dispatcher()
                .subscribe(Arc::clone(&self.class), wrapped, Filters::none());

        let consumer_group = self
            .consumer_group
            .unwrap_or_else(|| Arc::from(self.transport.config().consumer_group()));

        self.transport.subscribe_as(pattern, consumer_group).await?;

        Ok(subscription_handle)
    }
}

#[allow(clippy::too_many_arguments)]
async fn dead_letter_if_exhausted<B: Broker>(
    config: &crate::QueueTransportConfig,
    gateway: &crate::Gateway<B>,
    serializer: &dyn relay_message::Serializer,
    dispatcher: &relay_dispatch::Dispatcher,
    class: &str,
    handler_id: &str,
    queue_name: &str,
    envelope: &relay_message::Envelope,
    error: &HandlerError,
    first_failure_at: OffsetDateTime,
    last_failure_at: OffsetDateTime,
) {
    // The dispatcher records this invocation's own outcome only after this
    // wrapper's future resolves, so `handler_error` here is the count from
    // every *prior* failure; `+ 1` accounts for the one in progress.
    let counts = dispatcher.counts_for(class, handler_id);

    if counts.handler_error + 1 <= config.max_retries() as u64 {
        return;
    }

    let original = match serializer.encode(envelope) {
        Ok(bytes) => bytes,
        Err(encode_error) => {
            warn!(
                alert = true,
                class,
                handler_id,
                %encode_error,
                "failed to encode envelope for dead-letter queue",
            );
            return;
        }
    };

    let record = DeadLetterRecord {
        original,
        origin_queue: Box::from(queue_name),
        error_class: Box::from("HandlerError"),
        error_message: Box::from(error.to_string()),
        retry_count: counts.handler_error + 1,
        first_failure_at,
        last_failure_at,
    };

    let payload = match record.to_json() {
        Ok(payload) => payload,
        Err(json_error) => {
            warn!(alert = true, class, handler_id, %json_error, "failed to encode dead-letter record");
            return;
        }
    };

    let dlq_name = format!("{}.{}", config.dead_letter_prefix(), queue_name);
    let connection = gateway.connection().await;

    if let Err(broker_error) = connection.lpush(&dlq_name, payload).await {
        warn!(
            alert = true,
            class,
            handler_id,
            queue = dlq_name,
            %broker_error,
            "failed to push dead-lettered message",
        );
    }
}
