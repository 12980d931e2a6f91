use crate::{
    Counters, DispatcherConfig, Filters, Handler, HandlerCounts, HandlerId, SubscriptionHandle,
    SubscriptionRegistry, WorkerPool,
};
use relay_core::{AppSpindown, AppSpindownToken};
use relay_message::Envelope;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The subscription registry and worker pool that together route decoded
/// envelopes to their subscribed handlers (§4.4).
///
/// A [`Dispatcher`] registers itself with the global
/// [`AppSpindown`](relay_core::AppSpindown) registry on construction and
/// punches out once [`drain`](Dispatcher::drain) completes, so a process
/// shutdown sequence that awaits spindown will naturally wait for in-flight
/// handlers to finish.
pub struct Dispatcher {
    registry: SubscriptionRegistry,
    pool: WorkerPool,
    counters: Arc<Counters>,
    spindown: AppSpindownToken,
}

impl Dispatcher {
    /// Builds a new dispatcher with the given configuration, spawning its
    /// worker pool immediately.
    pub fn new(name: impl AsRef<str>, config: DispatcherConfig) -> Self {
        let counters = Arc::new(Counters::new());
        let pool = WorkerPool::spawn(
            config.worker_count(),
            config.queue_depth(),
            config.overflow_timeout(),
            Arc::clone(&counters),
        );

        Self {
            registry: SubscriptionRegistry::new(),
            pool,
            counters,
            spindown: AppSpindown::register(name),
        }
    }

    /// Registers `handler` for `class`, constrained by `filters`.
    ///
    /// Idempotent by `(class, handler)`: re-subscribing the same pair
    /// replaces its filters.
    pub fn subscribe(
        &self,
        class: impl Into<Arc<str>>,
        handler: Handler,
        filters: Filters,
    ) -> SubscriptionHandle {
        self.registry.subscribe(class, handler, filters)
    }

    /// Removes a single `(class, handler)` registration. Returns whether a
    /// record was removed.
    pub fn unsubscribe(&self, class: &str, handler_id: &HandlerId) -> bool {
        self.registry.unsubscribe(class, handler_id)
    }

    /// Removes every handler registered for `class`. Returns the number of
    /// records removed.
    pub fn unsubscribe_all(&self, class: &str) -> usize {
        self.registry.unsubscribe_all(class)
    }

    /// Routes a decoded envelope of the given message class to every
    /// subscriber whose filters match the envelope's header.
    ///
    /// An envelope with no matching subscriber at all is counted as dropped
    /// (not an error: publishing to a class nobody is listening to yet is
    /// normal during rollout). Multiple matching subscribers each receive
    /// their own clone of the envelope, submitted independently to the
    /// worker pool; a submission rejected for overflow does not block or
    /// affect delivery to other subscribers.
    pub async fn route(&self, class: &str, envelope: Envelope) {
        let subscriptions = self.registry.subscriptions_for(class);

        if subscriptions.is_empty() {
            self.counters.record_dropped_no_match(class);
            debug!(class, "no subscribers registered for message class");
            return;
        }

        let class: Arc<str> = Arc::from(class);
        let mut matched = false;

        for entry in subscriptions {
            if !entry.filters().evaluate(envelope.header()) {
                continue;
            }

            matched = true;

            let accepted = self
                .pool
                .submit(Arc::clone(&class), entry.handler().clone(), envelope.clone())
                .await;

            if !accepted {
                debug!(
                    alert = true,
                    %class,
                    handler = %entry.handler().id(),
                    "submission rejected: worker pool overflow",
                );
            }
        }

        if !matched {
            self.counters.record_dropped_no_match(&class);
            debug!(%class, "no subscriber's filters matched this envelope");
        }
    }

    /// Returns the counts recorded for a given `(class, handler)` pair.
    pub fn counts_for(&self, class: &str, handler_id: &str) -> HandlerCounts {
        self.counters.counts_for(class, handler_id)
    }

    /// Returns the number of envelopes of `class` dropped for lack of a
    /// subscriber.
    pub fn dropped_no_match(&self, class: &str) -> u64 {
        self.counters.dropped_no_match(class)
    }

    /// Waits for all in-flight handler invocations to complete, then punches
    /// out of the global spindown registry. Returns `true` if the pool
    /// drained fully within `timeout`.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let drained = self.pool.drain(timeout).await;
        self.spindown.punch_out();
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandlerError;
    use relay_message::{Message, MessageClass};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope(class: &str, from: &str, to: Option<&str>) -> Envelope {
        let class = Arc::new(MessageClass::builder(class).build());
        let mut builder = Message::builder(class).with_from(from);
        if let Some(to) = to {
            builder = builder.with_to(to);
        }
        builder.build().to_envelope()
    }

    #[tokio::test]
    async fn routes_to_matching_subscriber_only() {
        // Given
        let dispatcher = Dispatcher::new("test-dispatcher", DispatcherConfig::default());
        let matched = Arc::new(AtomicUsize::new(0));
        let unmatched = Arc::new(AtomicUsize::new(0));

        let matched_clone = Arc::clone(&matched);
        dispatcher.subscribe(
            "demo.order_created",
            Handler::new("matcher", move |_envelope| {
                let matched = Arc::clone(&matched_clone);
                async move {
                    matched.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), HandlerError>(())
                }
            }),
            Filters::none().with_from(crate::MatchSet::literal("orders")),
        );

        let unmatched_clone = Arc::clone(&unmatched);
        dispatcher.subscribe(
            "demo.order_created",
            Handler::new("non_matcher", move |_envelope| {
                let unmatched = Arc::clone(&unmatched_clone);
                async move {
                    unmatched.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), HandlerError>(())
                }
            }),
            Filters::none().with_from(crate::MatchSet::literal("payments")),
        );

        // When
        dispatcher
            .route("demo.order_created", envelope("demo.order_created", "orders", None))
            .await;
        dispatcher.drain(Duration::from_secs(1)).await;

        // Then
        assert_eq!(matched.load(Ordering::SeqCst), 1);
        assert_eq!(unmatched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn envelope_with_no_subscriber_is_counted_dropped() {
        // Given
        let dispatcher = Dispatcher::new("test-dispatcher-2", DispatcherConfig::default());

        // When
        dispatcher
            .route("demo.untouched", envelope("demo.untouched", "anyone", None))
            .await;

        // Then
        assert_eq!(dispatcher.dropped_no_match("demo.untouched"), 1);
    }

    #[tokio::test]
    async fn envelope_rejected_by_every_filter_is_counted_dropped() {
        // Given
        let dispatcher = Dispatcher::new("test-dispatcher-3", DispatcherConfig::default());
        let invocations = Arc::new(AtomicUsize::new(0));
        let invocations_clone = Arc::clone(&invocations);

        dispatcher.subscribe(
            "demo.order_created",
            Handler::new("non_matcher", move |_envelope| {
                let invocations = Arc::clone(&invocations_clone);
                async move {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), HandlerError>(())
                }
            }),
            Filters::none().with_from(crate::MatchSet::literal("payments")),
        );

        // When
        dispatcher
            .route("demo.order_created", envelope("demo.order_created", "orders", None))
            .await;
        dispatcher.drain(Duration::from_secs(1)).await;

        // Then
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.dropped_no_match("demo.order_created"), 1);
    }
}
