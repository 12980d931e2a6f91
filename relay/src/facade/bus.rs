use crate::AppConfig;
use relay_dispatch::Dispatcher;
use relay_message::Serializer;
use std::sync::{Arc, OnceLock};

#[cfg(feature = "pubsub")]
use relay_pubsub::{Broker as PubSubBroker, PubSubTransport};

#[cfg(feature = "queue")]
use relay_queue::{Broker as QueueBroker, QueueTransport};

/// A facade for building the message-bus components described in §4, wired
/// to the application's global [`AppConfig`].
///
/// This mirrors how other Relay facades expose ready-to-use clients built
/// from configuration, with one difference: concrete broker clients are
/// outside this workspace's scope (§1 Non-goals), so
/// [`Bus::pubsub_transport`] and [`Bus::queue_transport`] are generic over
/// any caller-supplied [`Broker`] implementation rather than hard-wiring
/// one.
///
/// [`Broker`]: relay_pubsub::Broker
pub struct Bus;

impl Bus {
    /// Returns the process-wide [`Dispatcher`], lazily constructed from
    /// [`AppConfig::dispatcher`] on first access.
    ///
    /// Every transport built through this facade shares this single
    /// dispatcher, matching the spec's "process-wide, concurrent router"
    /// framing of the dispatcher (§1).
    pub fn dispatcher() -> &'static Arc<Dispatcher> {
        static DISPATCHER: OnceLock<Arc<Dispatcher>> = OnceLock::new();

        DISPATCHER.get_or_init(|| {
            let config = AppConfig::get();

            Arc::new(Dispatcher::new("bus", config.dispatcher().clone()))
        })
    }

    /// Builds a [`PubSubTransport`] named `name`, wired to the shared
    /// [`dispatcher`](Bus::dispatcher) and configured from
    /// [`AppConfig::pubsub`].
    ///
    /// # Panics
    ///
    /// Panics if called before `AppConfig` has been initialized. See
    /// [`AppConfig::get`] for details.
    #[cfg(feature = "pubsub")]
    pub fn pubsub_transport<B: PubSubBroker>(
        name: impl Into<Arc<str>>,
        broker_config: B::Config,
        serializer: Arc<dyn Serializer>,
    ) -> PubSubTransport<B> {
        let config = AppConfig::get();

        PubSubTransport::new(
            name,
            broker_config,
            Arc::clone(Self::dispatcher()),
            serializer,
            config.pubsub().clone(),
        )
    }

    /// Builds a [`QueueTransport`] named `name`, wired to the shared
    /// [`dispatcher`](Bus::dispatcher) and configured from
    /// [`AppConfig::queue`].
    ///
    /// # Panics
    ///
    /// Panics if called before `AppConfig` has been initialized. See
    /// [`AppConfig::get`] for details.
    #[cfg(feature = "queue")]
    pub fn queue_transport<B: QueueBroker>(
        name: impl Into<Arc<str>>,
        broker_config: B::Config,
        serializer: Arc<dyn Serializer>,
    ) -> QueueTransport<B> {
        let config = AppConfig::get();

        QueueTransport::new(
            name,
            broker_config,
            Arc::clone(Self::dispatcher()),
            serializer,
            config.queue().clone(),
        )
    }
}
