use async_trait::async_trait;
use futures::stream::BoxStream;
use relay_transport::TransportError;

/// The pub/sub half of the broker vocabulary (§4.6): a live connection to a
/// channel-based message broker.
///
/// A `Broker` instance stands in for a single open connection (the way
/// `lapin::Connection` does for the teacher). Implementations should be
/// cheap to [`Clone`], since [`Gateway::connection`](crate::Gateway::connection)
/// hands out clones of the one connection a [`Connector`](crate::Connector)
/// maintains.
#[async_trait]
pub trait Broker: Send + Sync + Clone + 'static {
    /// The configuration needed to open a connection (DSN, credentials,
    /// pool size, etc).
    type Config: Send + Sync + Clone + 'static;

    /// Opens a fresh connection to the broker.
    async fn connect(config: &Self::Config) -> Result<Self, TransportError>
    where
        Self: Sized;

    /// Gracefully closes this connection.
    async fn close(&self);

    /// Publishes `payload` on `channel`.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Subscribes to exact-match messages on `channel`.
    async fn subscribe(&self, channel: &str) -> Result<BoxStream<'static, Vec<u8>>, TransportError>;

    /// Subscribes to messages on every channel matching `pattern`, in the
    /// broker's own glob syntax, yielding `(channel, payload)` pairs.
    async fn psubscribe(
        &self,
        pattern: &str,
    ) -> Result<BoxStream<'static, (String, Vec<u8>)>, TransportError>;

    /// Lists the channels with at least one active subscriber.
    async fn pubsub_channels(&self) -> Result<Vec<String>, TransportError>;

    /// The number of subscribers currently on `channel`.
    async fn pubsub_numsub(&self, channel: &str) -> Result<usize, TransportError>;
}
