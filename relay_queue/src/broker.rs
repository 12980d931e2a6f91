use async_trait::async_trait;
use relay_transport::TransportError;
use std::time::Duration;

/// The queue half of the broker vocabulary (§4.7): a live connection to a
/// list-based work-queue broker.
///
/// Shares the same "live connection, cheap to clone" shape as the pub/sub
/// broker trait, since both transports are ultimately two access patterns
/// over one underlying broker connection type, the same way a single AMQP
/// channel backs both a publisher and a subscriber.
#[async_trait]
pub trait Broker: Send + Sync + Clone + 'static {
    /// The configuration needed to open a connection.
    type Config: Send + Sync + Clone + 'static;

    /// Opens a fresh connection to the broker.
    async fn connect(config: &Self::Config) -> Result<Self, TransportError>
    where
        Self: Sized;

    /// Gracefully closes this connection.
    async fn close(&self);

    /// Pushes `payload` onto the head of `queue`.
    async fn lpush(&self, queue: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Trims `queue` to at most `max_length` entries, discarding the oldest.
    async fn ltrim(&self, queue: &str, max_length: usize) -> Result<(), TransportError>;

    /// Blocks for up to `timeout` waiting for an entry to become available on
    /// any of `queues`, popping from the tail of whichever queue produces one
    /// first. Returns `None` on timeout.
    async fn brpop(
        &self,
        queues: &[String],
        timeout: Duration,
    ) -> Result<Option<(String, Vec<u8>)>, TransportError>;

    /// The current number of entries in `queue`. Backs the read-only
    /// management surface (§4.7); not part of the broker contract proper,
    /// but every concrete list-queue broker (Redis `LLEN` and equivalents)
    /// offers it.
    async fn len(&self, queue: &str) -> Result<usize, TransportError>;

    /// Deletes `queue` outright. Reserved for administrative use.
    async fn clear(&self, queue: &str) -> Result<(), TransportError>;
}
