use crate::TransportError;
use async_trait::async_trait;
use relay_message::Envelope;
use relay_routing::Pattern;
use std::time::Duration;

/// The shared contract implemented by every concrete transport (§4.5).
///
/// Both the pub/sub and queue transports (`relay_pubsub`, `relay_queue`)
/// implement this one vocabulary, so [`MultiTransportPublisher`](crate::MultiTransportPublisher)
/// and the dispatching layer never need to know which kind of transport they
/// are driving.
#[async_trait]
pub trait Transport: Send + Sync {
    /// This transport's name, used in logs and in aggregated publish
    /// failures.
    fn name(&self) -> &str;

    /// Publishes `envelope` (of the given message class) through this
    /// transport.
    async fn publish(&self, class: &str, envelope: &Envelope) -> Result<(), TransportError>;

    /// Begins routing envelopes matching `pattern` to the dispatcher.
    async fn subscribe(&self, pattern: Pattern) -> Result<(), TransportError>;

    /// Stops routing envelopes matching `pattern`.
    async fn unsubscribe(&self, pattern: &Pattern) -> Result<(), TransportError>;

    /// Stops routing envelopes for every pattern currently subscribed.
    async fn unsubscribe_all(&self) -> Result<(), TransportError>;

    /// `true` if this transport currently has a live connection to its
    /// broker.
    fn connected(&self) -> bool;

    /// Gracefully closes this transport's connection, waiting up to
    /// `timeout` for in-flight work to settle.
    async fn shutdown(&self, timeout: Duration) -> Result<(), TransportError>;
}
