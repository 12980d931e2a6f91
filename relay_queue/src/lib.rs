#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Exposes the queue half of the broker vocabulary.
mod broker;
pub use self::broker::Broker;

/// Exposes the generalized [`Connector`]/[`Gateway`] connection management.
mod connector;
pub use self::connector::{Connector, Gateway};

/// Exposes the [`QueueTransportConfig`] configuration surface.
mod config;
pub use self::config::QueueTransportConfig;

/// Exposes the pattern-to-queue [`RoutingTable`] and its supporting types.
mod routing_table;
pub use self::routing_table::{derive_queue_name, ConsumerGroup, QueueBinding, RoutingTable};

/// Exposes the [`DeadLetterRecord`] persisted on a handler's dead-letter
/// queue.
mod dead_letter;
pub use self::dead_letter::DeadLetterRecord;

/// Exposes the common subscription-pattern convenience constructors.
mod convenience;
pub use self::convenience::{
    subscribe_from_sender, subscribe_to_alerts, subscribe_to_broadcasts, subscribe_to_recipient,
    subscribe_to_type,
};

/// Exposes the [`QueueSubscriptionBuilder`] fluent subscription API.
mod builder;
pub use self::builder::QueueSubscriptionBuilder;

/// Exposes the [`QueueTransport`] itself.
mod transport;
pub use self::transport::{QueueStats, QueueTransport};

/// The cooperative blocking-pop receive loop backing each subscribed queue.
mod worker;
