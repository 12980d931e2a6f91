#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Exposes the pub/sub [`Broker`] trait contract.
mod broker;
pub use self::broker::Broker;

/// Exposes the generalized [`Connector`]/[`Gateway`] connection management.
mod connector;
pub use self::connector::{Connector, Gateway};

/// Exposes the [`PubSubTransportConfig`]/[`ChannelNaming`] configuration
/// surface.
mod config;
pub use self::config::{ChannelNaming, PubSubTransportConfig};

/// Exposes the [`PubSubTransport`] itself.
mod transport;
pub use self::transport::PubSubTransport;
