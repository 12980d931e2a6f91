#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Exposes the shared [`Transport`] trait contract.
mod transport;
pub use self::transport::Transport;

/// Exposes this crate's error types.
mod error;
pub use self::error::{PublishFlowError, TransportError};

/// Exposes the [`MultiTransportPublisher`] fan-out publisher.
mod multi;
pub use self::multi::MultiTransportPublisher;

/// Exposes the shared routing-key derivation helper.
mod routing;
pub use self::routing::routing_key_for;
