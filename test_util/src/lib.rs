#![doc = include_str!("../README.md")]

/// Runs a companion binary crate as a subprocess and asserts against its exit
/// status and captured output.
mod harness;
pub use self::harness::Harness;

/// An in-memory stand-in for [`relay_pubsub::Broker`], for pub/sub transport
/// tests that need fan-out without a real broker connection.
mod memory_pubsub;
pub use self::memory_pubsub::MemoryPubSubBroker;

/// An in-memory stand-in for [`relay_queue::Broker`], for queue transport
/// tests that need list semantics without a real broker connection.
mod memory_queue;
pub use self::memory_queue::{MemoryQueueBroker, SharedLists};
