#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Exposes the opaque [`HandlerId`] and the [`Handler`] closure vocabulary.
mod handler;
pub use self::handler::{Handler, HandlerFn, HandlerId};

/// Exposes the [`Filters`]/[`MatchSet`] predicate vocabulary.
mod filters;
pub use self::filters::{Filters, MatchSet};

/// Exposes the [`SubscriptionRegistry`] and its entries.
mod registry;
pub use self::registry::{SubscriptionEntry, SubscriptionHandle, SubscriptionRegistry};

/// Exposes the per-class, per-handler [`Counters`] snapshot.
mod counters;
pub use self::counters::{Counters, HandlerCounts};

/// Exposes the bounded [`WorkerPool`].
mod pool;
pub use self::pool::WorkerPool;

/// Exposes the [`DispatcherConfig`] configuration surface.
mod config;
pub use self::config::DispatcherConfig;

/// Exposes the [`Dispatcher`] itself.
mod dispatcher;
pub use self::dispatcher::Dispatcher;

/// Exposes this crate's error type.
mod error;
pub use self::error::HandlerError;
