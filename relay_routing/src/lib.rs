#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Exposes the [`Pattern`] wildcard matcher and its [`Segment`] vocabulary.
mod pattern;
pub use self::pattern::{Pattern, Segment};

/// Exposes the [`RoutingKey`] newtype and its validation.
mod routing_key;
pub use self::routing_key::RoutingKey;

/// Exposes the fluent [`PatternBuilder`].
mod builder;
pub use self::builder::PatternBuilder;

/// Exposes this crate's error type.
mod error;
pub use self::error::InvalidRouting;
