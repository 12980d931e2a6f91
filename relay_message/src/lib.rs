#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Exposes the [`Header`] carried by every envelope.
mod header;
pub use self::header::Header;

/// Exposes the on-wire ([`Header`], payload) pair.
mod envelope;
pub use self::envelope::Envelope;

/// Exposes the error types raised by this crate.
mod error;
pub use self::error::{FieldError, InvalidRouting, SerializerError, ValidationError, VersionMismatch};

/// Exposes the design-time message schema and its process-wide registry.
mod class;
pub use self::class::{
    ClassDefaults, MessageClass, MessageClassBuilder, MessageClassRegistry, PropertySchema,
    PropertyValue,
};

/// Exposes the runtime message instance and its builder.
mod message;
pub use self::message::{Message, MessageBuilder};

/// Exposes the [`Serializer`] contract and the reference codecs.
mod serializer;
pub use self::serializer::{NoopSerializer, Serializer};

#[cfg(feature = "json")]
pub use self::serializer::JsonSerializer;

/// Re-exports [`serde_value::Value`] as it is part of this crate's API, used
/// to represent untyped payload properties and the `extras` bag.
pub use serde_value::Value;
