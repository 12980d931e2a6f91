use nonempty::NonEmpty;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    field: Box<str>,
    reason: Box<str>,
}

impl FieldError {
    /// Creates a new [`FieldError`] for the given `field`, with the given
    /// human-readable `reason`.
    pub fn new(field: impl Into<Box<str>>, reason: impl Into<Box<str>>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Exposes the name of the offending field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Exposes the human-readable reason for the failure.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}': {}", self.field, self.reason)
    }
}

/// Raised when one or more properties of a message instance fail validation
/// at construction or publish time.
#[derive(Debug, Clone, Error)]
#[error("message failed validation: {}", format_errors(.0))]
pub struct ValidationError(pub NonEmpty<FieldError>);

impl ValidationError {
    /// Creates a [`ValidationError`] from a single [`FieldError`].
    pub fn single(error: FieldError) -> Self {
        Self(NonEmpty::new(error))
    }

    /// Exposes the individual field-level errors.
    pub fn errors(&self) -> &NonEmpty<FieldError> {
        &self.0
    }
}

fn format_errors(errors: &NonEmpty<FieldError>) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raised when a decoded header's `version` does not match the current
/// version of the message class, and no migration path is declared.
#[derive(Debug, Clone, Error)]
#[error("version mismatch for class '{class}': expected {expected}, found {found}")]
pub struct VersionMismatch {
    /// The message class on which the mismatch was detected.
    pub class: Box<str>,
    /// The version the class currently declares.
    pub expected: u32,
    /// The version found in the decoded header.
    pub found: u32,
}

/// Raised when an addressing field (`from`, `to`, `reply_to`) or a routing
/// key contains an illegal character, or refers to an unknown message class.
#[derive(Debug, Clone, Error)]
pub enum InvalidRouting {
    /// A segment of a routing key or pattern contained a `.` or other
    /// disallowed character.
    #[error("illegal character in segment '{segment}' of field '{field}'")]
    IllegalSegment {
        /// The field that produced the illegal segment.
        field: Box<str>,
        /// The offending segment value.
        segment: Box<str>,
    },

    /// A decoded envelope named a message class that is not registered.
    #[error("unknown message class '{0}'")]
    UnknownClass(Box<str>),
}

/// Raised when a [`Serializer`](crate::Serializer) fails to encode or decode
/// an envelope.
#[derive(Debug, Clone, Error)]
pub enum SerializerError {
    /// Encoding a message instance into bytes failed.
    #[error("failed to encode envelope with serializer '{serializer}': {reason}")]
    Encode {
        /// The identifier of the serializer that failed.
        serializer: Box<str>,
        /// A human-readable reason for the failure.
        reason: Box<str>,
    },

    /// Decoding bytes into a message instance failed.
    #[error("failed to decode envelope with serializer '{serializer}': {reason}")]
    Decode {
        /// The identifier of the serializer that failed.
        serializer: Box<str>,
        /// A human-readable reason for the failure.
        reason: Box<str>,
    },
}
