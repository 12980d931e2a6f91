use crate::class::MessageClass;
use crate::{Envelope, FieldError, Header, ValidationError, VersionMismatch};
use nonempty::NonEmpty;
use relay_deserialize::SlugMap;
use serde_value::Value;
use std::sync::Arc;
use time::OffsetDateTime;

/// A runtime instance of a [`MessageClass`]: a header plus an ordered set of
/// property values, validated against the class's declared schema.
///
/// Message classes are plain runtime descriptors rather than compile-time
/// types (see the Design Notes on dynamic properties), so a single concrete
/// `Message` struct represents instances of every class.
#[derive(Debug, Clone)]
pub struct Message {
    class: Arc<MessageClass>,
    header: Header,
    properties: Vec<(Arc<str>, Value)>,
    extras: SlugMap<Value>,
}

impl Message {
    /// Starts building a new [`Message`] of the given class.
    pub fn builder(class: Arc<MessageClass>) -> MessageBuilder {
        MessageBuilder::new(class)
    }

    /// The message's class.
    pub fn class(&self) -> &MessageClass {
        &self.class
    }

    /// The message's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// A mutable view of the message's header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Looks up a property value by name.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(name, _)| name.as_ref() == property)
            .map(|(_, value)| value)
    }

    /// Sets (or overwrites) a property value by name. No-op if the class does
    /// not declare a property by that name.
    pub fn set(&mut self, property: &str, value: Value) {
        if let Some(entry) = self.properties.iter_mut().find(|(name, _)| name.as_ref() == property)
        {
            entry.1 = value;
        }
    }

    /// Unknown fields preserved from [`from_envelope`](Message::from_envelope),
    /// for forward compatibility.
    pub fn extras(&self) -> &SlugMap<Value> {
        &self.extras
    }

    /// Validates this message's properties against its class's schema, and
    /// its header against the publish-time invariant that `from` must be
    /// present.
    ///
    /// Required properties missing a value (and with no default) fail
    /// validation; a missing `from` at publish time fails validation. All
    /// collected failures are returned together.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors: Vec<FieldError> = Vec::new();

        for schema in self.class.properties() {
            let has_value = self.get(schema.name()).is_some();

            if schema.is_required() && !has_value {
                errors.push(FieldError::new(schema.name(), "required property is missing"));
            }
        }

        if self.header.from().is_none() {
            errors.push(FieldError::new("from", "sender identity must be present at publish time"));
        }

        match NonEmpty::from_vec(errors) {
            Some(errors) => Err(ValidationError(errors)),
            None => Ok(()),
        }
    }

    /// Stamps `published_at` on this message's header with the current
    /// instant. Intended to be called exactly once, by the publish path,
    /// after [`validate`](Message::validate) succeeds.
    pub fn stamp_published(&mut self) {
        self.header.stamp_published(OffsetDateTime::now_utc());
    }

    /// Produces the ([`Header`], payload) pair for a [`Serializer`](crate::Serializer)
    /// to encode.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(self.header.clone(), self.properties.clone())
    }

    /// Reconstructs a [`Message`] from a decoded envelope, looking up the
    /// class named in the header.
    ///
    /// Declared properties found in the payload are matched by name; anything
    /// else in the payload is preserved in [`extras`](Message::extras).
    /// Fails with [`VersionMismatch`] if the header's version doesn't match
    /// the class's current version.
    pub fn from_envelope(class: Arc<MessageClass>, envelope: Envelope) -> Result<Self, VersionMismatch> {
        let (header, payload) = envelope.into_parts();

        if header.version() != class.version() {
            return Err(VersionMismatch {
                class: Box::from(class.name()),
                expected: class.version(),
                found: header.version(),
            });
        }

        let mut properties = Vec::with_capacity(class.properties().len());
        let mut extras = Vec::new();

        for (name, value) in payload {
            if class.property(&name).is_some() {
                properties.push((name, value));
            } else {
                extras.push((name.to_string(), value));
            }
        }

        // Fill in declared-but-absent properties with their class default
        for schema in class.properties() {
            if !properties.iter().any(|(name, _)| name.as_ref() == schema.name()) {
                if let Some(default) = schema.default() {
                    properties.push((Arc::from(schema.name()), default.evaluate()));
                }
            }
        }

        Ok(Self {
            class,
            header,
            properties,
            extras: extras.into_iter().collect(),
        })
    }
}

/// Incrementally builds a [`Message`] instance.
pub struct MessageBuilder {
    class: Arc<MessageClass>,
    from: Option<Arc<str>>,
    to: Option<Arc<str>>,
    reply_to: Option<Arc<str>>,
    serializer: Option<Arc<str>>,
    properties: Vec<(Arc<str>, Value)>,
}

impl MessageBuilder {
    fn new(class: Arc<MessageClass>) -> Self {
        Self {
            class,
            from: None,
            to: None,
            reply_to: None,
            serializer: None,
            properties: Vec::new(),
        }
    }

    /// Overrides the sender identity (otherwise taken from the class default).
    pub fn with_from(mut self, from: impl Into<Arc<str>>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Overrides the recipient identity (otherwise taken from the class
    /// default; absent means broadcast).
    pub fn with_to(mut self, to: impl Into<Arc<str>>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Overrides the return address (otherwise taken from the class default).
    pub fn with_reply_to(mut self, reply_to: impl Into<Arc<str>>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Overrides the serializer identifier (otherwise taken from the class
    /// default, or `"noop"` if unset).
    pub fn with_serializer(mut self, serializer: impl Into<Arc<str>>) -> Self {
        self.serializer = Some(serializer.into());
        self
    }

    /// Sets a declared property's value.
    pub fn with_property(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Constructs the [`Message`]: assigns `uuid`, fills the header from
    /// class defaults and builder overrides (builder overrides win), and
    /// evaluates property defaults for properties not explicitly set.
    pub fn build(self) -> Message {
        let defaults = self.class.defaults();

        let from = self.from.or_else(|| defaults.from().map(Arc::from));
        let to = self.to.or_else(|| defaults.to().map(Arc::from));
        let reply_to = self.reply_to.or_else(|| defaults.reply_to().map(Arc::from));
        let serializer = self
            .serializer
            .or_else(|| defaults.serializer().map(Arc::from))
            .unwrap_or_else(|| Arc::from("noop"));

        let publisher_pid = Arc::from(publisher_pid().as_str());

        let header = Header::new(
            Arc::from(self.class.name()),
            publisher_pid,
            self.class.version(),
            from,
            to,
            reply_to,
            serializer,
        );

        let mut properties = self.properties;

        for schema in self.class.properties() {
            if !properties.iter().any(|(name, _)| name.as_ref() == schema.name()) {
                if let Some(default) = schema.default() {
                    properties.push((Arc::from(schema.name()), default.evaluate()));
                }
            }
        }

        Message {
            class: self.class,
            header,
            properties,
            extras: SlugMap::empty(),
        }
    }
}

/// Composes the opaque `publisher_pid` identifier of this process, combining
/// the OS process id with this replica's stable
/// [`lifetime_id`](relay_core::AppReplica::lifetime_id).
fn publisher_pid() -> String {
    format!("{}-{}", std::process::id(), relay_core::AppReplica::lifetime_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::PropertySchema;
    use pretty_assertions::assert_eq;

    fn order_class() -> Arc<MessageClass> {
        Arc::new(
            MessageClass::builder("demo.order_created")
                .with_property(PropertySchema::new("order_id", "string").required())
                .with_default_from("orders")
                .build(),
        )
    }

    #[test]
    fn missing_required_property_fails_validation() {
        // Given
        let message = Message::builder(order_class()).build();

        // When
        let result = message.validate();

        // Then
        let error = result.unwrap_err();
        assert_eq!(error.errors().len(), 1);
        assert_eq!(error.errors().first().field(), "order_id");
    }

    #[test]
    fn missing_from_fails_validation() {
        // Given
        let class = Arc::new(MessageClass::builder("demo.no_default_from").build());
        let message = Message::builder(class).build();

        // When
        let result = message.validate();

        // Then
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().errors().first().field(), "from");
    }

    #[test]
    fn envelope_round_trips_declared_properties() {
        // Given
        let class = order_class();
        let message = Message::builder(Arc::clone(&class))
            .with_property("order_id", Value::String("abc".into()))
            .build();

        // When
        let envelope = message.to_envelope();
        let restored = Message::from_envelope(class, envelope).unwrap();

        // Then
        assert_eq!(restored.get("order_id"), Some(&Value::String("abc".into())));
    }

    #[test]
    fn from_envelope_rejects_version_mismatch() {
        // Given
        let class = Arc::new(MessageClass::builder("demo.versioned").with_version(2).build());
        let header = Header::new(Arc::from("demo.versioned"), Arc::from("pid"), 1, Some(Arc::from("a")), None, None, Arc::from("noop"));
        let envelope = Envelope::new(header, Vec::new());

        // When
        let result = Message::from_envelope(class, envelope);

        // Then
        assert!(result.is_err());
    }

    #[test]
    fn unknown_payload_fields_land_in_extras() {
        // Given
        let class = Arc::new(MessageClass::builder("demo.extras_test").build());
        let header = Header::new(Arc::from("demo.extras_test"), Arc::from("pid"), 1, Some(Arc::from("a")), None, None, Arc::from("noop"));
        let envelope = Envelope::new(header, vec![(Arc::from("mystery"), Value::Bool(true))]);

        // When
        let restored = Message::from_envelope(class, envelope).unwrap();

        // Then
        assert_eq!(restored.extras().get("mystery"), Some(&Value::Bool(true)));
    }
}
