use relay_deserialize::SlugMap;
use serde_value::Value;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock, RwLock};

/// A literal default or a deferred producer, evaluated at message
/// construction time.
#[derive(Clone)]
pub enum PropertyValue {
    /// A fixed literal default value.
    Literal(Value),
    /// A producer closure, invoked once per [`Message::new`](crate::Message::new)
    /// call.
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl PropertyValue {
    /// Evaluates this default, invoking the producer if deferred.
    pub fn evaluate(&self) -> Value {
        match self {
            PropertyValue::Literal(value) => value.clone(),
            PropertyValue::Producer(producer) => producer(),
        }
    }
}

impl Debug for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            PropertyValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        PropertyValue::Literal(value)
    }
}

/// Declares one property of a [`MessageClass`]: its name, an informal type
/// hint, whether it is required, and its default.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    name: Arc<str>,
    type_hint: Arc<str>,
    required: bool,
    default: Option<PropertyValue>,
    description: Option<Arc<str>>,
}

impl PropertySchema {
    /// Declares a new, non-required property with no default.
    pub fn new(name: impl Into<Arc<str>>, type_hint: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            type_hint: type_hint.into(),
            required: false,
            default: None,
            description: None,
        }
    }

    /// Marks this property as required: its absence at construction, with no
    /// default available, fails validation.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches a default value or deferred producer to this property.
    pub fn with_default(mut self, default: impl Into<PropertyValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attaches a human-readable description to this property.
    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The property's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property's informal type hint.
    pub fn type_hint(&self) -> &str {
        &self.type_hint
    }

    /// `true` if this property must be present at construction.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The property's default, if any.
    pub fn default(&self) -> Option<&PropertyValue> {
        self.default.as_ref()
    }

    /// The property's description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Class-level defaults for header fields and the transport/serializer/logger
/// names that messages of this class publish through unless overridden.
#[derive(Debug, Clone, Default)]
pub struct ClassDefaults {
    from: Option<Arc<str>>,
    to: Option<Arc<str>>,
    reply_to: Option<Arc<str>>,
    transport: Option<Arc<str>>,
    serializer: Option<Arc<str>>,
    logger: Option<Arc<str>>,
}

impl ClassDefaults {
    /// The class-level default `from`.
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// The class-level default `to`.
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// The class-level default `reply_to`.
    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    /// The class-level default transport identifier.
    pub fn transport(&self) -> Option<&str> {
        self.transport.as_deref()
    }

    /// The class-level default serializer identifier.
    pub fn serializer(&self) -> Option<&str> {
        self.serializer.as_deref()
    }

    /// The class-level default logger identifier.
    pub fn logger(&self) -> Option<&str> {
        self.logger.as_deref()
    }
}

/// The design-time schema of a message class: its name, declared properties,
/// class-level defaults, and schema version.
///
/// Class names are used as logical type identifiers on the wire (§3); they
/// are looked up in the process-wide [`MessageClassRegistry`].
#[derive(Debug, Clone)]
pub struct MessageClass {
    name: Arc<str>,
    version: u32,
    properties: Vec<PropertySchema>,
    defaults: ClassDefaults,
}

impl MessageClass {
    /// Starts building a new [`MessageClass`] with the given fully-qualified
    /// name.
    pub fn builder(name: impl Into<Arc<str>>) -> MessageClassBuilder {
        MessageClassBuilder::new(name)
    }

    /// The class's fully-qualified name, used as the wire type identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class's current schema version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The class's ordered property declarations.
    pub fn properties(&self) -> &[PropertySchema] {
        &self.properties
    }

    /// Looks up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// The class's header/transport/serializer/logger defaults.
    pub fn defaults(&self) -> &ClassDefaults {
        &self.defaults
    }
}

/// Incrementally builds a [`MessageClass`].
pub struct MessageClassBuilder {
    name: Arc<str>,
    version: u32,
    properties: Vec<PropertySchema>,
    defaults: ClassDefaults,
}

impl MessageClassBuilder {
    fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            properties: Vec::new(),
            defaults: ClassDefaults::default(),
        }
    }

    /// Sets the schema version of this class. Defaults to `1`.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Appends a property declaration, in declaration order.
    pub fn with_property(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    /// Sets the class-level default sender.
    pub fn with_default_from(mut self, from: impl Into<Arc<str>>) -> Self {
        self.defaults.from = Some(from.into());
        self
    }

    /// Sets the class-level default recipient.
    pub fn with_default_to(mut self, to: impl Into<Arc<str>>) -> Self {
        self.defaults.to = Some(to.into());
        self
    }

    /// Sets the class-level default return address.
    pub fn with_default_reply_to(mut self, reply_to: impl Into<Arc<str>>) -> Self {
        self.defaults.reply_to = Some(reply_to.into());
        self
    }

    /// Sets the class-level default transport identifier.
    pub fn with_default_transport(mut self, transport: impl Into<Arc<str>>) -> Self {
        self.defaults.transport = Some(transport.into());
        self
    }

    /// Sets the class-level default serializer identifier.
    pub fn with_default_serializer(mut self, serializer: impl Into<Arc<str>>) -> Self {
        self.defaults.serializer = Some(serializer.into());
        self
    }

    /// Sets the class-level default logger identifier.
    pub fn with_default_logger(mut self, logger: impl Into<Arc<str>>) -> Self {
        self.defaults.logger = Some(logger.into());
        self
    }

    /// Builds the immutable [`MessageClass`].
    pub fn build(self) -> MessageClass {
        MessageClass {
            name: self.name,
            version: self.version,
            properties: self.properties,
            defaults: self.defaults,
        }
    }
}

/// A process-wide registry mapping a class name string to its
/// [`MessageClass`] descriptor.
///
/// Lookups are [`Slug`](relay_deserialize::Slug)-normalized, exactly like
/// every other name-keyed collection in this workspace (e.g.
/// `HandleCollection`), so `"demo.HealthCheck"` and `"demo_health_check"`
/// resolve to the same registration.
pub struct MessageClassRegistry;

static REGISTRY: OnceLock<RwLock<HashMap<Arc<str>, Arc<MessageClass>>>> = OnceLock::new();

impl MessageClassRegistry {
    fn storage() -> &'static RwLock<HashMap<Arc<str>, Arc<MessageClass>>> {
        REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
    }

    /// Registers the given [`MessageClass`], replacing any previous
    /// registration under the same name.
    pub fn register(class: MessageClass) -> Arc<MessageClass> {
        let class = Arc::new(class);
        let key = Arc::from(class.name());

        Self::storage().write().expect("registry lock poisoned").insert(key, Arc::clone(&class));

        class
    }

    /// Looks up a registered class by name.
    pub fn get(name: &str) -> Option<Arc<MessageClass>> {
        Self::storage()
            .read()
            .expect("registry lock poisoned")
            .iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, class)| Arc::clone(class))
    }

    /// Snapshot of every currently registered class, keyed by its
    /// [`Slug`](relay_deserialize::Slug)-normalized name.
    pub fn snapshot() -> SlugMap<Arc<MessageClass>> {
        Self::storage()
            .read()
            .expect("registry lock poisoned")
            .iter()
            .map(|(name, class)| (name.to_string(), Arc::clone(class)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_collects_properties_in_order() {
        // Given
        let class = MessageClass::builder("demo.order_created")
            .with_property(PropertySchema::new("order_id", "string").required())
            .with_property(PropertySchema::new("total", "integer").with_default(Value::I64(0)))
            .build();

        // Then
        assert_eq!(class.properties().len(), 2);
        assert_eq!(class.properties()[0].name(), "order_id");
        assert!(class.properties()[0].is_required());
        assert!(!class.properties()[1].is_required());
    }

    #[test]
    fn registry_round_trips_by_name() {
        // Given
        let class = MessageClass::builder("demo.registry_round_trip_test").build();

        // When
        MessageClassRegistry::register(class);

        // Then
        let found = MessageClassRegistry::get("demo.registry_round_trip_test");
        assert!(found.is_some());
        assert_eq!(found.unwrap().name(), "demo.registry_round_trip_test");
    }
}
