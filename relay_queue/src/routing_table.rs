use parking_lot::RwLock;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use relay_routing::{Pattern, RoutingKey};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Derives the queue name a [`Pattern`] is bound to: the configured prefix
/// joined with a safe-encoding of the pattern's source string (§3, §6).
///
/// One pattern always produces the same queue name, so subscribing the same
/// pattern twice (even under different consumer groups) binds more workers
/// to the one queue rather than creating a second one.
pub fn derive_queue_name(prefix: &str, pattern: &Pattern) -> Arc<str> {
    let encoded = utf8_percent_encode(pattern.as_str(), NON_ALPHANUMERIC).to_string();
    Arc::from(format!("{prefix}.{encoded}"))
}

/// One consumer bound to a queue: a `(group_id, consumer_id)` pair (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsumerGroup {
    group_id: Arc<str>,
    consumer_id: Arc<str>,
}

impl ConsumerGroup {
    /// Builds a new consumer group label.
    pub fn new(group_id: impl Into<Arc<str>>, consumer_id: impl Into<Arc<str>>) -> Self {
        Self {
            group_id: group_id.into(),
            consumer_id: consumer_id.into(),
        }
    }

    /// This consumer's group label.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// This consumer's identity within its group.
    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }
}

/// One queue's binding: the pattern it was derived from, and the consumers
/// currently attached to it.
#[derive(Debug, Clone)]
pub struct QueueBinding {
    pattern: Pattern,
    queue_name: Arc<str>,
    consumers: HashSet<ConsumerGroup>,
}

impl QueueBinding {
    /// The pattern this queue was derived from.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// This queue's derived name.
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// The consumers currently attached to this queue.
    pub fn consumers(&self) -> impl Iterator<Item = &ConsumerGroup> {
        self.consumers.iter()
    }
}

/// The process-private mapping from pattern to queue binding (§3, §4.7).
///
/// Guarded by a single [`parking_lot::RwLock`], mirroring the dispatcher's
/// `SubscriptionRegistry`: publishes read it far more often than subscribes
/// write it.
#[derive(Default)]
pub struct RoutingTable {
    bindings: RwLock<HashMap<Box<str>, QueueBinding>>,
}

impl RoutingTable {
    /// Creates a new, empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `consumer` against `pattern`, deriving and returning the
    /// queue name it is now bound to. Idempotent: binding the same consumer
    /// to the same pattern twice has no additional effect.
    pub fn bind(&self, prefix: &str, pattern: Pattern, consumer: ConsumerGroup) -> Arc<str> {
        let mut bindings = self.bindings.write();

        let entry = bindings.entry(Box::from(pattern.as_str())).or_insert_with(|| {
            let queue_name = derive_queue_name(prefix, &pattern);
            QueueBinding {
                pattern: pattern.clone(),
                queue_name,
                consumers: HashSet::new(),
            }
        });

        entry.consumers.insert(consumer);
        Arc::clone(&entry.queue_name)
    }

    /// Removes `consumer` from `pattern`'s binding. If it was the last
    /// consumer, the binding itself is removed. Returns the queue name that
    /// was bound, if the pattern was known at all.
    pub fn unbind(&self, pattern: &Pattern, consumer: &ConsumerGroup) -> Option<Arc<str>> {
        let mut bindings = self.bindings.write();

        let Some(entry) = bindings.get_mut(pattern.as_str()) else {
            return None;
        };

        entry.consumers.remove(consumer);
        let queue_name = Arc::clone(&entry.queue_name);

        if entry.consumers.is_empty() {
            bindings.remove(pattern.as_str());
        }

        Some(queue_name)
    }

    /// Removes every binding. Returns the queue names that were bound.
    pub fn clear(&self) -> Vec<Arc<str>> {
        self.bindings
            .write()
            .drain()
            .map(|(_, binding)| binding.queue_name)
            .collect()
    }

    /// Returns the distinct, deduplicated set of queue names whose patterns
    /// match `key`, in no particular order (§4.7: "duplicate queues are
    /// deduplicated so a single subscription receives exactly one copy per
    /// publish").
    pub fn matching_queues(&self, key: &RoutingKey) -> Vec<Arc<str>> {
        self.bindings
            .read()
            .values()
            .filter(|binding| binding.pattern.matches(key))
            .map(|binding| Arc::clone(&binding.queue_name))
            .collect()
    }

    /// Returns a snapshot of every binding currently registered.
    pub fn bindings(&self) -> Vec<QueueBinding> {
        self.bindings.read().values().cloned().collect()
    }

    /// Looks up the binding for a queue by name, if any pattern still maps
    /// to it.
    pub fn binding_for_queue(&self, queue_name: &str) -> Option<QueueBinding> {
        self.bindings
            .read()
            .values()
            .find(|binding| binding.queue_name.as_ref() == queue_name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> RoutingKey {
        RoutingKey::parse(s).unwrap()
    }

    #[test]
    fn binding_same_pattern_twice_reuses_queue_name() {
        let table = RoutingTable::new();
        let pattern = Pattern::parse("#.*.payment_service").unwrap();

        let a = table.bind("relay", pattern.clone(), ConsumerGroup::new("g1", "c1"));
        let b = table.bind("relay", pattern, ConsumerGroup::new("g1", "c2"));

        assert_eq!(a, b);
        assert_eq!(table.bindings().len(), 1);
        assert_eq!(table.bindings()[0].consumers().count(), 2);
    }

    #[test]
    fn matching_queues_are_deduplicated() {
        let table = RoutingTable::new();
        let pattern_a = Pattern::parse("#.api.payment_service").unwrap();
        let pattern_b = Pattern::parse("payment.#.*.*").unwrap();

        table.bind("relay", pattern_a, ConsumerGroup::new("g1", "c1"));
        table.bind("relay", pattern_b, ConsumerGroup::new("g2", "c1"));

        let matches = table.matching_queues(&key("payment.payment.api.payment_service"));
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn unbinding_last_consumer_removes_binding() {
        let table = RoutingTable::new();
        let pattern = Pattern::parse("#.*.svc").unwrap();
        let consumer = ConsumerGroup::new("g1", "c1");

        table.bind("relay", pattern.clone(), consumer.clone());
        table.unbind(&pattern, &consumer);

        assert!(table.bindings().is_empty());
    }

    #[test]
    fn derived_queue_name_is_stable() {
        let pattern = Pattern::parse("#.*.svc").unwrap();
        let a = derive_queue_name("relay", &pattern);
        let b = derive_queue_name("relay", &pattern);
        assert_eq!(a, b);
    }
}
