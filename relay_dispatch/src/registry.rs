use crate::{Filters, Handler, HandlerId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// One registered `(handler, filters)` pair for a given message class.
#[derive(Clone)]
pub struct SubscriptionEntry {
    handler: Handler,
    filters: Filters,
}

impl SubscriptionEntry {
    /// This entry's handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// This entry's filters.
    pub fn filters(&self) -> &Filters {
        &self.filters
    }
}

/// A lightweight handle returned by [`SubscriptionRegistry::subscribe`],
/// identifying the `(class, handler)` pair that was registered.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    class: Arc<str>,
    handler_id: HandlerId,
}

impl SubscriptionHandle {
    /// The subscription's message class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The subscription's handler identity.
    pub fn handler_id(&self) -> &HandlerId {
        &self.handler_id
    }
}

/// The process-wide registry mapping `message_class -> [(handler, filters)]`
/// (§4.4).
///
/// Guarded by a single [`parking_lot::RwLock`]: reads (on every `route` call)
/// dominate, writes happen only on subscribe/unsubscribe, which are rare —
/// the same access pattern the teacher reaches for with `Connector::connection`.
#[derive(Default)]
pub struct SubscriptionRegistry {
    table: RwLock<HashMap<Arc<str>, Vec<(HandlerId, SubscriptionEntry)>>>,
}

impl SubscriptionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `class` with the given `filters`.
    ///
    /// Idempotent by `(class, handler)`: re-subscribing the same pair
    /// replaces its filters in place rather than adding a second entry.
    pub fn subscribe(
        &self,
        class: impl Into<Arc<str>>,
        handler: Handler,
        filters: Filters,
    ) -> SubscriptionHandle {
        let class = class.into();
        let handler_id = handler.id().clone();
        let entry = SubscriptionEntry { handler, filters };

        let mut table = self.table.write();
        let handlers = table.entry(Arc::clone(&class)).or_default();

        if let Some(existing) = handlers.iter_mut().find(|(id, _)| *id == handler_id) {
            existing.1 = entry;
        } else {
            handlers.push((handler_id.clone(), entry));
        }

        SubscriptionHandle { class, handler_id }
    }

    /// Removes the `(class, handler)` registration, if any. Returns whether a
    /// record was removed.
    pub fn unsubscribe(&self, class: &str, handler_id: &HandlerId) -> bool {
        let mut table = self.table.write();

        let Some(handlers) = table.get_mut(class) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(id, _)| id != handler_id);

        handlers.len() != before
    }

    /// Removes every handler registered for `class`. Returns the number of
    /// records removed.
    pub fn unsubscribe_all(&self, class: &str) -> usize {
        self.table
            .write()
            .remove(class)
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }

    /// Returns a snapshot of the subscriptions currently registered for
    /// `class`.
    pub fn subscriptions_for(&self, class: &str) -> Vec<SubscriptionEntry> {
        self.table
            .read()
            .get(class)
            .map(|handlers| handlers.iter().map(|(_, entry)| entry.clone()).collect())
            .unwrap_or_default()
    }

    /// `true` if at least one handler is registered for `class`.
    pub fn has_subscribers(&self, class: &str) -> bool {
        self.table
            .read()
            .get(class)
            .map(|handlers| !handlers.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandlerError;
    use pretty_assertions::assert_eq;

    fn noop_handler(id: &str) -> Handler {
        Handler::new(id, |_envelope| async { Ok::<(), HandlerError>(()) })
    }

    #[test]
    fn resubscribing_same_pair_replaces_filters() {
        // Given
        let registry = SubscriptionRegistry::new();
        registry.subscribe("demo.class", noop_handler("h1"), Filters::none());

        // When
        registry.subscribe(
            "demo.class",
            noop_handler("h1"),
            Filters::none().with_broadcast(true),
        );

        // Then
        let subscriptions = registry.subscriptions_for("demo.class");
        assert_eq!(subscriptions.len(), 1);
    }

    #[test]
    fn unsubscribe_nonexistent_pair_is_noop() {
        let registry = SubscriptionRegistry::new();
        assert!(!registry.unsubscribe("demo.class", &HandlerId::new("missing")));
    }

    #[test]
    fn unsubscribe_all_removes_every_handler() {
        // Given
        let registry = SubscriptionRegistry::new();
        registry.subscribe("demo.class", noop_handler("h1"), Filters::none());
        registry.subscribe("demo.class", noop_handler("h2"), Filters::none());

        // When
        let removed = registry.unsubscribe_all("demo.class");

        // Then
        assert_eq!(removed, 2);
        assert!(!registry.has_subscribers("demo.class"));
    }
}
