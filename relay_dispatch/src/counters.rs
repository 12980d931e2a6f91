use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A snapshot of the counts tracked for one `(class, handler)` pair (§4.4,
/// §7).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerCounts {
    /// Envelopes submitted to this handler's worker queue.
    pub routed: u64,
    /// Invocations that returned `Ok(())`.
    pub handler_ok: u64,
    /// Invocations that returned an error or panicked.
    pub handler_error: u64,
    /// Submissions rejected because the worker queue stayed full past the
    /// overflow timeout.
    pub dispatcher_overflow: u64,
}

/// Process-wide dispatch counters, keyed by `(class, handler)` plus a
/// separate per-class tally of envelopes dropped for lack of any subscriber.
///
/// A plain [`parking_lot::Mutex`] is enough here: counters are incremented
/// once per dispatch decision, never held across an `.await`.
#[derive(Default)]
pub struct Counters {
    by_handler: Mutex<HashMap<(Arc<str>, Arc<str>), HandlerCounts>>,
    dropped_no_match: Mutex<HashMap<Arc<str>, u64>>,
}

impl Counters {
    /// Creates a fresh, zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, class: &str, handler_id: &str) -> HandlerCounts {
        self.by_handler
            .lock()
            .get(&(Arc::from(class), Arc::from(handler_id)))
            .copied()
            .unwrap_or_default()
    }

    fn with_entry(&self, class: &str, handler_id: &str, f: impl FnOnce(&mut HandlerCounts)) {
        let mut table = self.by_handler.lock();
        let counts = table
            .entry((Arc::from(class), Arc::from(handler_id)))
            .or_default();
        f(counts);
    }

    /// Records a successful submission to a handler's worker queue.
    pub fn record_routed(&self, class: &str, handler_id: &str) {
        self.with_entry(class, handler_id, |c| c.routed += 1);
    }

    /// Records a handler invocation that completed without error.
    pub fn record_handler_ok(&self, class: &str, handler_id: &str) {
        self.with_entry(class, handler_id, |c| c.handler_ok += 1);
    }

    /// Records a handler invocation that errored or panicked.
    pub fn record_handler_error(&self, class: &str, handler_id: &str) {
        self.with_entry(class, handler_id, |c| c.handler_error += 1);
    }

    /// Records a submission rejected due to sustained backpressure.
    pub fn record_overflow(&self, class: &str, handler_id: &str) {
        self.with_entry(class, handler_id, |c| c.dispatcher_overflow += 1);
    }

    /// Records an envelope of `class` that matched no subscriber at all.
    pub fn record_dropped_no_match(&self, class: &str) {
        *self
            .dropped_no_match
            .lock()
            .entry(Arc::from(class))
            .or_insert(0) += 1;
    }

    /// Returns the counts recorded for a given `(class, handler)` pair.
    pub fn counts_for(&self, class: &str, handler_id: &str) -> HandlerCounts {
        self.entry(class, handler_id)
    }

    /// Returns the number of envelopes of `class` dropped for lack of a
    /// subscriber.
    pub fn dropped_no_match(&self, class: &str) -> u64 {
        self.dropped_no_match
            .lock()
            .get(class)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_accumulate_independently_per_handler() {
        // Given
        let counters = Counters::new();

        // When
        counters.record_routed("demo.class", "h1");
        counters.record_routed("demo.class", "h1");
        counters.record_handler_ok("demo.class", "h1");
        counters.record_routed("demo.class", "h2");

        // Then
        let h1 = counters.counts_for("demo.class", "h1");
        assert_eq!(h1.routed, 2);
        assert_eq!(h1.handler_ok, 1);

        let h2 = counters.counts_for("demo.class", "h2");
        assert_eq!(h2.routed, 1);
        assert_eq!(h2.handler_ok, 0);
    }

    #[test]
    fn dropped_no_match_is_tracked_per_class() {
        let counters = Counters::new();
        counters.record_dropped_no_match("demo.class");
        counters.record_dropped_no_match("demo.class");
        assert_eq!(counters.dropped_no_match("demo.class"), 2);
        assert_eq!(counters.dropped_no_match("other.class"), 0);
    }
}
