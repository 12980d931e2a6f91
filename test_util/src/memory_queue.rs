use async_trait::async_trait;
use parking_lot::Mutex;
use relay_queue::Broker;
use relay_transport::TransportError;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// A shared, process-local map of named lists: the "broker" a
/// [`MemoryQueueBroker`] config points at.
pub type SharedLists = Arc<Mutex<HashMap<String, VecDeque<Vec<u8>>>>>;

/// An in-memory [`Broker`](relay_queue::Broker) implementation for tests: a
/// process-local map of named lists, no network I/O.
///
/// Its [`Config`](Broker::Config) *is* the shared list store rather than a
/// DSN, so that [`new_shared_config`](Self::new_shared_config) lets several
/// independent connections (and so several [`QueueTransport`](relay_queue::QueueTransport)
/// instances, each simulating one consumer process) observe the same queues —
/// the same way several real connections opened against one broker URL would.
///
/// `lpush` prepends, so the oldest entry in a list is always at the back;
/// `ltrim` therefore discards from the back, and `brpop` pops from the back,
/// giving first-in-first-out delivery exactly like the list-based broker
/// `relay_queue` is written against.
#[derive(Clone)]
pub struct MemoryQueueBroker {
    lists: SharedLists,
}

impl MemoryQueueBroker {
    /// Builds a fresh, empty config to hand to any number of
    /// [`QueueTransport`](relay_queue::QueueTransport)s that should share one
    /// logical broker.
    pub fn new_shared_config() -> SharedLists {
        Arc::new(Mutex::new(HashMap::new()))
    }
}

#[async_trait]
impl Broker for MemoryQueueBroker {
    type Config = SharedLists;

    async fn connect(config: &Self::Config) -> Result<Self, TransportError> {
        Ok(Self {
            lists: Arc::clone(config),
        })
    }

    async fn close(&self) {}

    async fn lpush(&self, queue: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.lists
            .lock()
            .entry(queue.to_string())
            .or_default()
            .push_front(payload);

        Ok(())
    }

    async fn ltrim(&self, queue: &str, max_length: usize) -> Result<(), TransportError> {
        if let Some(list) = self.lists.lock().get_mut(queue) {
            list.truncate(max_length);
        }

        Ok(())
    }

    async fn brpop(
        &self,
        queues: &[String],
        timeout: Duration,
    ) -> Result<Option<(String, Vec<u8>)>, TransportError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            {
                let mut lists = self.lists.lock();

                for queue in queues {
                    if let Some(payload) = lists.get_mut(queue).and_then(VecDeque::pop_back) {
                        return Ok(Some((queue.clone(), payload)));
                    }
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }

            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    async fn len(&self, queue: &str) -> Result<usize, TransportError> {
        Ok(self.lists.lock().get(queue).map(VecDeque::len).unwrap_or(0))
    }

    async fn clear(&self, queue: &str) -> Result<(), TransportError> {
        self.lists.lock().remove(queue);
        Ok(())
    }
}
