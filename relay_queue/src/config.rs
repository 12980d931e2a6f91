use relay_factory::impl_deserialize_field;
use relay_util::BackoffConfig;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;
use std::time::Duration;

/// Tunables for a [`QueueTransport`](crate::QueueTransport) (§4.7, §6).
///
/// `url`/`db`-style connection parameters and pool sizing belong to the
/// broker's own `B::Config`, not here: this struct only covers the
/// transport-level policy that is the same regardless of which broker
/// backs it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueTransportConfig {
    pub(crate) queue_prefix: Box<str>,
    pub(crate) consumer_group: Box<str>,
    pub(crate) consumer_id: Box<str>,
    pub(crate) block_time: Duration,
    pub(crate) max_queue_length: usize,
    pub(crate) max_retries: u32,
    pub(crate) dead_letter_queue: bool,
    pub(crate) dead_letter_prefix: Box<str>,
    pub(crate) backoff: BackoffConfig,
    pub(crate) test_mode: bool,
}

impl QueueTransportConfig {
    /// The prefix prepended to every derived queue name.
    pub fn queue_prefix(&self) -> &str {
        &self.queue_prefix
    }

    /// This transport's default consumer group label.
    pub fn consumer_group(&self) -> &str {
        &self.consumer_group
    }

    /// This transport's default consumer identity within its group.
    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    /// How long a worker blocks on an empty queue before re-polling.
    pub fn block_time(&self) -> Duration {
        self.block_time
    }

    /// The maximum number of entries retained per queue (trim-oldest).
    pub fn max_queue_length(&self) -> usize {
        self.max_queue_length
    }

    /// The cumulative `handler_error` count, per `(class, handler)`, past
    /// which further failures for that subscription are dead-lettered
    /// rather than merely counted (see `DESIGN.md`).
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether handler failures past [`max_retries`](Self::max_retries) are
    /// pushed onto a dead-letter queue at all, or simply dropped with a
    /// logged error.
    pub fn dead_letter_queue(&self) -> bool {
        self.dead_letter_queue
    }

    /// The prefix prepended to a queue's name to produce its DLQ name.
    pub fn dead_letter_prefix(&self) -> &str {
        &self.dead_letter_prefix
    }

    /// The reconnection backoff policy for this transport's connector.
    pub fn backoff(&self) -> &BackoffConfig {
        &self.backoff
    }

    /// Whether this transport's receive loop (worker spawning) is disabled.
    /// Intended for statistics-only callers that only need `publish` and the
    /// read-only management surface.
    pub fn test_mode(&self) -> bool {
        self.test_mode
    }
}

impl QueueTransportConfig {
    fn default_queue_prefix() -> Box<str> {
        Box::from("relay")
    }

    fn default_consumer_group() -> Box<str> {
        Box::from("default")
    }

    fn default_consumer_id() -> Box<str> {
        Box::from(format!("{}", std::process::id()))
    }

    fn default_block_time() -> Duration {
        Duration::from_secs(5)
    }

    fn default_max_queue_length() -> usize {
        10_000
    }

    fn default_max_retries() -> u32 {
        3
    }

    fn default_dead_letter_queue() -> bool {
        false
    }

    fn default_dead_letter_prefix() -> Box<str> {
        Box::from("dlq")
    }

    fn default_backoff() -> BackoffConfig {
        BackoffConfig::default()
    }

    fn default_test_mode() -> bool {
        false
    }
}

impl Default for QueueTransportConfig {
    fn default() -> Self {
        Self {
            queue_prefix: Self::default_queue_prefix(),
            consumer_group: Self::default_consumer_group(),
            consumer_id: Self::default_consumer_id(),
            block_time: Self::default_block_time(),
            max_queue_length: Self::default_max_queue_length(),
            max_retries: Self::default_max_retries(),
            dead_letter_queue: Self::default_dead_letter_queue(),
            dead_letter_prefix: Self::default_dead_letter_prefix(),
            backoff: Self::default_backoff(),
            test_mode: Self::default_test_mode(),
        }
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for QueueTransportConfig {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(QueueTransportConfigVisitor)
        }
    }

    struct QueueTransportConfigVisitor;

    impl<'de> Visitor<'de> for QueueTransportConfigVisitor {
        type Value = QueueTransportConfig;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a map of queue transport configuration")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut queue_prefix = None;
            let mut consumer_group = None;
            let mut consumer_id = None;
            let mut block_time_ms: Option<u64> = None;
            let mut max_queue_length = None;
            let mut max_retries = None;
            let mut dead_letter_queue = None;
            let mut dead_letter_prefix = None;
            let mut backoff = None;
            let mut test_mode = None;

            while let Some(key) = map.next_key()? {
                match key {
                    QueueTransportConfigField::queue_prefix => {
                        key.poll(&mut map, &mut queue_prefix)?
                    }
                    QueueTransportConfigField::consumer_group => {
                        key.poll(&mut map, &mut consumer_group)?
                    }
                    QueueTransportConfigField::consumer_id => {
                        key.poll(&mut map, &mut consumer_id)?
                    }
                    QueueTransportConfigField::block_time_ms => {
                        key.poll(&mut map, &mut block_time_ms)?
                    }
                    QueueTransportConfigField::max_queue_length => {
                        key.poll(&mut map, &mut max_queue_length)?
                    }
                    QueueTransportConfigField::max_retries => {
                        key.poll(&mut map, &mut max_retries)?
                    }
                    QueueTransportConfigField::dead_letter_queue => {
                        key.poll(&mut map, &mut dead_letter_queue)?
                    }
                    QueueTransportConfigField::dead_letter_prefix => {
                        key.poll(&mut map, &mut dead_letter_prefix)?
                    }
                    QueueTransportConfigField::backoff => key.poll(&mut map, &mut backoff)?,
                    QueueTransportConfigField::test_mode => {
                        key.poll(&mut map, &mut test_mode)?
                    }
                    QueueTransportConfigField::__ignore => map.next_value()?,
                };
            }

            Ok(QueueTransportConfig {
                queue_prefix: queue_prefix.unwrap_or_else(QueueTransportConfig::default_queue_prefix),
                consumer_group: consumer_group
                    .unwrap_or_else(QueueTransportConfig::default_consumer_group),
                consumer_id: consumer_id.unwrap_or_else(QueueTransportConfig::default_consumer_id),
                block_time: block_time_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(QueueTransportConfig::default_block_time),
                max_queue_length: max_queue_length
                    .unwrap_or_else(QueueTransportConfig::default_max_queue_length),
                max_retries: max_retries.unwrap_or_else(QueueTransportConfig::default_max_retries),
                dead_letter_queue: dead_letter_queue
                    .unwrap_or_else(QueueTransportConfig::default_dead_letter_queue),
                dead_letter_prefix: dead_letter_prefix
                    .unwrap_or_else(QueueTransportConfig::default_dead_letter_prefix),
                backoff: backoff.unwrap_or_else(QueueTransportConfig::default_backoff),
                test_mode: test_mode.unwrap_or_else(QueueTransportConfig::default_test_mode),
            })
        }
    }

    impl_deserialize_field!(
        QueueTransportConfigField,
        relay_deserialize::Slug::eq_as_slugs,
        queue_prefix,
        consumer_group,
        consumer_id,
        block_time_ms,
        max_queue_length,
        max_retries,
        dead_letter_queue,
        dead_letter_prefix,
        backoff,
        test_mode,
    );
};
