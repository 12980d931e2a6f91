use relay_factory::impl_deserialize_field;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;
use std::time::Duration;

/// Tunables for a [`Dispatcher`](crate::Dispatcher)'s [`WorkerPool`](crate::WorkerPool)
/// (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherConfig {
    pub(crate) worker_count: usize,
    pub(crate) queue_depth: usize,
    pub(crate) overflow_timeout: Duration,
}

impl DispatcherConfig {
    /// The number of persistent worker tasks in the pool.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// The bounded depth of the worker queue.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// How long a submission may wait for room in a full queue before being
    /// rejected as overflow.
    pub fn overflow_timeout(&self) -> Duration {
        self.overflow_timeout
    }
}

impl DispatcherConfig {
    fn default_worker_count() -> usize {
        num_cpus::get().max(1)
    }

    fn default_queue_depth() -> usize {
        1024
    }

    fn default_overflow_timeout() -> Duration {
        Duration::from_millis(500)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: Self::default_worker_count(),
            queue_depth: Self::default_queue_depth(),
            overflow_timeout: Self::default_overflow_timeout(),
        }
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for DispatcherConfig {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(DispatcherConfigVisitor)
        }
    }

    struct DispatcherConfigVisitor;

    impl<'de> Visitor<'de> for DispatcherConfigVisitor {
        type Value = DispatcherConfig;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a map of dispatcher configuration")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut worker_count = None;
            let mut queue_depth = None;
            let mut overflow_timeout = None;

            while let Some(key) = map.next_key()? {
                match key {
                    DispatcherConfigField::worker_count => key.poll(&mut map, &mut worker_count)?,
                    DispatcherConfigField::queue_depth => key.poll(&mut map, &mut queue_depth)?,
                    DispatcherConfigField::overflow_timeout => {
                        key.poll(&mut map, &mut overflow_timeout)?
                    }
                    DispatcherConfigField::__ignore => map.next_value()?,
                };
            }

            Ok(DispatcherConfig {
                worker_count: worker_count.unwrap_or_else(DispatcherConfig::default_worker_count),
                queue_depth: queue_depth.unwrap_or_else(DispatcherConfig::default_queue_depth),
                overflow_timeout: overflow_timeout
                    .unwrap_or_else(DispatcherConfig::default_overflow_timeout),
            })
        }
    }

    impl_deserialize_field!(
        DispatcherConfigField,
        relay_deserialize::Slug::eq_as_slugs,
        worker_count,
        queue_depth,
        overflow_timeout,
    );
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_sane() {
        let config = DispatcherConfig::default();
        assert!(config.worker_count() >= 1);
        assert!(config.queue_depth() > 0);
    }

    #[test]
    fn deserializes_with_tolerant_field_names() {
        let yaml = "worker-count: 4\nQueueDepth: 16\n";
        let config: DispatcherConfig = serde_yml::from_str(yaml).unwrap();

        assert_eq!(config.worker_count(), 4);
        assert_eq!(config.queue_depth(), 16);
        assert_eq!(
            config.overflow_timeout(),
            DispatcherConfig::default_overflow_timeout()
        );
    }
}
