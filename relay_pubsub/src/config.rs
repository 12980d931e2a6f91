use relay_factory::impl_deserialize_field;
use relay_util::BackoffConfig;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt::Formatter;

/// How a [`PubSubTransport`](crate::PubSubTransport) names broker channels
/// for outgoing envelopes (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelNaming {
    /// The channel is the message class name, verbatim.
    Basic,
    /// The channel is the derived `<type>.<from>.<to>` routing key.
    Enhanced,
}

impl Default for ChannelNaming {
    fn default() -> Self {
        ChannelNaming::Basic
    }
}

/// Tunables for a [`PubSubTransport`](crate::PubSubTransport) (§4.6).
#[derive(Debug, Clone, PartialEq)]
pub struct PubSubTransportConfig {
    pub(crate) channel_naming: ChannelNaming,
    pub(crate) dual_publish: bool,
    pub(crate) backoff: BackoffConfig,
}

impl PubSubTransportConfig {
    /// How outgoing channels are named.
    pub fn channel_naming(&self) -> ChannelNaming {
        self.channel_naming
    }

    /// Whether an envelope is published under both the basic and enhanced
    /// channel names. Defaults to `false`: enabling it doubles broker
    /// traffic, so it is opt-in (Open Questions, `DESIGN.md`).
    pub fn dual_publish(&self) -> bool {
        self.dual_publish
    }

    /// The reconnection backoff policy for this transport's connector.
    pub fn backoff(&self) -> &BackoffConfig {
        &self.backoff
    }
}

impl PubSubTransportConfig {
    fn default_channel_naming() -> ChannelNaming {
        ChannelNaming::default()
    }

    fn default_dual_publish() -> bool {
        false
    }

    fn default_backoff() -> BackoffConfig {
        BackoffConfig::default()
    }
}

impl Default for PubSubTransportConfig {
    fn default() -> Self {
        Self {
            channel_naming: Self::default_channel_naming(),
            dual_publish: Self::default_dual_publish(),
            backoff: Self::default_backoff(),
        }
    }
}

const _: () = {
    impl<'de> Deserialize<'de> for PubSubTransportConfig {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(PubSubTransportConfigVisitor)
        }
    }

    struct PubSubTransportConfigVisitor;

    impl<'de> Visitor<'de> for PubSubTransportConfigVisitor {
        type Value = PubSubTransportConfig;

        fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
            formatter.write_str("a map of pub/sub transport configuration")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut channel_naming = None;
            let mut dual_publish = None;
            let mut backoff = None;

            while let Some(key) = map.next_key()? {
                match key {
                    PubSubTransportConfigField::channel_naming => {
                        key.poll(&mut map, &mut channel_naming)?
                    }
                    PubSubTransportConfigField::dual_publish => {
                        key.poll(&mut map, &mut dual_publish)?
                    }
                    PubSubTransportConfigField::backoff => key.poll(&mut map, &mut backoff)?,
                    PubSubTransportConfigField::__ignore => map.next_value()?,
                };
            }

            Ok(PubSubTransportConfig {
                channel_naming: channel_naming
                    .unwrap_or_else(PubSubTransportConfig::default_channel_naming),
                dual_publish: dual_publish
                    .unwrap_or_else(PubSubTransportConfig::default_dual_publish),
                backoff: backoff.unwrap_or_else(PubSubTransportConfig::default_backoff),
            })
        }
    }

    impl_deserialize_field!(
        PubSubTransportConfigField,
        relay_deserialize::Slug::eq_as_slugs,
        channel_naming,
        dual_publish,
        backoff,
    );
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_basic_naming_single_publish() {
        let config = PubSubTransportConfig::default();
        assert_eq!(config.channel_naming(), ChannelNaming::Basic);
        assert!(!config.dual_publish());
    }

    #[test]
    fn deserializes_with_tolerant_field_names() {
        let yaml = "ChannelNaming: enhanced\ndual-publish: true\n";
        let config: PubSubTransportConfig = serde_yml::from_str(yaml).unwrap();

        assert_eq!(config.channel_naming(), ChannelNaming::Enhanced);
        assert!(config.dual_publish());
    }
}
