use crate::InvalidRouting;

/// A validated `<namespace>.<type>.<from>.<to>` routing key (§6), as used by
/// the queue transport.
///
/// Each segment matches `[a-z0-9_]+`; an empty `to` component is rendered as
/// the literal segment `"broadcast"` by [`compose`](RoutingKey::compose).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingKey(Box<str>);

/// The literal segment substituted for an empty/absent recipient.
pub const BROADCAST_SEGMENT: &str = "broadcast";

impl RoutingKey {
    /// Parses an already-dotted routing key string, validating that every
    /// segment matches `[a-z0-9_]+`.
    pub fn parse(source: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        let source = source.as_ref();

        if source.is_empty() {
            return Err(InvalidRouting::IllegalSegment {
                field: Box::from("routing_key"),
                segment: Box::from(""),
            });
        }

        for segment in source.split('.') {
            if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(InvalidRouting::IllegalSegment {
                    field: Box::from("routing_key"),
                    segment: Box::from(segment),
                });
            }
        }

        Ok(Self(Box::from(source)))
    }

    /// Composes a routing key from its four logical components, normalizing
    /// each (lowercased, `-` replaced with `_`). An empty `to` is rendered as
    /// [`BROADCAST_SEGMENT`]. Any component that still contains a `.` after
    /// normalization is rejected.
    pub fn compose(
        namespace: impl AsRef<str>,
        type_: impl AsRef<str>,
        from: impl AsRef<str>,
        to: impl AsRef<str>,
    ) -> Result<Self, InvalidRouting> {
        let namespace = normalize_segment("namespace", namespace.as_ref())?;
        let type_ = normalize_segment("type", type_.as_ref())?;
        let from = normalize_segment("from", from.as_ref())?;

        let to = to.as_ref();
        let to = if to.is_empty() {
            BROADCAST_SEGMENT.to_string()
        } else {
            normalize_segment("to", to)?
        };

        Self::parse(format!("{namespace}.{type_}.{from}.{to}"))
    }

    /// The key's raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the key's dotted segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl std::fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoutingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes one routing-key component: lowercases it and replaces `-` with
/// `_`. Rejects a component that contains a `.` (disallowed per §6) or ends
/// up empty.
pub(crate) fn normalize_segment(field: &str, raw: &str) -> Result<String, InvalidRouting> {
    if raw.contains('.') {
        return Err(InvalidRouting::IllegalSegment {
            field: Box::from(field),
            segment: Box::from(raw),
        });
    }

    let normalized: String = raw
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if normalized.is_empty() {
        return Err(InvalidRouting::IllegalSegment {
            field: Box::from(field),
            segment: Box::from(raw),
        });
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compose_normalizes_and_joins() {
        let key = RoutingKey::compose("Payment", "payment", "api", "payment_service").unwrap();
        assert_eq!(key.as_str(), "payment.payment.api.payment_service");
    }

    #[test]
    fn compose_renders_empty_to_as_broadcast() {
        let key = RoutingKey::compose("demo", "health_check", "health", "").unwrap();
        assert_eq!(key.as_str(), "demo.health_check.health.broadcast");
    }

    #[test]
    fn compose_rejects_dotted_to() {
        let result = RoutingKey::compose("demo", "health_check", "health", "a.b");
        assert!(result.is_err());
    }

    #[test]
    fn compose_normalizes_dashes_to_underscores() {
        let key = RoutingKey::compose("demo", "health-check", "api-gw", "svc").unwrap();
        assert_eq!(key.as_str(), "demo.health_check.api_gw.svc");
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(RoutingKey::parse("a..b").is_err());
    }
}
