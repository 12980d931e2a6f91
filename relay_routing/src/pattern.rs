use crate::{InvalidRouting, RoutingKey};

/// One dotted segment of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal segment (`[a-z0-9_]+`), matched case-insensitively.
    Literal(Box<str>),
    /// `*`: matches exactly one segment.
    Star,
    /// `#`: matches zero or more segments.
    Hash,
}

/// A dotted wildcard pattern (§4.3): `*` matches exactly one segment, `#`
/// matches zero or more segments, bound to a queue or channel at subscribe
/// time.
///
/// Matching is case-insensitive on segments, case-sensitive on the `.`
/// separator. Patterns are expected to be short (at most 8 segments); the
/// matcher is a straightforward recursive backtracker, O(|pattern|·|key|) in
/// the worst case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: Box<str>,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses a dotted pattern string into its [`Segment`]s.
    pub fn parse(source: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        let source = source.as_ref();

        if source.is_empty() {
            return Err(InvalidRouting::MalformedPattern(Box::from(source)));
        }

        let mut segments = Vec::new();

        for raw in source.split('.') {
            if raw.is_empty() {
                return Err(InvalidRouting::MalformedPattern(Box::from(source)));
            }

            let segment = match raw {
                "*" => Segment::Star,
                "#" => Segment::Hash,
                literal => {
                    if !literal.chars().all(is_allowed_char) {
                        return Err(InvalidRouting::IllegalSegment {
                            field: Box::from("pattern"),
                            segment: Box::from(literal),
                        });
                    }

                    Segment::Literal(literal.to_ascii_lowercase().into_boxed_str())
                }
            };

            segments.push(segment);
        }

        Ok(Self {
            source: Box::from(source),
            segments,
        })
    }

    /// The pattern's original source string.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The pattern's parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Tests whether this pattern matches the given [`RoutingKey`].
    ///
    /// A `#` absorbs zero or more key segments by trying successively longer
    /// suffixes (backtracking) until the rest of the pattern matches the
    /// remaining suffix, or no absorption works.
    pub fn matches(&self, key: &RoutingKey) -> bool {
        let key_segments = key.segments().collect::<Vec<_>>();

        Self::matches_from(&self.segments, &key_segments)
    }

    fn matches_from(pattern: &[Segment], key: &[&str]) -> bool {
        match pattern.split_first() {
            None => key.is_empty(),

            Some((Segment::Literal(literal), rest)) => match key.split_first() {
                Some((head, key_rest)) if literal.eq_ignore_ascii_case(head) => {
                    Self::matches_from(rest, key_rest)
                }
                _ => false,
            },

            Some((Segment::Star, rest)) => match key.split_first() {
                Some((_, key_rest)) => Self::matches_from(rest, key_rest),
                None => false,
            },

            Some((Segment::Hash, rest)) => {
                for take in 0..=key.len() {
                    if Self::matches_from(rest, &key[take..]) {
                        return true;
                    }
                }
                false
            }
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> RoutingKey {
        RoutingKey::parse(s).unwrap()
    }

    #[test]
    fn literal_pattern_matches_exact_key() {
        let pattern = Pattern::parse("payment.payment.api.payment_service").unwrap();
        assert!(pattern.matches(&key("payment.payment.api.payment_service")));
    }

    #[test]
    fn star_matches_single_segment_only() {
        let pattern = Pattern::parse("order.created.*.svc").unwrap();
        assert!(pattern.matches(&key("order.created.web.svc")));
        assert!(!pattern.matches(&key("order.created.web.extra.svc")));
    }

    #[test]
    fn hash_matches_zero_or_more_segments() {
        let pattern = Pattern::parse("order.#.*.*").unwrap();
        assert!(pattern.matches(&key("order.created.web.svc")));
        assert!(pattern.matches(&key("order.updated.mobile.svc")));
        assert!(!pattern.matches(&key("payment.created.web.svc")));
    }

    #[test]
    fn leading_hash_matches_any_prefix() {
        let pattern = Pattern::parse("#.*.payment_service").unwrap();
        assert!(pattern.matches(&key("payment.payment.api.payment_service")));
        assert!(!pattern.matches(&key("payment.payment.api.other_service")));
    }

    #[test]
    fn matching_is_case_insensitive_on_segments() {
        let pattern = Pattern::parse("Order.Created.*.*").unwrap();
        assert!(pattern.matches(&key("order.created.web.svc")));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(Pattern::parse("").is_err());
    }

    #[test]
    fn illegal_character_is_rejected() {
        assert!(Pattern::parse("order.cre-ated.*.*").is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn segment_string() -> impl Strategy<Value = String> {
            "[a-z0-9_]{1,6}"
        }

        fn literal_key(segments: Vec<String>) -> RoutingKey {
            RoutingKey::parse(segments.join(".")).unwrap()
        }

        proptest! {
            // A pattern built entirely from the key's own segments (no
            // wildcards) always matches that same key.
            #[test]
            fn literal_pattern_of_key_matches_itself(segments in proptest::collection::vec(segment_string(), 1..6)) {
                let key = literal_key(segments.clone());
                let pattern = Pattern::parse(segments.join(".")).unwrap();
                prop_assert!(pattern.matches(&key));
            }

            // Replacing any single segment with `*` still matches, since `*`
            // absorbs exactly one segment.
            #[test]
            fn star_in_place_of_any_segment_still_matches(
                segments in proptest::collection::vec(segment_string(), 1..6),
                index in 0usize..6,
            ) {
                prop_assume!(index < segments.len());
                let key = literal_key(segments.clone());
                let mut pattern_segments = segments.clone();
                pattern_segments[index] = "*".to_string();
                let pattern = Pattern::parse(pattern_segments.join(".")).unwrap();
                prop_assert!(pattern.matches(&key));
            }

            // `#` alone matches any routing key, of any length.
            #[test]
            fn bare_hash_matches_any_key(segments in proptest::collection::vec(segment_string(), 1..8)) {
                let key = literal_key(segments);
                let pattern = Pattern::parse("#").unwrap();
                prop_assert!(pattern.matches(&key));
            }

            // A pattern with strictly more literal/star segments than the key
            // has segments (and no `#` to absorb the slack) never matches.
            #[test]
            fn too_few_key_segments_never_match(
                segments in proptest::collection::vec(segment_string(), 1..4),
                extra in 1usize..3,
            ) {
                let key = literal_key(segments.clone());
                let mut pattern_segments = segments.clone();
                for _ in 0..extra {
                    pattern_segments.push("*".to_string());
                }
                let pattern = Pattern::parse(pattern_segments.join(".")).unwrap();
                prop_assert!(!pattern.matches(&key));
            }
        }
    }
}
