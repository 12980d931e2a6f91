use regex::Regex;
use relay_message::Header;

/// A predicate over a single header field: a literal string, a
/// pre-compiled regex, or an ordered set of either (matching is "any of",
/// §3).
///
/// Regexes are compiled at subscribe time (Design Notes: allocation-free
/// dispatch), so evaluating a [`Filters`] never allocates or compiles a
/// pattern.
#[derive(Debug, Clone)]
pub enum MatchSet {
    /// Matches by exact equality.
    Literal(Box<str>),
    /// Matches by full-string regex search.
    Regex(Regex),
    /// Matches if any alternative matches.
    AnyOf(Vec<MatchSet>),
}

impl MatchSet {
    /// Builds a literal alternative.
    pub fn literal(value: impl Into<Box<str>>) -> Self {
        MatchSet::Literal(value.into())
    }

    /// Builds a regex alternative, pre-compiling the given pattern.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(MatchSet::Regex(Regex::new(pattern)?))
    }

    /// Tests this predicate against a header field value.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            MatchSet::Literal(literal) => literal.as_ref() == value,
            MatchSet::Regex(regex) => regex.is_match(value),
            MatchSet::AnyOf(alternatives) => alternatives.iter().any(|m| m.matches(value)),
        }
    }
}

impl PartialEq for MatchSet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MatchSet::Literal(a), MatchSet::Literal(b)) => a == b,
            (MatchSet::Regex(a), MatchSet::Regex(b)) => a.as_str() == b.as_str(),
            (MatchSet::AnyOf(a), MatchSet::AnyOf(b)) => a == b,
            _ => false,
        }
    }
}

/// The filter set attached to a subscription (§3): optional predicates over
/// `from`, `to`, `reply_to`, and an optional `broadcast` flag.
///
/// Absent predicates impose no constraint; a subscription with no filters at
/// all matches every envelope of its class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    from: Option<MatchSet>,
    to: Option<MatchSet>,
    reply_to: Option<MatchSet>,
    broadcast: Option<bool>,
}

impl Filters {
    /// An empty filter set: matches everything.
    pub fn none() -> Self {
        Self::default()
    }

    /// Constrains the `from` header field.
    pub fn with_from(mut self, predicate: MatchSet) -> Self {
        self.from = Some(predicate);
        self
    }

    /// Constrains the `to` header field.
    pub fn with_to(mut self, predicate: MatchSet) -> Self {
        self.to = Some(predicate);
        self
    }

    /// Constrains the `reply_to` header field.
    pub fn with_reply_to(mut self, predicate: MatchSet) -> Self {
        self.reply_to = Some(predicate);
        self
    }

    /// Constrains whether the envelope is a broadcast (`to` absent/empty).
    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    /// Evaluates every declared predicate against the given header. Absent
    /// predicates impose no constraint; all declared predicates must hold.
    pub fn evaluate(&self, header: &Header) -> bool {
        if let Some(predicate) = &self.from {
            if !header.from().map(|v| predicate.matches(v)).unwrap_or(false) {
                return false;
            }
        }

        if let Some(predicate) = &self.to {
            if !header.to().map(|v| predicate.matches(v)).unwrap_or(false) {
                return false;
            }
        }

        if let Some(predicate) = &self.reply_to {
            if !header.reply_to().map(|v| predicate.matches(v)).unwrap_or(false) {
                return false;
            }
        }

        if let Some(broadcast) = self.broadcast {
            if header.is_broadcast() != broadcast {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relay_message::{Message, MessageClass};
    use std::sync::Arc;

    fn header(from: &str, to: Option<&str>) -> Header {
        let class = Arc::new(MessageClass::builder("demo.class").build());
        let mut builder = Message::builder(class).with_from(from);

        if let Some(to) = to {
            builder = builder.with_to(to);
        }

        builder.build().header().clone()
    }

    #[test]
    fn empty_filters_match_everything() {
        assert!(Filters::none().evaluate(&header("anyone", Some("anything"))));
    }

    #[test]
    fn literal_from_filter() {
        let filters = Filters::none().with_from(MatchSet::literal("api"));
        assert!(filters.evaluate(&header("api", None)));
        assert!(!filters.evaluate(&header("web", None)));
    }

    #[test]
    fn any_of_matches_one_alternative() {
        let filters = Filters::none().with_from(MatchSet::AnyOf(vec![
            MatchSet::literal("api"),
            MatchSet::literal("web"),
        ]));
        assert!(filters.evaluate(&header("web", None)));
        assert!(!filters.evaluate(&header("mobile", None)));
    }

    #[test]
    fn broadcast_true_matches_absent_to() {
        let filters = Filters::none().with_broadcast(true);
        assert!(filters.evaluate(&header("health", None)));
        assert!(!filters.evaluate(&header("health", Some("svc"))));
    }

    #[test]
    fn regex_filter_matches_full_string_search() {
        let filters = Filters::none().with_from(MatchSet::regex("^svc-\\d+$").unwrap());
        assert!(filters.evaluate(&header("svc-42", None)));
        assert!(!filters.evaluate(&header("svc-abc", None)));
    }
}
