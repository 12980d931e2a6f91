use crate::routing_key::normalize_segment;
use crate::{InvalidRouting, Pattern};

/// Fluently accumulates optional `type`/`from`/`to` predicates and compiles
/// them into a [`Pattern`] string (§4.3).
///
/// Unknown segments default to `*`; the namespace segment (leftmost) is left
/// as `#` when unspecified, so a bare `PatternBuilder::new().build()` yields
/// `"#.*.*.*"` — matching one class of any namespace, any sender, any
/// recipient.
///
/// Per the Open Questions resolution (see `DESIGN.md`): `type_of` is matched
/// only against the class-derived namespace segment, not the stringified
/// payload type, so this builder's `type_of` substitutes the namespace
/// segment directly rather than emitting a separate predicate.
///
/// This builder is pure and side-effect-free, so it is trivially safe to
/// share across threads.
#[derive(Debug, Default, Clone)]
pub struct PatternBuilder {
    type_of: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl PatternBuilder {
    /// Starts a new, fully-wildcarded builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrains the namespace segment to the given class-derived type.
    pub fn type_of(mut self, type_: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        self.type_of = Some(normalize_segment("type", type_.as_ref())?);
        Ok(self)
    }

    /// Constrains the `from` segment.
    pub fn from(mut self, from: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        self.from = Some(normalize_segment("from", from.as_ref())?);
        Ok(self)
    }

    /// Constrains the `to` segment.
    pub fn to(mut self, to: impl AsRef<str>) -> Result<Self, InvalidRouting> {
        self.to = Some(normalize_segment("to", to.as_ref())?);
        Ok(self)
    }

    /// Compiles the accumulated predicates into a [`Pattern`].
    ///
    /// Unspecified segments default to `*`; an unspecified namespace
    /// segment is emitted as a leading `#.` so the pattern matches any
    /// namespace (this also absorbs the case where the caller wants a
    /// pattern with fewer than four logical segments).
    pub fn build(self) -> Pattern {
        let namespace_segment = self.type_of.clone().unwrap_or_else(|| "#".to_string());
        let from_segment = self.from.unwrap_or_else(|| "*".to_string());
        let to_segment = self.to.unwrap_or_else(|| "*".to_string());

        let source = if self.type_of.is_some() {
            format!("{namespace_segment}.*.{from_segment}.{to_segment}")
        } else {
            format!("#.{from_segment}.{to_segment}")
        };

        Pattern::parse(source).expect("builder only emits validated segments")
    }
}
