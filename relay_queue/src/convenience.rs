use relay_routing::Pattern;

/// A pattern matching anything addressed to `recipient`, regardless of
/// namespace or sender: `#.*.<recipient>` (§4.7).
pub fn subscribe_to_recipient(recipient: impl AsRef<str>) -> Pattern {
    Pattern::parse(format!("#.*.{}", recipient.as_ref()))
        .expect("recipient-only pattern is always well-formed")
}

/// A pattern matching anything sent by `sender`, regardless of namespace or
/// recipient: `#.<sender>.*` (§4.7).
pub fn subscribe_from_sender(sender: impl AsRef<str>) -> Pattern {
    Pattern::parse(format!("#.{}.*", sender.as_ref()))
        .expect("sender-only pattern is always well-formed")
}

/// A pattern matching every message of the given class-derived namespace,
/// regardless of sender or recipient: `<type>.#.*.*` (§4.7).
pub fn subscribe_to_type(type_: impl AsRef<str>) -> Pattern {
    Pattern::parse(format!("{}.#.*.*", type_.as_ref()))
        .expect("type-only pattern is always well-formed")
}

/// A pattern matching broadcast messages (`to` rendered as the literal
/// `broadcast` segment) addressed under any namespace or sender (§4.7).
pub fn subscribe_to_broadcasts() -> Pattern {
    Pattern::parse("#.*.broadcast").expect("broadcast pattern is always well-formed")
}

/// A set of patterns matching commonly-used alert namespaces: `emergency`,
/// `alert`, `alarm`, `critical` (§4.7).
///
/// The substring-glob `*alert*` named alongside these in the original source
/// cannot be expressed in this pattern grammar (segments are exact literals
/// or `*`/`#`, never partial-literal wildcards); it is approximated here by
/// the exact segment `alert`, documented as a known gap in `DESIGN.md`.
pub fn subscribe_to_alerts() -> Vec<Pattern> {
    ["emergency", "alert", "alarm", "critical"]
        .into_iter()
        .map(subscribe_to_type)
        .collect()
}
