use thiserror::Error;

/// Raised when a routing key or pattern segment contains a disallowed
/// character, per the `<namespace>.<type>.<from>.<to>` grammar (§6).
#[derive(Debug, Clone, Error)]
pub enum InvalidRouting {
    /// A segment contained an embedded `.` or a character outside
    /// `[a-z0-9_]` once normalized.
    #[error("illegal character in segment '{segment}' of field '{field}'")]
    IllegalSegment {
        /// The field the offending segment came from (e.g. `"to"`).
        field: Box<str>,
        /// The offending segment value.
        segment: Box<str>,
    },

    /// A pattern string failed to parse into segments at all (e.g. empty).
    #[error("malformed pattern string: '{0}'")]
    MalformedPattern(Box<str>),
}
