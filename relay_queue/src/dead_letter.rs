use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A persisted record of a message whose handler failed past the configured
/// retry threshold (§3, §4.7).
///
/// Pushed onto `<dead_letter_prefix>.<origin_queue>` as JSON, since the DLQ
/// is an operator-facing surface rather than a wire format any subscriber is
/// expected to decode with the envelope's own serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetterRecord {
    /// The original envelope, encoded with the same serializer the queue
    /// transport publishes with.
    pub original: Vec<u8>,
    /// The name of the queue the message was consumed from.
    pub origin_queue: Box<str>,
    /// A short label for the kind of failure (typically `"HandlerError"`).
    pub error_class: Box<str>,
    /// The failure's human-readable message.
    pub error_message: Box<str>,
    /// How many times this message's handler was observed to fail before
    /// being dead-lettered.
    pub retry_count: u64,
    /// When this message's handler first failed.
    #[serde(with = "time::serde::rfc3339")]
    pub first_failure_at: OffsetDateTime,
    /// When this message's handler most recently failed (the attempt that
    /// triggered dead-lettering).
    #[serde(with = "time::serde::rfc3339")]
    pub last_failure_at: OffsetDateTime,
}

impl DeadLetterRecord {
    /// Serializes this record to JSON bytes for pushing onto a DLQ list.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserializes a record previously produced by [`to_json`](Self::to_json).
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_json() {
        let now = OffsetDateTime::now_utc();
        let record = DeadLetterRecord {
            original: vec![1, 2, 3],
            origin_queue: Box::from("relay.abc"),
            error_class: Box::from("HandlerError"),
            error_message: Box::from("boom"),
            retry_count: 4,
            first_failure_at: now,
            last_failure_at: now,
        };

        let bytes = record.to_json().unwrap();
        let restored = DeadLetterRecord::from_json(&bytes).unwrap();

        assert_eq!(restored, record);
    }
}
