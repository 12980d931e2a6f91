use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// The standardized header carried by every envelope: addressing, identity,
/// and versioning metadata, independent of the payload shape.
///
/// See the data model's invariants: [`uuid`](Header::uuid) never changes
/// after construction, and [`published_at`](Header::published_at) is set
/// exactly once, at publish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    uuid: Uuid,
    message_class: Arc<str>,
    #[serde(with = "time::serde::rfc3339::option")]
    published_at: Option<OffsetDateTime>,
    publisher_pid: Arc<str>,
    version: u32,
    from: Option<Arc<str>>,
    to: Option<Arc<str>>,
    reply_to: Option<Arc<str>>,
    serializer: Arc<str>,
}

impl Header {
    /// Builds a fresh header for a newly constructed message instance:
    /// assigns a random [`Uuid`], leaves `published_at` unset, and fills in
    /// the rest from class- and call-site-provided defaults.
    pub(crate) fn new(
        message_class: Arc<str>,
        publisher_pid: Arc<str>,
        version: u32,
        from: Option<Arc<str>>,
        to: Option<Arc<str>>,
        reply_to: Option<Arc<str>>,
        serializer: Arc<str>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            message_class,
            published_at: None,
            publisher_pid,
            version,
            from,
            to,
            reply_to,
            serializer,
        }
    }

    /// The globally unique identity of the message this header belongs to.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The fully-qualified message class name.
    pub fn message_class(&self) -> &str {
        &self.message_class
    }

    /// The timestamp assigned at publish, if the message has been published.
    pub fn published_at(&self) -> Option<OffsetDateTime> {
        self.published_at
    }

    /// Marks this header as published, stamping [`published_at`] with the
    /// given instant. Intended to be called exactly once, by the publish
    /// path.
    ///
    /// [`published_at`]: Header::published_at
    pub(crate) fn stamp_published(&mut self, at: OffsetDateTime) {
        self.published_at = Some(at);
    }

    /// The opaque identifier of the process that published this message.
    pub fn publisher_pid(&self) -> &str {
        &self.publisher_pid
    }

    /// The integer schema version of the message class at construction time.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The sender identity. Required to be present at publish time.
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Sets the sender identity.
    pub fn set_from(&mut self, from: Option<Arc<str>>) {
        self.from = from;
    }

    /// The recipient identity. Absent means broadcast.
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// Sets the recipient identity.
    pub fn set_to(&mut self, to: Option<Arc<str>>) {
        self.to = to;
    }

    /// `true` if this header has no recipient, i.e. it addresses a broadcast.
    pub fn is_broadcast(&self) -> bool {
        match &self.to {
            None => true,
            Some(to) => to.is_empty(),
        }
    }

    /// An optional return address.
    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    /// Sets the return address.
    pub fn set_reply_to(&mut self, reply_to: Option<Arc<str>>) {
        self.reply_to = reply_to;
    }

    /// The identifier of the codec used to encode this envelope.
    pub fn serializer(&self) -> &str {
        &self.serializer
    }

    /// Sets the identifier of the codec that will encode this envelope.
    pub fn set_serializer(&mut self, serializer: Arc<str>) {
        self.serializer = serializer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Header {
        Header::new(
            Arc::from("demo.health_check"),
            Arc::from("pid-1"),
            1,
            Some(Arc::from("health")),
            None,
            None,
            Arc::from("noop"),
        )
    }

    #[test]
    fn new_header_is_unpublished_and_broadcast() {
        // Given / When
        let header = sample();

        // Then
        assert_eq!(header.published_at(), None);
        assert!(header.is_broadcast());
        assert_eq!(header.from(), Some("health"));
    }

    #[test]
    fn stamping_publishes_exactly_once() {
        // Given
        let mut header = sample();
        let at = OffsetDateTime::now_utc();

        // When
        header.stamp_published(at);

        // Then
        assert_eq!(header.published_at(), Some(at));
    }

    #[test]
    fn non_empty_to_is_not_broadcast() {
        // Given
        let mut header = sample();

        // When
        header.set_to(Some(Arc::from("payment_service")));

        // Then
        assert!(!header.is_broadcast());
    }
}
