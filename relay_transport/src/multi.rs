use crate::{PublishFlowError, Transport, TransportError};
use relay_message::{Envelope, Message};
use std::sync::Arc;
use tracing::{info, warn};

/// Publishes an envelope through an ordered collection of transports,
/// collecting per-transport results (§4.8).
///
/// Transports are tried in registration order, mirroring a sequential
/// batch-publish loop: a failure on one transport does not stop the
/// publisher from attempting the rest. A mix of successes and failures is
/// still reported as an overall success (each failure is logged at WARN) —
/// only a failure on *every* transport is surfaced as an error, via
/// [`TransportError::PublishError`] naming every transport that failed.
pub struct MultiTransportPublisher {
    transports: Vec<Arc<dyn Transport>>,
}

impl MultiTransportPublisher {
    /// Builds a publisher over the given ordered transports.
    pub fn new(transports: Vec<Arc<dyn Transport>>) -> Self {
        Self { transports }
    }

    /// The transports this publisher fans out to, in registration order.
    pub fn transports(&self) -> &[Arc<dyn Transport>] {
        &self.transports
    }

    /// Publishes `envelope` (of the given message class) through every
    /// registered transport.
    pub async fn publish(&self, class: &str, envelope: &Envelope) -> Result<(), TransportError> {
        let mut failures = Vec::new();
        let mut successes = 0usize;

        for transport in &self.transports {
            match transport.publish(class, envelope).await {
                Ok(()) => {
                    successes += 1;
                    info!(transport = transport.name(), class, "published");
                }
                Err(error) => {
                    warn!(
                        alert = true,
                        transport = transport.name(),
                        class,
                        %error,
                        "transport failed to publish",
                    );
                    failures.push((Arc::from(transport.name()), error));
                }
            }
        }

        if failures.is_empty() || successes > 0 {
            Ok(())
        } else {
            Err(TransportError::aggregate(failures))
        }
    }

    /// Runs the full publish data flow of §2 on `message`: validates it,
    /// rejecting synchronously before any I/O if validation fails, stamps
    /// `published_at`, then fans the resulting envelope out through every
    /// configured transport via [`publish`](Self::publish).
    pub async fn publish_message(&self, message: &mut Message) -> Result<(), PublishFlowError> {
        message.validate()?;
        message.stamp_published();

        let class = message.class().name().to_string();
        let envelope = message.to_envelope();

        self.publish(&class, &envelope).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relay_message::{Message, MessageClass, PropertySchema};
    use relay_routing::Pattern;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct StubTransport {
        name: &'static str,
        fails: bool,
        invoked: AtomicBool,
    }

    #[async_trait]
    impl Transport for StubTransport {
        fn name(&self) -> &str {
            self.name
        }

        async fn publish(&self, _class: &str, _envelope: &Envelope) -> Result<(), TransportError> {
            self.invoked.store(true, Ordering::SeqCst);

            if self.fails {
                Err(TransportError::TransportDown {
                    transport: Arc::from(self.name),
                })
            } else {
                Ok(())
            }
        }

        async fn subscribe(&self, _pattern: Pattern) -> Result<(), TransportError> {
            Ok(())
        }

        async fn unsubscribe(&self, _pattern: &Pattern) -> Result<(), TransportError> {
            Ok(())
        }

        async fn unsubscribe_all(&self) -> Result<(), TransportError> {
            Ok(())
        }

        fn connected(&self) -> bool {
            true
        }

        async fn shutdown(&self, _timeout: Duration) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn envelope() -> Envelope {
        let class = Arc::new(MessageClass::builder("demo.class").build());
        Message::builder(class).with_from("tester").build().to_envelope()
    }

    #[tokio::test]
    async fn all_succeed_reports_ok() {
        // Given
        let publisher = MultiTransportPublisher::new(vec![
            Arc::new(StubTransport { name: "a", fails: false, invoked: AtomicBool::new(false) }),
            Arc::new(StubTransport { name: "b", fails: false, invoked: AtomicBool::new(false) }),
        ]);

        // When / Then
        assert!(publisher.publish("demo.class", &envelope()).await.is_ok());
    }

    #[tokio::test]
    async fn partial_failure_still_attempts_every_transport_and_reports_success() {
        // Given
        let second = Arc::new(StubTransport { name: "b", fails: false, invoked: AtomicBool::new(false) });
        let publisher = MultiTransportPublisher::new(vec![
            Arc::new(StubTransport { name: "a", fails: true, invoked: AtomicBool::new(false) }),
            Arc::clone(&second) as Arc<dyn Transport>,
        ]);

        // When
        let result = publisher.publish("demo.class", &envelope()).await;

        // Then: one success among a mixed batch is still an overall success.
        assert!(result.is_ok());
        assert!(second.invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn all_transports_failing_reports_publish_error() {
        // Given
        let publisher = MultiTransportPublisher::new(vec![
            Arc::new(StubTransport { name: "a", fails: true, invoked: AtomicBool::new(false) }),
            Arc::new(StubTransport { name: "b", fails: true, invoked: AtomicBool::new(false) }),
        ]);

        // When
        let result = publisher.publish("demo.class", &envelope()).await;

        // Then
        match result.unwrap_err() {
            TransportError::PublishError(failures) => {
                assert_eq!(failures.len(), 2);
            }
            other => panic!("expected PublishError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_message_rejects_invalid_message_before_any_transport_runs() {
        // Given
        let class = Arc::new(
            MessageClass::builder("demo.order_created")
                .with_property(PropertySchema::new("order_id", "string").required())
                .with_default_from("orders")
                .build(),
        );
        let transport = Arc::new(StubTransport { name: "a", fails: false, invoked: AtomicBool::new(false) });
        let publisher = MultiTransportPublisher::new(vec![Arc::clone(&transport) as Arc<dyn Transport>]);
        let mut message = Message::builder(class).build();

        // When
        let result = publisher.publish_message(&mut message).await;

        // Then
        assert!(matches!(result, Err(PublishFlowError::Validation(_))));
        assert!(!transport.invoked.load(Ordering::SeqCst));
        assert_eq!(message.header().published_at(), None);
    }

    #[tokio::test]
    async fn publish_message_stamps_and_fans_out_a_valid_message() {
        // Given
        let class = Arc::new(MessageClass::builder("demo.class").build());
        let transport = Arc::new(StubTransport { name: "a", fails: false, invoked: AtomicBool::new(false) });
        let publisher = MultiTransportPublisher::new(vec![Arc::clone(&transport) as Arc<dyn Transport>]);
        let mut message = Message::builder(class).with_from("tester").build();

        // When
        let result = publisher.publish_message(&mut message).await;

        // Then
        assert!(result.is_ok());
        assert!(transport.invoked.load(Ordering::SeqCst));
        assert!(message.header().published_at().is_some());
    }
}
