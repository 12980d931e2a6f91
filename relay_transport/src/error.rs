use nonempty::NonEmpty;
use relay_message::ValidationError;
use std::sync::Arc;
use thiserror::Error;

/// The name under which a transport is registered, used to identify it in
/// aggregated failure reports.
pub type TransportName = Arc<str>;

/// Raised by a [`Transport`](crate::Transport) implementation (§4.5).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport's underlying connection is not currently available.
    #[error("transport '{transport}' is down")]
    TransportDown {
        /// The name of the transport that is down.
        transport: TransportName,
    },

    /// One or more transports failed to publish, aggregated by name (§4.8).
    #[error("{} transport(s) failed to publish", .0.len())]
    PublishError(NonEmpty<(TransportName, Box<TransportError>)>),

    /// A lower-level broker operation failed; the message carries whatever
    /// detail the broker surfaced.
    #[error("broker operation failed: {0}")]
    Broker(Box<str>),
}

impl TransportError {
    /// Builds a [`TransportError::PublishError`] from the given collection of
    /// per-transport failures. Panics if given an empty vector; callers are
    /// expected to have already checked for at least one failure.
    pub fn aggregate(failures: Vec<(TransportName, TransportError)>) -> Self {
        let failures: Vec<_> = failures
            .into_iter()
            .map(|(name, error)| (name, Box::new(error)))
            .collect();

        let failures =
            NonEmpty::from_vec(failures).expect("aggregate requires at least one failure");

        TransportError::PublishError(failures)
    }
}

/// The full set of ways a whole-message publish attempt can fail (§7): the
/// message fails its own validation before any I/O is attempted, or every
/// configured transport fails.
#[derive(Debug, Error)]
pub enum PublishFlowError {
    /// The message failed [`validate`](relay_message::Message::validate);
    /// no transport ever saw the envelope.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every configured transport failed to publish.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
