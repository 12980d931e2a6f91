use thiserror::Error;

/// Raised by user handler code. Caught by the dispatcher's workers and never
/// propagated past the worker boundary (§4.4, §7).
#[derive(Debug, Clone, Error)]
#[error("handler failed: {reason}")]
pub struct HandlerError {
    /// A human-readable description of the failure.
    pub reason: Box<str>,
}

impl HandlerError {
    /// Creates a new [`HandlerError`] with the given reason.
    pub fn new(reason: impl Into<Box<str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Creates a [`HandlerError`] describing a handler panic, carrying
    /// whatever message could be recovered from the panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked with a non-string payload".to_string()
        };

        Self::new(message)
    }
}
