use crate::HandlerError;
use relay_message::Envelope;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The boxed future returned by a [`HandlerFn`] invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>>;

/// The shape of a registered handler: takes the decoded [`Envelope`] and
/// returns a future resolving to success or a [`HandlerError`].
///
/// Represents the Design Notes' "block/proc handlers" generalization: any
/// closure, method reference, or async block can be boxed into this shape.
pub type HandlerFn = dyn Fn(Envelope) -> HandlerFuture + Send + Sync;

/// An opaque identity for a registered handler.
///
/// Per the Design Notes on block/proc handlers: identity is a user-provided
/// name (or a stable hash of one), so `(class, handler)` subscribe/unsubscribe
/// remains idempotent without requiring handlers to implement `PartialEq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId(Arc<str>);

impl HandlerId {
    /// Creates a new [`HandlerId`] from any string-like origin (a function
    /// name, a registration site, a user-chosen label).
    pub fn new(origin: impl Into<Arc<str>>) -> Self {
        Self(origin.into())
    }

    /// Exposes the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for HandlerId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A named, boxed [`HandlerFn`] registered against one `(class, handler)`
/// pair.
#[derive(Clone)]
pub struct Handler {
    id: HandlerId,
    call: Arc<HandlerFn>,
}

impl Handler {
    /// Wraps the given closure as a [`Handler`] under the given identity.
    pub fn new<F, Fut>(id: impl Into<HandlerId>, call: F) -> Self
    where
        F: Fn(Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self {
            id: id.into(),
            call: Arc::new(move |envelope| Box::pin(call(envelope))),
        }
    }

    /// This handler's opaque identity.
    pub fn id(&self) -> &HandlerId {
        &self.id
    }

    /// Invokes this handler on the given envelope.
    pub fn invoke(&self, envelope: Envelope) -> HandlerFuture {
        (self.call)(envelope)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").field("id", &self.id).finish()
    }
}
