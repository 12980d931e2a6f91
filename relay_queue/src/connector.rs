use crate::Broker;
use relay_core::{AppContext, AppSpindown, AppSpindownToken};
use relay_sync::{Conduit, Retriever};
use relay_util::Backoff;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tracing::{info, warn};

/// Runs in the background, maintains no more than one live connection of
/// broker type `B`, and serves it on request to any number of [`Gateway`]
/// clones.
///
/// Identical in shape to `relay_pubsub::Connector`; the two are not shared
/// because they are generic over distinct `Broker` traits (one publishes and
/// subscribes on channels, the other pushes/pops on lists), but both provide
/// the same connection-management behavior.
pub struct Connector<B: Broker> {
    name: Arc<str>,
    config: B::Config,
    connection: AsyncMutex<Option<B>>,
    backoff: Backoff,
    conduit: Conduit<B>,
    _spindown_token: AppSpindownToken,
}

/// An asynchronous gateway to retrieving a live connection of broker type
/// `B`, handed out by a [`Connector`].
#[derive(Clone)]
pub struct Gateway<B: Broker> {
    retriever: Retriever<B>,
}

impl<B: Broker> Connector<B> {
    /// Creates a new [`Connector`] for the given config and sends it into the
    /// background to lazily serve connections via the returned [`Gateway`].
    pub fn start(name: impl Into<Arc<str>>, config: B::Config, backoff: Backoff) -> Gateway<B> {
        let name = Self::compose_name(name);
        let conduit = Conduit::new();
        let retriever = conduit.retriever();
        let _spindown_token = AppSpindown::register(&name);

        let connector = Self {
            name,
            config,
            connection: AsyncMutex::new(None),
            backoff,
            conduit,
            _spindown_token,
        };

        tokio::spawn(connector.serve());

        Gateway { retriever }
    }

    fn compose_name(name: impl Into<Arc<str>>) -> Arc<str> {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        Arc::from(format!(
            "queue:connector:{}:{}",
            name.into(),
            COUNTER.fetch_add(1, Ordering::Relaxed),
        ))
    }

    async fn serve(self) {
        loop {
            let interrupted = select! {
                biased;
                _ = AppContext::terminated() => true,
                request = self.conduit.requested() => {
                    select! {
                        biased;
                        _ = AppContext::terminated() => true,
                        () = self.receive_request(request) => false,
                    }
                }
            };

            if interrupted {
                break;
            }
        }

        info!(name = self.name.as_ref(), "closing queue broker connection");

        if let Some(connection) = self.connection.lock().await.take() {
            connection.close().await;
        }
    }

    async fn receive_request(&self, request: oneshot::Sender<B>) {
        let connection = self.anticipate_connection().await;

        if request.send(connection).is_err() {
            warn!(
                name = self.name.as_ref(),
                "too late to send the requested broker connection",
            );
        }
    }

    async fn anticipate_connection(&self) -> B {
        let mut guard = self.connection.lock().await;

        if let Some(connection) = guard.as_ref() {
            return connection.clone();
        }

        loop {
            match B::connect(&self.config).await {
                Ok(connection) => {
                    info!(name = self.name.as_ref(), "queue broker connected");
                    self.backoff.reset();
                    *guard = Some(connection.clone());
                    return connection;
                }
                Err(error) => {
                    warn!(
                        alert = true,
                        name = self.name.as_ref(),
                        %error,
                        "failed to connect to queue broker, backing off",
                    );
                    self.backoff.sleep_next().await;
                }
            }
        }
    }
}

impl<B: Broker> Gateway<B> {
    /// Asynchronously retrieves a live connection, waiting indefinitely if
    /// necessary.
    pub async fn connection(&self) -> B {
        self.retriever.anticipate().await
    }

    /// Same as [`connection`](Gateway::connection), but gives up after
    /// `timeout`.
    pub async fn connection_with_timeout(&self, timeout: Duration) -> Option<B> {
        self.retriever.request_with_timeout(timeout).await
    }
}
