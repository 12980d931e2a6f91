use crate::{Broker, Gateway};
use relay_core::AppContext;
use relay_dispatch::Dispatcher;
use relay_message::Serializer;
use relay_util::Backoff;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tracing::{info, warn};

/// Spawns the cooperative blocking-pop loop for one `(consumer, queue)`
/// binding (§4.7).
///
/// Each worker blocks on `brpop`, decodes whatever it receives, and routes
/// it to the dispatcher; decode and broker errors are counted, logged, and
/// retried with backoff, but never stop the loop. Handler failure is
/// entirely the dispatcher's (and the wrapped handler's) concern — this loop
/// does not wait for a handler to complete before polling again, per the
/// concurrency model's "receive loops are the only writers into the
/// dispatcher" rule.
#[allow(clippy::too_many_arguments)]
pub fn spawn<B: Broker>(
    name: Arc<str>,
    queue_name: Arc<str>,
    gateway: Gateway<B>,
    dispatcher: Arc<Dispatcher>,
    serializer: Arc<dyn Serializer>,
    block_time: Duration,
    backoff: Arc<Backoff>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let connection = gateway.connection().await;
            let queues = [queue_name.to_string()];

            let popped = select! {
                biased;
                _ = AppContext::terminated() => break,
                popped = connection.brpop(&queues, block_time) => popped,
            };

            match popped {
                Ok(Some((_queue, bytes))) => {
                    backoff.reset();

                    match serializer.decode(&bytes) {
                        Ok(envelope) => {
                            let class = envelope.header().message_class().to_string();
                            dispatcher.route(&class, envelope).await;
                        }
                        Err(error) => {
                            warn!(
                                alert = true,
                                name = name.as_ref(),
                                queue = queue_name.as_ref(),
                                %error,
                                "failed to decode queue message",
                            );
                        }
                    }
                }
                Ok(None) => {
                    // Timed out with no entry; re-poll immediately.
                }
                Err(error) => {
                    warn!(
                        alert = true,
                        name = name.as_ref(),
                        queue = queue_name.as_ref(),
                        %error,
                        "queue broker operation failed, backing off",
                    );
                    backoff.sleep_next().await;
                }
            }
        }

        info!(name = name.as_ref(), queue = queue_name.as_ref(), "queue worker stopped");
    })
}
