use crate::{Counters, Handler, HandlerError};
use futures::FutureExt;
use relay_message::Envelope;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify};
use tracing::warn;

/// One unit of work submitted to the pool: a handler, the envelope it is
/// about to receive, and the counters it should report to.
struct Job {
    class: Arc<str>,
    handler: Handler,
    envelope: Envelope,
}

/// A bounded pool of persistent worker tasks that invoke handlers on
/// submitted envelopes (§4.4).
///
/// Workers share a single [`mpsc::Receiver`] behind a [`tokio::sync::Mutex`]:
/// whichever idle worker acquires the lock next pulls the next job, giving
/// the simplest possible work-stealing queue without a dedicated scheduler.
/// Handler invocation is wrapped in [`futures::FutureExt::catch_unwind`] so a
/// panicking handler degrades to a counted [`HandlerError`] instead of taking
/// down a worker task.
pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    overflow_timeout: Duration,
    counters: Arc<Counters>,
    in_flight: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl WorkerPool {
    /// Spawns `worker_count` persistent tasks drawing from a queue of depth
    /// `queue_depth`. Submissions that cannot be enqueued within
    /// `overflow_timeout` are rejected and counted as dispatcher overflow.
    pub fn spawn(
        worker_count: usize,
        queue_depth: usize,
        overflow_timeout: Duration,
        counters: Arc<Counters>,
    ) -> Self {
        let worker_count = worker_count.max(1);
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(Notify::new());

        for worker_id in 0..worker_count {
            let receiver = Arc::clone(&receiver);
            let counters = Arc::clone(&counters);
            let in_flight = Arc::clone(&in_flight);
            let idle = Arc::clone(&idle);

            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut receiver = receiver.lock().await;
                        receiver.recv().await
                    };

                    let Some(job) = job else {
                        break;
                    };

                    Self::run_job(worker_id, job, &counters).await;

                    if in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
                        idle.notify_waiters();
                    }
                }
            });
        }

        Self {
            sender,
            overflow_timeout,
            counters,
            in_flight,
            idle,
        }
    }

    async fn run_job(worker_id: usize, job: Job, counters: &Counters) {
        let handler_id = job.handler.id().as_str().to_string();

        let outcome = AssertUnwindSafe(job.handler.invoke(job.envelope))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {
                counters.record_handler_ok(&job.class, &handler_id);
            }
            Ok(Err(error)) => {
                warn!(
                    alert = true,
                    worker_id,
                    class = %job.class,
                    handler = %handler_id,
                    %error,
                    "handler returned an error",
                );
                counters.record_handler_error(&job.class, &handler_id);
            }
            Err(payload) => {
                let error = HandlerError::from_panic(payload.as_ref());
                warn!(
                    alert = true,
                    worker_id,
                    class = %job.class,
                    handler = %handler_id,
                    %error,
                    "handler panicked",
                );
                counters.record_handler_error(&job.class, &handler_id);
            }
        }
    }

    /// Attempts to submit `envelope` to `handler` for `class`, falling back
    /// to a bounded wait if the queue is momentarily full.
    ///
    /// Returns `true` if the job was accepted, `false` if it was rejected due
    /// to sustained backpressure (and counted as dispatcher overflow).
    pub async fn submit(&self, class: Arc<str>, handler: Handler, envelope: Envelope) -> bool {
        let handler_id = handler.id().as_str().to_string();
        let job = Job {
            class: Arc::clone(&class),
            handler,
            envelope,
        };

        self.in_flight.fetch_add(1, Ordering::AcqRel);

        let accepted = match self.sender.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                match tokio::time::timeout(self.overflow_timeout, self.sender.send(job)).await {
                    Ok(Ok(())) => true,
                    _ => false,
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        };

        if accepted {
            self.counters.record_routed(&class, &handler_id);
        } else {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            self.counters.record_overflow(&class, &handler_id);
        }

        accepted
    }

    /// Waits for all currently in-flight jobs to complete, or until `timeout`
    /// elapses, whichever comes first. Returns `true` if the pool drained
    /// fully.
    pub async fn drain(&self, timeout: Duration) -> bool {
        if self.in_flight.load(Ordering::Acquire) == 0 {
            return true;
        }

        let wait = async {
            while self.in_flight.load(Ordering::Acquire) != 0 {
                self.idle.notified().await;
            }
        };

        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}
