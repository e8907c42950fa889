//! [`ThreadMessageQueueRunner`]: a dedicated OS thread plus a
//! single-threaded Tokio runtime draining one queue until `quit`.

// Layer 1: Standard library imports
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tracing::{error, warn};

// Layer 3: Internal module imports
use crate::message::Envelope;
use crate::queue::error::QueueError;
use crate::queue::simple::SimpleMessageQueue;
use crate::queue::traits::MessageQueue;

/// How long a single `do_message` wait blocks before re-checking for quit.
/// Keeping this short bounds shutdown latency without busy-polling.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runs a [`SimpleMessageQueue`] to completion on a dedicated OS thread,
/// inside its own single-threaded Tokio runtime.
///
/// A panic while handling one envelope is caught and logged; the runner
/// keeps draining subsequent envelopes rather than taking the whole thread
/// down, matching the "Hub never panics" failure model for components that
/// misbehave inside `handle`.
pub struct ThreadMessageQueueRunner {
    queue: Arc<SimpleMessageQueue>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadMessageQueueRunner {
    /// Spawn the runner thread. `on_envelope` is invoked for every popped
    /// envelope, on the runner's own thread.
    pub fn spawn<F>(queue: Arc<SimpleMessageQueue>, mut on_envelope: F) -> Result<Self, QueueError>
    where
        F: FnMut(Envelope) + Send + 'static,
    {
        // Build the runtime on the caller's thread, before spawning the
        // runner thread, so a build failure surfaces as a `Result` instead
        // of needing an `.expect()` on the runner thread itself.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| QueueError::SpawnFailed(err.to_string()))?;

        let thread_queue = queue.clone();
        let handle = std::thread::Builder::new()
            .name("ime-queue-runner".into())
            .spawn(move || {
                runtime.block_on(async move {
                    thread_queue.bind_owner();
                    loop {
                        match thread_queue.do_message(POLL_INTERVAL).await {
                            Ok(Some(envelope)) => {
                                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                                    on_envelope(envelope);
                                }));
                                if let Err(payload) = result {
                                    let message = panic_message(&payload);
                                    error!(panic = %message, "component handler panicked, continuing");
                                }
                            }
                            Ok(None) => continue,
                            Err(QueueError::Quit) => break,
                            Err(QueueError::Timeout) => continue,
                        }
                    }
                });
            })
            .map_err(|err| QueueError::SpawnFailed(err.to_string()))?;

        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    /// Enqueue an envelope for the runner's queue.
    pub fn post(&self, envelope: Envelope) -> bool {
        self.queue.post(envelope)
    }

    /// Signal shutdown and block until the runner thread exits.
    pub fn join(mut self) {
        self.queue.quit();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("queue runner thread panicked during shutdown");
            }
        }
    }
}

impl Drop for ThreadMessageQueueRunner {
    fn drop(&mut self) {
        self.queue.quit();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
