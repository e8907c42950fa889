//! `HubHost`: owns a [`Hub`] on a single dedicated task and serializes all
//! access to it through its envelope queue, the same mechanism used to
//! drive ordinary component traffic.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tokio::sync::oneshot;
use tracing::warn;

// Layer 3: Internal module imports
use crate::config::HubConfig;
use crate::hub::connector::Connector;
use crate::hub::hub::Hub;
use crate::message::Envelope;
use crate::monitoring::{HubEvent, Monitor};
use crate::queue::{MessageQueue, QueueError, SimpleMessageQueue};
use crate::util::ComponentId;

/// A request to attach or detach a connector, submitted out-of-band from
/// ordinary envelope traffic since a [`Connector`] cannot itself travel
/// inside an [`Envelope`].
enum ControlRequest {
    Attach {
        id: ComponentId,
        connector: Arc<dyn Connector>,
        done: oneshot::Sender<()>,
    },
    Detach {
        id: ComponentId,
        done: oneshot::Sender<()>,
    },
}

/// Owns a [`Hub`] on a dedicated current-thread task. Envelope traffic and
/// connector attach/detach requests are both drained from the same queue's
/// owning task, so `Hub` itself never needs synchronization.
pub struct HubHost {
    queue: Arc<SimpleMessageQueue>,
    controls: tokio::sync::mpsc::UnboundedSender<ControlRequest>,
    driver: Option<tokio::task::JoinHandle<()>>,
    config: HubConfig,
}

impl HubHost {
    /// Spawn a `Hub` driven by its own task and return a handle to submit
    /// envelopes and connector attach/detach requests to it. An invalid
    /// `config` is logged and used anyway rather than failing spawn outright,
    /// keeping with "the Hub never panics" — callers that care should check
    /// `config.validate()` themselves beforehand.
    pub fn spawn<M>(config: HubConfig, monitor: M) -> Self
    where
        M: Monitor<HubEvent> + 'static,
    {
        if let Err(err) = config.validate() {
            warn!(error = %err, "HubHost spawned with invalid configuration");
        }
        let queue = Arc::new(SimpleMessageQueue::new());
        let (control_tx, mut control_rx) = tokio::sync::mpsc::unbounded_channel::<ControlRequest>();
        let queue_for_driver = queue.clone();

        let driver = tokio::spawn(async move {
            let mut hub = Hub::new(monitor);
            loop {
                tokio::select! {
                    biased;

                    control = control_rx.recv() => {
                        match control {
                            Some(ControlRequest::Attach { id, connector, done }) => {
                                hub.attach_connector(id, connector);
                                let _ = done.send(());
                            }
                            Some(ControlRequest::Detach { id, done }) => {
                                hub.detach_connector(id);
                                let _ = done.send(());
                            }
                            None => break,
                        }
                    }

                    result = queue_for_driver.do_message(std::time::Duration::from_millis(200)) => {
                        match result {
                            Ok(Some(envelope)) => hub.handle(envelope),
                            Ok(None) => {}
                            Err(QueueError::Timeout) => {}
                            Err(QueueError::Quit) => break,
                        }
                    }
                }
            }
        });

        Self {
            queue,
            controls: control_tx,
            driver: Some(driver),
            config,
        }
    }

    /// The configuration this Hub was spawned with.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Hand an envelope to the Hub's queue; never blocks. Returns `false`
    /// once the queue has quit, in which case the envelope was not enqueued.
    pub fn post(&self, envelope: Envelope) -> bool {
        self.queue.post(envelope)
    }

    /// Attach a connector and wait for the Hub task to acknowledge it,
    /// so the caller knows subsequent `post` calls will be seen by it.
    pub async fn attach_connector(&self, id: ComponentId, connector: Arc<dyn Connector>) {
        let (done, rx) = oneshot::channel();
        let _ = self.controls.send(ControlRequest::Attach { id, connector, done });
        let _ = rx.await;
    }

    /// Detach a connector and wait for acknowledgement.
    pub async fn detach_connector(&self, id: ComponentId) {
        let (done, rx) = oneshot::channel();
        let _ = self.controls.send(ControlRequest::Detach { id, done });
        let _ = rx.await;
    }

    /// Shut the Hub's driver task down and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.queue.quit();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for HubHost {
    fn drop(&mut self) {
        self.queue.quit();
    }
}
