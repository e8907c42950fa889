//! [`ComponentHost`]: owns one [`Component`]'s lifecycle against a
//! [`HubHost`] — the registration handshake, inbound dispatch, pause/resume,
//! and request/reply correlation for synchronous sends.

// Layer 1: Standard library imports
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::warn;

// Layer 3: Internal module imports
use crate::config::HubConfig;
use crate::host::component::Component;
use crate::host::error::HostError;
use crate::hub::{Connector, HubHost};
use crate::message::types::KnownMessageType;
use crate::message::{Envelope, MessageType, Payload, ReplyMode};
use crate::monitoring::{ComponentEvent, ComponentEventKind, Monitor};
use crate::queue::{MessageQueue, SimpleMessageQueue, ThreadMessageQueueRunner};
use crate::util::{ComponentId, InputContextId, Serial, SerialAllocator};

static NEXT_TEMP_ID: AtomicU32 = AtomicU32::new(0xF000_0000);

/// A placeholder id used only for the duration of the registration
/// handshake, drawn from a range Hub's own monotonic allocator (which
/// starts at 1) never reaches.
fn allocate_temp_id() -> ComponentId {
    ComponentId::new(NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed))
}

/// Whether [`ComponentHost`] owns a dedicated OS thread draining its
/// component's queue, or shares a queue some other loop already drains.
pub enum QueueMode {
    /// Spawn a private [`ThreadMessageQueueRunner`]. This mode can be torn
    /// down even with a reply in flight, by quitting the queue out from
    /// under the waiting send.
    Threaded,
    /// Drain `queue` cooperatively on a lightweight task instead of a
    /// dedicated thread. A [`ComponentHost`] in this mode cannot be removed
    /// while a `send_with_reply` is pending on it.
    Borrowed(Arc<dyn MessageQueue>),
}

struct Shared<M: Monitor<ComponentEvent>> {
    component_id: Mutex<ComponentId>,
    string_id: Mutex<String>,
    /// Nesting depth for `pause`/`resume`; dispatch is suspended while this
    /// is nonzero so a caller can nest pause/resume pairs safely.
    pause_depth: AtomicU32,
    /// Envelopes that arrived while paused, replayed in order on the
    /// transition back to zero.
    paused_queue: Mutex<VecDeque<Envelope>>,
    pending: Mutex<HashMap<Serial, oneshot::Sender<Envelope>>>,
    queue: Arc<dyn MessageQueue>,
    monitor: M,
}

impl<M: Monitor<ComponentEvent>> Shared<M> {
    /// Record a monitoring event for this component. Mirrors `Hub::record`:
    /// every `Monitor` implementation in this crate completes
    /// synchronously, and this is called from both async dispatch loops and
    /// plain sync call sites (`pause`/`resume`), so `block_on` is used
    /// instead of spawning a task that would need a runtime.
    fn record(&self, kind: ComponentEventKind) {
        let event = ComponentEvent {
            timestamp: chrono::Utc::now(),
            string_id: self.string_id.lock().clone(),
            event_kind: kind,
            metadata: HashMap::new(),
        };
        let _ = futures::executor::block_on(self.monitor.record(event));
    }
}

struct HostConnector<M: Monitor<ComponentEvent>> {
    shared: Arc<Shared<M>>,
}

impl<M: Monitor<ComponentEvent>> Connector for HostConnector<M> {
    fn component_id(&self) -> ComponentId {
        *self.shared.component_id.lock()
    }

    fn deliver(&self, envelope: Envelope) {
        if !self.shared.queue.post(envelope) {
            warn!("dropping delivered envelope: component queue has already quit");
        }
    }
}

/// Intercept replies matching a pending `send_with_reply` before they ever
/// reach `component`. While paused, everything else is queued instead of
/// dropped; once unpaused, a handled envelope self-posts the next queued one
/// so replay interleaves with ordinary traffic instead of flushing inline.
fn dispatch_envelope<M: Monitor<ComponentEvent>>(
    shared: &Shared<M>,
    component: &mut dyn Component,
    envelope: Envelope,
) {
    if envelope.reply_mode == ReplyMode::IsReply {
        let waiter = shared.pending.lock().remove(&envelope.serial);
        if let Some(tx) = waiter {
            let _ = tx.send(envelope);
            return;
        }
    }
    if shared.pause_depth.load(Ordering::Acquire) > 0 {
        shared.paused_queue.lock().push_back(envelope);
        return;
    }
    let message_type = format!("{:?}", envelope.message_type);
    component.handle(envelope);
    shared.record(ComponentEventKind::MessageHandled { message_type });

    if shared.pause_depth.load(Ordering::Acquire) == 0 {
        if let Some(next) = shared.paused_queue.lock().pop_front() {
            if !shared.queue.post(next) {
                warn!("dropping queued envelope: component queue has already quit");
            }
        }
    }
}

/// Owns one [`Component`], registered against `hub`, driven by either a
/// dedicated thread or a cooperatively-drained shared queue.
pub struct ComponentHost<M: Monitor<ComponentEvent>> {
    hub: Arc<HubHost>,
    shared: Arc<Shared<M>>,
    runner: Option<ThreadMessageQueueRunner>,
    cooperative: Option<tokio::task::JoinHandle<()>>,
    serials: SerialAllocator,
}

impl<M: Monitor<ComponentEvent> + 'static> ComponentHost<M> {
    /// Register `component` against `hub`, then start dispatching inbound
    /// envelopes to it according to `mode`.
    pub async fn add_component(
        hub: Arc<HubHost>,
        component: Box<dyn Component>,
        mode: QueueMode,
        config: &HubConfig,
        monitor: M,
    ) -> Result<Self, HostError> {
        config.validate().map_err(HostError::InvalidConfig)?;
        let mut component = component;
        let info = component.get_info();
        let string_id = info.string_id.clone();
        let temp_id = allocate_temp_id();

        let (shared_queue, concrete): (Arc<dyn MessageQueue>, Option<Arc<SimpleMessageQueue>>) =
            match mode {
                QueueMode::Threaded => {
                    let concrete = Arc::new(SimpleMessageQueue::new());
                    (concrete.clone() as Arc<dyn MessageQueue>, Some(concrete))
                }
                QueueMode::Borrowed(queue) => (queue, None),
            };

        let shared = Arc::new(Shared {
            component_id: Mutex::new(temp_id),
            string_id: Mutex::new(string_id),
            pause_depth: AtomicU32::new(0),
            paused_queue: Mutex::new(VecDeque::new()),
            pending: Mutex::new(HashMap::new()),
            queue: shared_queue.clone(),
            monitor,
        });
        shared.record(ComponentEventKind::Added);

        let connector = Arc::new(HostConnector {
            shared: shared.clone(),
        });
        hub.attach_connector(temp_id, connector.clone()).await;

        let serials = SerialAllocator::new();
        let serial = serials.allocate();
        let register = Envelope::new(
            MessageType::Known(KnownMessageType::RegisterComponent),
            temp_id,
            ComponentId::DEFAULT,
            InputContextId::NONE,
            Payload::ComponentInfo(info),
        )
        .with_reply_mode(ReplyMode::NeedReply)
        .with_serial(serial);

        let (tx, rx) = oneshot::channel();
        shared.pending.lock().insert(serial, tx);
        if !hub.post(register) {
            shared.pending.lock().remove(&serial);
            return Err(HostError::RegistrationTimedOut);
        }

        let reply = tokio::time::timeout(config.registration_timeout, rx)
            .await
            .map_err(|_| HostError::RegistrationTimedOut)?
            .map_err(|_| HostError::RegistrationTimedOut)?;

        let assigned_info = match reply.payload {
            Payload::ComponentInfo(info) => info,
            _ => return Err(HostError::RegistrationTimedOut),
        };
        let assigned = assigned_info.id;

        *shared.component_id.lock() = assigned;
        hub.detach_connector(temp_id).await;
        hub.attach_connector(assigned, connector).await;
        shared.record(ComponentEventKind::RegistrationCompleted {
            component_id: assigned,
        });

        component.registered(assigned);
        component.did_add_to_host();

        let (runner, cooperative) = match concrete {
            Some(queue) => {
                let dispatch_shared = shared.clone();
                let mut component = component;
                let runner = ThreadMessageQueueRunner::spawn(queue, move |envelope| {
                    dispatch_envelope(&dispatch_shared, component.as_mut(), envelope);
                })?;
                (Some(runner), None)
            }
            None => {
                let dispatch_shared = shared.clone();
                let queue = shared_queue.clone();
                let mut component = component;
                let task = tokio::spawn(async move {
                    loop {
                        match queue.do_message(Duration::from_millis(200)).await {
                            Ok(Some(envelope)) => {
                                dispatch_envelope(&dispatch_shared, component.as_mut(), envelope)
                            }
                            Ok(None) => {}
                            Err(crate::queue::QueueError::Timeout) => {}
                            Err(crate::queue::QueueError::Quit) => break,
                        }
                    }
                });
                (None, Some(task))
            }
        };

        Ok(Self {
            hub,
            shared,
            runner,
            cooperative,
            serials,
        })
    }

    pub fn component_id(&self) -> ComponentId {
        *self.shared.component_id.lock()
    }

    /// Send `envelope` without waiting for a reply. `envelope.source` is
    /// overwritten with this host's component id.
    pub fn send(&self, mut envelope: Envelope) {
        envelope.source = self.component_id();
        if !self.hub.post(envelope) {
            warn!("dropping send: hub queue has already quit");
        }
    }

    /// Send `envelope` and wait up to `timeout` for its matching reply.
    /// Safe to call re-entrantly: each call allocates a fresh serial, so a
    /// handler that calls `send_with_reply` again while already inside a
    /// reply wait correlates independently.
    pub async fn send_with_reply(&self, mut envelope: Envelope, timeout: Duration) -> Option<Envelope> {
        let serial = self.serials.allocate();
        envelope.source = self.component_id();
        envelope.serial = serial;
        envelope.reply_mode = ReplyMode::NeedReply;

        let (tx, rx) = oneshot::channel();
        self.shared.pending.lock().insert(serial, tx);
        if !self.hub.post(envelope) {
            self.shared.pending.lock().remove(&serial);
            warn!("send_with_reply failed: hub queue has already quit");
            return None;
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Some(reply),
            _ => {
                self.shared.pending.lock().remove(&serial);
                None
            }
        }
    }

    /// Suspend delivery of inbound envelopes to the component, queueing them
    /// instead. Nesting-safe: each call increments a depth counter, and
    /// dispatch only resumes once every `pause` has a matching `resume`.
    /// Replies matching a pending `send_with_reply` are still delivered.
    pub fn pause(&self) {
        self.shared.pause_depth.fetch_add(1, Ordering::AcqRel);
        self.shared.record(ComponentEventKind::Paused);
    }

    /// Decrement the pause depth; on the transition to zero, replay starts
    /// by self-posting the oldest queued envelope. Each subsequent handled
    /// envelope posts the next one, so replay interleaves with whatever
    /// else arrives rather than flushing the backlog in one go.
    pub fn resume(&self) {
        let previous =
            self.shared
                .pause_depth
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |depth| {
                    Some(depth.saturating_sub(1))
                });
        if previous == Ok(1) {
            if let Some(next) = self.shared.paused_queue.lock().pop_front() {
                if !self.shared.queue.post(next) {
                    warn!("dropping queued envelope: component queue has already quit");
                }
            }
        }
        self.shared.record(ComponentEventKind::Resumed);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.pause_depth.load(Ordering::Acquire) > 0
    }

    /// Tear the component down: detach it from its Hub and stop its
    /// dispatch loop. A `Threaded` host can do this even with a reply
    /// in flight (the runner's `Drop` quits its queue); a `Borrowed` host
    /// refuses while a reply is pending, since nothing else would notice
    /// the queue going away.
    pub async fn remove_component(mut self) -> Result<(), HostError> {
        if self.runner.is_none() && !self.shared.pending.lock().is_empty() {
            return Err(HostError::BusyWithPendingReply);
        }
        let id = self.component_id();
        self.hub.detach_connector(id).await;
        if let Some(runner) = self.runner.take() {
            runner.join();
        }
        if let Some(task) = self.cooperative.take() {
            task.abort();
        }
        self.shared.record(ComponentEventKind::Removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ErrorCode;
    use crate::monitoring::{ComponentEvent, HubEvent, NoopMonitor};
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn registration_assigns_real_component_id() {
        let hub = Arc::new(HubHost::spawn(HubConfig::default(), NoopMonitor::<HubEvent>::new()));
        let received = Arc::new(StdMutex::new(Vec::new()));
        let component = Box::new(EchoComponentImpl {
            string_id: "ime.echo".to_string(),
            received: received.clone(),
        });

        let host = ComponentHost::add_component(
            hub.clone(),
            component,
            QueueMode::Threaded,
            &HubConfig::default(),
            NoopMonitor::<ComponentEvent>::new(),
        )
        .await
        .expect("registration should succeed");

        assert_ne!(host.component_id(), ComponentId::DEFAULT);
        host.remove_component().await.unwrap();
        hub_shutdown(hub).await;
    }

    struct EchoComponentImpl {
        string_id: String,
        received: Arc<StdMutex<Vec<Envelope>>>,
    }

    impl Component for EchoComponentImpl {
        fn get_info(&self) -> crate::message::ComponentInfo {
            crate::message::ComponentInfo {
                id: ComponentId::DEFAULT,
                string_id: self.string_id.clone(),
                name: self.string_id.clone(),
                produce_message: HashSet::new(),
                consume_message: HashSet::new(),
            }
        }

        fn handle(&mut self, envelope: Envelope) {
            self.received.lock().unwrap().push(envelope);
        }
    }

    async fn hub_shutdown(hub: Arc<HubHost>) {
        if let Ok(hub) = Arc::try_unwrap(hub) {
            hub.shutdown().await;
        }
    }

    #[tokio::test]
    async fn paused_envelopes_are_queued_and_delivered_on_resume() {
        let hub = Arc::new(HubHost::spawn(HubConfig::default(), NoopMonitor::<HubEvent>::new()));
        let received = Arc::new(StdMutex::new(Vec::new()));
        let component = Box::new(EchoComponentImpl {
            string_id: "ime.pauseable".to_string(),
            received: received.clone(),
        });
        let host = ComponentHost::add_component(
            hub.clone(),
            component,
            QueueMode::Threaded,
            &HubConfig::default(),
            NoopMonitor::<ComponentEvent>::new(),
        )
        .await
        .unwrap();

        host.pause();
        let probe = Envelope::new(
            MessageType::UserDefined(crate::message::types::USER_DEFINED_START),
            host.component_id(),
            host.component_id(),
            InputContextId::NONE,
            Payload::Empty,
        );
        host.hub.post(probe);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(
            received.lock().unwrap().is_empty(),
            "envelope must stay queued while paused, not reach the component"
        );

        host.resume();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            received.lock().unwrap().len(),
            1,
            "resume must replay the envelope that arrived while paused"
        );

        host.remove_component().await.unwrap();
        hub_shutdown(hub).await;
    }

    #[tokio::test]
    async fn nested_pause_requires_matching_resume_count() {
        let hub = Arc::new(HubHost::spawn(HubConfig::default(), NoopMonitor::<HubEvent>::new()));
        let received = Arc::new(StdMutex::new(Vec::new()));
        let component = Box::new(EchoComponentImpl {
            string_id: "ime.nested-pause".to_string(),
            received: received.clone(),
        });
        let host = ComponentHost::add_component(
            hub.clone(),
            component,
            QueueMode::Threaded,
            &HubConfig::default(),
            NoopMonitor::<ComponentEvent>::new(),
        )
        .await
        .unwrap();

        host.pause();
        host.pause();
        assert!(host.is_paused());

        host.resume();
        assert!(host.is_paused(), "one matching resume must not lift a double pause");

        let probe = Envelope::new(
            MessageType::UserDefined(crate::message::types::USER_DEFINED_START),
            host.component_id(),
            host.component_id(),
            InputContextId::NONE,
            Payload::Empty,
        );
        host.hub.post(probe);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(received.lock().unwrap().is_empty());

        host.resume();
        assert!(!host.is_paused());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(received.lock().unwrap().len(), 1);

        host.remove_component().await.unwrap();
        hub_shutdown(hub).await;
    }

    #[tokio::test]
    async fn send_with_reply_times_out_with_no_responder() {
        let hub = Arc::new(HubHost::spawn(HubConfig::default(), NoopMonitor::<HubEvent>::new()));
        let received = Arc::new(StdMutex::new(Vec::new()));
        let component = Box::new(EchoComponentImpl {
            string_id: "ime.sender".to_string(),
            received,
        });
        let host = ComponentHost::add_component(
            hub.clone(),
            component,
            QueueMode::Threaded,
            &HubConfig::default(),
            NoopMonitor::<ComponentEvent>::new(),
        )
        .await
        .unwrap();

        let envelope = Envelope::new(
            MessageType::UserDefined(crate::message::types::USER_DEFINED_START + 1),
            host.component_id(),
            ComponentId::new(999_999),
            InputContextId::NONE,
            Payload::Empty,
        );
        let reply = host
            .send_with_reply(envelope, Duration::from_millis(100))
            .await;
        assert!(reply.is_some());
        match reply.unwrap().payload {
            Payload::Error { code, .. } => assert_eq!(code, ErrorCode::ComponentNotFound),
            other => panic!("unexpected payload: {other:?}"),
        }

        host.remove_component().await.unwrap();
        hub_shutdown(hub).await;
    }
}
