//! [`CooperativeMessageQueue`]: a [`SimpleMessageQueue`] that always races
//! its pop against a [`ForeignEventSource`], for threads that must also
//! service non-envelope work (e.g. a channel's socket readiness).

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::message::Envelope;
use crate::queue::error::QueueError;
use crate::queue::simple::SimpleMessageQueue;
use crate::queue::traits::{ForeignEventSource, MessageQueue};

/// Wraps a [`SimpleMessageQueue`] with a fixed [`ForeignEventSource`] so
/// every `do_message` call is implicitly non-exclusive.
pub struct CooperativeMessageQueue {
    inner: SimpleMessageQueue,
    source: Arc<dyn ForeignEventSource>,
}

impl CooperativeMessageQueue {
    pub fn new(source: Arc<dyn ForeignEventSource>) -> Self {
        Self {
            inner: SimpleMessageQueue::new(),
            source,
        }
    }

    pub fn bind_owner(&self) {
        self.inner.bind_owner();
    }

    pub fn in_current_thread(&self) -> bool {
        self.inner.in_current_thread()
    }
}

#[async_trait]
impl MessageQueue for CooperativeMessageQueue {
    fn post(&self, envelope: Envelope) -> bool {
        self.inner.post(envelope)
    }

    async fn do_message(&self, timeout: Duration) -> Result<Option<Envelope>, QueueError> {
        self.inner
            .do_message_nonexclusive(timeout, self.source.as_ref())
            .await
    }

    async fn do_message_nonexclusive(
        &self,
        timeout: Duration,
        source: &dyn ForeignEventSource,
    ) -> Result<Option<Envelope>, QueueError> {
        self.inner.do_message_nonexclusive(timeout, source).await
    }

    fn quit(&self) {
        self.inner.quit();
    }

    fn is_quit(&self) -> bool {
        self.inner.is_quit()
    }

    fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::payload::Payload;
    use crate::message::types::{KnownMessageType, MessageType};
    use crate::util::{ComponentId, InputContextId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        polls: AtomicUsize,
    }

    #[async_trait]
    impl ForeignEventSource for CountingSource {
        async fn poll_one(&self) {
            self.polls.fetch_add(1, Ordering::SeqCst);
            // never resolves on its own in these tests; timeout or queue wins
            std::future::pending::<()>().await;
        }
    }

    fn sample() -> Envelope {
        Envelope::new(
            MessageType::Known(KnownMessageType::QueryComponent),
            ComponentId::new(1),
            ComponentId::new(2),
            InputContextId::NONE,
            Payload::Empty,
        )
    }

    #[tokio::test]
    async fn do_message_returns_posted_envelope() {
        let source = Arc::new(CountingSource {
            polls: AtomicUsize::new(0),
        });
        let queue = CooperativeMessageQueue::new(source);
        queue.post(sample());
        let popped = queue.do_message(Duration::from_millis(50)).await.unwrap();
        assert!(popped.is_some());
    }

    #[tokio::test]
    async fn do_message_times_out_with_no_envelope_or_event() {
        let source = Arc::new(CountingSource {
            polls: AtomicUsize::new(0),
        });
        let queue = CooperativeMessageQueue::new(source);
        let popped = queue.do_message(Duration::from_millis(10)).await.unwrap();
        assert!(popped.is_none());
    }
}
