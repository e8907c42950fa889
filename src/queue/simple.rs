//! [`SimpleMessageQueue`]: a `Mutex<VecDeque>` plus `Notify`, owned by a
//! single consumer task.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, ThreadId};
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::warn;

// Layer 3: Internal module imports
use crate::message::Envelope;
use crate::queue::error::QueueError;
use crate::queue::traits::{ForeignEventSource, MessageQueue};

/// FIFO envelope queue for a single owning task.
///
/// `post` is safe from any task and never blocks on an await point (the
/// internal lock is a [`parking_lot::Mutex`], held only long enough to
/// push/pop). `do_message`/`do_message_nonexclusive` must only be called
/// from the task that owns the queue; `in_current_thread` is a debug aid,
/// not an enforced invariant.
pub struct SimpleMessageQueue {
    inner: Mutex<VecDeque<Envelope>>,
    notify: Notify,
    quit: AtomicBool,
    owner: AtomicU64,
}

impl SimpleMessageQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            quit: AtomicBool::new(false),
            owner: AtomicU64::new(0),
        }
    }

    /// Record the calling thread as the queue's owner, for `in_current_thread`.
    pub fn bind_owner(&self) {
        self.owner
            .store(thread_id_as_u64(thread::current().id()), Ordering::Relaxed);
    }

    /// True if called from the thread that last called `bind_owner`.
    pub fn in_current_thread(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == thread_id_as_u64(thread::current().id())
    }

    fn pop_one(&self) -> Option<Envelope> {
        self.inner.lock().pop_front()
    }
}

impl Default for SimpleMessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageQueue for SimpleMessageQueue {
    fn post(&self, envelope: Envelope) -> bool {
        if self.quit.load(Ordering::Acquire) {
            warn!(
                message_type = envelope.message_type.id(),
                "rejecting post onto a queue that has already quit"
            );
            return false;
        }
        self.inner.lock().push_back(envelope);
        self.notify.notify_one();
        true
    }

    async fn do_message(&self, timeout: Duration) -> Result<Option<Envelope>, QueueError> {
        if let Some(envelope) = self.pop_one() {
            return Ok(Some(envelope));
        }
        if self.quit.load(Ordering::Acquire) {
            return Err(QueueError::Quit);
        }
        tokio::select! {
            _ = self.notify.notified() => {
                if let Some(envelope) = self.pop_one() {
                    Ok(Some(envelope))
                } else if self.quit.load(Ordering::Acquire) {
                    Err(QueueError::Quit)
                } else {
                    Ok(None)
                }
            }
            _ = tokio::time::sleep(timeout) => Ok(None),
        }
    }

    async fn do_message_nonexclusive(
        &self,
        timeout: Duration,
        source: &dyn ForeignEventSource,
    ) -> Result<Option<Envelope>, QueueError> {
        if let Some(envelope) = self.pop_one() {
            return Ok(Some(envelope));
        }
        if self.quit.load(Ordering::Acquire) {
            return Err(QueueError::Quit);
        }
        tokio::select! {
            _ = self.notify.notified() => {
                if let Some(envelope) = self.pop_one() {
                    Ok(Some(envelope))
                } else if self.quit.load(Ordering::Acquire) {
                    Err(QueueError::Quit)
                } else {
                    Ok(None)
                }
            }
            _ = source.poll_one() => Ok(None),
            _ = tokio::time::sleep(timeout) => Ok(None),
        }
    }

    fn quit(&self) {
        self.quit.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    fn is_quit(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    fn pending_count(&self) -> usize {
        self.inner.lock().len()
    }
}

fn thread_id_as_u64(id: ThreadId) -> u64 {
    // `ThreadId` exposes no stable numeric accessor; hash it instead. Good
    // enough for the debug-only `in_current_thread` check.
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}
