//! The `MessageQueue` and `ForeignEventSource` contracts.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::message::Envelope;
use crate::queue::error::QueueError;

/// A task-affine FIFO of envelopes, drained by exactly one owning task.
///
/// `post` may be called from any task; `do_message`/`do_message_nonexclusive`
/// must only ever be called from the queue's owning task (enforced by
/// `in_current_thread` at debug time, not by the type system).
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Enqueue an envelope for later processing. Never blocks.
    ///
    /// Returns `true` once accepted, `false` if `quit` has already been
    /// observed — the envelope is never silently dropped, so the caller can
    /// log or retry.
    fn post(&self, envelope: Envelope) -> bool;

    /// Pop the next envelope, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `Ok(Some(envelope))` when one was popped, `Ok(None)` on
    /// timeout with the queue still open, or `Err(QueueError::Quit)` once
    /// `quit` has been called and the queue has drained. The caller is
    /// responsible for dispatching the envelope; the queue only stores it.
    async fn do_message(&self, timeout: Duration) -> Result<Option<Envelope>, QueueError>;

    /// Like `do_message`, but also polls `source` for foreign events.
    ///
    /// Returns `Ok(None)` both on timeout and when a foreign event was
    /// consumed instead of an envelope; callers that need to distinguish
    /// the two should inspect `source` themselves.
    async fn do_message_nonexclusive(
        &self,
        timeout: Duration,
        source: &dyn ForeignEventSource,
    ) -> Result<Option<Envelope>, QueueError>;

    /// Signal that no more envelopes will be processed; any task parked in
    /// `do_message`/`do_message_nonexclusive` wakes with `QueueError::Quit`.
    fn quit(&self);

    /// True once `quit` has been called.
    fn is_quit(&self) -> bool;

    /// Approximate number of envelopes currently queued.
    fn pending_count(&self) -> usize;
}

/// A source of events external to the envelope queue (timers, socket
/// readiness, plug-in callbacks) that a `CooperativeMessageQueue` polls
/// alongside its own queue so a single thread can service both.
#[async_trait]
pub trait ForeignEventSource: Send + Sync {
    /// Wait for and consume one foreign event. Returns once an event has
    /// been handled, or the future is dropped (cancel-safe).
    async fn poll_one(&self);
}
