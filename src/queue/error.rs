//! Errors produced by the message queue subsystem.

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue has been shut down")]
    Quit,

    #[error("timed out waiting for a message")]
    Timeout,

    #[error("failed to start queue runner: {0}")]
    SpawnFailed(String),
}
