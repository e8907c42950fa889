//! Errors surfaced by [`crate::host::ComponentHost`] operations.

use crate::util::ComponentId;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("component {0} is not attached to this host")]
    UnknownComponent(ComponentId),

    #[error("registration handshake timed out")]
    RegistrationTimedOut,

    #[error("a borrowed host cannot remove a component while a reply is pending")]
    BusyWithPendingReply,

    #[error("channel error: {0}")]
    Channel(#[from] crate::channel::ChannelError),

    #[error("queue runner failed to start: {0}")]
    Runner(#[from] crate::queue::QueueError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
