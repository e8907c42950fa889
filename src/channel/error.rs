//! Errors produced by the channel transport subsystem.

// Layer 3: Internal module imports
use crate::message::CodecError;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel is not connected")]
    NotConnected,

    #[error("channel framing error: {0}")]
    Codec(#[from] CodecError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session discovery failed: {0}")]
    SessionDiscovery(String),

    #[error("channel closed by peer")]
    Closed,
}
