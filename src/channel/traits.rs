//! The `MessageChannel` / `ChannelListener` contract shared by
//! `DirectChannel` and `PipeChannel`.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::channel::error::ChannelError;
use crate::message::Envelope;

/// A transport capable of carrying envelopes to one peer.
///
/// Both the in-process [`crate::channel::DirectChannel`] and the
/// cross-process [`crate::channel::PipeChannel`] implement this; callers
/// above (Hub, ComponentHost) never need to know which.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// True if the underlying transport is currently usable.
    fn is_connected(&self) -> bool;

    /// Send one envelope. Fails if the channel is not connected.
    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError>;

    /// Install the listener notified of inbound envelopes and lifecycle
    /// transitions. Replaces any previously-set listener.
    fn set_listener(&self, listener: Arc<dyn ChannelListener>);
}

/// Callbacks a channel owner implements to receive inbound traffic and
/// lifecycle notifications.
pub trait ChannelListener: Send + Sync {
    /// An envelope arrived from the peer.
    fn on_message_received(&self, envelope: Envelope);

    /// The transport became connected (including reconnects).
    fn on_channel_connected(&self) {}

    /// The transport closed; `reason` is a short diagnostic string.
    fn on_channel_closed(&self, reason: &str) {
        let _ = reason;
    }

    /// The channel was attached to its owning Hub/ComponentHost.
    fn on_attached(&self) {}

    /// The channel was detached from its owning Hub/ComponentHost.
    fn on_detached(&self) {}
}
