//! [`DirectChannel`]: an in-process [`MessageChannel`] pairing two
//! endpoints with `tokio::sync::mpsc`, for components hosted in the same
//! process as their Hub.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use crate::channel::error::ChannelError;
use crate::channel::traits::{ChannelListener, MessageChannel};
use crate::message::Envelope;

/// One half of an in-process channel pair. Dropping both halves' senders
/// closes the channel; the receive loop is spawned the moment a listener
/// is installed.
pub struct DirectChannel {
    outbound: mpsc::UnboundedSender<Envelope>,
    inbound: Mutex<Option<mpsc::UnboundedReceiver<Envelope>>>,
    listener: Mutex<Option<Arc<dyn ChannelListener>>>,
}

impl DirectChannel {
    /// Build a connected pair: messages sent on one side arrive as
    /// `on_message_received` calls on the other's listener.
    pub fn pair() -> (Arc<DirectChannel>, Arc<DirectChannel>) {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();

        let a = Arc::new(DirectChannel {
            outbound: tx_b,
            inbound: Mutex::new(Some(rx_a)),
            listener: Mutex::new(None),
        });
        let b = Arc::new(DirectChannel {
            outbound: tx_a,
            inbound: Mutex::new(Some(rx_b)),
            listener: Mutex::new(None),
        });

        (a, b)
    }

    fn spawn_pump(self: &Arc<Self>) {
        let mut receiver = match self.inbound.lock().take() {
            Some(r) => r,
            None => return,
        };
        let this = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                if let Some(listener) = this.listener.lock().clone() {
                    listener.on_message_received(envelope);
                }
            }
            if let Some(listener) = this.listener.lock().clone() {
                listener.on_channel_closed("peer dropped");
            }
        });
    }
}

#[async_trait]
impl MessageChannel for DirectChannel {
    fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }

    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError> {
        self.outbound
            .send(envelope)
            .map_err(|_| ChannelError::Closed)
    }

    fn set_listener(&self, listener: Arc<dyn ChannelListener>) {
        *self.listener.lock() = Some(listener);
    }
}

/// Start the pump explicitly, once both ends have listeners installed.
/// Separate from `pair` so callers can set listeners before traffic flows.
pub fn start(channel: &Arc<DirectChannel>) {
    channel.spawn_pump();
    if let Some(listener) = channel.listener.lock().clone() {
        listener.on_channel_connected();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::payload::Payload;
    use crate::message::types::{KnownMessageType, MessageType};
    use crate::util::{ComponentId, InputContextId};
    use std::sync::Mutex as StdMutex;

    struct Capture {
        received: StdMutex<Vec<Envelope>>,
    }

    impl ChannelListener for Capture {
        fn on_message_received(&self, envelope: Envelope) {
            self.received.lock().unwrap().push(envelope);
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
    async fn message_sent_on_a_arrives_on_b() {
        let (a, b) = DirectChannel::pair();
        let capture = Arc::new(Capture {
            received: StdMutex::new(Vec::new()),
        });
        b.set_listener(capture.clone());
        start(&a);
        start(&b);

        a.send(sample()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(capture.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropping_peer_closes_channel() {
        let (a, b) = DirectChannel::pair();
        start(&a);
        drop(b);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!a.is_connected());
    }
}
