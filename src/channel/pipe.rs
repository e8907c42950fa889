//! [`PipeChannel`]: a cross-process [`MessageChannel`] over a Unix domain
//! socket (or, on Windows, a named pipe), framed with [`EnvelopeCodec`].

// Layer 1: Standard library imports
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{info, warn};

// Layer 3: Internal module imports
use crate::channel::config::ChannelConfig;
use crate::channel::error::ChannelError;
use crate::channel::traits::{ChannelListener, MessageChannel};
use crate::message::{Envelope, EnvelopeCodec};
use crate::monitoring::{ChannelEvent, ChannelEventKind, Monitor, NoopMonitor};

/// Unifies the platform transport behind one type so `PipeChannel`'s I/O
/// loop doesn't need to know whether it is driving a Unix domain socket or
/// a Windows named pipe.
pub trait DuplexTransport: AsyncRead + AsyncWrite + Unpin + Send + 'static {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> DuplexTransport for T {}

/// A cross-process envelope transport, client or server side.
///
/// Outbound envelopes are queued on an internal unbounded channel and
/// drained by a writer task; inbound frames are decoded by a reader task
/// that calls the installed [`ChannelListener`]. Client-side instances
/// reconnect automatically per [`crate::channel::config::ReconnectPolicy`].
///
/// Generic over its monitor for the same reason `Hub`/`ComponentHost` are:
/// `Monitor: Clone` rules out storing one behind `dyn Monitor<ChannelEvent>`.
/// [`PipeChannel::from_transport`]/[`PipeChannel::connect_client`] default to
/// a [`NoopMonitor`] when the caller doesn't need one wired up.
pub struct PipeChannel<M: Monitor<ChannelEvent> = NoopMonitor<ChannelEvent>> {
    outbound: mpsc::UnboundedSender<Envelope>,
    connected: AtomicBool,
    listener: Mutex<Option<Arc<dyn ChannelListener>>>,
    monitor: M,
}

impl<M: Monitor<ChannelEvent>> PipeChannel<M> {
    fn record(&self, kind: ChannelEventKind) {
        let event = ChannelEvent {
            timestamp: chrono::Utc::now(),
            event_kind: kind,
            metadata: std::collections::HashMap::new(),
        };
        let _ = futures::executor::block_on(self.monitor.record(event));
    }

    /// Wrap an already-accepted/-connected transport; drives read/write
    /// loops until the peer closes. Used directly by `PipeServer` for each
    /// accepted connection, and by a client after a successful connect.
    pub fn from_transport_monitored<T: DuplexTransport>(
        transport: T,
        config: ChannelConfig,
        monitor: M,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = Arc::new(Self {
            outbound: tx,
            connected: AtomicBool::new(true),
            listener: Mutex::new(None),
            monitor,
        });
        channel.clone().spawn_io(transport, rx, config);
        channel
    }

    /// Connect as a client to `path`, retrying per `config.reconnect` until
    /// the first connection succeeds, then hand the transport to
    /// `from_transport_monitored`. Reconnection after a later disconnect is
    /// the caller's responsibility (call `connect_client_monitored` again),
    /// matching the original protocol's "client notices server gone,
    /// retries" model.
    #[cfg(unix)]
    pub async fn connect_client_monitored(path: PathBuf, config: ChannelConfig, monitor: M) -> Arc<Self> {
        let mut attempt: u32 = 0;
        loop {
            match tokio::net::UnixStream::connect(&path).await {
                Ok(stream) => return Self::from_transport_monitored(stream, config, monitor),
                Err(err) => {
                    attempt += 1;
                    let event = ChannelEvent {
                        timestamp: chrono::Utc::now(),
                        event_kind: ChannelEventKind::ReconnectAttempt { attempt },
                        metadata: std::collections::HashMap::new(),
                    };
                    let _ = monitor.record(event).await;
                    if let Some(max) = config.reconnect.max_attempts {
                        if attempt >= max {
                            warn!(%err, attempts = attempt, "giving up connecting to pipe server");
                        }
                    }
                    tokio::time::sleep(config.reconnect.interval).await;
                }
            }
        }
    }

    fn spawn_io<T: DuplexTransport>(
        self: Arc<Self>,
        transport: T,
        mut outbound_rx: mpsc::UnboundedReceiver<Envelope>,
        _config: ChannelConfig,
    ) {
        let framed = Framed::new(transport, EnvelopeCodec);
        let (mut sink, mut stream) = framed.split();
        let reader_channel = self.clone();

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(envelope) => {
                        if let Some(listener) = reader_channel.listener.lock().clone() {
                            listener.on_message_received(envelope);
                        }
                    }
                    Err(crate::message::codec::CodecError::FrameTooLarge { max, actual }) => {
                        warn!(max, actual, "pipe channel frame exceeded size limit, closing");
                        reader_channel.record(ChannelEventKind::FrameTooLarge {
                            declared_len: actual,
                            max,
                        });
                        break;
                    }
                    Err(err) => {
                        warn!(%err, "pipe channel decode error, closing");
                        reader_channel.record(ChannelEventKind::ProtocolError {
                            reason: err.to_string(),
                        });
                        break;
                    }
                }
            }
            reader_channel.connected.store(false, Ordering::Release);
            reader_channel.record(ChannelEventKind::Closed {
                reason: "peer closed or decode error".to_string(),
            });
            if let Some(listener) = reader_channel.listener.lock().clone() {
                listener.on_channel_closed("peer closed or decode error");
            }
        });

        let writer_channel = self.clone();
        tokio::spawn(async move {
            while let Some(envelope) = outbound_rx.recv().await {
                if let Err(err) = sink.send(envelope).await {
                    warn!(%err, "pipe channel encode error, closing");
                    break;
                }
            }
            writer_channel.connected.store(false, Ordering::Release);
        });

        self.record(ChannelEventKind::Connected);
        if let Some(listener) = self.listener.lock().clone() {
            listener.on_channel_connected();
        }
        info!("pipe channel connected");
    }
}

impl PipeChannel<NoopMonitor<ChannelEvent>> {
    /// Convenience constructor for callers that don't need channel
    /// monitoring wired up; equivalent to `from_transport_monitored` with a
    /// [`NoopMonitor`].
    pub fn from_transport<T: DuplexTransport>(transport: T, config: ChannelConfig) -> Arc<Self> {
        Self::from_transport_monitored(transport, config, NoopMonitor::new())
    }

    /// Convenience constructor mirroring [`Self::from_transport`] for the
    /// client-connect path.
    #[cfg(unix)]
    pub async fn connect_client(path: PathBuf, config: ChannelConfig) -> Arc<Self> {
        Self::connect_client_monitored(path, config, NoopMonitor::new()).await
    }
}

#[async_trait]
impl<M: Monitor<ChannelEvent>> MessageChannel for PipeChannel<M> {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::NotConnected);
        }
        self.outbound
            .send(envelope)
            .map_err(|_| ChannelError::Closed)
    }

    fn set_listener(&self, listener: Arc<dyn ChannelListener>) {
        *self.listener.lock() = Some(listener);
    }
}
