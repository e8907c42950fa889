//! [`PipeServer`]: accepts incoming `PipeChannel` connections on a
//! session-scoped Unix domain socket and publishes session discovery.

// Layer 1: Standard library imports
use std::path::PathBuf;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tracing::{info, warn};

// Layer 3: Internal module imports
use crate::channel::config::ChannelConfig;
use crate::channel::error::ChannelError;
use crate::channel::pipe::PipeChannel;
use crate::monitoring::{ChannelEvent, NoopMonitor};
use crate::channel::session;

/// Listens for incoming connections and hands each one to `on_connect` as
/// a freshly-wrapped [`PipeChannel`].
pub struct PipeServer {
    socket_path: PathBuf,
}

impl PipeServer {
    /// Bind a listener at `<prefix>/<session_id>/<server_name>` and publish
    /// `session_id` under `shared_name` so clients can find it.
    #[cfg(unix)]
    pub async fn bind(
        prefix: &str,
        shared_name: &str,
        session_id: &str,
        server_name: &str,
    ) -> Result<(Self, tokio::net::UnixListener), ChannelError> {
        let path = session::socket_path(prefix, session_id, server_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Stale socket from a prior crash would otherwise make bind fail.
        let _ = tokio::fs::remove_file(&path).await;
        let listener = tokio::net::UnixListener::bind(&path)?;
        session::publish_session_id(prefix, shared_name, session_id).await?;
        info!(path = %path.display(), "pipe server listening");
        Ok((Self { socket_path: path }, listener))
    }

    /// Accept connections in a loop, spawning `on_connect` with each
    /// resulting [`PipeChannel`] until the listener errors out.
    #[cfg(unix)]
    pub async fn serve<F>(
        listener: tokio::net::UnixListener,
        config: ChannelConfig,
        mut on_connect: F,
    ) where
        F: FnMut(Arc<PipeChannel<NoopMonitor<ChannelEvent>>>) + Send,
    {
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let channel: Arc<PipeChannel<NoopMonitor<ChannelEvent>>> =
                        PipeChannel::from_transport(stream, config.clone());
                    on_connect(channel);
                }
                Err(err) => {
                    warn!(%err, "pipe server accept failed, stopping");
                    break;
                }
            }
        }
    }

    pub fn socket_path(&self) -> &std::path::Path {
        &self.socket_path
    }
}
