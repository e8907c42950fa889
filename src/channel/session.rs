//! Session discovery for `PipeServer`/`PipeChannel`.
//!
//! Cross-process components need to find the Unix domain socket for the
//! current desktop session without a well-known fixed path (multiple
//! sessions may run the same server concurrently). The server publishes
//! its session id to a small file keyed by a shared name; clients read it
//! back to compute the same socket path. This is the POSIX analogue of the
//! original protocol's Windows named-shared-memory handshake.

// Layer 1: Standard library imports
use std::path::{Path, PathBuf};

// Layer 2: Third-party crate imports
use tokio::fs;
use uuid::Uuid;

// Layer 3: Internal module imports
use crate::channel::error::ChannelError;

/// Generate a fresh session id for a server that doesn't already have one
/// of its own (a process id, a launch timestamp, ...) to publish.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Path to the small discovery file publishing `session_id` for `shared_name`.
fn discovery_file(prefix: &str, shared_name: &str) -> PathBuf {
    Path::new(prefix).join(format!("{shared_name}.session"))
}

/// Compute the socket path for a given session id and server name.
pub fn socket_path(prefix: &str, session_id: &str, server_name: &str) -> PathBuf {
    Path::new(prefix).join(session_id).join(server_name)
}

/// Publish `session_id` so clients sharing `shared_name` can discover it.
pub async fn publish_session_id(
    prefix: &str,
    shared_name: &str,
    session_id: &str,
) -> Result<(), ChannelError> {
    let path = discovery_file(prefix, shared_name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&path, session_id).await?;
    Ok(())
}

/// Read back the session id published under `shared_name`.
pub async fn discover_session_id(prefix: &str, shared_name: &str) -> Result<String, ChannelError> {
    let path = discovery_file(prefix, shared_name);
    let contents = fs::read_to_string(&path)
        .await
        .map_err(|e| ChannelError::SessionDiscovery(format!("{}: {e}", path.display())))?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err(ChannelError::SessionDiscovery(format!(
            "{} was empty",
            path.display()
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_then_discover_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().to_str().unwrap();
        publish_session_id(prefix, "ime-hub-test", "session-42")
            .await
            .unwrap();
        let discovered = discover_session_id(prefix, "ime-hub-test").await.unwrap();
        assert_eq!(discovered, "session-42");
    }

    #[tokio::test]
    async fn discover_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().to_str().unwrap();
        let result = discover_session_id(prefix, "no-such-name").await;
        assert!(result.is_err());
    }

    #[test]
    fn socket_path_joins_prefix_session_and_name() {
        let path = socket_path("/tmp/ime-hub", "session-1", "ime.server");
        assert_eq!(path, PathBuf::from("/tmp/ime-hub/session-1/ime.server"));
    }

    #[test]
    fn generated_session_ids_are_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
