//! Channel transport configuration.

// Layer 1: Standard library imports
use std::time::Duration;

/// Policy governing how a [`crate::channel::PipeChannel`] reconnects after
/// losing its transport.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Delay between reconnect attempts.
    pub interval: Duration,
    /// Maximum number of attempts before giving up (`None` = unlimited).
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: None,
        }
    }
}

/// Tunables for the cross-process transport.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Maximum size of a single encoded envelope frame, including the
    /// length prefix.
    pub max_envelope_size: usize,
    /// Size of the read buffer used when draining the socket.
    pub read_buffer_size: usize,
    /// Reconnect behavior for client-side `PipeChannel`s.
    pub reconnect: ReconnectPolicy,
    /// Directory prefix under which session-scoped socket paths are created.
    pub socket_dir_prefix: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_envelope_size: crate::message::MAX_ENVELOPE_SIZE,
            read_buffer_size: 4 * 1024,
            reconnect: ReconnectPolicy::default(),
            socket_dir_prefix: "/tmp/ime-hub".to_string(),
        }
    }
}

impl ChannelConfig {
    /// Validate constraints a hand-built config might violate.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_envelope_size == 0 {
            return Err("max_envelope_size must be greater than zero".into());
        }
        if self.read_buffer_size == 0 {
            return Err("read_buffer_size must be greater than zero".into());
        }
        if self.socket_dir_prefix.is_empty() {
            return Err("socket_dir_prefix must not be empty".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ChannelConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_envelope_size_rejected() {
        let mut config = ChannelConfig::default();
        config.max_envelope_size = 0;
        assert!(config.validate().is_err());
    }
}
