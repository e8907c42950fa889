//! Top-level configuration for a Hub and its default channel/queue sizing.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::channel::{ChannelConfig, ReconnectPolicy};
use crate::monitoring::MonitoringConfig;

/// How long `ComponentHost::add_component` waits for the registration
/// handshake's reply before giving up.
const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder-style configuration for a [`crate::hub::HubHost`]: transport
/// defaults, registration timing, and the monitor it records events to.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub channel: ChannelConfig,
    pub registration_timeout: Duration,
    pub monitoring: MonitoringConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            registration_timeout: DEFAULT_REGISTRATION_TIMEOUT,
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl HubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_registration_timeout(mut self, timeout: Duration) -> Self {
        self.registration_timeout = timeout;
        self
    }

    pub fn with_reconnect_policy(mut self, reconnect: ReconnectPolicy) -> Self {
        self.channel.reconnect = reconnect;
        self
    }

    pub fn with_monitoring(mut self, monitoring: MonitoringConfig) -> Self {
        self.monitoring = monitoring;
        self
    }

    /// Validate all nested configuration, surfacing the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.channel.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(HubConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_overrides_registration_timeout() {
        let config = HubConfig::new().with_registration_timeout(Duration::from_secs(1));
        assert_eq!(config.registration_timeout, Duration::from_secs(1));
    }
}
