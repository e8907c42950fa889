//! Monitoring event types and configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traits::{EventSeverity, MonitoringEvent};
use crate::util::{ComponentId, InputContextId};

/// Configuration for monitoring behavior.
///
/// Controls how events are recorded, filtered, and stored in the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether monitoring is enabled
    pub enabled: bool,

    /// Maximum number of events to keep in history
    pub max_history_size: usize,

    /// Minimum severity level to record (events below this are filtered)
    pub severity_filter: EventSeverity,

    /// Interval for snapshot generation (if using background snapshots)
    #[serde(with = "crate::util::duration_serde")]
    pub snapshot_interval: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of monitoring state at a point in time.
///
/// Provides queryable access to monitoring counters and recent event history.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    /// Timestamp when snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Total number of events recorded
    pub total_events: u64,

    /// Number of trace-level events
    pub trace_count: u64,

    /// Number of debug-level events
    pub debug_count: u64,

    /// Number of info-level events
    pub info_count: u64,

    /// Number of warning-level events
    pub warning_count: u64,

    /// Number of error-level events
    pub error_count: u64,

    /// Number of critical-level events
    pub critical_count: u64,

    /// Recent events (up to max_history_size)
    pub recent_events: Vec<E>,
}

// ============================================================================
// Hub Events
// ============================================================================

/// Events related to Hub routing and registry operations.
#[derive(Debug, Clone, Serialize)]
pub struct HubEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific Hub event type
    pub event_kind: HubEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for HubEvent {
    const EVENT_TYPE: &'static str = "hub";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            HubEventKind::ComponentRegistered { .. } => EventSeverity::Info,
            HubEventKind::ComponentDeregistered { .. } => EventSeverity::Info,
            HubEventKind::InputContextCreated { .. } => EventSeverity::Debug,
            HubEventKind::InputContextDeleted { .. } => EventSeverity::Debug,
            HubEventKind::FocusChanged { .. } => EventSeverity::Trace,
            HubEventKind::ActiveConsumerChanged { .. } => EventSeverity::Trace,
            HubEventKind::DispatchFailed { .. } => EventSeverity::Warning,
            HubEventKind::ReservedRangeViolation { .. } => EventSeverity::Error,
        }
    }
}

/// Specific types of Hub events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum HubEventKind {
    /// A component completed registration
    ComponentRegistered {
        component_id: ComponentId,
        string_id: String,
    },

    /// A component was deregistered (explicitly or via connector detach)
    ComponentDeregistered { component_id: ComponentId },

    /// An input context was created
    InputContextCreated {
        icid: InputContextId,
        owner: ComponentId,
    },

    /// An input context was deleted
    InputContextDeleted { icid: InputContextId },

    /// Global focus moved between contexts
    FocusChanged {
        previous: Option<InputContextId>,
        current: InputContextId,
    },

    /// The active consumer for a message type changed within a context
    ActiveConsumerChanged {
        icid: InputContextId,
        message_type: String,
        consumer: Option<ComponentId>,
    },

    /// Hub could not dispatch an envelope
    DispatchFailed {
        message_type: String,
        reason: String,
    },

    /// An external component attempted to send a system-reserved message type
    ReservedRangeViolation {
        component_id: ComponentId,
        message_type_id: u32,
    },
}

// ============================================================================
// Component Events
// ============================================================================

/// Events related to a single component's lifecycle inside a ComponentHost.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// string_id of the component this event concerns
    pub string_id: String,

    /// Specific component event type
    pub event_kind: ComponentEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ComponentEvent {
    const EVENT_TYPE: &'static str = "component";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ComponentEventKind::Added => EventSeverity::Info,
            ComponentEventKind::Removed => EventSeverity::Info,
            ComponentEventKind::RegistrationCompleted { .. } => EventSeverity::Info,
            ComponentEventKind::MessageHandled { .. } => EventSeverity::Trace,
            ComponentEventKind::Paused => EventSeverity::Debug,
            ComponentEventKind::Resumed => EventSeverity::Debug,
            ComponentEventKind::ReplyTimedOut { .. } => EventSeverity::Warning,
        }
    }
}

/// Specific types of component events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ComponentEventKind {
    /// Component added to a ComponentHost
    Added,
    /// Component removed from a ComponentHost
    Removed,
    /// Registration handshake with Hub completed
    RegistrationCompleted { component_id: ComponentId },
    /// Component's `handle` was invoked for one envelope
    MessageHandled { message_type: String },
    /// Message handling paused (counter went nonzero)
    Paused,
    /// Message handling resumed (counter returned to zero)
    Resumed,
    /// A `send_with_reply` call timed out waiting for a reply
    ReplyTimedOut { message_type: String },
}

// ============================================================================
// Channel Events
// ============================================================================

/// Events related to MessageChannel connection lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific channel event type
    pub event_kind: ChannelEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ChannelEvent {
    const EVENT_TYPE: &'static str = "channel";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ChannelEventKind::Connected => EventSeverity::Info,
            ChannelEventKind::Closed { .. } => EventSeverity::Warning,
            ChannelEventKind::ReconnectAttempt { .. } => EventSeverity::Debug,
            ChannelEventKind::FrameTooLarge { .. } => EventSeverity::Error,
            ChannelEventKind::ProtocolError { .. } => EventSeverity::Error,
        }
    }
}

/// Specific types of channel events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ChannelEventKind {
    /// The underlying transport became connected
    Connected,
    /// The underlying transport closed
    Closed { reason: String },
    /// A reconnect attempt is about to be made
    ReconnectAttempt { attempt: u32 },
    /// An inbound frame exceeded the configured size limit
    FrameTooLarge { declared_len: usize, max: usize },
    /// Any other framing/protocol-level failure
    ProtocolError { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitoring_config_default() {
        let config = MonitoringConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_history_size, 1000);
        assert_eq!(config.severity_filter, EventSeverity::Info);
        assert_eq!(config.snapshot_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_hub_event_severity() {
        let event = HubEvent {
            timestamp: Utc::now(),
            event_kind: HubEventKind::ReservedRangeViolation {
                component_id: ComponentId::new(1),
                message_type_id: 0x8000,
            },
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Error);
        assert_eq!(HubEvent::EVENT_TYPE, "hub");
    }

    #[test]
    fn test_component_event_severity() {
        let event = ComponentEvent {
            timestamp: Utc::now(),
            string_id: "ime.test".into(),
            event_kind: ComponentEventKind::Added,
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Info);
        assert_eq!(ComponentEvent::EVENT_TYPE, "component");
    }

    #[test]
    fn test_channel_event_severity() {
        let event = ChannelEvent {
            timestamp: Utc::now(),
            event_kind: ChannelEventKind::Closed {
                reason: "peer reset".into(),
            },
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Warning);
        assert_eq!(ChannelEvent::EVENT_TYPE, "channel");
    }

    #[test]
    fn test_monitoring_snapshot_creation() {
        let snapshot = MonitoringSnapshot::<HubEvent> {
            timestamp: Utc::now(),
            total_events: 100,
            trace_count: 10,
            debug_count: 20,
            info_count: 30,
            warning_count: 25,
            error_count: 10,
            critical_count: 5,
            recent_events: vec![],
        };

        assert_eq!(snapshot.total_events, 100);
        assert_eq!(snapshot.critical_count, 5);
    }
}
