//! Prelude module for convenient imports.
//!
//! Re-exports the types most programs embedding a component or standing up
//! a hub will need. Import this module to get started quickly:
//!
//! ```rust
//! use ime_hub::prelude::*;
//! ```
//!
//! # What's Included
//!
//! ## Hub and Routing
//! - [`Hub`] - The router: registries and dispatch logic.
//! - [`HubHost`] - Owns a `Hub` on a dedicated task.
//! - [`Connector`] - The synchronous delivery boundary Hub holds per
//!   attached component.
//! - [`HubError`] - Errors from registry operations.
//!
//! ## Components
//! - [`Component`] - Trait an embedder implements for its component logic.
//! - [`ComponentHost`] - Drives one `Component` against a `HubHost`.
//! - [`QueueMode`] - Threaded vs. cooperatively-drained dispatch.
//! - [`HostError`] - Errors from registration, pause, and teardown.
//!
//! ## Messaging
//! - [`Envelope`] - The wire message: type, routing, payload.
//! - [`MessageType`] - Known or user-defined numeric message type.
//! - [`Payload`] - The typed data an envelope carries.
//! - [`ReplyMode`] - Whether an envelope expects, is, or needs no reply.
//! - [`ComponentInfo`] - A component's identity and produce/consume sets.
//! - [`ErrorCode`] - Error payload codes.
//!
//! ## Transport
//! - [`MessageChannel`] - Trait for in-process and cross-process
//!   transports.
//! - [`DirectChannel`] - In-process channel.
//! - [`PipeChannel`] - Cross-process channel over a Unix domain socket.
//! - [`ChannelConfig`] - Transport configuration, including reconnection.
//! - [`ChannelError`] - Transport errors.
//!
//! ## Plug-ins
//! - [`PluginStubComponent`] - Loader-side proxy for a dynamic-library
//!   component.
//! - [`PluginError`] - Errors from loading or driving a plug-in.
//!
//! ## Monitoring
//! - [`Monitor`] - Core monitoring trait.
//! - [`InMemoryMonitor`] - Retains recent events for inspection.
//! - [`NoopMonitor`] - Zero-overhead no-op monitor.
//! - [`MonitoringEvent`] - Trait for event types.
//! - [`EventSeverity`] - Event severity levels.
//! - [`HubEvent`] - Hub lifecycle and routing events.
//! - [`ComponentEvent`] - Component lifecycle events.
//! - [`ChannelEvent`] - Transport connect/reconnect/disconnect events.
//!
//! ## Configuration
//! - [`HubConfig`] - Transport defaults, registration timing, monitoring.
//!
//! ## Utilities
//! - [`ComponentId`] - Component identifier.
//! - [`InputContextId`] - Input context identifier.
//! - [`Serial`] - Request/reply correlation id.
//!
//! # Example
//!
//! ```rust,ignore
//! use ime_hub::prelude::*;
//!
//! struct MyEngine;
//!
//! impl Component for MyEngine {
//!     fn get_info(&self) -> ComponentInfo {
//!         ComponentInfo {
//!             id: ComponentId::DEFAULT,
//!             string_id: "ime.my_engine".to_string(),
//!             name: "My Engine".to_string(),
//!             produce_message: Default::default(),
//!             consume_message: Default::default(),
//!         }
//!     }
//!
//!     fn handle(&mut self, envelope: Envelope) {
//!         println!("received: {:?}", envelope.message_type);
//!     }
//! }
//! ```

// Hub and routing
pub use crate::hub::{Connector, Hub, HubError, HubHost};

// Components
pub use crate::host::{Component, ComponentHost, HostError, QueueMode};

// Messaging
pub use crate::message::{
    ComponentInfo, Envelope, ErrorCode, MessageType, Payload, ReplyMode,
};

// Transport
pub use crate::channel::{ChannelConfig, ChannelError, DirectChannel, MessageChannel, PipeChannel};

// Plug-ins
pub use crate::plugin::{PluginError, PluginStubComponent};

// Monitoring
pub use crate::monitoring::{
    ChannelEvent, ComponentEvent, EventSeverity, HubEvent, InMemoryMonitor, Monitor,
    MonitoringEvent, NoopMonitor,
};

// Configuration
pub use crate::config::HubConfig;

// Utilities
pub use crate::util::{ComponentId, InputContextId, Serial};
