//! # ime-hub - Typed, Asynchronous IME Component Bus
//!
//! A message bus for multi-component input-method frameworks: a single
//! `Hub` routes typed envelopes between components (engines, UI surfaces,
//! settings panels, plug-ins) attached either in-process or across a
//! process boundary, while tracking the input contexts they share and who
//! is currently focused, attached, or the active consumer of a message type.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ime_hub::prelude::*;
//! use std::time::Duration;
//!
//! struct EchoEngine;
//!
//! impl Component for EchoEngine {
//!     fn get_info(&self) -> ComponentInfo {
//!         ComponentInfo {
//!             id: ComponentId::DEFAULT,
//!             string_id: "ime.echo".to_string(),
//!             name: "Echo Engine".to_string(),
//!             produce_message: Default::default(),
//!             consume_message: Default::default(),
//!         }
//!     }
//!
//!     fn handle(&mut self, envelope: Envelope) {
//!         println!("received {:?}", envelope.message_type);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = HubConfig::default();
//!     let hub = std::sync::Arc::new(HubHost::spawn(config.clone(), NoopMonitor::new()));
//!     let host = ComponentHost::add_component(
//!         hub.clone(),
//!         Box::new(EchoEngine),
//!         QueueMode::Threaded,
//!         &config,
//!         NoopMonitor::new(),
//!     )
//!     .await
//!     .expect("registration should succeed");
//!
//!     host.remove_component().await.unwrap();
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Core Routing
//! - [`hub`] - The router itself: registries, dispatch, and [`hub::HubHost`],
//!   which owns a [`hub::Hub`] on its own task.
//! - [`host`] - [`host::Component`] and [`host::ComponentHost`], the
//!   component-side counterpart that drives registration, pause/resume, and
//!   request/reply correlation.
//! - [`message`] - The wire envelope, its typed payload, and the closed
//!   catalogue of known message types.
//!
//! ## Transport
//! - [`queue`] - Task-affine envelope queues used to serialize delivery
//!   onto a single owning task or thread.
//! - [`channel`] - In-process and cross-process transports carrying
//!   envelopes between a Hub and the components attached to it.
//!
//! ## Extensibility
//! - [`plugin`] - The C-ABI boundary for components shipped as a dynamic
//!   library, loaded at runtime instead of linked in.
//!
//! ## Observability and Configuration
//! - [`monitoring`] - Event tracking for hub, component, and channel
//!   lifecycle, with in-memory and no-op monitor implementations.
//! - [`config`] - Top-level [`config::HubConfig`] tying transport,
//!   registration timing, and monitoring together.
//! - [`util`] - Shared identifier types (`ComponentId`, `InputContextId`,
//!   `Serial`) and serde helpers.
//!
//! # Architecture Principles
//!
//! ## Single-Writer Registries
//! `Hub` owns its component/input-context registries outright and runs on
//! one task; nothing touches them concurrently, so they're plain
//! `HashMap`/`HashSet` rather than a concurrent map. Everything that would
//! otherwise contend for a lock — attaching a connector, posting an
//! envelope, handling a reply — is serialized through `HubHost`'s queue and
//! control channel instead.
//!
//! ## The Hub Never Panics
//! A component handler panicking must not take down the bus. Threaded
//! component hosts run their dispatch loop behind `catch_unwind`, and a
//! `Hub` failing to route an envelope always resolves into an error reply
//! (or a logged drop), never a propagated `Result`.
//!
//! ## Closed Message Catalogue
//! Message types below `USER_DEFINED_START` are a fixed, stable numeric
//! catalogue (see [`message::types`]); everything above it is free for
//! applications to define. The system-reserved range above
//! `SYSTEM_RESERVED_START` is rejected by `Hub::handle` for anything but
//! the internal attach/detach handshake.
//!
//! # See Also
//!
//! - [`DESIGN.md`](https://github.com/example/ime-hub/blob/main/DESIGN.md) -
//!   grounding notes and resolved design questions.

pub mod channel;
pub mod config;
pub mod host;
pub mod hub;
pub mod message;
pub mod monitoring;
pub mod plugin;
pub mod prelude;
pub mod queue;
pub mod util;

pub use channel::{ChannelConfig, ChannelError, DirectChannel, MessageChannel, PipeChannel};
pub use config::HubConfig;
pub use host::{Component, ComponentHost, HostError, QueueMode};
pub use hub::{Connector, Hub, HubError, HubHost};
pub use message::{Envelope, MessageType, Payload, ReplyMode};
pub use monitoring::{
    ChannelEvent, ComponentEvent, EventSeverity, HubEvent, InMemoryMonitor, Monitor,
    MonitoringConfig, MonitoringError, MonitoringEvent, MonitoringSnapshot, NoopMonitor,
};
pub use plugin::{PluginError, PluginStubComponent};
pub use queue::{MessageQueue, QueueError, SimpleMessageQueue};
pub use util::{ComponentId, InputContextId, Serial};
