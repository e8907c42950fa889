//! The message router. [`Hub`] owns every registry (components, input
//! contexts, hotkey lists) and decides where each envelope goes;
//! [`HubHost`] drives a `Hub` on its own task so nothing in it needs a lock.

pub mod connector;
pub mod error;
pub mod host;
#[allow(clippy::module_inception)]
pub mod hub;
pub mod input_context;
pub mod registry;

pub use connector::Connector;
pub use error::HubError;
pub use host::HubHost;
pub use hub::Hub;
pub use input_context::InputContext;
pub use registry::Registries;
