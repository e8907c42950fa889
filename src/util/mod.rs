//! Utility types and helpers shared across the bus.

pub mod ids;
pub mod serde_helpers;

pub use ids::{ComponentId, InputContextId, Serial, SerialAllocator};
pub use serde_helpers::duration_serde;
