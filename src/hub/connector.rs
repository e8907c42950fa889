//! The boundary between Hub's dispatch loop and whatever owns a component
//! on the other side (a `ComponentHost`, in process or across a channel).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::message::Envelope;
use crate::util::ComponentId;

/// A delivery target Hub's registries hold on to. Implementors must not
/// block the caller; Hub's dispatch loop calls `deliver` inline while
/// holding its own registries, so a slow or blocking implementation stalls
/// every component attached to this Hub.
pub trait Connector: Send + Sync {
    /// The component this connector currently delivers to. `ComponentId::DEFAULT`
    /// before the registration handshake completes.
    fn component_id(&self) -> ComponentId;

    /// Hand `envelope` off without blocking. Implementations typically post
    /// onto a `MessageQueue` or forward over a `MessageChannel`'s outbound
    /// queue, both of which are non-blocking sends.
    fn deliver(&self, envelope: Envelope);
}
