//! The [`Component`] trait: the behavior a plugin or in-process module
//! implements to participate in a Hub.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::message::{ComponentInfo, Envelope};
use crate::util::ComponentId;

/// Implemented by anything a [`crate::host::ComponentHost`] can own and
/// drive: an in-process IME, a plug-in shim, or a test double.
///
/// `get_info` must not call back into the owning host; it runs before the
/// component has a registered id and before any queue is draining for it.
pub trait Component: Send {
    /// Static metadata describing this component: its string id, name, and
    /// the message types it produces/consumes. Used to build the
    /// `RegisterComponent` request sent on the component's behalf.
    fn get_info(&self) -> ComponentInfo;

    /// Handle one routed envelope. Called on the task or thread
    /// `ComponentHost` dedicates to this component.
    fn handle(&mut self, envelope: Envelope);

    /// Called once Hub has assigned this component its id.
    fn registered(&mut self, id: ComponentId) {
        let _ = id;
    }

    /// Called when this component has been deregistered from its Hub,
    /// voluntarily or because its channel closed.
    fn deregistered(&mut self) {}

    /// Called after this component has been added to a host, before any
    /// envelope is delivered to it.
    fn did_add_to_host(&mut self) {}

    /// Called just before this component is removed from its host.
    fn did_remove_from_host(&mut self) {}
}
