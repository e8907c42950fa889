//! Plug-in-side helper: wraps an embedder's [`Component`] behind the
//! `#[no_mangle] extern "C"` entry points a [`crate::plugin::stub`] loads.
//!
//! A plug-in crate built on `ime-hub` defines one `extern "C" fn` per ABI
//! symbol, each simply delegating into the matching [`PluginAdaptorHost`]
//! method. Every entry point catches unwinding panics at the boundary: a
//! panicking plug-in component must not unwind across the C ABI into the
//! loader.

// Layer 1: Standard library imports
use std::panic::{catch_unwind, AssertUnwindSafe};

// Layer 2: Third-party crate imports
use tracing::error;

// Layer 3: Internal module imports
use crate::host::component::Component;
use crate::message::codec::decode_standalone;
use crate::plugin::abi::{CBuffer, InstanceHandle};
use crate::util::ComponentId;

/// Owns the embedder's [`Component`] on the plug-in side, translating each
/// ABI call into the corresponding trait method and catching panics so they
/// never unwind back into the loader across the C boundary.
pub struct PluginAdaptorHost {
    component: Box<dyn Component>,
}

impl PluginAdaptorHost {
    pub fn new(component: Box<dyn Component>) -> Self {
        Self { component }
    }

    fn get_info(&self) -> CBuffer {
        let info = self.component.get_info();
        match serde_json::to_vec(&info) {
            Ok(bytes) => CBuffer::from_vec(bytes),
            Err(err) => {
                error!(error = %err, "failed to serialize ComponentInfo in plug-in");
                CBuffer::empty()
            }
        }
    }

    fn handle_message(&mut self, buf: CBuffer) {
        let bytes = unsafe { buf.as_slice() }.to_vec();
        match decode_standalone(&bytes) {
            Ok(envelope) => self.component.handle(envelope),
            Err(err) => error!(error = %err, "plug-in received malformed envelope"),
        }
    }

    fn registered(&mut self, id: u32) {
        self.component.registered(ComponentId::new(id));
    }

    fn deregistered(&mut self) {
        self.component.deregistered();
    }
}

/// Turn a boxed adaptor into a raw [`InstanceHandle`] for the loader to hold.
pub fn into_instance_handle(host: PluginAdaptorHost) -> InstanceHandle {
    Box::into_raw(Box::new(host)) as InstanceHandle
}

/// Reclaim and drop a handle previously produced by [`into_instance_handle`].
///
/// # Safety
/// `handle` must have come from [`into_instance_handle`] and must not be
/// used again after this call.
pub unsafe fn destroy_instance_handle(handle: InstanceHandle) {
    if handle.is_null() {
        return;
    }
    drop(Box::from_raw(handle as *mut PluginAdaptorHost));
}

/// Borrow the adaptor behind `handle` for the duration of `f`, catching any
/// panic so it cannot unwind into the caller across the ABI boundary.
///
/// # Safety
/// `handle` must be a live pointer produced by [`into_instance_handle`] and
/// not concurrently accessed from another thread.
unsafe fn with_instance<R>(
    handle: InstanceHandle,
    default: R,
    f: impl FnOnce(&mut PluginAdaptorHost) -> R,
) -> R {
    if handle.is_null() {
        return default;
    }
    let host = &mut *(handle as *mut PluginAdaptorHost);
    match catch_unwind(AssertUnwindSafe(|| f(host))) {
        Ok(value) => value,
        Err(_) => {
            error!("plug-in component panicked; caught at the ABI boundary");
            default
        }
    }
}

/// Implements the body of the `extern "C" fn` a plug-in exports for
/// `ime_plugin_get_info`. Call from the plug-in crate's own `#[no_mangle]`
/// wrapper, passing the live instance handle.
///
/// # Safety
/// See [`with_instance`].
pub unsafe fn abi_get_info(handle: InstanceHandle) -> CBuffer {
    with_instance(handle, CBuffer::empty(), |host| host.get_info())
}

/// # Safety
/// See [`with_instance`].
pub unsafe fn abi_handle_message(handle: InstanceHandle, buf: CBuffer) {
    with_instance(handle, (), |host| host.handle_message(buf))
}

/// # Safety
/// See [`with_instance`].
pub unsafe fn abi_registered(handle: InstanceHandle, id: u32) {
    with_instance(handle, (), |host| host.registered(id))
}

/// # Safety
/// See [`with_instance`].
pub unsafe fn abi_deregistered(handle: InstanceHandle) {
    with_instance(handle, (), |host| host.deregistered())
}

/// Free a [`CBuffer`] previously handed to the loader by this plug-in.
///
/// # Safety
/// `buf` must have been produced by this module (via `get_info` or
/// similar) and not already freed.
pub unsafe fn abi_free_buffer(buf: CBuffer) {
    let _ = buf.into_vec();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ComponentInfo, Envelope};
    use std::collections::HashSet;

    struct RecordingComponent {
        registered_id: Option<ComponentId>,
        handled: Vec<Envelope>,
    }

    impl Component for RecordingComponent {
        fn get_info(&self) -> ComponentInfo {
            ComponentInfo {
                id: ComponentId::DEFAULT,
                string_id: "ime.plugin.test".to_string(),
                name: "test plug-in".to_string(),
                produce_message: HashSet::new(),
                consume_message: HashSet::new(),
            }
        }

        fn handle(&mut self, envelope: Envelope) {
            self.handled.push(envelope);
        }

        fn registered(&mut self, id: ComponentId) {
            self.registered_id = Some(id);
        }
    }

    #[test]
    fn instance_lifecycle_round_trips_across_raw_pointer() {
        let component = Box::new(RecordingComponent {
            registered_id: None,
            handled: Vec::new(),
        });
        let host = PluginAdaptorHost::new(component);
        let handle = into_instance_handle(host);

        unsafe {
            abi_registered(handle, 42);
            let buf = abi_get_info(handle);
            let bytes = buf.as_slice().to_vec();
            abi_free_buffer(buf);
            let info: ComponentInfo = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(info.string_id, "ime.plugin.test");
            destroy_instance_handle(handle);
        }
    }

    #[test]
    fn panicking_component_is_caught_at_boundary() {
        struct PanicsOnInfo;
        impl Component for PanicsOnInfo {
            fn get_info(&self) -> ComponentInfo {
                panic!("boom");
            }
            fn handle(&mut self, _envelope: Envelope) {}
        }

        let host = PluginAdaptorHost::new(Box::new(PanicsOnInfo));
        let handle = into_instance_handle(host);
        let buf = unsafe { abi_get_info(handle) };
        assert!(unsafe { buf.as_slice() }.is_empty());
        unsafe { destroy_instance_handle(handle) };
    }
}
