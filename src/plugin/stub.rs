//! Loader-side proxy: a [`Component`] backed by a dynamic library loaded
//! through `libloading`, translating every trait call across the C ABI.

// Layer 1: Standard library imports
use std::ffi::CStr;
use std::path::Path;

// Layer 2: Third-party crate imports
use libloading::{Library, Symbol};
use tracing::error;

// Layer 3: Internal module imports
use crate::host::component::Component;
use crate::message::codec::{decode_standalone, encode_standalone};
use crate::message::{ComponentInfo, Envelope};
use crate::plugin::abi::{
    CBuffer, CreateInstanceFn, DeregisteredFn, DestroyInstanceFn, FreeBufferFn, GetInfoFn,
    HandleMessageFn, InstanceHandle, RegisteredFn, SYM_CREATE_INSTANCE, SYM_DEREGISTERED,
    SYM_DESTROY_INSTANCE, SYM_FREE_BUFFER, SYM_GET_INFO, SYM_HANDLE_MESSAGE, SYM_REGISTERED,
};
use crate::plugin::error::PluginError;
use crate::util::ComponentId;

/// A component whose behaviour lives in a dynamic library, loaded and driven
/// across the plug-in ABI. Owns the `Library` for its entire lifetime; the
/// library is unloaded (and `destroy_instance` called) on drop.
pub struct PluginStubComponent {
    // Order matters: `instance` must be destroyed before `library` is
    // dropped, and fields drop in declaration order.
    instance: InstanceHandle,
    create_instance: Symbol<'static, CreateInstanceFn>,
    destroy_instance: Symbol<'static, DestroyInstanceFn>,
    get_info: Symbol<'static, GetInfoFn>,
    registered: Symbol<'static, RegisteredFn>,
    deregistered: Symbol<'static, DeregisteredFn>,
    handle_message: Symbol<'static, HandleMessageFn>,
    free_buffer: Symbol<'static, FreeBufferFn>,
    // Keeps the library mapped for as long as any `Symbol` above is alive;
    // never accessed directly after load.
    _library: Library,
}

// Safety: the underlying library is required to be safe to drive from a
// single thread at a time, which `ComponentHost` already guarantees by
// owning this component behind its own dispatch loop.
unsafe impl Send for PluginStubComponent {}

impl PluginStubComponent {
    /// Load `path` and create one plug-in instance from it.
    ///
    /// # Safety
    /// `path` must name a dynamic library that exports the symbols in
    /// [`crate::plugin::abi`] with the exact signatures declared there;
    /// mismatched signatures are undefined behaviour.
    pub unsafe fn load(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let library = Library::new(path.as_ref())?;

        macro_rules! load_symbol {
            ($name:expr) => {{
                let sym: Symbol<'_, _> = library.get($name)?;
                std::mem::transmute(sym)
            }};
        }

        let create_instance: Symbol<'static, CreateInstanceFn> = load_symbol!(SYM_CREATE_INSTANCE);
        let destroy_instance: Symbol<'static, DestroyInstanceFn> =
            load_symbol!(SYM_DESTROY_INSTANCE);
        let get_info: Symbol<'static, GetInfoFn> = load_symbol!(SYM_GET_INFO);
        let registered: Symbol<'static, RegisteredFn> = load_symbol!(SYM_REGISTERED);
        let deregistered: Symbol<'static, DeregisteredFn> = load_symbol!(SYM_DEREGISTERED);
        let handle_message: Symbol<'static, HandleMessageFn> = load_symbol!(SYM_HANDLE_MESSAGE);
        let free_buffer: Symbol<'static, FreeBufferFn> = load_symbol!(SYM_FREE_BUFFER);

        let instance = create_instance();
        if instance.is_null() {
            return Err(PluginError::NullInstance);
        }

        Ok(Self {
            instance,
            create_instance,
            destroy_instance,
            get_info,
            registered,
            deregistered,
            handle_message,
            free_buffer,
            _library: library,
        })
    }

    fn take_buffer(&self, buf: CBuffer) -> Vec<u8> {
        // Safety: `buf` was produced by this plug-in's own `get_info`/etc,
        // and is read exactly once here before being freed below.
        let bytes = unsafe { buf.as_slice() }.to_vec();
        unsafe { (self.free_buffer)(buf) };
        bytes
    }
}

impl Component for PluginStubComponent {
    fn get_info(&self) -> ComponentInfo {
        let buf = unsafe { (self.get_info)(self.instance) };
        let bytes = self.take_buffer(buf);
        match serde_json::from_slice(&bytes) {
            Ok(info) => info,
            Err(err) => {
                error!(error = %err, "plug-in returned malformed ComponentInfo");
                ComponentInfo {
                    id: ComponentId::DEFAULT,
                    string_id: String::new(),
                    name: String::new(),
                    produce_message: Default::default(),
                    consume_message: Default::default(),
                }
            }
        }
    }

    fn handle(&mut self, envelope: Envelope) {
        let bytes = match encode_standalone(&envelope) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, "failed to encode envelope for plug-in");
                return;
            }
        };
        let buf = CBuffer::from_vec(bytes);
        unsafe { (self.handle_message)(self.instance, buf) };
    }

    fn registered(&mut self, id: ComponentId) {
        unsafe { (self.registered)(self.instance, id.value()) };
    }

    fn deregistered(&mut self) {
        unsafe { (self.deregistered)(self.instance) };
    }
}

impl Drop for PluginStubComponent {
    fn drop(&mut self) {
        unsafe { (self.destroy_instance)(self.instance) };
    }
}

/// Decode a standalone length-prefixed envelope buffer received from a
/// plug-in. Exposed for the adaptor side of the boundary; kept alongside the
/// stub since both sides must agree on the same framing.
pub fn decode_envelope_buffer(bytes: &[u8]) -> Result<Envelope, PluginError> {
    Ok(decode_standalone(bytes)?)
}

#[allow(dead_code)]
fn symbol_name(raw: &'static [u8]) -> &'static str {
    CStr::from_bytes_with_nul(raw)
        .map(|s| s.to_str().unwrap_or("<invalid>"))
        .unwrap_or("<invalid>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_names_are_valid_c_strings() {
        assert_eq!(symbol_name(SYM_CREATE_INSTANCE), "ime_plugin_create_instance");
        assert_eq!(symbol_name(SYM_FREE_BUFFER), "ime_plugin_free_buffer");
    }
}
