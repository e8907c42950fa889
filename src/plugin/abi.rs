//! The C-ABI boundary a plug-in dynamic library exports and a loader calls.
//!
//! Every payload crossing this boundary is a [`CBuffer`]: a heap allocation
//! owned by whichever side produced it until the *other* side calls
//! `free_buffer` on it. `ComponentInfo`/`Envelope` values are carried as
//! `serde_json` bytes, the same wire encoding used by [`crate::message::codec`],
//! so a plug-in only needs `serde_json` plus the shared types to participate.

// Layer 1: Standard library imports
use std::os::raw::c_void;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// An owned byte buffer passed across the plug-in boundary by raw parts.
/// Safety: the side that did NOT allocate this buffer must pass it back
/// through `free_buffer` exactly once, and must not read `ptr` past `len`.
#[repr(C)]
pub struct CBuffer {
    pub ptr: *mut u8,
    pub len: usize,
    pub cap: usize,
}

impl CBuffer {
    /// Take ownership of `bytes`, leaking it into a raw buffer the other
    /// side of the boundary is responsible for freeing.
    pub fn from_vec(mut bytes: Vec<u8>) -> Self {
        let ptr = bytes.as_mut_ptr();
        let len = bytes.len();
        let cap = bytes.capacity();
        std::mem::forget(bytes);
        Self { ptr, len, cap }
    }

    /// An empty, non-allocating buffer (used for void-returning calls).
    pub fn empty() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            len: 0,
            cap: 0,
        }
    }

    /// Reconstruct the `Vec<u8>` this buffer was built from. Safety: must be
    /// called at most once per buffer, by the side that did not allocate it.
    ///
    /// # Safety
    /// `self` must have been produced by [`CBuffer::from_vec`] (or be the
    /// result of [`CBuffer::empty`]) and must not have been reconstructed
    /// already.
    pub unsafe fn into_vec(self) -> Vec<u8> {
        if self.ptr.is_null() {
            return Vec::new();
        }
        Vec::from_raw_parts(self.ptr, self.len, self.cap)
    }

    /// Borrow the buffer's bytes without taking ownership.
    ///
    /// # Safety
    /// `self` must still own valid memory (i.e. `into_vec` has not been
    /// called on it yet).
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.ptr.is_null() {
            &[]
        } else {
            std::slice::from_raw_parts(self.ptr, self.len)
        }
    }
}

/// Opaque handle to a plug-in's component instance; never dereferenced by
/// the loader, only passed back into the plug-in's own entry points.
pub type InstanceHandle = *mut c_void;

pub type CreateInstanceFn = unsafe extern "C" fn() -> InstanceHandle;
pub type DestroyInstanceFn = unsafe extern "C" fn(InstanceHandle);
pub type GetInfoFn = unsafe extern "C" fn(InstanceHandle) -> CBuffer;
pub type RegisteredFn = unsafe extern "C" fn(InstanceHandle, u32);
pub type DeregisteredFn = unsafe extern "C" fn(InstanceHandle);
pub type HandleMessageFn = unsafe extern "C" fn(InstanceHandle, CBuffer);
pub type FreeBufferFn = unsafe extern "C" fn(CBuffer);

/// Symbol names every plug-in dynamic library must export.
pub const SYM_CREATE_INSTANCE: &[u8] = b"ime_plugin_create_instance\0";
pub const SYM_DESTROY_INSTANCE: &[u8] = b"ime_plugin_destroy_instance\0";
pub const SYM_GET_INFO: &[u8] = b"ime_plugin_get_info\0";
pub const SYM_REGISTERED: &[u8] = b"ime_plugin_registered\0";
pub const SYM_DEREGISTERED: &[u8] = b"ime_plugin_deregistered\0";
pub const SYM_HANDLE_MESSAGE: &[u8] = b"ime_plugin_handle_message\0";
pub const SYM_FREE_BUFFER: &[u8] = b"ime_plugin_free_buffer\0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_round_trips_bytes() {
        let bytes = vec![1u8, 2, 3, 4];
        let buf = CBuffer::from_vec(bytes.clone());
        let back = unsafe { buf.into_vec() };
        assert_eq!(back, bytes);
    }

    #[test]
    fn empty_buffer_has_no_bytes() {
        let buf = CBuffer::empty();
        assert_eq!(unsafe { buf.as_slice() }, &[] as &[u8]);
    }
}
