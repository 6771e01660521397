//! Low-level FFI bindings to the Spout2 SDK for Windows, receiver side.
//!
//! Spout is a Windows framework for sharing GPU textures between applications
//! using DirectX shared textures. This module provides bindings to
//! SpoutLibrary.dll's COM-like interface.
//!
//! Reference: https://github.com/leadedge/Spout2

#![cfg(target_os = "windows")]

use std::ffi::{c_char, c_void, CStr, CString};

use windows::Win32::Foundation::HANDLE;

use super::directory::MAX_SENDER_NAME_LEN;

/// VTable indices, following the declaration order of the receiver and
/// sender-list sections of SpoutLibrary.h.
mod vtable {
    pub const RELEASE_RECEIVER: usize = 8;
    pub const GET_SENDER_COUNT: usize = 17;
    pub const GET_SENDER_NAME: usize = 18;
    pub const GET_SENDER_INFO: usize = 19;
    pub const SET_ACTIVE_SENDER: usize = 21;
    /// `Release()`, declared last in the interface. Must move with the
    /// header shipped beside the plugin, like every index above.
    pub const RELEASE: usize = 96;
}

/// Raw description of a sender returned by GetSenderInfo.
#[derive(Debug, Clone, Copy)]
pub struct RawSenderInfo {
    pub width: u32,
    pub height: u32,
    pub share_handle: HANDLE,
    pub format: u32,
}

/// Spout library handle - wraps the COM-like interface
pub struct SpoutLibrary {
    /// Handle to the SPOUTLIBRARY interface
    handle: *mut c_void,
    /// DLL handle to keep it loaded
    _dll: libloading::Library,
}

impl SpoutLibrary {
    /// Load SpoutLibrary.dll and get the interface handle.
    pub fn new() -> Result<Self, String> {
        unsafe {
            let dll = Self::load_dll()?;

            let get_spout: libloading::Symbol<unsafe extern "C" fn() -> *mut c_void> = dll
                .get(b"GetSpout")
                .map_err(|e| format!("Failed to find GetSpout function: {}", e))?;

            let handle = get_spout();
            if handle.is_null() {
                return Err("GetSpout returned null".to_string());
            }

            Ok(Self { handle, _dll: dll })
        }
    }

    /// Try to load SpoutLibrary.dll from the plugin and host directories
    unsafe fn load_dll() -> Result<libloading::Library, String> {
        let paths = [
            "SpoutLibrary.dll",
            "./SpoutLibrary.dll",
            "../../obs-plugins/64bit/SpoutLibrary.dll",
        ];

        for path in &paths {
            if let Ok(dll) = libloading::Library::new(path) {
                log::info!("Spout: Loaded SpoutLibrary.dll from {}", path);
                return Ok(dll);
            }
        }

        Err("Failed to load SpoutLibrary.dll - ensure it's next to the plugin or in PATH".to_string())
    }

    /// Get the vtable pointer for calling virtual methods
    fn vtable(&self) -> *const *const c_void {
        // The handle points to an object whose first member is the vtable pointer
        self.handle as *const *const c_void
    }

    unsafe fn method(&self, index: usize) -> *const c_void {
        let vtable = *self.vtable();
        *vtable.add(index)
    }

    /// Release - free the instance GetSpout allocated inside the DLL
    fn release(&self) {
        unsafe {
            let method: unsafe extern "C" fn(*mut c_void) =
                std::mem::transmute(self.method(vtable::RELEASE));
            method(self.handle);
        }
    }

    // === Receiver Methods ===

    /// ReleaseReceiver - drop this instance's claim on the current sender
    pub fn release_receiver(&self) {
        unsafe {
            let method: unsafe extern "C" fn(*mut c_void) =
                std::mem::transmute(self.method(vtable::RELEASE_RECEIVER));
            method(self.handle);
        }
    }

    /// GetSenderCount - number of senders in the shared sender list
    pub fn get_sender_count(&self) -> i32 {
        unsafe {
            let method: unsafe extern "C" fn(*mut c_void) -> i32 =
                std::mem::transmute(self.method(vtable::GET_SENDER_COUNT));
            method(self.handle)
        }
    }

    /// GetSenderName - name of the sender at `index` in the sender list
    pub fn get_sender_name(&self, index: i32) -> Option<String> {
        let mut buffer = [0 as c_char; MAX_SENDER_NAME_LEN];
        let found = unsafe {
            let method: unsafe extern "C" fn(*mut c_void, i32, *mut c_char, i32) -> bool =
                std::mem::transmute(self.method(vtable::GET_SENDER_NAME));
            method(self.handle, index, buffer.as_mut_ptr(), MAX_SENDER_NAME_LEN as i32)
        };
        if !found {
            return None;
        }

        // Force termination in case the library filled the whole buffer
        buffer[MAX_SENDER_NAME_LEN - 1] = 0;
        let name = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        Some(name.to_string_lossy().into_owned())
    }

    /// GetSenderInfo - dimensions, share handle and format of a named sender
    pub fn get_sender_info(&self, name: &str) -> Option<RawSenderInfo> {
        let c_name = CString::new(name).ok()?;
        let mut width: u32 = 0;
        let mut height: u32 = 0;
        let mut share_handle = HANDLE::default();
        let mut format: u32 = 0;

        let found = unsafe {
            let method: unsafe extern "C" fn(
                *mut c_void,
                *const c_char,
                *mut u32,
                *mut u32,
                *mut HANDLE,
                *mut u32,
            ) -> bool = std::mem::transmute(self.method(vtable::GET_SENDER_INFO));
            method(
                self.handle,
                c_name.as_ptr(),
                &mut width,
                &mut height,
                &mut share_handle,
                &mut format,
            )
        };

        if !found {
            log::warn!("Spout: Named sender '{}' not found w: {}, h: {}", name, width, height);
            return None;
        }

        Some(RawSenderInfo {
            width,
            height,
            share_handle,
            format,
        })
    }

    /// SetActiveSender - mark a sender as the system-wide active one
    pub fn set_active_sender(&self, name: &str) -> bool {
        let Ok(c_name) = CString::new(name) else {
            return false;
        };
        unsafe {
            let method: unsafe extern "C" fn(*mut c_void, *const c_char) -> bool =
                std::mem::transmute(self.method(vtable::SET_ACTIVE_SENDER));
            method(self.handle, c_name.as_ptr())
        }
    }
}

impl Drop for SpoutLibrary {
    fn drop(&mut self) {
        // The receiver was already released by whoever engaged it; only the
        // instance is left. Runs before `_dll` unloads.
        self.release();
        log::debug!("Spout: Released library instance");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_is_last_slot() {
        let slots = [
            vtable::RELEASE_RECEIVER,
            vtable::GET_SENDER_COUNT,
            vtable::GET_SENDER_NAME,
            vtable::GET_SENDER_INFO,
            vtable::SET_ACTIVE_SENDER,
        ];
        assert!(slots.iter().all(|&slot| slot < vtable::RELEASE));
    }

    #[test]
    fn test_instances_are_released_on_drop() {
        // Needs SpoutLibrary.dll next to the test binary
        let Ok(first) = SpoutLibrary::new() else {
            return;
        };
        assert!(first.get_sender_count() >= 0);
        drop(first);

        for _ in 0..8 {
            let spout = SpoutLibrary::new().unwrap();
            drop(spout);
        }
    }
}
