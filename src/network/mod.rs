//! Spout sender discovery.
//!
//! This module provides:
//! - The `SenderDirectory` seam over the process-wide Spout sender registry
//! - First-available resolution and enumeration helpers
//! - The SpoutLibrary.dll bindings and directory adapter (Windows)

pub mod directory;

#[cfg(target_os = "windows")]
pub mod spout_directory;
#[cfg(target_os = "windows")]
pub mod spout_ffi;

pub use directory::{
    enumerate, resolve_first, SenderDescriptor, SenderDirectory, SenderInfo, SenderName,
    SharedHandle, MAX_SENDER_NAME_LEN,
};

#[cfg(target_os = "windows")]
pub use spout_directory::SpoutDirectory;
