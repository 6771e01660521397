//! Discovery of Spout senders.
//!
//! The Spout sender registry is a single shared, mutable, system-wide table
//! owned by the sharing service. Nothing here is cached: every call goes back
//! to the service, and the set may change between any two calls.

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::{SourceError, SourceResult};

/// Size of a Spout sender name buffer, including the C terminator.
pub const MAX_SENDER_NAME_LEN: usize = 256;

/// A sender name, bounded to what fits in a Spout name buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SenderName(String);

impl SenderName {
    /// Build a name, truncating on a character boundary if it does not fit.
    pub fn new(name: &str) -> Self {
        let limit = MAX_SENDER_NAME_LEN - 1;
        if name.len() <= limit {
            return Self(name.to_string());
        }

        let mut end = limit;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        tracing::warn!(
            len = name.len(),
            "Spout sender name longer than {} bytes, truncating",
            limit
        );
        Self(name[..end].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SenderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SenderName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for SenderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A sender as seen in one enumeration of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderDescriptor {
    /// Sender name
    pub name: SenderName,
    /// Ordinal position in the enumeration it came from
    pub index: usize,
}

/// Non-null shared-resource handle published by a sender.
///
/// The handle belongs to the producing process. It is never closed here.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SharedHandle(NonZeroUsize);

impl SharedHandle {
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Debug for SharedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedHandle({:#x})", self.0.get())
    }
}

/// Description of a sender as reported by the sharing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderInfo {
    /// Texture width in pixels
    pub width: u32,
    /// Texture height in pixels
    pub height: u32,
    /// Raw shared handle (0 if the sender did not publish one)
    pub handle: usize,
    /// DXGI format of the shared texture
    pub format: u32,
}

impl SenderInfo {
    /// The shared handle, if the sender published a non-null one.
    pub fn shared_handle(&self) -> Option<SharedHandle> {
        SharedHandle::from_raw(self.handle)
    }

    /// A sender can only be bound with a handle and non-zero dimensions.
    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0 && self.shared_handle().is_some()
    }
}

/// The process-wide Spout sender registry.
///
/// Implemented by [`SpoutDirectory`](super::SpoutDirectory) on Windows and by
/// fakes in tests.
pub trait SenderDirectory {
    /// Number of senders advertised right now.
    fn count(&self) -> usize;

    /// Name of the sender at `index` in the current enumeration.
    fn name_at(&self, index: usize) -> SourceResult<SenderName>;

    /// Mark `name` as the active sender, system-wide.
    fn activate(&self, name: &SenderName) -> SourceResult<()>;

    /// Dimensions and shared handle of the named sender.
    fn info_for(&self, name: &SenderName) -> SourceResult<SenderInfo>;

    /// Tell the service this receiver no longer holds a binding.
    fn release_receiver(&self);
}

/// Resolve the first advertised sender and make it the active one.
///
/// This is not a pure query: activation changes the "active sender" marker
/// that every Spout receiver on the machine sees.
pub fn resolve_first(directory: &dyn SenderDirectory) -> SourceResult<SenderName> {
    let total = directory.count();
    if total == 0 {
        return Err(SourceError::NoSenderAvailable);
    }

    let name = directory.name_at(0)?;
    tracing::info!(sender = %name, total, "Spout: First available sender");

    directory.activate(&name)?;
    Ok(name)
}

/// Snapshot of the registry for display purposes.
///
/// Senders that disappear while enumerating are skipped.
pub fn enumerate(directory: &dyn SenderDirectory) -> Vec<SenderDescriptor> {
    (0..directory.count())
        .filter_map(|index| {
            directory
                .name_at(index)
                .ok()
                .map(|name| SenderDescriptor { name, index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDirectory;

    #[test]
    fn test_sender_name_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let name = SenderName::new(&long);
        assert!(name.as_str().len() <= MAX_SENDER_NAME_LEN - 1);
        assert_eq!(name.as_str().len(), 254);
        assert!(long.starts_with(name.as_str()));
    }

    #[test]
    fn test_sender_name_short_is_unchanged() {
        assert_eq!(SenderName::new("CamA").as_str(), "CamA");
        assert!(SenderName::default().is_empty());
    }

    #[test]
    fn test_shared_handle_rejects_null() {
        assert!(SharedHandle::from_raw(0).is_none());
        assert_eq!(SharedHandle::from_raw(0x40).map(SharedHandle::as_raw), Some(0x40));
    }

    #[test]
    fn test_sender_info_usable() {
        let info = SenderInfo { width: 1920, height: 1080, handle: 0x10, format: 87 };
        assert!(info.is_usable());
        assert!(!SenderInfo { width: 0, height: 0, ..info }.is_usable());
        assert!(!SenderInfo { handle: 0, ..info }.is_usable());
    }

    #[test]
    fn test_resolve_first_without_senders() {
        let directory = FakeDirectory::new();
        assert_eq!(resolve_first(&directory), Err(SourceError::NoSenderAvailable));
        assert_eq!(directory.activations(), 0);
    }

    #[test]
    fn test_resolve_first_activates_index_zero() {
        let directory = FakeDirectory::new();
        directory.add_sender("CamA", 1920, 1080);
        directory.add_sender("CamB", 1280, 720);

        let name = resolve_first(&directory).unwrap();
        assert_eq!(name.as_str(), "CamA");
        assert_eq!(directory.active_sender().as_deref(), Some("CamA"));
    }

    #[test]
    fn test_resolve_first_activation_race() {
        let directory = FakeDirectory::new();
        directory.add_sender("CamA", 1920, 1080);
        directory.reject_activation(true);

        assert_eq!(
            resolve_first(&directory),
            Err(SourceError::ActivationFailed { name: "CamA".to_string() })
        );
    }

    #[test]
    fn test_enumerate_lists_in_order() {
        let directory = FakeDirectory::new();
        directory.add_sender("CamA", 1920, 1080);
        directory.add_sender("CamB", 1280, 720);

        let senders = enumerate(&directory);
        assert_eq!(senders.len(), 2);
        assert_eq!(senders[1].name.as_str(), "CamB");
        assert_eq!(senders[1].index, 1);
    }
}
