//! `SenderDirectory` backed by SpoutLibrary.dll.

#![cfg(target_os = "windows")]

use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT;

use super::directory::{SenderDirectory, SenderInfo, SenderName};
use super::spout_ffi::SpoutLibrary;
use crate::error::{SourceError, SourceResult};

/// The machine's Spout sender registry, as seen through SpoutLibrary.dll.
pub struct SpoutDirectory {
    spout: SpoutLibrary,
}

impl SpoutDirectory {
    /// Load SpoutLibrary.dll and open a receiver interface.
    pub fn new() -> SourceResult<Self> {
        let spout = SpoutLibrary::new().map_err(SourceError::LibraryLoad)?;
        tracing::info!("Spout: Receiver interface ready");
        Ok(Self { spout })
    }
}

impl SenderDirectory for SpoutDirectory {
    fn count(&self) -> usize {
        self.spout.get_sender_count().max(0) as usize
    }

    fn name_at(&self, index: usize) -> SourceResult<SenderName> {
        let raw_index = i32::try_from(index).map_err(|_| SourceError::NotFound { index })?;
        self.spout
            .get_sender_name(raw_index)
            .map(|name| SenderName::new(&name))
            .ok_or(SourceError::NotFound { index })
    }

    fn activate(&self, name: &SenderName) -> SourceResult<()> {
        if self.spout.set_active_sender(name.as_str()) {
            Ok(())
        } else {
            Err(SourceError::ActivationFailed {
                name: name.to_string(),
            })
        }
    }

    fn info_for(&self, name: &SenderName) -> SourceResult<SenderInfo> {
        let raw = self
            .spout
            .get_sender_info(name.as_str())
            .ok_or_else(|| SourceError::SenderInfoUnavailable {
                name: name.to_string(),
            })?;

        tracing::debug!(
            sender = %name,
            width = raw.width,
            height = raw.height,
            format = ?DXGI_FORMAT(raw.format as i32),
            "Spout: Sender info"
        );

        Ok(SenderInfo {
            width: raw.width,
            height: raw.height,
            handle: raw.share_handle.0 as usize,
            format: raw.format,
        })
    }

    fn release_receiver(&self) {
        self.spout.release_receiver();
    }
}
