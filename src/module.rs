//! Registration metadata and module lifecycle.

use std::sync::{Mutex, Once};

use crate::telemetry::{init_logging, LogConfig, LogGuard};

/// Ensure logging is initialized exactly once per process
static MODULE_INIT: Once = Once::new();

/// Keeps the file writer alive until the module unloads.
static LOG_GUARD: Mutex<Option<LogGuard>> = Mutex::new(None);

/// Kind of source, as the host classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Input,
    Filter,
    Transition,
}

/// Capabilities advertised to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFlags {
    /// Produces video
    pub video: bool,
    /// Draws itself instead of going through the host's default effect
    pub custom_draw: bool,
}

/// Static description of the source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub source_type: SourceType,
    pub output_flags: OutputFlags,
}

pub const SOURCE_INFO: SourceInfo = SourceInfo {
    id: "spout_capture",
    display_name: "Spout2 Capture",
    source_type: SourceType::Input,
    output_flags: OutputFlags {
        video: true,
        custom_draw: true,
    },
};

/// Module load: set up logging and return the source description to register.
pub fn load(config: &LogConfig) -> &'static SourceInfo {
    MODULE_INIT.call_once(|| match init_logging(config) {
        Ok(guard) => {
            if let Ok(mut slot) = LOG_GUARD.lock() {
                *slot = guard;
            }
            tracing::info!(id = SOURCE_INFO.id, "Spout: Module loaded");
        }
        Err(e) => {
            // The host owns the global subscriber; keep using it
            tracing::debug!("Spout: Logging not initialized: {}", e);
        }
    });
    &SOURCE_INFO
}

/// Module unload: flush and close the log file, if any.
pub fn unload() {
    if let Ok(mut slot) = LOG_GUARD.lock() {
        slot.take();
    }
}
