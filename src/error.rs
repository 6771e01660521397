//! Error types for the Spout capture source.
//!
//! None of these are fatal to a source instance. A failed bind attempt leaves
//! the source unbound and it is retried on the next tick (throttled) or the
//! next show/reconfiguration (forced).

use thiserror::Error;

/// Errors raised while discovering, binding, or drawing a Spout sender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The sharing service advertises no senders right now.
    #[error("No Spout senders available")]
    NoSenderAvailable,

    /// The enumeration shrank between `count()` and `name_at()`.
    #[error("No Spout sender at index {index}")]
    NotFound { index: usize },

    /// The service rejected activation, usually because the sender vanished
    /// between enumeration and activation.
    #[error("Failed to activate Spout sender '{name}'")]
    ActivationFailed { name: String },

    /// The named sender is gone or reported a malformed description.
    #[error("Spout sender '{name}' not found or has no usable texture")]
    SenderInfoUnavailable { name: String },

    /// The host refused exclusive access to its graphics context.
    #[error("Host graphics context unavailable")]
    GraphicsContextUnavailable,

    /// The host could not open a local texture on the shared handle.
    #[error("Failed to open shared texture for Spout sender '{name}'")]
    SharedTextureOpenFailed { name: String },

    /// A vendor or host library could not be loaded.
    #[error("Failed to load library: {0}")]
    LibraryLoad(String),

    /// Host settings object could not be interpreted.
    #[error("Invalid source settings: {0}")]
    Settings(String),
}

impl SourceError {
    /// Whether this failure is an expected, transient state of the sharing
    /// service rather than something worth a warning.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::NoSenderAvailable
                | SourceError::NotFound { .. }
                | SourceError::ActivationFailed { .. }
        )
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Settings(err.to_string())
    }
}

/// Result alias used across the crate.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SourceError::NoSenderAvailable.to_string(),
            "No Spout senders available"
        );
        assert_eq!(
            SourceError::SenderInfoUnavailable { name: "CamA".to_string() }.to_string(),
            "Spout sender 'CamA' not found or has no usable texture"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(SourceError::NoSenderAvailable.is_transient());
        assert!(SourceError::ActivationFailed { name: "x".into() }.is_transient());
        assert!(!SourceError::GraphicsContextUnavailable.is_transient());
        assert!(!SourceError::SenderInfoUnavailable { name: "x".into() }.is_transient());
    }
}
