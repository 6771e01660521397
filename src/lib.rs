//! Spout Capture Source
//!
//! Exposes a single Spout2 sender as a video source inside an OBS-style
//! compositing host. The source discovers a sender, opens the shared DirectX
//! texture it publishes, and draws it every frame, re-binding whenever the
//! sender appears, disappears, or the user picks another one.

pub mod binding;
pub mod clock;
pub mod error;
pub mod graphics;
pub mod module;
pub mod network;
pub mod policy;
pub mod properties;
pub mod settings;
pub mod source;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::{BindTarget, BindingState};
pub use clock::{Clock, SystemClock};
pub use error::{SourceError, SourceResult};
pub use graphics::{GraphicsGuard, GraphicsHost, SharedTexture, TextureId};
pub use module::{SourceInfo, SOURCE_INFO};
pub use network::{SenderDescriptor, SenderDirectory, SenderInfo, SenderName, SharedHandle};
pub use policy::{AttemptTrigger, RebindDecision, RebindPolicy};
pub use properties::SourceProperties;
pub use settings::SourceSettings;
pub use source::SpoutSource;
