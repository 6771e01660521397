//! Host graphics context and the locally owned shared texture.
//!
//! The host serializes access to its rendering context across all sources.
//! Every texture creation or destruction must happen while the context is
//! held, which is what [`GraphicsGuard`] enforces: it enters the context on
//! acquisition and leaves it when dropped, on every exit path.
//!
//! ```text
//! producer process            this source
//! ┌──────────────┐            ┌─────────────────────────────┐
//! │ DX texture   │──handle──▶ │ SharedTexture (local wrap)  │
//! │ (owned there)│            │  destroyed here, handle not │
//! └──────────────┘            └─────────────────────────────┘
//! ```

#[cfg(target_os = "windows")]
pub mod obs_graphics;

use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

use crate::error::SourceResult;
use crate::network::SharedHandle;

#[cfg(target_os = "windows")]
pub use obs_graphics::ObsGraphics;

/// Host-side identifier of a local texture object.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(NonZeroUsize);

impl TextureId {
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({:#x})", self.0.get())
    }
}

/// Rendering primitives of the host application.
pub trait GraphicsHost {
    /// Take exclusive access to the host's graphics context.
    fn enter(&self) -> SourceResult<()>;

    /// Give the graphics context back.
    fn leave(&self);

    /// Open a local texture wrapping a shared handle. Context must be held.
    fn open_shared(&self, handle: SharedHandle) -> Option<TextureId>;

    /// Destroy a local texture. Context must be held.
    fn destroy(&self, texture: TextureId);

    /// Draw `texture` once, opaque-blended, at `width` x `height` pixels.
    ///
    /// Only called from the host's render callback, which already holds the
    /// context.
    fn draw_opaque(&self, texture: TextureId, width: u32, height: u32);
}

/// Scoped ownership of the host graphics context.
pub struct GraphicsGuard<'a> {
    host: &'a Rc<dyn GraphicsHost>,
}

impl<'a> GraphicsGuard<'a> {
    pub fn acquire(host: &'a Rc<dyn GraphicsHost>) -> SourceResult<Self> {
        host.enter()?;
        Ok(Self { host })
    }

    /// Open a local texture on `handle` while the context is held.
    pub fn open_shared(&self, handle: SharedHandle) -> Option<SharedTexture> {
        let texture = self.host.open_shared(handle)?;
        tracing::debug!(?handle, ?texture, "Opened shared texture");
        Some(SharedTexture {
            host: Rc::clone(self.host),
            texture,
            handle,
            live: true,
        })
    }
}

impl Drop for GraphicsGuard<'_> {
    fn drop(&mut self) {
        self.host.leave();
    }
}

/// Local texture wrapping a sender's shared handle.
///
/// Destroying it only destroys the local wrapper. The shared handle remains
/// owned by the producer.
pub struct SharedTexture {
    host: Rc<dyn GraphicsHost>,
    texture: TextureId,
    handle: SharedHandle,
    live: bool,
}

impl SharedTexture {
    pub fn id(&self) -> TextureId {
        self.texture
    }

    /// Destroy the local texture under an already-held context.
    pub fn destroy(mut self, _guard: &GraphicsGuard<'_>) {
        self.live = false;
        self.host.destroy(self.texture);
        tracing::debug!(texture = ?self.texture, "Destroyed shared texture");
    }
}

impl fmt::Debug for SharedTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTexture")
            .field("texture", &self.texture)
            .field("handle", &self.handle)
            .finish()
    }
}

impl Drop for SharedTexture {
    fn drop(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;

        match GraphicsGuard::acquire(&self.host) {
            Ok(_guard) => self.host.destroy(self.texture),
            Err(err) => tracing::error!(
                texture = ?self.texture,
                "Leaking shared texture: {}",
                err
            ),
        }
    }
}
