//! `GraphicsHost` backed by libobs' graphics subsystem.
//!
//! The symbols are resolved at runtime from the already-loaded `obs.dll`,
//! the same way SpoutLibrary.dll is loaded, so the plugin does not need an
//! import library at build time.

#![cfg(target_os = "windows")]

use std::ffi::{c_char, c_void};

use crate::error::{SourceError, SourceResult};
use crate::network::SharedHandle;

use super::{GraphicsHost, TextureId};

/// `enum obs_base_effect` value of the opaque effect.
const OBS_EFFECT_OPAQUE: i32 = 2;

/// Technique name used by the base effects.
const DRAW_TECHNIQUE: &[u8] = b"Draw\0";

type EnterGraphicsFn = unsafe extern "C" fn();
type LeaveGraphicsFn = unsafe extern "C" fn();
type GetContextFn = unsafe extern "C" fn() -> *mut c_void;
type TextureOpenSharedFn = unsafe extern "C" fn(u32) -> *mut c_void;
type TextureDestroyFn = unsafe extern "C" fn(*mut c_void);
type GetBaseEffectFn = unsafe extern "C" fn(i32) -> *mut c_void;
type EffectLoopFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> bool;
type SourceDrawFn = unsafe extern "C" fn(*mut c_void, i32, i32, u32, u32, bool);

/// Graphics entry points of the host, resolved from obs.dll.
pub struct ObsGraphics {
    enter_graphics: EnterGraphicsFn,
    leave_graphics: LeaveGraphicsFn,
    get_context: GetContextFn,
    texture_open_shared: TextureOpenSharedFn,
    texture_destroy: TextureDestroyFn,
    get_base_effect: GetBaseEffectFn,
    effect_loop: EffectLoopFn,
    source_draw: SourceDrawFn,
    /// DLL handle to keep the function pointers valid
    _dll: libloading::Library,
}

impl ObsGraphics {
    /// Resolve the graphics entry points from obs.dll.
    pub fn load() -> SourceResult<Self> {
        unsafe {
            let dll = libloading::Library::new("obs.dll")
                .map_err(|e| SourceError::LibraryLoad(format!("obs.dll: {}", e)))?;

            let enter_graphics = *symbol::<EnterGraphicsFn>(&dll, b"obs_enter_graphics\0")?;
            let leave_graphics = *symbol::<LeaveGraphicsFn>(&dll, b"obs_leave_graphics\0")?;
            let get_context = *symbol::<GetContextFn>(&dll, b"gs_get_context\0")?;
            let texture_open_shared =
                *symbol::<TextureOpenSharedFn>(&dll, b"gs_texture_open_shared\0")?;
            let texture_destroy = *symbol::<TextureDestroyFn>(&dll, b"gs_texture_destroy\0")?;
            let get_base_effect = *symbol::<GetBaseEffectFn>(&dll, b"obs_get_base_effect\0")?;
            let effect_loop = *symbol::<EffectLoopFn>(&dll, b"gs_effect_loop\0")?;
            let source_draw = *symbol::<SourceDrawFn>(&dll, b"obs_source_draw\0")?;

            let graphics = Self {
                enter_graphics,
                leave_graphics,
                get_context,
                texture_open_shared,
                texture_destroy,
                get_base_effect,
                effect_loop,
                source_draw,
                _dll: dll,
            };

            log::info!("OBS: Resolved graphics entry points from obs.dll");
            Ok(graphics)
        }
    }
}

unsafe fn symbol<'a, T>(
    dll: &'a libloading::Library,
    name: &[u8],
) -> SourceResult<libloading::Symbol<'a, T>> {
    dll.get(name).map_err(|e| {
        SourceError::LibraryLoad(format!(
            "obs.dll is missing {}: {}",
            String::from_utf8_lossy(&name[..name.len() - 1]),
            e
        ))
    })
}

impl GraphicsHost for ObsGraphics {
    fn enter(&self) -> SourceResult<()> {
        unsafe {
            (self.enter_graphics)();
            // obs_enter_graphics silently does nothing without a graphics subsystem
            if (self.get_context)().is_null() {
                return Err(SourceError::GraphicsContextUnavailable);
            }
        }
        Ok(())
    }

    fn leave(&self) {
        unsafe { (self.leave_graphics)() }
    }

    fn open_shared(&self, handle: SharedHandle) -> Option<TextureId> {
        // DXGI shared handles only carry 32 significant bits
        let texture = unsafe { (self.texture_open_shared)(handle.as_raw() as u32) };
        TextureId::from_raw(texture as usize)
    }

    fn destroy(&self, texture: TextureId) {
        unsafe { (self.texture_destroy)(texture.as_raw() as *mut c_void) }
    }

    fn draw_opaque(&self, texture: TextureId, width: u32, height: u32) {
        unsafe {
            let effect = (self.get_base_effect)(OBS_EFFECT_OPAQUE);
            if effect.is_null() {
                log::warn!("OBS: Opaque effect unavailable, skipping draw");
                return;
            }
            while (self.effect_loop)(effect, DRAW_TECHNIQUE.as_ptr() as *const c_char) {
                (self.source_draw)(texture.as_raw() as *mut c_void, 0, 0, width, height, false);
            }
        }
    }
}
