//! Deterministic fakes for the sender registry, host graphics and clock.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::{SourceError, SourceResult};
use crate::graphics::{GraphicsHost, TextureId};
use crate::network::{SenderDirectory, SenderInfo, SenderName, SharedHandle};

struct FakeSender {
    name: String,
    info: SenderInfo,
}

#[derive(Default)]
struct DirectoryState {
    senders: Vec<FakeSender>,
    active: Option<String>,
    next_handle: usize,
    count_calls: usize,
    name_calls: usize,
    info_calls: usize,
    activations: usize,
    releases: usize,
    reject_activation: bool,
    vanish_on_activate: bool,
}

/// In-memory sender registry. Clones share the same registry.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Rc<RefCell<DirectoryState>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sender(&self, name: &str, width: u32, height: u32) {
        let handle = {
            let mut state = self.state.borrow_mut();
            state.next_handle += 1;
            0x1000 + state.next_handle * 0x10
        };
        self.add_sender_with_handle(name, width, height, handle);
    }

    pub fn add_sender_with_handle(&self, name: &str, width: u32, height: u32, handle: usize) {
        self.state.borrow_mut().senders.push(FakeSender {
            name: name.to_string(),
            info: SenderInfo {
                width,
                height,
                handle,
                format: 87,
            },
        });
    }

    pub fn remove_sender(&self, name: &str) {
        self.state.borrow_mut().senders.retain(|s| s.name != name);
    }

    pub fn clear(&self) {
        self.state.borrow_mut().senders.clear();
    }

    pub fn reject_activation(&self, reject: bool) {
        self.state.borrow_mut().reject_activation = reject;
    }

    /// Make the activated sender disappear right after activation succeeds.
    pub fn vanish_on_activate(&self, vanish: bool) {
        self.state.borrow_mut().vanish_on_activate = vanish;
    }

    pub fn active_sender(&self) -> Option<String> {
        self.state.borrow().active.clone()
    }

    pub fn activations(&self) -> usize {
        self.state.borrow().activations
    }

    pub fn info_queries(&self) -> usize {
        self.state.borrow().info_calls
    }

    pub fn receiver_releases(&self) -> usize {
        self.state.borrow().releases
    }

    /// Every call that reads or mutates the registry.
    pub fn queries(&self) -> usize {
        let state = self.state.borrow();
        state.count_calls + state.name_calls + state.info_calls + state.activations
    }
}

impl SenderDirectory for FakeDirectory {
    fn count(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.count_calls += 1;
        state.senders.len()
    }

    fn name_at(&self, index: usize) -> SourceResult<SenderName> {
        let mut state = self.state.borrow_mut();
        state.name_calls += 1;
        state
            .senders
            .get(index)
            .map(|s| SenderName::new(&s.name))
            .ok_or(SourceError::NotFound { index })
    }

    fn activate(&self, name: &SenderName) -> SourceResult<()> {
        let mut state = self.state.borrow_mut();
        state.activations += 1;

        let known = state.senders.iter().any(|s| s.name == name.as_str());
        if state.reject_activation || !known {
            return Err(SourceError::ActivationFailed {
                name: name.to_string(),
            });
        }

        state.active = Some(name.to_string());
        if state.vanish_on_activate {
            state.senders.retain(|s| s.name != name.as_str());
        }
        Ok(())
    }

    fn info_for(&self, name: &SenderName) -> SourceResult<SenderInfo> {
        let mut state = self.state.borrow_mut();
        state.info_calls += 1;
        state
            .senders
            .iter()
            .find(|s| s.name == name.as_str())
            .map(|s| s.info)
            .ok_or_else(|| SourceError::SenderInfoUnavailable {
                name: name.to_string(),
            })
    }

    fn release_receiver(&self) {
        self.state.borrow_mut().releases += 1;
    }
}

#[derive(Default)]
struct GraphicsState {
    unavailable: bool,
    fail_open: bool,
    depth: usize,
    entered: usize,
    next_texture: usize,
    live: Vec<TextureId>,
    opened: usize,
    destroyed: Vec<TextureId>,
    opened_outside_context: usize,
    destroyed_outside_context: usize,
    draws: Vec<(TextureId, u32, u32)>,
}

/// Host graphics that tracks context depth and texture lifetimes.
#[derive(Default)]
pub struct FakeGraphics {
    state: RefCell<GraphicsState>,
}

impl FakeGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_context_available(&self, available: bool) {
        self.state.borrow_mut().unavailable = !available;
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.borrow_mut().fail_open = fail;
    }

    pub fn depth(&self) -> usize {
        self.state.borrow().depth
    }

    pub fn entered(&self) -> usize {
        self.state.borrow().entered
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn opened(&self) -> usize {
        self.state.borrow().opened
    }

    pub fn destroyed(&self) -> usize {
        self.state.borrow().destroyed.len()
    }

    pub fn was_destroyed(&self, texture: TextureId) -> bool {
        self.state.borrow().destroyed.contains(&texture)
    }

    pub fn opened_outside_context(&self) -> usize {
        self.state.borrow().opened_outside_context
    }

    pub fn destroyed_outside_context(&self) -> usize {
        self.state.borrow().destroyed_outside_context
    }

    pub fn draws(&self) -> Vec<(TextureId, u32, u32)> {
        self.state.borrow().draws.clone()
    }
}

impl GraphicsHost for FakeGraphics {
    fn enter(&self) -> SourceResult<()> {
        let mut state = self.state.borrow_mut();
        if state.unavailable {
            return Err(SourceError::GraphicsContextUnavailable);
        }
        state.depth += 1;
        state.entered += 1;
        Ok(())
    }

    fn leave(&self) {
        let mut state = self.state.borrow_mut();
        assert!(state.depth > 0, "leave without matching enter");
        state.depth -= 1;
    }

    fn open_shared(&self, _handle: SharedHandle) -> Option<TextureId> {
        let mut state = self.state.borrow_mut();
        if state.depth == 0 {
            state.opened_outside_context += 1;
        }
        if state.fail_open {
            return None;
        }
        state.next_texture += 1;
        let texture = TextureId::from_raw(state.next_texture)?;
        state.live.push(texture);
        state.opened += 1;
        Some(texture)
    }

    fn destroy(&self, texture: TextureId) {
        let mut state = self.state.borrow_mut();
        if state.depth == 0 {
            state.destroyed_outside_context += 1;
        }
        state.live.retain(|t| *t != texture);
        state.destroyed.push(texture);
    }

    fn draw_opaque(&self, texture: TextureId, width: u32, height: u32) {
        self.state.borrow_mut().draws.push((texture, width, height));
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
