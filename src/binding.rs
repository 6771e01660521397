//! Binding of one Spout sender to one source instance.
//!
//! `BindingState` owns the local texture opened on a sender's shared handle.
//! Whether the source is bound is not stored separately: it is the presence
//! of that texture, so the two can never disagree.
//!
//! # Attempt sequence
//!
//! ```text
//! attempt_bind(trigger, now)
//!   ├─ bound?                       → no-op
//!   ├─ unforced and < 5 s since last → no-op
//!   ├─ last_attempt = now
//!   ├─ resolve name   (first available: count → name_at(0) → activate)
//!   ├─ info_for(name) (width, height, shared handle)
//!   └─ [graphics context held] destroy old texture, open new one
//! ```

use std::rc::Rc;
use std::time::Instant;

use crate::error::{SourceError, SourceResult};
use crate::graphics::{GraphicsGuard, GraphicsHost, SharedTexture, TextureId};
use crate::network::{resolve_first, SenderDirectory, SenderName, SharedHandle};
use crate::policy::{AttemptTrigger, RebindDecision, RebindPolicy};

/// Size reported to the host before any sender has been bound.
pub const PLACEHOLDER_SIZE: u32 = 100;

/// Which sender a source should bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindTarget {
    /// Whatever sender the registry lists first at attempt time
    FirstAvailable,
    /// A specific sender by name
    Named(SenderName),
}

/// Result of an attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// A binding was already held; nothing was queried.
    AlreadyBound,
    /// Skipped by the retry throttle; nothing was queried.
    Throttled,
    /// A new binding was established.
    Bound,
}

/// A sender the source currently draws from.
#[derive(Debug)]
struct BoundSender {
    name: SenderName,
    texture: SharedTexture,
}

/// Resolved and validated sender, ready to be opened.
struct UsableSender {
    name: SenderName,
    handle: SharedHandle,
    width: u32,
    height: u32,
}

/// Binding between a source instance and a Spout sender.
pub struct BindingState {
    /// Host name of the owning source, for log lines.
    source_name: String,
    directory: Box<dyn SenderDirectory>,
    graphics: Rc<dyn GraphicsHost>,
    policy: RebindPolicy,

    /// Configured sender name; ignored while `use_first_available` is set.
    target_name: SenderName,
    use_first_available: bool,

    bound: Option<BoundSender>,
    /// Dimensions of the last bound sender.
    width: u32,
    height: u32,

    /// When the registry was last queried for a bind.
    last_attempt: Option<Instant>,
    /// Whether the registry has been queried since the receiver was last released.
    receiver_engaged: bool,
}

impl BindingState {
    pub fn new(
        source_name: impl Into<String>,
        directory: Box<dyn SenderDirectory>,
        graphics: Rc<dyn GraphicsHost>,
        policy: RebindPolicy,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            directory,
            graphics,
            policy,
            target_name: SenderName::default(),
            use_first_available: true,
            bound: None,
            width: PLACEHOLDER_SIZE,
            height: PLACEHOLDER_SIZE,
            last_attempt: None,
            receiver_engaged: false,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Local texture of the bound sender.
    pub fn texture(&self) -> Option<TextureId> {
        self.bound.as_ref().map(|bound| bound.texture.id())
    }

    /// Name of the sender currently bound.
    pub fn bound_sender(&self) -> Option<&SenderName> {
        self.bound.as_ref().map(|bound| &bound.name)
    }

    pub fn target(&self) -> BindTarget {
        if self.use_first_available {
            BindTarget::FirstAvailable
        } else {
            BindTarget::Named(self.target_name.clone())
        }
    }

    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    pub fn directory(&self) -> &dyn SenderDirectory {
        self.directory.as_ref()
    }

    /// Try to bind the target sender.
    ///
    /// Failed attempts leave the state unbound and are recorded in
    /// `last_attempt`, whether or not they were forced.
    pub fn attempt_bind(&mut self, trigger: AttemptTrigger, now: Instant) -> SourceResult<BindOutcome> {
        match self
            .policy
            .decide(self.is_bound(), self.last_attempt, trigger, now)
        {
            RebindDecision::AlreadyBound => return Ok(BindOutcome::AlreadyBound),
            RebindDecision::Throttled { remaining } => {
                tracing::trace!(
                    source = %self.source_name,
                    remaining_ms = remaining.as_millis() as u64,
                    "Spout: Bind attempt throttled"
                );
                return Ok(BindOutcome::Throttled);
            }
            RebindDecision::Attempt => {}
        }

        self.last_attempt = Some(now);

        let name = self.resolve_target()?;
        tracing::info!(source = %self.source_name, sender = %name, %trigger, "Spout: Getting info for sender");

        let sender = self.query_sender(name)?;
        tracing::info!(
            source = %self.source_name,
            sender = %sender.name,
            "Spout: Sender {} is of dimensions {} x {}",
            sender.name,
            sender.width,
            sender.height
        );

        self.install(sender)?;
        Ok(BindOutcome::Bound)
    }

    /// Release the bound texture and the receiver reference. Idempotent.
    pub fn unbind(&mut self) {
        if let Some(bound) = self.bound.take() {
            match GraphicsGuard::acquire(&self.graphics) {
                Ok(guard) => bound.texture.destroy(&guard),
                Err(err) => {
                    tracing::warn!(source = %self.source_name, "Spout: Releasing texture without context: {}", err);
                    drop(bound);
                }
            }
            tracing::info!(source = %self.source_name, "Spout: Released sender texture");
        }

        if self.receiver_engaged {
            self.directory.release_receiver();
            self.receiver_engaged = false;
        }
    }

    /// Change the target sender.
    ///
    /// A bound source drops its binding and re-resolves immediately,
    /// bypassing the retry throttle.
    pub fn set_target(&mut self, name: &str, use_first_available: bool, now: Instant) -> SourceResult<()> {
        self.target_name = SenderName::new(name);
        self.use_first_available = use_first_available;

        if self.is_bound() {
            self.unbind();
            self.attempt_bind(AttemptTrigger::Reconfigure, now)?;
        }
        Ok(())
    }

    fn resolve_target(&mut self) -> SourceResult<SenderName> {
        match self.target() {
            BindTarget::FirstAvailable => {
                self.receiver_engaged = true;
                resolve_first(self.directory.as_ref())
            }
            BindTarget::Named(name) if name.is_empty() => Err(SourceError::NoSenderAvailable),
            BindTarget::Named(name) => Ok(name),
        }
    }

    fn query_sender(&mut self, name: SenderName) -> SourceResult<UsableSender> {
        self.receiver_engaged = true;
        let info = self.directory.info_for(&name)?;

        match info.shared_handle() {
            Some(handle) if info.is_usable() => Ok(UsableSender {
                name,
                handle,
                width: info.width,
                height: info.height,
            }),
            _ => {
                tracing::warn!(
                    source = %self.source_name,
                    sender = %name,
                    "Spout: Named sender not usable w: {}, h: {}",
                    info.width,
                    info.height
                );
                Err(SourceError::SenderInfoUnavailable {
                    name: name.to_string(),
                })
            }
        }
    }

    fn install(&mut self, sender: UsableSender) -> SourceResult<()> {
        let guard = GraphicsGuard::acquire(&self.graphics)?;

        if let Some(previous) = self.bound.take() {
            tracing::warn!(source = %self.source_name, sender = %previous.name, "Spout: Replacing stale texture");
            previous.texture.destroy(&guard);
        }

        let texture = guard
            .open_shared(sender.handle)
            .ok_or_else(|| SourceError::SharedTextureOpenFailed {
                name: sender.name.to_string(),
            })?;

        self.width = sender.width;
        self.height = sender.height;
        self.bound = Some(BoundSender {
            name: sender.name,
            texture,
        });
        Ok(())
    }
}

impl Drop for BindingState {
    fn drop(&mut self) {
        self.unbind();
    }
}
