//! Host-facing Spout capture source.
//!
//! `SpoutSource` implements the host's per-source callbacks (create, update,
//! show, hide, tick, render, size, properties, destroy) on top of
//! [`BindingState`]. All callbacks arrive on the host's graphics thread, one
//! at a time.

use std::rc::Rc;

use serde_json::Value;

use crate::binding::{BindOutcome, BindingState};
use crate::clock::Clock;
use crate::error::SourceResult;
use crate::graphics::GraphicsHost;
use crate::network::SenderDirectory;
use crate::policy::{AttemptTrigger, RebindPolicy};
use crate::properties::SourceProperties;
use crate::settings::SourceSettings;

/// A Spout receiver presented to the host as a video source.
pub struct SpoutSource {
    /// Host-visible source name, for log lines
    name: String,
    binding: BindingState,
    graphics: Rc<dyn GraphicsHost>,
    clock: Box<dyn Clock>,
    settings: SourceSettings,
    /// Whether the host is currently displaying this source
    active: bool,
    /// Set between `hide()` and the next `show()`; suspends tick retries
    hidden: bool,
}

impl SpoutSource {
    /// Create a source from the host's settings object.
    pub fn create(
        name: impl Into<String>,
        settings: &Value,
        directory: Box<dyn SenderDirectory>,
        graphics: Rc<dyn GraphicsHost>,
        clock: Box<dyn Clock>,
    ) -> SourceResult<Self> {
        Self::create_with_policy(name, settings, directory, graphics, clock, RebindPolicy::default())
    }

    pub fn create_with_policy(
        name: impl Into<String>,
        settings: &Value,
        directory: Box<dyn SenderDirectory>,
        graphics: Rc<dyn GraphicsHost>,
        clock: Box<dyn Clock>,
        policy: RebindPolicy,
    ) -> SourceResult<Self> {
        let name = name.into();
        tracing::info!(source = %name, "Spout: Initialising source");

        let binding = BindingState::new(name.clone(), directory, Rc::clone(&graphics), policy);
        let mut source = Self {
            name,
            binding,
            graphics,
            clock,
            settings: SourceSettings::default(),
            active: false,
            hidden: false,
        };
        source.update(settings)?;
        Ok(source)
    }

    /// Create a source bound to the machine's Spout registry and the host's
    /// graphics subsystem.
    #[cfg(target_os = "windows")]
    pub fn create_native(name: impl Into<String>, settings: &Value) -> SourceResult<Self> {
        let directory = crate::network::SpoutDirectory::new()?;
        let graphics = crate::graphics::ObsGraphics::load()?;
        Self::create(
            name,
            settings,
            Box::new(directory),
            Rc::new(graphics),
            Box::new(crate::clock::SystemClock),
        )
    }

    /// Display name of the source type.
    pub fn display_name() -> &'static str {
        crate::module::SOURCE_INFO.display_name
    }

    /// Default settings for new sources.
    pub fn defaults() -> Value {
        SourceSettings::defaults_json()
    }

    /// Apply new settings from the host.
    ///
    /// A bound source re-binds immediately when its target changes.
    pub fn update(&mut self, settings: &Value) -> SourceResult<()> {
        let settings = SourceSettings::from_json(settings)?;
        let now = self.clock.now();

        if let Err(err) = self.binding.set_target(
            &settings.custom_spout_name,
            settings.use_first_available_sender,
            now,
        ) {
            self.log_failure(AttemptTrigger::Reconfigure, &err);
        }

        self.settings = settings;
        Ok(())
    }

    /// The source became visible: bind without waiting for the throttle.
    pub fn show(&mut self) {
        self.hidden = false;
        self.attempt(AttemptTrigger::Show);
    }

    /// The source was hidden: release the GPU resource and stop retrying
    /// until it is shown again.
    pub fn hide(&mut self) {
        self.hidden = true;
        self.binding.unbind();
    }

    /// Per-frame update. The host ticks hidden sources too.
    pub fn tick(&mut self, active: bool, _seconds: f32) {
        self.active = active;
        if !self.hidden && !self.binding.is_bound() {
            self.attempt(AttemptTrigger::Tick);
        }
    }

    /// Draw the bound texture. Returns whether a draw was issued.
    pub fn render(&self) -> bool {
        if !self.active {
            tracing::trace!(source = %self.name, "Spout: inactive");
            return false;
        }

        if !self.binding.is_bound() {
            tracing::trace!(source = %self.name, "Spout: unbound");
            return false;
        }

        let Some(texture) = self.binding.texture() else {
            tracing::trace!(source = %self.name, "Spout: no texture");
            return false;
        };

        self.graphics
            .draw_opaque(texture, self.binding.width(), self.binding.height());
        true
    }

    pub fn width(&self) -> u32 {
        self.binding.width()
    }

    pub fn height(&self) -> u32 {
        self.binding.height()
    }

    /// Properties sheet, listing the senders advertised right now.
    pub fn properties(&self) -> SourceProperties {
        SourceProperties::build(self.binding.directory())
    }

    /// Tear the source down, releasing the texture and the receiver.
    pub fn destroy(mut self) {
        self.binding.unbind();
        tracing::info!(source = %self.name, "Spout: Source destroyed");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    pub fn binding(&self) -> &BindingState {
        &self.binding
    }

    fn attempt(&mut self, trigger: AttemptTrigger) {
        let now = self.clock.now();
        match self.binding.attempt_bind(trigger, now) {
            Ok(BindOutcome::Bound) => {
                tracing::info!(
                    source = %self.name,
                    %trigger,
                    "Spout: Bound ({}x{})",
                    self.binding.width(),
                    self.binding.height()
                );
            }
            Ok(_) => {}
            Err(err) => self.log_failure(trigger, &err),
        }
    }

    fn log_failure(&self, trigger: AttemptTrigger, err: &crate::error::SourceError) {
        if err.is_transient() {
            tracing::info!(source = %self.name, %trigger, "Spout: {}", err);
        } else {
            tracing::warn!(source = %self.name, %trigger, "Spout: {}", err);
        }
    }
}
