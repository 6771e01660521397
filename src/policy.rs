//! When to (re)try binding a sender.
//!
//! Passive per-frame polling is throttled so a source with no sender does not
//! hit the Spout registry every frame. Explicit events (the source becoming
//! visible, the user changing the target) bypass the throttle.

use std::fmt;
use std::time::{Duration, Instant};

/// Minimum interval between unforced bind attempts.
pub const DEFAULT_RETRY_THROTTLE: Duration = Duration::from_millis(5000);

/// What caused a bind attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptTrigger {
    /// Per-frame polling while unbound
    Tick,
    /// The source became visible
    Show,
    /// The target sender was changed
    Reconfigure,
}

impl AttemptTrigger {
    pub fn is_forced(self) -> bool {
        !matches!(self, AttemptTrigger::Tick)
    }
}

impl fmt::Display for AttemptTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptTrigger::Tick => write!(f, "tick"),
            AttemptTrigger::Show => write!(f, "show"),
            AttemptTrigger::Reconfigure => write!(f, "reconfigure"),
        }
    }
}

/// Outcome of [`RebindPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindDecision {
    /// A binding is held; rebinding only follows an explicit unbind.
    AlreadyBound,
    /// Too soon after the previous attempt.
    Throttled { remaining: Duration },
    /// Query the registry now.
    Attempt,
}

/// Throttle for unforced bind attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebindPolicy {
    throttle: Duration,
}

impl RebindPolicy {
    pub fn new(throttle: Duration) -> Self {
        Self { throttle }
    }

    pub fn decide(
        &self,
        is_bound: bool,
        last_attempt: Option<Instant>,
        trigger: AttemptTrigger,
        now: Instant,
    ) -> RebindDecision {
        if is_bound {
            return RebindDecision::AlreadyBound;
        }
        if trigger.is_forced() {
            return RebindDecision::Attempt;
        }

        match last_attempt {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.throttle {
                    RebindDecision::Throttled {
                        remaining: self.throttle - elapsed,
                    }
                } else {
                    RebindDecision::Attempt
                }
            }
            None => RebindDecision::Attempt,
        }
    }
}

impl Default for RebindPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_THROTTLE)
    }
}
