//! Hover/focus intent state machine
//!
//! Turns raw pointer-enter/leave and focus/blur signals into a debounced
//! open flag for tooltips and hover cards:
//!
//! ```text
//!            enter/focus              timer
//!   Idle ───────────────▶ PendingOpen ─────▶ Open
//!    ▲  ◀─────────────────┘ leave/blur        │ ▲
//!    │                                 leave/ │ │ enter/
//!    │           timer                  blur  ▼ │ focus
//!    └────────────────────────────── PendingClose
//! ```
//!
//! [`HoverMachine::advance`] is pure: it returns the side effects the caller
//! must perform (cancel a timer, schedule a timer, report an open change).
//! [`HoverMachine::apply`] performs them against a [`TimerQueue`] in the
//! only safe order: cancel first, then schedule, then attach the new handle.
//! The machine tracks the one live handle, so an expiry for any other handle
//! is recognised as stale and ignored.

use crate::timer::{TimerId, TimerQueue};

/// Default delay before a hover-triggered widget opens
pub const DEFAULT_OPEN_DELAY_MS: u64 = 700;

/// Default grace period before a hover-triggered widget closes
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 150;

/// Phase of a hover-triggered widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HoverPhase {
    #[default]
    Idle,
    PendingOpen,
    Open,
    PendingClose,
}

impl HoverPhase {
    /// Whether the content should be shown
    pub fn is_open(self) -> bool {
        matches!(self, HoverPhase::Open | HoverPhase::PendingClose)
    }

    pub fn is_pending(self) -> bool {
        matches!(self, HoverPhase::PendingOpen | HoverPhase::PendingClose)
    }
}

/// Input to the hover machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HoverSignal {
    Enter,
    Leave,
    Focus,
    Blur,
    /// A timer scheduled by this machine fired
    TimerExpired(TimerId),
}

/// Delays and switches for a hover-triggered widget
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HoverConfig {
    /// Delay before opening (ms); 0 opens immediately
    pub open_delay_ms: u64,
    /// Delay before closing (ms); 0 closes immediately
    pub close_delay_ms: u64,
    /// Disabled widgets never leave `Idle`
    pub disabled: bool,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            open_delay_ms: DEFAULT_OPEN_DELAY_MS,
            close_delay_ms: DEFAULT_CLOSE_DELAY_MS,
            disabled: false,
        }
    }
}

impl HoverConfig {
    pub fn open_delay_ms(mut self, delay: u64) -> Self {
        self.open_delay_ms = delay;
        self
    }

    pub fn close_delay_ms(mut self, delay: u64) -> Self {
        self.close_delay_ms = delay;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Side effects of one transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverEffects {
    /// Timer to cancel before anything else
    pub cancel_timer: Option<TimerId>,
    /// Delay (ms) of a timer to schedule and attach
    pub schedule_timer: Option<u64>,
    /// New open flag, when it changed
    pub open_changed: Option<bool>,
}

impl HoverEffects {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Debounced open/closed state driven by hover and focus
#[derive(Clone, Debug, Default)]
pub struct HoverMachine {
    phase: HoverPhase,
    handle: Option<TimerId>,
    config: HoverConfig,
}

impl HoverMachine {
    pub fn new(config: HoverConfig) -> Self {
        Self {
            phase: HoverPhase::Idle,
            handle: None,
            config,
        }
    }

    pub fn phase(&self) -> HoverPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase.is_open()
    }

    /// The live timer, if a transition is pending
    pub fn timer(&self) -> Option<TimerId> {
        self.handle
    }

    pub fn config(&self) -> &HoverConfig {
        &self.config
    }

    /// Compute the transition for `signal`
    ///
    /// The caller must cancel `cancel_timer`, then schedule `schedule_timer`
    /// and hand the new handle to [`attach_timer`](Self::attach_timer).
    pub fn advance(&mut self, signal: HoverSignal) -> HoverEffects {
        use HoverPhase::*;
        use HoverSignal::*;

        if self.config.disabled {
            return HoverEffects::default();
        }

        let before = self.phase;
        let effects = match (self.phase, signal) {
            (Idle, Enter | Focus) => {
                if self.config.open_delay_ms == 0 {
                    self.phase = Open;
                    HoverEffects::default()
                } else {
                    self.phase = PendingOpen;
                    HoverEffects {
                        schedule_timer: Some(self.config.open_delay_ms),
                        ..Default::default()
                    }
                }
            }
            (PendingOpen, Leave | Blur) => {
                self.phase = Idle;
                self.take_timer()
            }
            (Open, Leave | Blur) => {
                if self.config.close_delay_ms == 0 {
                    self.phase = Idle;
                    HoverEffects::default()
                } else {
                    self.phase = PendingClose;
                    HoverEffects {
                        schedule_timer: Some(self.config.close_delay_ms),
                        ..Default::default()
                    }
                }
            }
            (PendingClose, Enter | Focus) => {
                self.phase = Open;
                self.take_timer()
            }
            (PendingOpen | PendingClose, TimerExpired(id)) if self.handle == Some(id) => {
                self.handle = None;
                self.phase = if before == PendingOpen { Open } else { Idle };
                HoverEffects::default()
            }
            (_, TimerExpired(id)) => {
                tracing::warn!(?id, phase = ?self.phase, "stale hover timer ignored");
                HoverEffects::default()
            }
            // Re-entering while pending open, leaving while pending close, etc.
            _ => HoverEffects::default(),
        };

        self.finish(before, effects)
    }

    /// Record the handle of the timer scheduled for the last transition
    pub fn attach_timer(&mut self, id: TimerId) {
        debug_assert!(self.handle.is_none(), "previous hover timer not cancelled");
        self.handle = Some(id);
    }

    /// Close immediately (escape, item chosen, owner closed it)
    pub fn force_close(&mut self) -> HoverEffects {
        let before = self.phase;
        self.phase = HoverPhase::Idle;
        let effects = self.take_timer();
        self.finish(before, effects)
    }

    /// Open immediately, cancelling anything pending
    pub fn force_open(&mut self) -> HoverEffects {
        if self.config.disabled {
            return HoverEffects::default();
        }
        let before = self.phase;
        self.phase = HoverPhase::Open;
        let effects = self.take_timer();
        self.finish(before, effects)
    }

    /// Align the machine with an open flag decided elsewhere
    pub fn sync_open(&mut self, open: bool) -> HoverEffects {
        match (open, self.phase) {
            (true, HoverPhase::Open) | (false, HoverPhase::Idle) => HoverEffects::default(),
            (true, _) => self.force_open(),
            (false, _) => self.force_close(),
        }
    }

    /// Enable or disable; disabling closes
    pub fn set_disabled(&mut self, disabled: bool) -> HoverEffects {
        if disabled {
            let effects = self.force_close();
            self.config.disabled = true;
            effects
        } else {
            self.config.disabled = false;
            HoverEffects::default()
        }
    }

    /// Run `signal` and perform its effects on `timers`
    ///
    /// Returns the new open flag when it changed.
    pub fn apply(&mut self, signal: HoverSignal, timers: &mut TimerQueue) -> Option<bool> {
        let effects = self.advance(signal);
        self.perform(effects, timers)
    }

    /// Perform effects from `advance`/`force_*` against `timers`
    pub fn perform(&mut self, effects: HoverEffects, timers: &mut TimerQueue) -> Option<bool> {
        if let Some(id) = effects.cancel_timer {
            timers.cancel(id);
        }
        if let Some(delay) = effects.schedule_timer {
            let id = timers.schedule(delay);
            self.attach_timer(id);
        }
        effects.open_changed
    }

    /// Cancel whatever is pending; used on unmount regardless of phase
    pub fn teardown(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.handle.take() {
            timers.cancel(id);
        }
        self.phase = HoverPhase::Idle;
    }

    fn take_timer(&mut self) -> HoverEffects {
        HoverEffects {
            cancel_timer: self.handle.take(),
            ..Default::default()
        }
    }

    fn finish(&self, before: HoverPhase, mut effects: HoverEffects) -> HoverEffects {
        if before != self.phase {
            tracing::debug!(from = ?before, to = ?self.phase, "hover phase");
        }
        if before.is_open() != self.phase.is_open() {
            effects.open_changed = Some(self.phase.is_open());
        }
        effects
    }
}
