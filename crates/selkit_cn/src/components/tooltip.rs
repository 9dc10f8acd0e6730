//! Tooltip component - short hint shown after hovering or focusing a trigger
//!
//! Opens once the pointer has rested on the trigger (or it held focus) for
//! the open delay, closes a short grace period after it leaves. Escape and
//! pressing the trigger close it at once.
//!
//! # Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let tip = cn::tooltip().mount(&mut rt).unwrap();
//!
//! tip.pointer_enter(&mut rt).unwrap();
//! rt.advance_time(700).unwrap();
//! assert!(tip.is_open(&rt));
//!
//! tip.pointer_leave(&mut rt).unwrap();
//! rt.advance_time(850).unwrap();
//! assert!(!tip.is_open(&rt));
//! ```

use std::sync::Arc;

use selkit_core::{
    ContextId, ContextKind, HoverConfig, HoverPhase, HoverSignal, Result, SelectionValue,
    SelkitRuntime, StoreOptions,
};

use super::{open_mode, OpenChangeCallback};

pub const TOOLTIP: ContextKind = ContextKind::new("Tooltip");

/// Builder for a tooltip
pub struct TooltipBuilder {
    open: Option<bool>,
    default_open: bool,
    on_open_change: Option<OpenChangeCallback>,
    hover: HoverConfig,
}

/// Create a tooltip (700ms open delay, 150ms close delay)
pub fn tooltip() -> TooltipBuilder {
    TooltipBuilder {
        open: None,
        default_open: false,
        on_open_change: None,
        hover: HoverConfig::default(),
    }
}

impl TooltipBuilder {
    pub fn default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    pub fn on_open_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_open_change = Some(Arc::new(callback));
        self
    }

    /// Set the delay before opening (in milliseconds)
    pub fn open_delay_ms(mut self, delay: u64) -> Self {
        self.hover = self.hover.open_delay_ms(delay);
        self
    }

    /// Set the delay before closing (in milliseconds)
    pub fn close_delay_ms(mut self, delay: u64) -> Self {
        self.hover = self.hover.close_delay_ms(delay);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.hover = self.hover.disabled(disabled);
        self
    }

    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<Tooltip> {
        let mode = open_mode(self.open, self.default_open, self.on_open_change);
        let id = rt.mount(TOOLTIP, mode, StoreOptions::default());
        rt.bind_hover(id, self.hover)?;
        Ok(Tooltip { id })
    }
}

/// A mounted tooltip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tooltip {
    id: ContextId,
}

impl Tooltip {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn is_open(&self, rt: &SelkitRuntime) -> bool {
        rt.is_open(self.id).unwrap_or(false)
    }

    pub fn phase(&self, rt: &SelkitRuntime) -> HoverPhase {
        rt.hover_phase(self.id).unwrap_or_default()
    }

    pub fn pointer_enter(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Enter)
    }

    pub fn pointer_leave(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Leave)
    }

    pub fn focus(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Focus)
    }

    pub fn blur(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Blur)
    }

    /// Pressing the trigger hides the hint
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover_force_close(self.id)
    }

    pub fn set_disabled(&self, rt: &mut SelkitRuntime, disabled: bool) -> Result<()> {
        rt.set_hover_disabled(self.id, disabled)
    }

    pub fn sync(&self, rt: &mut SelkitRuntime, open: Option<bool>) -> Result<()> {
        rt.sync_external(self.id, open.map(SelectionValue::Boolean))
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        rt.unmount(self.id)
    }
}
