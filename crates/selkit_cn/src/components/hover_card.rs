//! Hover Card component - content revealed on hover with delay
//!
//! Like a tooltip, but for richer content the user may move the pointer
//! into. Leaving the trigger starts the close delay; entering the card
//! before it runs out keeps the card open.
//!
//! # Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let card = cn::hover_card().mount(&mut rt).unwrap();
//!
//! card.trigger_enter(&mut rt).unwrap();
//! rt.advance_time(500).unwrap();
//! assert!(card.is_open(&rt));
//!
//! // Pointer travels from the trigger into the card
//! card.trigger_leave(&mut rt).unwrap();
//! rt.advance_time(600).unwrap();
//! card.content_enter(&mut rt).unwrap();
//! rt.advance_time(2_000).unwrap();
//! assert!(card.is_open(&rt));
//! ```

use std::sync::Arc;

use selkit_core::{
    ContextId, ContextKind, HoverConfig, HoverSignal, Result, SelectionValue, SelkitRuntime,
    StoreOptions,
};

use super::{open_mode, OpenChangeCallback};

pub const HOVER_CARD: ContextKind = ContextKind::new("HoverCard");

/// Default delay before showing (ms)
pub const HOVER_CARD_OPEN_DELAY_MS: u64 = 500;

/// Default delay before hiding (ms)
pub const HOVER_CARD_CLOSE_DELAY_MS: u64 = 300;

/// Builder for a hover card
pub struct HoverCardBuilder {
    open: Option<bool>,
    default_open: bool,
    on_open_change: Option<OpenChangeCallback>,
    hover: HoverConfig,
}

/// Create a hover card
pub fn hover_card() -> HoverCardBuilder {
    HoverCardBuilder {
        open: None,
        default_open: false,
        on_open_change: None,
        hover: HoverConfig::default()
            .open_delay_ms(HOVER_CARD_OPEN_DELAY_MS)
            .close_delay_ms(HOVER_CARD_CLOSE_DELAY_MS),
    }
}

impl HoverCardBuilder {
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

    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<HoverCard> {
        let mode = open_mode(self.open, self.default_open, self.on_open_change);
        let id = rt.mount(HOVER_CARD, mode, StoreOptions::default());
        rt.bind_hover(id, self.hover)?;
        Ok(HoverCard { id })
    }
}

/// A mounted hover card
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoverCard {
    id: ContextId,
}

impl HoverCard {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn is_open(&self, rt: &SelkitRuntime) -> bool {
        rt.is_open(self.id).unwrap_or(false)
    }

    pub fn trigger_enter(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Enter)
    }

    pub fn trigger_leave(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Leave)
    }

    pub fn trigger_focus(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Focus)
    }

    pub fn trigger_blur(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Blur)
    }

    /// The pointer moved onto the open card
    pub fn content_enter(&self, rt: &mut SelkitRuntime) -> Result<()> {
        if !self.is_open(rt) {
            return Ok(());
        }
        rt.hover(self.id, HoverSignal::Enter)
    }

    pub fn content_leave(&self, rt: &mut SelkitRuntime) -> Result<()> {
        rt.hover(self.id, HoverSignal::Leave)
    }

    pub fn sync(&self, rt: &mut SelkitRuntime, open: Option<bool>) -> Result<()> {
        rt.sync_external(self.id, open.map(SelectionValue::Boolean))
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        rt.unmount(self.id)
    }
}
