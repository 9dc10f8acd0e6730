//! Collapsible component for expandable/collapsible content sections
//!
//! A single disclosure: one trigger shows or hides one content region.
//!
//! # Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let section = cn::collapsible().default_open(false).mount(&mut rt).unwrap();
//!
//! section.scoped(&mut rt, |rt| CollapsibleTrigger.press(rt)).unwrap();
//! assert!(section.is_open(&rt));
//! ```

use std::sync::Arc;

use selkit_core::{ContextId, ContextKind, Result, SelectionValue, SelkitRuntime, StoreOptions};

use super::{open_mode, OpenChangeCallback};

pub const COLLAPSIBLE: ContextKind = ContextKind::new("Collapsible");

/// Builder for a collapsible root
#[derive(Default)]
pub struct CollapsibleBuilder {
    open: Option<bool>,
    default_open: bool,
    disabled: bool,
    on_open_change: Option<OpenChangeCallback>,
}

/// Create a collapsible section
pub fn collapsible() -> CollapsibleBuilder {
    CollapsibleBuilder::default()
}

impl CollapsibleBuilder {
    /// Start expanded (uncontrolled)
    pub fn default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    /// Expanded state owned by the caller (controlled)
    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on_open_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_open_change = Some(Arc::new(callback));
        self
    }

    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<Collapsible> {
        let mode = open_mode(self.open, self.default_open, self.on_open_change);
        let id = rt.mount(COLLAPSIBLE, mode, StoreOptions::default());
        rt.register_item(id, TRIGGER, self.disabled)?;
        Ok(Collapsible {
            id,
            disabled: self.disabled,
        })
    }
}

/// A mounted collapsible root
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collapsible {
    id: ContextId,
    disabled: bool,
}

impl Collapsible {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn scoped<R>(&self, rt: &mut SelkitRuntime, f: impl FnOnce(&mut SelkitRuntime) -> R) -> R {
        rt.scoped(COLLAPSIBLE, self.id, f)
    }

    pub fn is_open(&self, rt: &SelkitRuntime) -> bool {
        rt.is_open(self.id).unwrap_or(false)
    }

    pub fn set_open(&self, rt: &mut SelkitRuntime, open: bool) -> Result<()> {
        if self.disabled {
            return Ok(());
        }
        rt.request_change(self.id, SelectionValue::Boolean(open))
    }

    pub fn sync(&self, rt: &mut SelkitRuntime, open: Option<bool>) -> Result<()> {
        rt.sync_external(self.id, open.map(SelectionValue::Boolean))
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        rt.unmount(self.id)
    }
}

/// Item id the trigger is registered under
const TRIGGER: &str = "trigger";

/// The button that flips the section
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollapsibleTrigger;

impl CollapsibleTrigger {
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        let id = rt.lookup(COLLAPSIBLE)?;
        if rt.items(id)?.is_disabled(TRIGGER) {
            return Ok(());
        }
        let open = rt.is_open(id)?;
        rt.request_change(id, SelectionValue::Boolean(!open))
    }

    pub fn is_open(&self, rt: &SelkitRuntime) -> Result<bool> {
        rt.is_open(rt.lookup(COLLAPSIBLE)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selkit_core::EngineError;
    use std::sync::Mutex;

    #[test]
    fn test_trigger_toggles() {
        let mut rt = SelkitRuntime::new();
        let section = collapsible().mount(&mut rt).unwrap();
        for expected in [true, false, true] {
            section.scoped(&mut rt, |rt| CollapsibleTrigger.press(rt)).unwrap();
            assert_eq!(section.is_open(&rt), expected);
        }
    }

    #[test]
    fn test_disabled_trigger_does_nothing() {
        let mut rt = SelkitRuntime::new();
        let section = collapsible().disabled(true).mount(&mut rt).unwrap();
        section.scoped(&mut rt, |rt| CollapsibleTrigger.press(rt)).unwrap();
        assert!(!section.is_open(&rt));
    }

    #[test]
    fn test_controlled_reports_and_waits() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut rt = SelkitRuntime::new();
        let section = collapsible()
            .open(false)
            .on_open_change(move |open| sink.lock().unwrap().push(open))
            .mount(&mut rt)
            .unwrap();

        section.scoped(&mut rt, |rt| CollapsibleTrigger.press(rt)).unwrap();
        assert_eq!(*seen.lock().unwrap(), [true]);
        assert!(!section.is_open(&rt));

        section.sync(&mut rt, Some(true)).unwrap();
        assert!(section.is_open(&rt));
    }

    #[test]
    fn test_mode_flip_reported() {
        let mut rt = SelkitRuntime::new();
        let section = collapsible().open(true).mount(&mut rt).unwrap();
        assert!(matches!(
            section.sync(&mut rt, None),
            Err(EngineError::OwnershipModeChange { .. })
        ));
        assert!(section.is_open(&rt));
    }
}
