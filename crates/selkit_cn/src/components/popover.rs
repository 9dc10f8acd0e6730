//! Popover component - floating content anchored to a trigger
//!
//! Opens on trigger press and closes on a second press, on a pointer-down
//! outside the trigger and content, or on Escape.
//!
//! # Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! // Platform nodes: 1 is the trigger, 2 the content
//! let popover = cn::popover()
//!     .boundary(|node| node == NodeId(1) || node == NodeId(2))
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! popover.scoped(&mut rt, |rt| PopoverTrigger.press(rt)).unwrap();
//! assert!(popover.is_open(&rt));
//!
//! rt.pointer_down(NodeId(99)).unwrap();
//! assert!(!popover.is_open(&rt));
//! ```

use std::sync::Arc;

use selkit_core::{
    ContextId, ContextKind, DismissConfig, DismissReason, NodeId, Result, SelectionValue,
    SelkitRuntime, StoreOptions,
};

use super::{open_mode, OpenChangeCallback};

pub const POPOVER: ContextKind = ContextKind::new("Popover");

type Boundary = Arc<dyn Fn(NodeId) -> bool + Send + Sync>;

/// Builder for a popover root
pub struct PopoverBuilder {
    open: Option<bool>,
    default_open: bool,
    on_open_change: Option<OpenChangeCallback>,
    on_dismiss: Option<Arc<dyn Fn(DismissReason) + Send + Sync>>,
    boundary: Boundary,
    dismiss: DismissConfig,
}

/// Create a popover
pub fn popover() -> PopoverBuilder {
    PopoverBuilder {
        open: None,
        default_open: false,
        on_open_change: None,
        on_dismiss: None,
        boundary: Arc::new(|_| false),
        dismiss: DismissConfig::default(),
    }
}

impl PopoverBuilder {
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

    /// Called when an outside interaction dismisses the popover
    pub fn on_dismiss<F>(mut self, callback: F) -> Self
    where
        F: Fn(DismissReason) + Send + Sync + 'static,
    {
        self.on_dismiss = Some(Arc::new(callback));
        self
    }

    /// Which nodes count as inside the popover (trigger and content)
    pub fn boundary<B>(mut self, boundary: B) -> Self
    where
        B: Fn(NodeId) -> bool + Send + Sync + 'static,
    {
        self.boundary = Arc::new(boundary);
        self
    }

    /// Whether Escape closes the popover (default: true)
    pub fn dismiss_on_escape(mut self, dismiss: bool) -> Self {
        self.dismiss = self.dismiss.dismiss_on_escape(dismiss);
        self
    }

    /// Whether a pointer-down outside closes the popover (default: true)
    pub fn dismiss_on_click_outside(mut self, dismiss: bool) -> Self {
        self.dismiss = self.dismiss.dismiss_on_pointer_down_outside(dismiss);
        self
    }

    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<Popover> {
        let mode = open_mode(self.open, self.default_open, self.on_open_change);
        let id = rt.mount(POPOVER, mode, StoreOptions::default());

        let boundary = self.boundary;
        rt.bind_dismiss(id, move |node| boundary(node), self.dismiss)?;
        if let Some(on_dismiss) = self.on_dismiss {
            rt.on_dismiss(id, move |reason| on_dismiss(reason))?;
        }
        Ok(Popover { id })
    }
}

/// A mounted popover root
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Popover {
    id: ContextId,
}

impl Popover {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn scoped<R>(&self, rt: &mut SelkitRuntime, f: impl FnOnce(&mut SelkitRuntime) -> R) -> R {
        rt.scoped(POPOVER, self.id, f)
    }

    pub fn is_open(&self, rt: &SelkitRuntime) -> bool {
        rt.is_open(self.id).unwrap_or(false)
    }

    pub fn set_open(&self, rt: &mut SelkitRuntime, open: bool) -> Result<()> {
        rt.request_change(self.id, SelectionValue::Boolean(open))
    }

    pub fn sync(&self, rt: &mut SelkitRuntime, open: Option<bool>) -> Result<()> {
        rt.sync_external(self.id, open.map(SelectionValue::Boolean))
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        rt.unmount(self.id)
    }
}

/// The button that opens and closes the popover
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopoverTrigger;

impl PopoverTrigger {
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        let id = rt.lookup(POPOVER)?;
        let open = rt.is_open(id)?;
        rt.request_change(id, SelectionValue::Boolean(!open))
    }
}

/// A close button inside the content
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopoverClose;

impl PopoverClose {
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        let id = rt.lookup(POPOVER)?;
        rt.request_change(id, SelectionValue::closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selkit_core::Key;
    use std::sync::Mutex;

    const TRIGGER: NodeId = NodeId(1);
    const CONTENT: NodeId = NodeId(2);

    fn mount(rt: &mut SelkitRuntime) -> Popover {
        popover()
            .boundary(|node| node == TRIGGER || node == CONTENT)
            .mount(rt)
            .unwrap()
    }

    #[test]
    fn test_trigger_toggles_and_arms() {
        let mut rt = SelkitRuntime::new();
        let pop = mount(&mut rt);

        pop.scoped(&mut rt, |rt| PopoverTrigger.press(rt)).unwrap();
        assert!(pop.is_open(&rt));
        assert_eq!(rt.stats().armed_watchers, 1);

        pop.scoped(&mut rt, |rt| PopoverTrigger.press(rt)).unwrap();
        assert!(!pop.is_open(&rt));
        assert_eq!(rt.stats().armed_watchers, 0);
    }

    #[test]
    fn test_click_inside_keeps_open() {
        let mut rt = SelkitRuntime::new();
        let pop = mount(&mut rt);
        pop.set_open(&mut rt, true).unwrap();

        rt.pointer_down(CONTENT).unwrap();
        assert!(pop.is_open(&rt));
        rt.pointer_down(NodeId(50)).unwrap();
        assert!(!pop.is_open(&rt));
    }

    #[test]
    fn test_escape_closes_innermost_first() {
        let mut rt = SelkitRuntime::new();
        let outer = mount(&mut rt);
        let inner = popover().boundary(|node| node == NodeId(3)).mount(&mut rt).unwrap();
        outer.set_open(&mut rt, true).unwrap();
        inner.set_open(&mut rt, true).unwrap();

        rt.key_down(Key::Escape).unwrap();
        assert!(outer.is_open(&rt));
        assert!(!inner.is_open(&rt));

        rt.key_down(Key::Escape).unwrap();
        assert!(!outer.is_open(&rt));
    }

    #[test]
    fn test_close_button_and_dismiss_callback() {
        let reasons = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reasons);
        let mut rt = SelkitRuntime::new();
        let pop = popover()
            .default_open(true)
            .on_dismiss(move |reason| sink.lock().unwrap().push(reason))
            .mount(&mut rt)
            .unwrap();
        assert_eq!(rt.stats().armed_watchers, 1);

        pop.scoped(&mut rt, |rt| PopoverClose.press(rt)).unwrap();
        assert!(!pop.is_open(&rt));
        // Closing from inside is not a dismissal
        assert!(reasons.lock().unwrap().is_empty());

        pop.set_open(&mut rt, true).unwrap();
        rt.pointer_down(NodeId(8)).unwrap();
        assert_eq!(*reasons.lock().unwrap(), [DismissReason::PointerDownOutside]);
    }

    #[test]
    fn test_escape_disabled() {
        let mut rt = SelkitRuntime::new();
        let pop = popover().dismiss_on_escape(false).default_open(true).mount(&mut rt).unwrap();
        assert!(!rt.key_down(Key::Escape).unwrap());
        assert!(pop.is_open(&rt));
    }

    #[test]
    fn test_unmount_while_open_disarms() {
        let mut rt = SelkitRuntime::new();
        let pop = mount(&mut rt);
        pop.set_open(&mut rt, true).unwrap();
        assert!(pop.unmount(&mut rt));
        assert_eq!(rt.stats().armed_watchers, 0);
        assert_eq!(rt.pointer_down(NodeId(50)).unwrap(), 0);
    }
}
