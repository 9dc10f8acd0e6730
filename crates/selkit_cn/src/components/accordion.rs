//! Accordion component for expandable content sections
//!
//! A set of vertically stacked collapsible sections. Supports single-open
//! (only one section open at a time) or multi-open modes.
//!
//! # Example - Single Open
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let accordion = cn::accordion()
//!     .item("section-1")
//!     .item("section-2")
//!     .item("section-3")
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! // The trigger of section 2 was clicked
//! accordion
//!     .scoped(&mut rt, |rt| AccordionTrigger::new("section-2").press(rt))
//!     .unwrap();
//! assert!(accordion.is_open(&rt, "section-2"));
//!
//! // Clicking it again collapses it
//! accordion
//!     .scoped(&mut rt, |rt| AccordionTrigger::new("section-2").press(rt))
//!     .unwrap();
//! assert!(!accordion.is_open(&rt, "section-2"));
//! ```
//!
//! # Multi-Open Mode
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let accordion = cn::accordion()
//!     .multi_open() // Allow multiple sections open at once
//!     .item("a")
//!     .item("b")
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! accordion.toggle(&mut rt, "a").unwrap();
//! accordion.toggle(&mut rt, "b").unwrap();
//! assert!(accordion.is_open(&rt, "a") && accordion.is_open(&rt, "b"));
//! ```

use std::sync::Arc;

use selkit_core::{
    ChangeCallback, ContextId, ContextKind, Identifier, Key, NavKey, Orientation, OwnershipMode,
    Result, SelectionValue, SelkitRuntime, StoreOptions, ValueShape,
};

pub const ACCORDION: ContextKind = ContextKind::new("Accordion");

/// Accordion mode - single or multi open
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccordionMode {
    /// Only one section can be open at a time (default)
    #[default]
    Single,
    /// Multiple sections can be open simultaneously
    Multi,
}

/// Builder for an accordion root
pub struct AccordionBuilder {
    mode: AccordionMode,
    items: Vec<(Identifier, bool)>,
    default_value: Option<SelectionValue>,
    value: Option<SelectionValue>,
    on_change: Option<ChangeCallback>,
    collapsible: bool,
    looping: bool,
}

/// Create an accordion
pub fn accordion() -> AccordionBuilder {
    AccordionBuilder {
        mode: AccordionMode::Single,
        items: Vec::new(),
        default_value: None,
        value: None,
        on_change: None,
        collapsible: true,
        looping: true,
    }
}

impl AccordionBuilder {
    /// Allow multiple sections open at once
    pub fn multi_open(mut self) -> Self {
        self.mode = AccordionMode::Multi;
        self
    }

    pub fn mode(mut self, mode: AccordionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a section
    pub fn item(mut self, id: impl Into<Identifier>) -> Self {
        self.items.push((id.into(), false));
        self
    }

    /// Add a section that cannot be toggled or focused
    pub fn item_disabled(mut self, id: impl Into<Identifier>) -> Self {
        self.items.push((id.into(), true));
        self
    }

    /// Initially open sections (uncontrolled)
    pub fn default_value(mut self, value: SelectionValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Open sections owned by the caller (controlled)
    pub fn value(mut self, value: SelectionValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SelectionValue) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Whether clicking the open section closes it in single mode (default: true)
    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    /// Wrap focus between the first and last trigger (default: true)
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Mount the root and register its sections
    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<Accordion> {
        let empty = match self.mode {
            AccordionMode::Single => SelectionValue::none(),
            AccordionMode::Multi => SelectionValue::empty_set(),
        };
        let default_value = self.default_value.unwrap_or(empty);
        let mode = OwnershipMode::from_props(self.value, default_value, self.on_change);
        let options = StoreOptions::default().collapsible(self.collapsible);

        let id = rt.mount(ACCORDION, mode, options);
        let accordion = Accordion {
            id,
            mode: self.mode,
            looping: self.looping,
        };

        // A bad default/value shape or duplicate section leaves nothing mounted
        let shape = match self.mode {
            AccordionMode::Single => ValueShape::Single,
            AccordionMode::Multi => ValueShape::Multiple,
        };
        if let Err(err) = register_sections(rt, id, shape, self.items) {
            rt.unmount(id);
            return Err(err);
        }

        tracing::debug!(mode = ?self.mode, "accordion mounted");
        Ok(accordion)
    }
}

fn register_sections(
    rt: &mut SelkitRuntime,
    id: ContextId,
    shape: ValueShape,
    items: Vec<(Identifier, bool)>,
) -> Result<()> {
    rt.current(id)?.ensure_shape(shape)?;
    for (item, disabled) in items {
        rt.register_item(id, item, disabled)?;
    }
    Ok(())
}

/// A mounted accordion root
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accordion {
    id: ContextId,
    mode: AccordionMode,
    looping: bool,
}

impl Accordion {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn mode(&self) -> AccordionMode {
        self.mode
    }

    /// Run `f` inside this accordion, where its parts can find it
    pub fn scoped<R>(&self, rt: &mut SelkitRuntime, f: impl FnOnce(&mut SelkitRuntime) -> R) -> R {
        rt.scoped(ACCORDION, self.id, f)
    }

    pub fn value<'rt>(&self, rt: &'rt SelkitRuntime) -> Result<&'rt SelectionValue> {
        rt.current(self.id)
    }

    /// Whether `item`'s section is expanded
    pub fn is_open(&self, rt: &SelkitRuntime, item: &str) -> bool {
        rt.current(self.id).is_ok_and(|value| value.is_selected(item))
    }

    /// Toggle a section; disabled sections are left alone
    pub fn toggle(&self, rt: &mut SelkitRuntime, item: impl Into<Identifier>) -> Result<()> {
        let item = item.into();
        if rt.items(self.id)?.is_disabled(&item) {
            tracing::trace!(%item, "toggle ignored: section disabled");
            return Ok(());
        }
        match self.mode {
            // Collapsing the open section is the store's call
            AccordionMode::Single => rt.request_change(self.id, SelectionValue::single(item)),
            AccordionMode::Multi => rt.toggle(self.id, &item),
        }
    }

    /// Keyboard handling on a focused trigger
    ///
    /// Up/Down/Home/End return the trigger to focus next; Enter/Space toggle
    /// the focused section and return `None`.
    pub fn key_down(&self, rt: &mut SelkitRuntime, focused: &Identifier, key: Key) -> Result<Option<Identifier>> {
        if key.is_activation() {
            self.toggle(rt, focused)?;
            return Ok(None);
        }
        let Some(nav) = NavKey::from_key(key, Orientation::Vertical) else {
            return Ok(None);
        };
        Ok(rt.items(self.id)?.navigate(Some(focused), nav, self.looping))
    }

    /// Hand over the owner's value on re-render
    pub fn sync(&self, rt: &mut SelkitRuntime, value: Option<SelectionValue>) -> Result<()> {
        rt.sync_external(self.id, value)
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        rt.unmount(self.id)
    }
}

/// The clickable header of one section
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccordionTrigger {
    item: Identifier,
}

impl AccordionTrigger {
    pub fn new(item: impl Into<Identifier>) -> Self {
        Self { item: item.into() }
    }

    /// Whether the enclosing accordion has this section open
    pub fn is_open(&self, rt: &SelkitRuntime) -> Result<bool> {
        let id = rt.lookup(ACCORDION)?;
        Ok(rt.current(id)?.is_selected(&self.item))
    }

    /// Click on the trigger
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        let id = rt.lookup(ACCORDION)?;
        if rt.items(id)?.is_disabled(&self.item) {
            return Ok(());
        }
        match rt.current(id)? {
            SelectionValue::Multiple(_) => rt.toggle(id, &self.item),
            _ => rt.request_change(id, SelectionValue::Single(Some(self.item.clone()))),
        }
    }
}
