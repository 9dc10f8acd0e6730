//! Select component - pick one option from a dropdown list
//!
//! A select owns two values: the chosen option (`Single`) and whether its
//! list is open (`Boolean`). Each can be controlled or uncontrolled on its
//! own. The open list is dismissed by Escape or a pointer-down outside.
//!
//! # Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let select = cn::select()
//!     .option("apple")
//!     .option("banana")
//!     .option_disabled("cherry")
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! select.set_open(&mut rt, true).unwrap();
//! select
//!     .scoped(&mut rt, |rt| SelectItem::new("banana").press(rt))
//!     .unwrap();
//!
//! assert_eq!(select.value(&rt), Some(Identifier::from("banana")));
//! assert!(!select.is_open(&rt));
//! ```

use std::sync::Arc;

use selkit_core::{
    next_index, ChangeCallback, ContextId, ContextKind, DismissConfig, Identifier, Key, NavKey,
    NodeId, Orientation, OwnershipMode, Result, SelectionValue, SelkitRuntime, StoreOptions,
};

use super::{open_mode, OpenChangeCallback};

/// The chosen option; options register here
pub const SELECT: ContextKind = ContextKind::new("Select");

/// The open/closed list
pub const SELECT_CONTENT: ContextKind = ContextKind::new("SelectContent");

type Boundary = Arc<dyn Fn(NodeId) -> bool + Send + Sync>;

/// Builder for a select
pub struct SelectBuilder {
    options: Vec<(Identifier, bool)>,
    default_value: Option<Identifier>,
    value: Option<Option<Identifier>>,
    on_change: Option<ChangeCallback>,
    open: Option<bool>,
    default_open: bool,
    on_open_change: Option<OpenChangeCallback>,
    boundary: Boundary,
    looping: bool,
}

/// Create a select
pub fn select() -> SelectBuilder {
    SelectBuilder {
        options: Vec::new(),
        default_value: None,
        value: None,
        on_change: None,
        open: None,
        default_open: false,
        on_open_change: None,
        boundary: Arc::new(|_| false),
        looping: false,
    }
}

impl SelectBuilder {
    pub fn option(mut self, value: impl Into<Identifier>) -> Self {
        self.options.push((value.into(), false));
        self
    }

    pub fn option_disabled(mut self, value: impl Into<Identifier>) -> Self {
        self.options.push((value.into(), true));
        self
    }

    /// Initially chosen option (uncontrolled)
    pub fn default_value(mut self, value: impl Into<Identifier>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Start with `value` chosen, or nothing (uncontrolled)
    pub fn placeholder_value(mut self, value: Option<Identifier>) -> Self {
        self.default_value = value;
        self
    }

    /// Chosen option owned by the caller (controlled)
    pub fn value(mut self, value: Option<Identifier>) -> Self {
        self.value = Some(value);
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(move |value: &SelectionValue| {
            if let Some(Some(option)) = value.as_single() {
                callback(option.as_str());
            }
        }));
        self
    }

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

    /// Which nodes count as inside the select (trigger and list)
    pub fn boundary<B>(mut self, boundary: B) -> Self
    where
        B: Fn(NodeId) -> bool + Send + Sync + 'static,
    {
        self.boundary = Arc::new(boundary);
        self
    }

    /// Wrap the highlight at the ends (default: false)
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<Select> {
        let value_mode = OwnershipMode::from_props(
            self.value.map(SelectionValue::Single),
            SelectionValue::Single(self.default_value),
            self.on_change,
        );
        let value = rt.mount(SELECT, value_mode, StoreOptions::default());
        let list_mode = open_mode(self.open, self.default_open, self.on_open_change);
        let open = rt.mount(SELECT_CONTENT, list_mode, StoreOptions::default());

        let select = Select {
            value,
            open,
            looping: self.looping,
        };
        if let Err(err) = bind_select(rt, &select, self.boundary, self.options) {
            select.unmount(rt);
            return Err(err);
        }
        Ok(select)
    }
}

fn bind_select(
    rt: &mut SelkitRuntime,
    select: &Select,
    boundary: Boundary,
    options: Vec<(Identifier, bool)>,
) -> Result<()> {
    rt.bind_dismiss(select.open, move |node| boundary(node), DismissConfig::default())?;
    for (option, disabled) in options {
        rt.register_item(select.value, option, disabled)?;
    }
    Ok(())
}

/// A mounted select
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Select {
    value: ContextId,
    open: ContextId,
    looping: bool,
}

impl Select {
    pub fn value_id(&self) -> ContextId {
        self.value
    }

    pub fn open_id(&self) -> ContextId {
        self.open
    }

    /// Run `f` inside this select, where its items can find it
    pub fn scoped<R>(&self, rt: &mut SelkitRuntime, f: impl FnOnce(&mut SelkitRuntime) -> R) -> R {
        let (value, open) = (self.value, self.open);
        rt.scoped(SELECT, value, |rt| rt.scoped(SELECT_CONTENT, open, f))
    }

    /// The chosen option
    pub fn value(&self, rt: &SelkitRuntime) -> Option<Identifier> {
        rt.current(self.value)
            .ok()
            .and_then(|value| value.as_single().flatten().cloned())
    }

    pub fn is_open(&self, rt: &SelkitRuntime) -> bool {
        rt.is_open(self.open).unwrap_or(false)
    }

    pub fn set_open(&self, rt: &mut SelkitRuntime, open: bool) -> Result<()> {
        rt.request_change(self.open, SelectionValue::Boolean(open))
    }

    /// Keyboard handling on the trigger or the open list
    ///
    /// Returns the option to highlight next. Opening highlights the chosen
    /// option, or the first enabled one. Enter/Space on the open list choose
    /// the highlighted option and close.
    pub fn key_down(
        &self,
        rt: &mut SelkitRuntime,
        highlighted: Option<&Identifier>,
        key: Key,
    ) -> Result<Option<Identifier>> {
        if !rt.is_open(self.open)? {
            if !matches!(key, Key::ArrowDown | Key::ArrowUp | Key::Enter | Key::Space) {
                return Ok(None);
            }
            self.set_open(rt, true)?;
            let chosen = self.value(rt);
            return Ok(chosen.or_else(|| {
                rt.items(self.value)
                    .ok()
                    .and_then(|items| items.navigate(None, NavKey::Home, self.looping))
            }));
        }

        if key.is_activation() {
            if let Some(option) = highlighted {
                choose(rt, self.value, self.open, option)?;
            }
            return Ok(None);
        }
        let Some(nav) = NavKey::from_key(key, Orientation::Vertical) else {
            return Ok(highlighted.cloned());
        };
        let items = rt.items(self.value)?;
        Ok(match highlighted {
            Some(current) if self.looping => Some(next_index(items.items(), current, nav)),
            current => items.navigate(current, nav, self.looping),
        })
    }

    pub fn sync_value(&self, rt: &mut SelkitRuntime, value: Option<Option<Identifier>>) -> Result<()> {
        rt.sync_external(self.value, value.map(SelectionValue::Single))
    }

    pub fn sync_open(&self, rt: &mut SelkitRuntime, open: Option<bool>) -> Result<()> {
        rt.sync_external(self.open, open.map(SelectionValue::Boolean))
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        let open = rt.unmount(self.open);
        rt.unmount(self.value) && open
    }
}

fn choose(rt: &mut SelkitRuntime, value: ContextId, open: ContextId, option: &Identifier) -> Result<()> {
    let items = rt.items(value)?;
    if !items.contains(option) || items.is_disabled(option) {
        return Ok(());
    }
    rt.request_change(value, SelectionValue::Single(Some(option.clone())))?;
    rt.request_change(open, SelectionValue::closed())
}

/// One option in the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectItem {
    value: Identifier,
}

impl SelectItem {
    pub fn new(value: impl Into<Identifier>) -> Self {
        Self { value: value.into() }
    }

    /// Click on the option: choose it and close the list
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        let value = rt.lookup(SELECT)?;
        let open = rt.lookup(SELECT_CONTENT)?;
        choose(rt, value, open, &self.value)
    }

    /// Whether this option is the chosen one
    pub fn is_selected(&self, rt: &SelkitRuntime) -> Result<bool> {
        let value = rt.lookup(SELECT)?;
        Ok(rt.current(value)?.is_selected(&self.value))
    }
}

/// The button showing the chosen option
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectTrigger;

impl SelectTrigger {
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        let open = rt.lookup(SELECT_CONTENT)?;
        let is_open = rt.is_open(open)?;
        rt.request_change(open, SelectionValue::Boolean(!is_open))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn fruit(rt: &mut SelkitRuntime) -> Select {
        select()
            .option("apple")
            .option_disabled("banana")
            .option("cherry")
            .boundary(|node| node == NodeId(1) || node == NodeId(2))
            .mount(rt)
            .unwrap()
    }

    #[test]
    fn test_trigger_opens_and_arms() {
        let mut rt = SelkitRuntime::new();
        let select = fruit(&mut rt);
        select.scoped(&mut rt, |rt| SelectTrigger.press(rt)).unwrap();
        assert!(select.is_open(&rt));
        assert_eq!(rt.stats().armed_watchers, 1);

        rt.pointer_down(NodeId(30)).unwrap();
        assert!(!select.is_open(&rt));
        assert_eq!(select.value(&rt), None);
    }

    #[test]
    fn test_keyboard_flow() {
        let mut rt = SelkitRuntime::new();
        let select = fruit(&mut rt);

        let highlight = select.key_down(&mut rt, None, Key::ArrowDown).unwrap();
        assert_eq!(highlight, Some("apple".into()));

        let highlight = select.key_down(&mut rt, highlight.as_ref(), Key::ArrowDown).unwrap();
        assert_eq!(highlight, Some("cherry".into()));

        // Not looping: the end stays put
        let highlight = select.key_down(&mut rt, highlight.as_ref(), Key::ArrowDown).unwrap();
        assert_eq!(highlight, Some("cherry".into()));

        select.key_down(&mut rt, highlight.as_ref(), Key::Enter).unwrap();
        assert_eq!(select.value(&rt), Some("cherry".into()));
        assert!(!select.is_open(&rt));

        // Reopening highlights the chosen option
        let highlight = select.key_down(&mut rt, None, Key::Space).unwrap();
        assert_eq!(highlight, Some("cherry".into()));
    }

    #[test]
    fn test_looping_highlight_wraps() {
        let mut rt = SelkitRuntime::new();
        let select = select().option("a").option("b").looping(true).mount(&mut rt).unwrap();
        select.set_open(&mut rt, true).unwrap();
        let b = Identifier::from("b");
        assert_eq!(select.key_down(&mut rt, Some(&b), Key::ArrowDown).unwrap(), Some("a".into()));
    }

    #[test]
    fn test_disabled_option_ignored() {
        let mut rt = SelkitRuntime::new();
        let select = fruit(&mut rt);
        select.set_open(&mut rt, true).unwrap();
        select.scoped(&mut rt, |rt| SelectItem::new("banana").press(rt)).unwrap();
        assert_eq!(select.value(&rt), None);
        assert!(select.is_open(&rt));
    }

    #[test]
    fn test_controlled_value_uncontrolled_open() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut rt = SelkitRuntime::new();
        let select = select()
            .option("a")
            .option("b")
            .value(Some("a".into()))
            .on_change(move |v| sink.lock().unwrap().push(v.to_string()))
            .mount(&mut rt)
            .unwrap();

        select.set_open(&mut rt, true).unwrap();
        let selected = select.scoped(&mut rt, |rt| {
            SelectItem::new("b").press(rt)?;
            SelectItem::new("a").is_selected(rt)
        });
        assert_eq!(selected, Ok(true));
        assert_eq!(*seen.lock().unwrap(), ["b"]);
        // The list still closes on its own
        assert!(!select.is_open(&rt));
    }

    #[test]
    fn test_unmount_releases_both() {
        let mut rt = SelkitRuntime::new();
        let select = fruit(&mut rt);
        select.set_open(&mut rt, true).unwrap();
        assert_eq!(rt.stats().contexts, 2);
        assert!(select.unmount(&mut rt));
        assert_eq!(rt.stats().contexts, 0);
        assert_eq!(rt.stats().armed_watchers, 0);
    }
}
