//! Dropdown Menu component - a list of actions opened from a trigger
//!
//! The menu closes when an item is chosen, on Escape, and on a pointer-down
//! outside the trigger and menu. While open, arrow keys move the highlight
//! over enabled items, wrapping at the ends.
//!
//! The highlighted item belongs to whoever renders the menu: key handling
//! takes the current highlight and returns the next one.
//!
//! # Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let menu = cn::dropdown_menu()
//!     .item("profile")
//!     .item("settings")
//!     .item_disabled("billing")
//!     .item("logout")
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! // ArrowDown on the trigger opens the menu on its first item
//! let highlight = menu.key_down(&mut rt, None, Key::ArrowDown).unwrap();
//! assert!(menu.is_open(&rt));
//! assert_eq!(highlight, Some(Identifier::from("profile")));
//!
//! let chosen = menu
//!     .scoped(&mut rt, |rt| DropdownMenuItem::new("settings").press(rt))
//!     .unwrap();
//! assert_eq!(chosen, Some(Identifier::from("settings")));
//! assert!(!menu.is_open(&rt));
//! ```

use std::sync::Arc;

use selkit_core::{
    ContextId, ContextKind, DismissConfig, Identifier, Key, NavKey, NodeId, Orientation, Result,
    SelectionValue, SelkitRuntime, StoreOptions,
};

use super::{open_mode, OpenChangeCallback};

pub const DROPDOWN_MENU: ContextKind = ContextKind::new("DropdownMenu");

type Boundary = Arc<dyn Fn(NodeId) -> bool + Send + Sync>;

/// Builder for a dropdown menu
pub struct DropdownMenuBuilder {
    items: Vec<(Identifier, bool)>,
    open: Option<bool>,
    default_open: bool,
    on_open_change: Option<OpenChangeCallback>,
    boundary: Boundary,
    looping: bool,
}

/// Create a dropdown menu
pub fn dropdown_menu() -> DropdownMenuBuilder {
    DropdownMenuBuilder {
        items: Vec::new(),
        open: None,
        default_open: false,
        on_open_change: None,
        boundary: Arc::new(|_| false),
        looping: true,
    }
}

impl DropdownMenuBuilder {
    pub fn item(mut self, id: impl Into<Identifier>) -> Self {
        self.items.push((id.into(), false));
        self
    }

    pub fn item_disabled(mut self, id: impl Into<Identifier>) -> Self {
        self.items.push((id.into(), true));
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

    /// Which nodes count as inside the menu (trigger and list)
    pub fn boundary<B>(mut self, boundary: B) -> Self
    where
        B: Fn(NodeId) -> bool + Send + Sync + 'static,
    {
        self.boundary = Arc::new(boundary);
        self
    }

    /// Wrap the highlight at the ends (default: true)
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<DropdownMenu> {
        let mode = open_mode(self.open, self.default_open, self.on_open_change);
        let id = rt.mount(DROPDOWN_MENU, mode, StoreOptions::default());
        let menu = DropdownMenu {
            id,
            looping: self.looping,
        };

        if let Err(err) = bind_menu(rt, id, self.boundary, self.items) {
            rt.unmount(id);
            return Err(err);
        }
        Ok(menu)
    }
}

fn bind_menu(
    rt: &mut SelkitRuntime,
    id: ContextId,
    boundary: Boundary,
    items: Vec<(Identifier, bool)>,
) -> Result<()> {
    rt.bind_dismiss(id, move |node| boundary(node), DismissConfig::default())?;
    for (item, disabled) in items {
        rt.register_item(id, item, disabled)?;
    }
    Ok(())
}

/// A mounted dropdown menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropdownMenu {
    id: ContextId,
    looping: bool,
}

impl DropdownMenu {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn scoped<R>(&self, rt: &mut SelkitRuntime, f: impl FnOnce(&mut SelkitRuntime) -> R) -> R {
        rt.scoped(DROPDOWN_MENU, self.id, f)
    }

    pub fn is_open(&self, rt: &SelkitRuntime) -> bool {
        rt.is_open(self.id).unwrap_or(false)
    }

    pub fn set_open(&self, rt: &mut SelkitRuntime, open: bool) -> Result<()> {
        rt.request_change(self.id, SelectionValue::Boolean(open))
    }

    /// Keyboard handling on the trigger or the open list
    ///
    /// Returns the item to highlight next. Closed, Down/Enter/Space open on
    /// the first item and Up opens on the last. Open, Enter/Space choose the
    /// highlighted item and close.
    pub fn key_down(
        &self,
        rt: &mut SelkitRuntime,
        highlighted: Option<&Identifier>,
        key: Key,
    ) -> Result<Option<Identifier>> {
        if !rt.is_open(self.id)? {
            let entry = match key {
                Key::ArrowDown | Key::Enter | Key::Space => NavKey::Home,
                Key::ArrowUp => NavKey::End,
                _ => return Ok(None),
            };
            rt.request_change(self.id, SelectionValue::open())?;
            return Ok(rt.items(self.id)?.navigate(None, entry, self.looping));
        }

        if key.is_activation() {
            if let Some(item) = highlighted {
                choose(rt, self.id, item, true)?;
            }
            return Ok(None);
        }
        match NavKey::from_key(key, Orientation::Vertical) {
            Some(nav) => Ok(rt.items(self.id)?.navigate(highlighted, nav, self.looping)),
            None => Ok(highlighted.cloned()),
        }
    }

    pub fn sync(&self, rt: &mut SelkitRuntime, open: Option<bool>) -> Result<()> {
        rt.sync_external(self.id, open.map(SelectionValue::Boolean))
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        rt.unmount(self.id)
    }
}

/// Choose `item`; returns it unless it is disabled or unknown
fn choose(rt: &mut SelkitRuntime, id: ContextId, item: &Identifier, close: bool) -> Result<Option<Identifier>> {
    let items = rt.items(id)?;
    if !items.contains(item) || items.is_disabled(item) {
        return Ok(None);
    }
    tracing::debug!(%item, "menu item selected");
    if close {
        rt.request_change(id, SelectionValue::closed())?;
    }
    Ok(Some(item.clone()))
}

/// One action in the menu
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropdownMenuItem {
    id: Identifier,
    close_on_select: bool,
}

impl DropdownMenuItem {
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            close_on_select: true,
        }
    }

    /// Leave the menu open after this item is chosen (checkbox-like items)
    pub fn keep_open(mut self) -> Self {
        self.close_on_select = false;
        self
    }

    /// Click on the item; returns the chosen id
    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<Option<Identifier>> {
        let id = rt.lookup(DROPDOWN_MENU)?;
        choose(rt, id, &self.id, self.close_on_select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(rt: &mut SelkitRuntime) -> DropdownMenu {
        dropdown_menu()
            .item("a")
            .item_disabled("b")
            .item("c")
            .boundary(|node| node == NodeId(1))
            .mount(rt)
            .unwrap()
    }

    #[test]
    fn test_arrow_up_opens_on_last() {
        let mut rt = SelkitRuntime::new();
        let menu = menu(&mut rt);
        assert_eq!(menu.key_down(&mut rt, None, Key::ArrowUp).unwrap(), Some("c".into()));
        assert!(menu.is_open(&rt));
        assert_eq!(rt.stats().armed_watchers, 1);
    }

    #[test]
    fn test_highlight_skips_disabled() {
        let mut rt = SelkitRuntime::new();
        let menu = menu(&mut rt);
        menu.set_open(&mut rt, true).unwrap();

        let a = Identifier::from("a");
        let next = menu.key_down(&mut rt, Some(&a), Key::ArrowDown).unwrap();
        assert_eq!(next, Some("c".into()));
        let next = menu.key_down(&mut rt, next.as_ref(), Key::ArrowDown).unwrap();
        assert_eq!(next, Some("a".into()));
    }

    #[test]
    fn test_enter_chooses_and_closes() {
        let mut rt = SelkitRuntime::new();
        let menu = menu(&mut rt);
        menu.set_open(&mut rt, true).unwrap();

        let c = Identifier::from("c");
        assert_eq!(menu.key_down(&mut rt, Some(&c), Key::Enter).unwrap(), None);
        assert!(!menu.is_open(&rt));
        assert_eq!(rt.stats().armed_watchers, 0);
    }

    #[test]
    fn test_disabled_item_press() {
        let mut rt = SelkitRuntime::new();
        let menu = menu(&mut rt);
        menu.set_open(&mut rt, true).unwrap();
        let chosen = menu.scoped(&mut rt, |rt| DropdownMenuItem::new("b").press(rt));
        assert_eq!(chosen, Ok(None));
        assert!(menu.is_open(&rt));
    }

    #[test]
    fn test_keep_open_item() {
        let mut rt = SelkitRuntime::new();
        let menu = menu(&mut rt);
        menu.set_open(&mut rt, true).unwrap();
        let chosen = menu.scoped(&mut rt, |rt| DropdownMenuItem::new("a").keep_open().press(rt));
        assert_eq!(chosen, Ok(Some("a".into())));
        assert!(menu.is_open(&rt));
    }

    #[test]
    fn test_outside_click_closes() {
        let mut rt = SelkitRuntime::new();
        let menu = menu(&mut rt);
        menu.set_open(&mut rt, true).unwrap();
        rt.pointer_down(NodeId(1)).unwrap();
        assert!(menu.is_open(&rt));
        rt.pointer_down(NodeId(4)).unwrap();
        assert!(!menu.is_open(&rt));
    }
}
