//! Keyboard navigation over registered items
//!
//! Composite widgets (tab lists, listboxes, menus, accordion triggers) keep
//! an ordered [`ItemRegistry`] of their focusable leaves. [`next_index`] maps
//! a navigation key to the id that should become current. It is a pure
//! function: the caller forwards the result to `request_change` (or to its
//! highlight state) itself.
//!
//! ```rust
//! use selkit_core::navigation::{next_index, NavKey, RegisteredItem};
//!
//! let items = [
//!     RegisteredItem::new("a", 0).disabled(true),
//!     RegisteredItem::new("b", 1),
//!     RegisteredItem::new("c", 2),
//! ];
//! assert_eq!(next_index(&items, &"c".into(), NavKey::ArrowNext).as_str(), "b");
//! ```

use rustc_hash::FxHashMap;

use crate::error::{EngineError, Result};
use crate::events::Key;
use crate::value::Identifier;

/// One focusable/selectable leaf of a composite widget
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredItem {
    pub id: Identifier,
    /// Registration order within the owning collection
    pub order: usize,
    pub disabled: bool,
}

impl RegisteredItem {
    pub fn new(id: impl Into<Identifier>, order: usize) -> Self {
        Self {
            id: id.into(),
            order,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Logical navigation keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavKey {
    ArrowPrevious,
    ArrowNext,
    Home,
    End,
}

/// Axis along which arrow keys move
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
    /// Both axes (grids of menu items)
    Both,
}

impl NavKey {
    /// Translate a physical key for a widget laid out along `orientation`
    pub fn from_key(key: Key, orientation: Orientation) -> Option<Self> {
        use Orientation::*;

        match (key, orientation) {
            (Key::Home, _) => Some(NavKey::Home),
            (Key::End, _) => Some(NavKey::End),
            (Key::ArrowRight, Horizontal | Both) | (Key::ArrowDown, Vertical | Both) => {
                Some(NavKey::ArrowNext)
            }
            (Key::ArrowLeft, Horizontal | Both) | (Key::ArrowUp, Vertical | Both) => {
                Some(NavKey::ArrowPrevious)
            }
            _ => None,
        }
    }
}

/// Navigation behavior of a collection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationConfig {
    pub orientation: Orientation,
    /// Wrap around at either end
    pub looping: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            looping: true,
        }
    }
}

impl NavigationConfig {
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

/// Target id for `key`, wrapping around the collection
///
/// Disabled items are skipped. When nothing can be reached, `current` is
/// returned unchanged.
pub fn next_index(items: &[RegisteredItem], current: &Identifier, key: NavKey) -> Identifier {
    next_index_with(items, current, key, true)
}

/// [`next_index`] with explicit control over wraparound
pub fn next_index_with(
    items: &[RegisteredItem],
    current: &Identifier,
    key: NavKey,
    looping: bool,
) -> Identifier {
    let target = match key {
        NavKey::Home => first_enabled(items),
        NavKey::End => last_enabled(items),
        NavKey::ArrowNext | NavKey::ArrowPrevious => {
            let forward = key == NavKey::ArrowNext;
            match items.iter().position(|item| &item.id == current) {
                Some(pos) => step(items, pos, forward, looping),
                // Entering the collection from outside
                None if forward => first_enabled(items),
                None => last_enabled(items),
            }
        }
    };

    target.map(|item| item.id.clone()).unwrap_or_else(|| current.clone())
}

pub fn first_enabled(items: &[RegisteredItem]) -> Option<&RegisteredItem> {
    items.iter().find(|item| !item.disabled)
}

pub fn last_enabled(items: &[RegisteredItem]) -> Option<&RegisteredItem> {
    items.iter().rev().find(|item| !item.disabled)
}

fn step(items: &[RegisteredItem], pos: usize, forward: bool, looping: bool) -> Option<&RegisteredItem> {
    let len = items.len();
    if looping {
        // At most one full lap, ending back on `pos`
        (1..=len)
            .map(|offset| {
                if forward {
                    (pos + offset) % len
                } else {
                    (pos + len - offset % len) % len
                }
            })
            .map(|idx| &items[idx])
            .find(|item| !item.disabled)
    } else if forward {
        items[pos + 1..].iter().find(|item| !item.disabled)
    } else {
        items[..pos].iter().rev().find(|item| !item.disabled)
    }
}

/// Ordered collection of a widget's registered items
#[derive(Debug, Default)]
pub struct ItemRegistry {
    items: Vec<RegisteredItem>,
    index: FxHashMap<Identifier, usize>,
    next_order: usize,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item at the end of the collection
    ///
    /// Ids are unique within one registry; a second registration under the
    /// same id is rejected.
    pub fn register(&mut self, id: impl Into<Identifier>, disabled: bool) -> Result<()> {
        let id = id.into();
        if self.index.contains_key(&id) {
            tracing::warn!("Duplicate item registered: {}", id);
            return Err(EngineError::DuplicateItem { id });
        }

        let order = self.next_order;
        self.next_order += 1;
        self.index.insert(id.clone(), self.items.len());
        self.items.push(RegisteredItem {
            id,
            order,
            disabled,
        });
        Ok(())
    }

    /// Remove an item, returning whether it was registered
    pub fn unregister(&mut self, id: &str) -> bool {
        let Some(pos) = self.index.remove(id) else {
            return false;
        };
        self.items.remove(pos);
        for (idx, item) in self.items.iter().enumerate().skip(pos) {
            self.index.insert(item.id.clone(), idx);
        }
        true
    }

    /// Update an item's disabled flag, returning whether it exists
    pub fn set_disabled(&mut self, id: &str, disabled: bool) -> bool {
        match self.index.get(id) {
            Some(&pos) => {
                self.items[pos].disabled = disabled;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.get(id).is_some_and(|item| item.disabled)
    }

    pub fn items(&self) -> &[RegisteredItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// Navigate from `current`, or enter the collection when there is none
    pub fn navigate(&self, current: Option<&Identifier>, key: NavKey, looping: bool) -> Option<Identifier> {
        if let Some(current) = current {
            return Some(next_index_with(&self.items, current, key, looping));
        }
        let entry = match key {
            NavKey::ArrowNext | NavKey::Home => first_enabled(&self.items),
            NavKey::ArrowPrevious | NavKey::End => last_enabled(&self.items),
        };
        entry.map(|item| item.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(entries: &[(&str, bool)]) -> Vec<RegisteredItem> {
        entries.iter()
            .enumerate()
            .map(|(order, (id, disabled))| RegisteredItem::new(*id, order).disabled(*disabled))
            .collect()
    }

    fn id(s: &str) -> Identifier {
        Identifier::from(s)
    }

    #[test]
    fn test_wraparound() {
        let list = items(&[("A", false), ("B", false), ("C", false)]);
        assert_eq!(next_index(&list, &id("C"), NavKey::ArrowNext), id("A"));
        assert_eq!(next_index(&list, &id("A"), NavKey::ArrowPrevious), id("C"));
        assert_eq!(next_index(&list, &id("A"), NavKey::ArrowNext), id("B"));
    }

    #[test]
    fn test_disabled_skip() {
        let list = items(&[("A", true), ("B", false), ("C", false)]);
        assert_eq!(next_index(&list, &id("C"), NavKey::ArrowNext), id("B"));
        assert_eq!(next_index(&list, &id("B"), NavKey::ArrowPrevious), id("C"));
        assert_eq!(next_index(&list, &id("C"), NavKey::Home), id("B"));
    }

    #[test]
    fn test_all_disabled_keeps_current() {
        let list = items(&[("A", true), ("B", true)]);
        for key in [NavKey::ArrowNext, NavKey::ArrowPrevious, NavKey::Home, NavKey::End] {
            assert_eq!(next_index(&list, &id("A"), key), id("A"));
        }
    }

    #[test]
    fn test_single_enabled_returns_itself() {
        let list = items(&[("A", true), ("B", false), ("C", true)]);
        assert_eq!(next_index(&list, &id("B"), NavKey::ArrowNext), id("B"));
    }

    #[test]
    fn test_home_end() {
        let list = items(&[("A", false), ("B", false), ("C", true)]);
        assert_eq!(next_index(&list, &id("B"), NavKey::Home), id("A"));
        assert_eq!(next_index(&list, &id("A"), NavKey::End), id("B"));
    }

    #[test]
    fn test_no_loop_stops_at_edges() {
        let list = items(&[("A", false), ("B", false), ("C", false)]);
        assert_eq!(next_index_with(&list, &id("C"), NavKey::ArrowNext, false), id("C"));
        assert_eq!(next_index_with(&list, &id("A"), NavKey::ArrowPrevious, false), id("A"));
        assert_eq!(next_index_with(&list, &id("A"), NavKey::ArrowNext, false), id("B"));
    }

    #[test]
    fn test_unknown_current_enters_collection() {
        let list = items(&[("A", true), ("B", false), ("C", false)]);
        assert_eq!(next_index(&list, &id("zz"), NavKey::ArrowNext), id("B"));
        assert_eq!(next_index(&list, &id("zz"), NavKey::ArrowPrevious), id("C"));
        assert_eq!(next_index(&[], &id("zz"), NavKey::ArrowNext), id("zz"));
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            NavKey::from_key(Key::ArrowRight, Orientation::Horizontal),
            Some(NavKey::ArrowNext)
        );
        assert_eq!(NavKey::from_key(Key::ArrowDown, Orientation::Horizontal), None);
        assert_eq!(
            NavKey::from_key(Key::ArrowUp, Orientation::Vertical),
            Some(NavKey::ArrowPrevious)
        );
        assert_eq!(
            NavKey::from_key(Key::ArrowLeft, Orientation::Both),
            Some(NavKey::ArrowPrevious)
        );
        assert_eq!(NavKey::from_key(Key::End, Orientation::Vertical), Some(NavKey::End));
        assert_eq!(NavKey::from_key(Key::Escape, Orientation::Both), None);
    }

    #[test]
    fn test_registry() {
        let mut registry = ItemRegistry::new();
        registry.register("a", false).unwrap();
        registry.register("b", false).unwrap();
        registry.register("c", true).unwrap();

        assert_eq!(
            registry.register("b", false),
            Err(EngineError::DuplicateItem { id: id("b") })
        );
        assert_eq!(registry.len(), 3);
        assert!(registry.is_disabled("c"));

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.get("b").map(|item| item.order), Some(1));
        assert_eq!(registry.items()[0].id, id("b"));

        assert!(registry.set_disabled("c", false));
        assert_eq!(
            registry.navigate(Some(&id("b")), NavKey::ArrowNext, true),
            Some(id("c"))
        );
        assert_eq!(registry.navigate(None, NavKey::End, true), Some(id("c")));
    }
}
