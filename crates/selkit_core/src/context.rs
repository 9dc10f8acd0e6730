//! Context arena - how a root shares its value with its parts
//!
//! A composite widget's root provides its [`ValueStore`] to the arena and
//! gets back a [`ContextId`]. The arena owns the store for the root's whole
//! lifetime; parts never hold the store itself, only a borrowed
//! [`WidgetContext`] obtained by ambient lookup:
//!
//! ```rust
//! use selkit_core::context::{ContextArena, ContextKind};
//! use selkit_core::store::{OwnershipMode, ValueStore};
//! use selkit_core::value::SelectionValue;
//!
//! const TABS: ContextKind = ContextKind::new("Tabs");
//!
//! let mut arena = ContextArena::new();
//! let root = arena.provide(
//!     TABS,
//!     ValueStore::new(OwnershipMode::uncontrolled(SelectionValue::single("account"))),
//! );
//!
//! arena.scoped(TABS, root, |arena| {
//!     // Somewhere deep inside the tab list, a trigger was pressed
//!     let mut ctx = arena.lookup(TABS).unwrap();
//!     ctx.request_change(SelectionValue::single("password")).unwrap();
//! });
//!
//! assert!(arena.current(root).unwrap().is_selected("password"));
//! ```
//!
//! The scope is a stack: the nearest enclosing root of the requested kind
//! wins, roots of other kinds are skipped, and nested roots of the same kind
//! stay independent.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{EngineError, Result};
use crate::navigation::ItemRegistry;
use crate::store::{OwnershipKind, ValueStore};
use crate::value::{Identifier, SelectionValue};

new_key_type! {
    /// Handle to a root's context, owned by the arena
    pub struct ContextId;
}

/// Names the widget family a context belongs to
///
/// Lookup only matches roots of the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextKind(&'static str);

impl ContextKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

struct ContextEntry {
    kind: ContextKind,
    store: ValueStore,
    items: ItemRegistry,
}

/// Owner of every mounted root's store and item collection
#[derive(Default)]
pub struct ContextArena {
    entries: SlotMap<ContextId, ContextEntry>,
    /// Roots enclosing the code currently running, innermost last
    scope: SmallVec<[(ContextKind, ContextId); 8]>,
}

impl ContextArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a root: the arena takes ownership of its store
    pub fn provide(&mut self, kind: ContextKind, store: ValueStore) -> ContextId {
        let id = self.entries.insert(ContextEntry {
            kind,
            store,
            items: ItemRegistry::new(),
        });
        tracing::debug!(kind = kind.name(), ?id, "context provided");
        id
    }

    /// Unmount a root, handing back its store
    pub fn release(&mut self, id: ContextId) -> Option<ValueStore> {
        let entry = self.entries.remove(id)?;
        tracing::debug!(kind = entry.kind.name(), ?id, "context released");
        Some(entry.store)
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `f` with `id` as the innermost enclosing root
    ///
    /// The scope entry is popped when `f` returns, whatever it returns.
    pub fn scoped<R>(&mut self, kind: ContextKind, id: ContextId, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.push_scope(kind, id);
        let result = f(self);
        self.restore_scope(depth);
        result
    }

    /// Nesting depth of the current scope
    pub fn depth(&self) -> usize {
        self.scope.len()
    }

    /// Push a scope entry, returning the depth to restore afterwards
    pub(crate) fn push_scope(&mut self, kind: ContextKind, id: ContextId) -> usize {
        let depth = self.scope.len();
        self.scope.push((kind, id));
        depth
    }

    pub(crate) fn restore_scope(&mut self, depth: usize) {
        self.scope.truncate(depth);
    }

    /// Id of the nearest enclosing root of `kind`
    pub fn lookup_id(&self, kind: ContextKind) -> Result<ContextId> {
        self.scope
            .iter()
            .rev()
            .find(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .ok_or(EngineError::MissingContext { kind: kind.name() })
    }

    /// Context of the nearest enclosing root of `kind`
    pub fn lookup(&mut self, kind: ContextKind) -> Result<WidgetContext<'_>> {
        let id = self.lookup_id(kind)?;
        self.context(id)
    }

    /// Context for a known root
    pub fn context(&mut self, id: ContextId) -> Result<WidgetContext<'_>> {
        let entry = self.entries.get_mut(id).ok_or(EngineError::UnknownContext)?;
        Ok(WidgetContext { id, entry })
    }

    pub fn current(&self, id: ContextId) -> Result<&SelectionValue> {
        self.entry(id).map(|entry| entry.store.current())
    }

    pub fn kind(&self, id: ContextId) -> Result<ContextKind> {
        self.entry(id).map(|entry| entry.kind)
    }

    pub fn ownership(&self, id: ContextId) -> Result<OwnershipKind> {
        self.entry(id).map(|entry| entry.store.kind())
    }

    pub fn items(&self, id: ContextId) -> Result<&ItemRegistry> {
        self.entry(id).map(|entry| &entry.items)
    }

    pub fn request_change(&mut self, id: ContextId, next: SelectionValue) -> Result<()> {
        self.entry_mut(id)?.store.request_change(next)
    }

    /// Forward the owner's external value to a root's store
    pub fn sync_external(&mut self, id: ContextId, external: Option<SelectionValue>) -> Result<()> {
        self.entry_mut(id)?.store.sync_external(external)
    }

    /// Direct access to a root's store, for the root itself
    pub fn store_mut(&mut self, id: ContextId) -> Result<&mut ValueStore> {
        self.entry_mut(id).map(|entry| &mut entry.store)
    }

    fn entry(&self, id: ContextId) -> Result<&ContextEntry> {
        self.entries.get(id).ok_or(EngineError::UnknownContext)
    }

    fn entry_mut(&mut self, id: ContextId) -> Result<&mut ContextEntry> {
        self.entries.get_mut(id).ok_or(EngineError::UnknownContext)
    }
}

/// A part's borrowed view of its root: read the value, request changes
///
/// The store itself is not reachable from here; every write goes through
/// `request_change`.
pub struct WidgetContext<'a> {
    id: ContextId,
    entry: &'a mut ContextEntry,
}

impl WidgetContext<'_> {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn kind(&self) -> ContextKind {
        self.entry.kind
    }

    pub fn current(&self) -> &SelectionValue {
        self.entry.store.current()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.current().is_selected(id)
    }

    pub fn request_change(&mut self, next: SelectionValue) -> Result<()> {
        self.entry.store.request_change(next)
    }

    /// Toggle `id` under the disclosure convention
    pub fn toggle(&mut self, id: &Identifier) -> Result<()> {
        self.entry.store.toggle(id)
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.entry.items
    }

    /// Register a focusable leaf with the root, in render order
    pub fn register_item(&mut self, id: impl Into<Identifier>, disabled: bool) -> Result<()> {
        self.entry.items.register(id, disabled)
    }

    pub fn unregister_item(&mut self, id: &str) -> bool {
        self.entry.items.unregister(id)
    }

    pub fn set_item_disabled(&mut self, id: &str, disabled: bool) -> bool {
        self.entry.items.set_disabled(id, disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OwnershipMode;

    const TABS: ContextKind = ContextKind::new("Tabs");
    const TOOLTIP: ContextKind = ContextKind::new("Tooltip");

    fn tabs(arena: &mut ContextArena, initial: &str) -> ContextId {
        arena.provide(
            TABS,
            ValueStore::new(OwnershipMode::uncontrolled(SelectionValue::single(initial))),
        )
    }

    #[test]
    fn test_missing_context() {
        let mut arena = ContextArena::new();
        let err = arena.lookup(TABS).err();
        assert_eq!(err, Some(EngineError::MissingContext { kind: "Tabs" }));
    }

    #[test]
    fn test_nearest_root_wins() {
        let mut arena = ContextArena::new();
        let outer = tabs(&mut arena, "outer-1");
        let inner = tabs(&mut arena, "inner-1");

        arena.scoped(TABS, outer, |arena| {
            arena.scoped(TABS, inner, |arena| {
                let mut ctx = arena.lookup(TABS).unwrap();
                assert_eq!(ctx.id(), inner);
                ctx.request_change(SelectionValue::single("inner-2")).unwrap();
            });
            // Back in the outer root's scope
            assert_eq!(arena.lookup_id(TABS), Ok(outer));
        });

        assert_eq!(arena.current(outer), Ok(&SelectionValue::single("outer-1")));
        assert_eq!(arena.current(inner), Ok(&SelectionValue::single("inner-2")));
        assert_eq!(arena.depth(), 0);
    }

    #[test]
    fn test_other_kinds_are_skipped() {
        let mut arena = ContextArena::new();
        let root = tabs(&mut arena, "a");
        let tooltip = arena.provide(
            TOOLTIP,
            ValueStore::new(OwnershipMode::uncontrolled(SelectionValue::closed())),
        );

        arena.scoped(TABS, root, |arena| {
            arena.scoped(TOOLTIP, tooltip, |arena| {
                assert_eq!(arena.lookup_id(TABS), Ok(root));
                assert_eq!(arena.lookup_id(TOOLTIP), Ok(tooltip));
            });
        });
    }

    #[test]
    fn test_released_context_is_unknown() {
        let mut arena = ContextArena::new();
        let root = tabs(&mut arena, "a");
        assert!(arena.release(root).is_some());
        assert!(arena.release(root).is_none());
        assert_eq!(arena.current(root), Err(EngineError::UnknownContext));

        let result = arena.scoped(TABS, root, |arena| arena.lookup(TABS).map(|ctx| ctx.id()));
        assert_eq!(result, Err(EngineError::UnknownContext));
    }

    #[test]
    fn test_parts_register_items() {
        let mut arena = ContextArena::new();
        let root = tabs(&mut arena, "a");
        arena.scoped(TABS, root, |arena| {
            let mut ctx = arena.lookup(TABS).unwrap();
            ctx.register_item("a", false).unwrap();
            ctx.register_item("b", true).unwrap();
            assert!(ctx.register_item("a", false).is_err());
        });
        let items = arena.items(root).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.is_disabled("b"));
    }
}
