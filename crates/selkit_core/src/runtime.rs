//! Selkit Runtime
//!
//! The runtime owns every engine subsystem and wires them per widget:
//!
//! - the [`ContextArena`] holding each root's store and items
//! - the [`DismissLayer`] standing in for document-level listeners
//! - the [`TimerQueue`] driving hover delays
//!
//! Widgets bind extra behavior to their context. A dismiss binding is armed
//! exactly while the context's `Boolean` value is open; a hover binding
//! commits its debounced open flag through `request_change`. Both follow the
//! committed value, so a controlled owner that declines a proposal leaves
//! the widget (and its watcher) where it was.

use std::sync::Arc;

use slotmap::SecondaryMap;

use crate::context::{ContextArena, ContextId, ContextKind};
use crate::dismiss::{DismissConfig, DismissLayer, DismissReason, WatcherId};
use crate::error::{EngineError, Result};
use crate::events::{Key, NodeId};
use crate::hover::{HoverConfig, HoverEffects, HoverMachine, HoverPhase, HoverSignal};
use crate::navigation::{ItemRegistry, NavKey};
use crate::store::{OwnershipMode, StoreOptions, ValueStore};
use crate::timer::{TimerId, TimerQueue};
use crate::value::{Identifier, SelectionValue, ValueShape};

/// Shared boundary check, re-armed on every open
type SharedBoundary = Arc<dyn Fn(NodeId) -> bool + Send + Sync>;

/// Shared dismiss callback
pub type DismissHandler = Arc<dyn Fn(DismissReason) + Send + Sync>;

struct DismissBinding {
    boundary: SharedBoundary,
    config: DismissConfig,
    on_dismiss: Option<DismissHandler>,
    armed: Option<WatcherId>,
}

/// The selkit runtime - owns contexts, watchers and timers
#[derive(Default)]
pub struct SelkitRuntime {
    contexts: ContextArena,
    dismiss: DismissLayer,
    timers: TimerQueue,
    dismiss_bindings: SecondaryMap<ContextId, DismissBinding>,
    hover_bindings: SecondaryMap<ContextId, HoverMachine>,
    watcher_owners: SecondaryMap<WatcherId, ContextId>,
    timer_owners: SecondaryMap<TimerId, ContextId>,
}

impl SelkitRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    /// Mount a root with a fresh store
    pub fn mount(&mut self, kind: ContextKind, mode: OwnershipMode, options: StoreOptions) -> ContextId {
        self.contexts.provide(kind, ValueStore::with_options(mode, options))
    }

    /// Mount a root around an existing store
    pub fn mount_store(&mut self, kind: ContextKind, store: ValueStore) -> ContextId {
        self.contexts.provide(kind, store)
    }

    /// Tear a root down: cancel its timer, disarm its watcher, drop its store
    ///
    /// Runs whatever phase the widget is in. Returns false for an unknown id.
    pub fn unmount(&mut self, id: ContextId) -> bool {
        if let Some(mut machine) = self.hover_bindings.remove(id) {
            if let Some(timer) = machine.timer() {
                self.timer_owners.remove(timer);
            }
            machine.teardown(&mut self.timers);
        }
        if let Some(binding) = self.dismiss_bindings.remove(id) {
            if let Some(watcher) = binding.armed {
                self.watcher_owners.remove(watcher);
                self.dismiss.disarm(watcher);
            }
        }
        self.contexts.release(id).is_some()
    }

    // =========================================================================
    // Context access
    // =========================================================================

    /// Read-only view of every mounted root
    pub fn contexts(&self) -> &ContextArena {
        &self.contexts
    }

    /// Run `f` with `id` as the innermost enclosing root of `kind`
    pub fn scoped<R>(&mut self, kind: ContextKind, id: ContextId, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.contexts.push_scope(kind, id);
        let result = f(self);
        self.contexts.restore_scope(depth);
        result
    }

    /// Nearest enclosing root of `kind`
    pub fn lookup(&self, kind: ContextKind) -> Result<ContextId> {
        self.contexts.lookup_id(kind)
    }

    pub fn current(&self, id: ContextId) -> Result<&SelectionValue> {
        self.contexts.current(id)
    }

    /// Open flag of a `Boolean` root
    pub fn is_open(&self, id: ContextId) -> Result<bool> {
        let value = self.contexts.current(id)?;
        value.as_bool().ok_or(EngineError::ShapeMismatch {
            expected: ValueShape::Boolean,
            found: value.shape(),
        })
    }

    pub fn items(&self, id: ContextId) -> Result<&ItemRegistry> {
        self.contexts.items(id)
    }

    /// Register a focusable leaf with a root
    pub fn register_item(&mut self, id: ContextId, item: impl Into<Identifier>, disabled: bool) -> Result<()> {
        self.contexts.context(id)?.register_item(item, disabled)
    }

    pub fn unregister_item(&mut self, id: ContextId, item: &str) -> Result<bool> {
        Ok(self.contexts.context(id)?.unregister_item(item))
    }

    /// Update a registered item's disabled flag; false if it is not registered
    pub fn set_item_disabled(&mut self, id: ContextId, item: &str, disabled: bool) -> Result<bool> {
        Ok(self.contexts.context(id)?.set_item_disabled(item, disabled))
    }

    // =========================================================================
    // Changes
    // =========================================================================

    /// Propose a value for a root and bring its bindings in line
    pub fn request_change(&mut self, id: ContextId, next: SelectionValue) -> Result<()> {
        self.contexts.request_change(id, next)?;
        self.reconcile(id)
    }

    /// Toggle `item` under the disclosure convention
    pub fn toggle(&mut self, id: ContextId, item: &Identifier) -> Result<()> {
        let next = self.contexts.current(id)?.toggled(item);
        self.request_change(id, next)
    }

    /// Hand a root the owner's latest external value
    pub fn sync_external(&mut self, id: ContextId, external: Option<SelectionValue>) -> Result<()> {
        self.contexts.sync_external(id, external)?;
        self.reconcile(id)
    }

    // =========================================================================
    // Dismiss bindings
    // =========================================================================

    /// Close a `Boolean` root on outside pointer-down / escape while it is open
    pub fn bind_dismiss<B>(&mut self, id: ContextId, boundary: B, config: DismissConfig) -> Result<()>
    where
        B: Fn(NodeId) -> bool + Send + Sync + 'static,
    {
        self.contexts.current(id)?.ensure_shape(ValueShape::Boolean)?;
        self.unbind_dismiss(id);
        self.dismiss_bindings.insert(
            id,
            DismissBinding {
                boundary: Arc::new(boundary),
                config,
                on_dismiss: None,
                armed: None,
            },
        );
        self.reconcile(id)
    }

    /// Callback run whenever the root's watcher fires, before it closes
    pub fn on_dismiss<F>(&mut self, id: ContextId, on_dismiss: F) -> Result<()>
    where
        F: Fn(DismissReason) + Send + Sync + 'static,
    {
        let binding = self.dismiss_bindings.get_mut(id).ok_or(EngineError::UnknownContext)?;
        binding.on_dismiss = Some(Arc::new(on_dismiss));
        // Re-arm so an open widget picks up the new callback
        if let Some(watcher) = binding.armed.take() {
            self.watcher_owners.remove(watcher);
            self.dismiss.disarm(watcher);
        }
        self.reconcile(id)
    }

    /// Drop a root's dismiss binding, disarming it if armed
    pub fn unbind_dismiss(&mut self, id: ContextId) -> bool {
        match self.dismiss_bindings.remove(id) {
            Some(binding) => {
                if let Some(watcher) = binding.armed {
                    self.watcher_owners.remove(watcher);
                    self.dismiss.disarm(watcher);
                }
                true
            }
            None => false,
        }
    }

    /// Whether the root currently has an armed watcher
    pub fn is_dismiss_armed(&self, id: ContextId) -> bool {
        self.dismiss_bindings
            .get(id)
            .is_some_and(|binding| binding.armed.is_some())
    }

    /// Document-level pointer-down; returns how many roots were asked to close
    pub fn pointer_down(&mut self, target: NodeId) -> Result<usize> {
        let dismissals = self.dismiss.pointer_down(target);
        let mut first_err = None;
        for dismissal in &dismissals {
            if let Err(err) = self.close_dismissed(dismissal.watcher) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(dismissals.len()), Err)
    }

    /// Document-level key-down; returns whether something was dismissed
    ///
    /// Escape goes to the topmost dismiss watcher. With none armed, it closes
    /// open hover widgets instead.
    pub fn key_down(&mut self, key: Key) -> Result<bool> {
        if key != Key::Escape {
            return Ok(false);
        }
        if let Some(dismissal) = self.dismiss.key_down(key) {
            self.close_dismissed(dismissal.watcher)?;
            return Ok(true);
        }

        let open: Vec<ContextId> = self
            .hover_bindings
            .iter()
            .filter(|(id, machine)| {
                machine.phase() != HoverPhase::Idle || self.is_open(*id).unwrap_or(false)
            })
            .map(|(id, _)| id)
            .collect();
        for id in &open {
            self.hover_force_close(*id)?;
        }
        Ok(!open.is_empty())
    }

    fn close_dismissed(&mut self, watcher: WatcherId) -> Result<()> {
        let Some(&id) = self.watcher_owners.get(watcher) else {
            return Ok(());
        };
        self.request_change(id, SelectionValue::closed())
    }

    // =========================================================================
    // Hover bindings
    // =========================================================================

    /// Drive a `Boolean` root from hover/focus intent
    pub fn bind_hover(&mut self, id: ContextId, config: HoverConfig) -> Result<()> {
        let open = self.is_open(id)?;
        let disabled = config.disabled;
        let mut machine = HoverMachine::new(config);
        if open {
            machine.force_open();
        }
        if let Some(mut previous) = self.hover_bindings.insert(id, machine) {
            if let Some(timer) = previous.timer() {
                self.timer_owners.remove(timer);
            }
            previous.teardown(&mut self.timers);
        }
        // A disabled machine stays Idle, so an open value has to close
        if open && disabled {
            self.request_change(id, SelectionValue::closed())?;
        }
        Ok(())
    }

    pub fn hover_phase(&self, id: ContextId) -> Option<HoverPhase> {
        self.hover_bindings.get(id).map(HoverMachine::phase)
    }

    /// Feed a pointer/focus signal to a root's hover machine
    pub fn hover(&mut self, id: ContextId, signal: HoverSignal) -> Result<()> {
        let machine = self.hover_bindings.get_mut(id).ok_or(EngineError::UnknownContext)?;
        let effects = machine.advance(signal);
        self.perform_hover(id, effects)
    }

    /// Close a hover widget now, cancelling any pending timer
    pub fn hover_force_close(&mut self, id: ContextId) -> Result<()> {
        let machine = self.hover_bindings.get_mut(id).ok_or(EngineError::UnknownContext)?;
        let effects = machine.force_close();
        self.perform_hover_close(id, effects)
    }

    /// Enable or disable a hover widget; disabling closes it
    pub fn set_hover_disabled(&mut self, id: ContextId, disabled: bool) -> Result<()> {
        let machine = self.hover_bindings.get_mut(id).ok_or(EngineError::UnknownContext)?;
        let effects = machine.set_disabled(disabled);
        if disabled {
            self.perform_hover_close(id, effects)
        } else {
            self.perform_hover(id, effects)
        }
    }

    /// Advance the clock and deliver expired timers to their machines
    ///
    /// Returns how many timers were delivered.
    pub fn advance_time(&mut self, now_ms: u64) -> Result<usize> {
        let fired = self.timers.update(now_ms);
        let mut delivered = 0;
        let mut first_err = None;

        for timer in fired {
            let Some(id) = self.timer_owners.remove(timer) else {
                continue;
            };
            let Some(machine) = self.hover_bindings.get_mut(id) else {
                continue;
            };
            let effects = machine.advance(HoverSignal::TimerExpired(timer));
            delivered += 1;
            if let Err(err) = self.perform_hover(id, effects) {
                first_err.get_or_insert(err);
            }
        }

        first_err.map_or(Ok(delivered), Err)
    }

    /// Time of the last `advance_time`
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    fn perform_hover(&mut self, id: ContextId, effects: HoverEffects) -> Result<()> {
        if let Some(timer) = effects.cancel_timer {
            self.timers.cancel(timer);
            self.timer_owners.remove(timer);
        }
        if let Some(delay) = effects.schedule_timer {
            let timer = self.timers.schedule(delay);
            self.timer_owners.insert(timer, id);
            if let Some(machine) = self.hover_bindings.get_mut(id) {
                machine.attach_timer(timer);
            }
        }
        match effects.open_changed {
            Some(open) => self.request_change(id, SelectionValue::Boolean(open)),
            None => Ok(()),
        }
    }

    /// Like `perform_hover`, but an open value closes even when the machine
    /// was already `Idle`
    fn perform_hover_close(&mut self, id: ContextId, effects: HoverEffects) -> Result<()> {
        let reported = effects.open_changed.is_some();
        self.perform_hover(id, effects)?;
        if !reported && self.is_open(id)? {
            self.request_change(id, SelectionValue::closed())?;
        }
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move a `Single` root's selection with a navigation key
    ///
    /// The target comes from the root's registered items and goes through
    /// `request_change` like any other change. Returns the target.
    pub fn navigate(&mut self, id: ContextId, key: NavKey, looping: bool) -> Result<Option<Identifier>> {
        let value = self.contexts.current(id)?;
        let current = value.as_single().ok_or(EngineError::ShapeMismatch {
            expected: ValueShape::Single,
            found: value.shape(),
        })?;
        let target = self.contexts.items(id)?.navigate(current, key, looping);

        if let Some(target) = &target {
            if current != Some(target) {
                self.request_change(id, SelectionValue::Single(Some(target.clone())))?;
            }
        }
        Ok(target)
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Bring a root's bindings in line with its committed value
    fn reconcile(&mut self, id: ContextId) -> Result<()> {
        let Some(open) = self.contexts.current(id)?.as_bool() else {
            return Ok(());
        };

        if let Some(binding) = self.dismiss_bindings.get_mut(id) {
            match (open, binding.armed) {
                (true, None) => {
                    let boundary = Arc::clone(&binding.boundary);
                    let on_dismiss = binding.on_dismiss.clone();
                    let watcher = self.dismiss.arm(
                        move |target| boundary(target),
                        move |reason| {
                            if let Some(on_dismiss) = &on_dismiss {
                                on_dismiss(reason);
                            }
                        },
                        binding.config,
                    );
                    binding.armed = Some(watcher);
                    self.watcher_owners.insert(watcher, id);
                }
                (false, Some(watcher)) => {
                    binding.armed = None;
                    self.watcher_owners.remove(watcher);
                    self.dismiss.disarm(watcher);
                }
                _ => {}
            }
        }

        if let Some(machine) = self.hover_bindings.get_mut(id) {
            if machine.is_open() != open {
                let effects = machine.sync_open(open);
                if let Some(timer) = effects.cancel_timer {
                    self.timers.cancel(timer);
                    self.timer_owners.remove(timer);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Get statistics about the runtime
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            contexts: self.contexts.len(),
            armed_watchers: self.dismiss.armed_count(),
            pending_timers: self.timers.pending_count(),
            dismiss_bindings: self.dismiss_bindings.len(),
            hover_bindings: self.hover_bindings.len(),
        }
    }
}

/// Statistics about the runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub contexts: usize,
    pub armed_watchers: usize,
    pub pending_timers: usize,
    pub dismiss_bindings: usize,
    pub hover_bindings: usize,
}
