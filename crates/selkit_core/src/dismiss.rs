//! Dismiss layer - closing open widgets on outside interaction
//!
//! Open popovers, menus and selects arm a watcher here. The layer plays the
//! role of the document-level listener: the platform feeds it every
//! pointer-down and key-down, and it decides which watchers fire.
//!
//! - **Pointer down**: every armed watcher whose boundary does not contain
//!   the target fires, topmost (most recently armed) first.
//! - **Escape**: only the topmost watcher that accepts escape fires, so one
//!   press peels off one layer of nested popovers.
//!
//! Watchers are armed on open and disarmed on close, one to one. `disarm` is
//! idempotent. [`DismissLayer::arm_scoped`] ties a watcher to a lexical scope
//! for code that must release it on every exit path.

use std::fmt;
use std::ops::{Deref, DerefMut};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::events::{Key, NodeId};

new_key_type! {
    /// Handle to an armed watcher
    pub struct WatcherId;
}

/// Why a watcher fired
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DismissReason {
    PointerDownOutside,
    EscapeKey,
}

/// Which outside interactions dismiss a widget
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DismissConfig {
    pub dismiss_on_escape: bool,
    pub dismiss_on_pointer_down_outside: bool,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            dismiss_on_escape: true,
            dismiss_on_pointer_down_outside: true,
        }
    }
}

impl DismissConfig {
    pub fn dismiss_on_escape(mut self, dismiss: bool) -> Self {
        self.dismiss_on_escape = dismiss;
        self
    }

    pub fn dismiss_on_pointer_down_outside(mut self, dismiss: bool) -> Self {
        self.dismiss_on_pointer_down_outside = dismiss;
        self
    }
}

/// Returns true when the target lies inside the widget
pub type BoundaryCheck = Box<dyn Fn(NodeId) -> bool + Send + Sync>;

/// Invoked when a watcher fires
pub type DismissCallback = Box<dyn FnMut(DismissReason) + Send>;

struct Watcher {
    boundary: BoundaryCheck,
    on_dismiss: DismissCallback,
    config: DismissConfig,
    /// Arming order; higher is closer to the top
    seq: u64,
}

/// A dismissal that happened during dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dismissal {
    pub watcher: WatcherId,
    pub reason: DismissReason,
}

/// Registry of armed outside-interaction watchers
#[derive(Default)]
pub struct DismissLayer {
    watchers: SlotMap<WatcherId, Watcher>,
    seq: u64,
}

impl DismissLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching for outside interaction on behalf of an open widget
    pub fn arm<B, D>(&mut self, boundary: B, on_dismiss: D, config: DismissConfig) -> WatcherId
    where
        B: Fn(NodeId) -> bool + Send + Sync + 'static,
        D: FnMut(DismissReason) + Send + 'static,
    {
        let seq = self.seq;
        self.seq += 1;
        let id = self.watchers.insert(Watcher {
            boundary: Box::new(boundary),
            on_dismiss: Box::new(on_dismiss),
            config,
            seq,
        });
        tracing::debug!(?id, armed = self.watchers.len(), "dismiss watcher armed");
        id
    }

    /// Arm a watcher that is disarmed when the returned guard drops
    pub fn arm_scoped<B, D>(&mut self, boundary: B, on_dismiss: D, config: DismissConfig) -> ArmedScope<'_>
    where
        B: Fn(NodeId) -> bool + Send + Sync + 'static,
        D: FnMut(DismissReason) + Send + 'static,
    {
        let id = self.arm(boundary, on_dismiss, config);
        ArmedScope { layer: self, id }
    }

    /// Stop watching; returns whether the watcher was armed
    pub fn disarm(&mut self, id: WatcherId) -> bool {
        let removed = self.watchers.remove(id).is_some();
        if removed {
            tracing::debug!(?id, armed = self.watchers.len(), "dismiss watcher disarmed");
        }
        removed
    }

    pub fn is_armed(&self, id: WatcherId) -> bool {
        self.watchers.contains_key(id)
    }

    pub fn armed_count(&self) -> usize {
        self.watchers.len()
    }

    /// Dispatch a document-level pointer-down
    pub fn pointer_down(&mut self, target: NodeId) -> SmallVec<[Dismissal; 2]> {
        let mut hits: SmallVec<[(u64, WatcherId); 4]> = self
            .watchers
            .iter()
            .filter(|(_, w)| w.config.dismiss_on_pointer_down_outside && !(w.boundary)(target))
            .map(|(id, w)| (w.seq, id))
            .collect();
        hits.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        hits.into_iter()
            .filter_map(|(_, id)| self.fire(id, DismissReason::PointerDownOutside))
            .collect()
    }

    /// Dispatch a document-level key-down
    ///
    /// Only Escape does anything. Watchers form layers: one press fires the
    /// most recently armed watcher that accepts Escape and leaves the ones
    /// beneath it armed, so a popover opened from a menu closes before the
    /// menu does. Callers must not assume every open widget closes.
    pub fn key_down(&mut self, key: Key) -> Option<Dismissal> {
        if key != Key::Escape {
            return None;
        }
        let topmost = self
            .watchers
            .iter()
            .filter(|(_, w)| w.config.dismiss_on_escape)
            .max_by_key(|(_, w)| w.seq)
            .map(|(id, _)| id)?;
        self.fire(topmost, DismissReason::EscapeKey)
    }

    /// Disarm everything, returning how many watchers were armed
    pub fn clear(&mut self) -> usize {
        let count = self.watchers.len();
        self.watchers.clear();
        count
    }

    fn fire(&mut self, id: WatcherId, reason: DismissReason) -> Option<Dismissal> {
        let watcher = self.watchers.get_mut(id)?;
        tracing::debug!(?id, ?reason, "dismiss");
        (watcher.on_dismiss)(reason);
        Some(Dismissal { watcher: id, reason })
    }
}

impl fmt::Debug for DismissLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissLayer")
            .field("armed", &self.watchers.len())
            .finish()
    }
}

/// Scope guard returned by [`DismissLayer::arm_scoped`]
pub struct ArmedScope<'a> {
    layer: &'a mut DismissLayer,
    id: WatcherId,
}

impl ArmedScope<'_> {
    pub fn id(&self) -> WatcherId {
        self.id
    }
}

impl Deref for ArmedScope<'_> {
    type Target = DismissLayer;

    fn deref(&self) -> &DismissLayer {
        self.layer
    }
}

impl DerefMut for ArmedScope<'_> {
    fn deref_mut(&mut self) -> &mut DismissLayer {
        self.layer
    }
}

impl Drop for ArmedScope<'_> {
    fn drop(&mut self) {
        self.layer.disarm(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(&'static str, DismissReason)>>>;

    fn logger(log: &Log, name: &'static str) -> impl FnMut(DismissReason) + Send + 'static {
        let log = Arc::clone(log);
        move |reason| log.lock().unwrap().push((name, reason))
    }

    /// Boundary made of a fixed set of nodes
    fn inside(nodes: &'static [u64]) -> impl Fn(NodeId) -> bool + Send + Sync + 'static {
        move |target: NodeId| nodes.contains(&target.0)
    }

    #[test]
    fn test_pointer_down_outside() {
        let log: Log = Arc::default();
        let mut layer = DismissLayer::new();
        let id = layer.arm(inside(&[1, 2]), logger(&log, "popover"), DismissConfig::default());

        assert!(layer.pointer_down(NodeId(2)).is_empty());
        let fired = layer.pointer_down(NodeId(9));
        assert_eq!(
            fired.as_slice(),
            [Dismissal {
                watcher: id,
                reason: DismissReason::PointerDownOutside
            }]
        );
        assert_eq!(*log.lock().unwrap(), [("popover", DismissReason::PointerDownOutside)]);
    }

    #[test]
    fn test_escape_hits_topmost_only() {
        let log: Log = Arc::default();
        let mut layer = DismissLayer::new();
        layer.arm(inside(&[1]), logger(&log, "outer"), DismissConfig::default());
        let inner = layer.arm(inside(&[2]), logger(&log, "inner"), DismissConfig::default());

        assert_eq!(layer.key_down(Key::Enter), None);
        let fired = layer.key_down(Key::Escape).map(|d| d.watcher);
        assert_eq!(fired, Some(inner));
        assert_eq!(*log.lock().unwrap(), [("inner", DismissReason::EscapeKey)]);
    }

    #[test]
    fn test_pointer_down_fires_topmost_first() {
        let log: Log = Arc::default();
        let mut layer = DismissLayer::new();
        layer.arm(inside(&[1]), logger(&log, "outer"), DismissConfig::default());
        layer.arm(inside(&[2]), logger(&log, "inner"), DismissConfig::default());

        // Inside the outer popover, outside the nested one
        layer.pointer_down(NodeId(1));
        layer.pointer_down(NodeId(7));
        let names: Vec<_> = log.lock().unwrap().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["inner", "inner", "outer"]);
    }

    #[test]
    fn test_config_filters() {
        let log: Log = Arc::default();
        let mut layer = DismissLayer::new();
        layer.arm(
            inside(&[]),
            logger(&log, "sticky"),
            DismissConfig::default()
                .dismiss_on_escape(false)
                .dismiss_on_pointer_down_outside(false),
        );
        assert!(layer.pointer_down(NodeId(1)).is_empty());
        assert_eq!(layer.key_down(Key::Escape), None);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_idempotent_disarm() {
        let mut layer = DismissLayer::new();
        let id = layer.arm(inside(&[]), |_| {}, DismissConfig::default());
        assert!(layer.disarm(id));
        assert_eq!(layer.armed_count(), 0);
        assert!(!layer.disarm(id));
        assert_eq!(layer.armed_count(), 0);
        assert!(layer.pointer_down(NodeId(3)).is_empty());
    }

    #[test]
    fn test_scoped_watcher_released_on_early_return() {
        fn build_content() -> Result<(), &'static str> {
            Err("content failed to build")
        }

        fn open_and_fail(layer: &mut DismissLayer) -> Result<(), &'static str> {
            let mut scope = layer.arm_scoped(inside(&[]), |_| {}, DismissConfig::default());
            assert_eq!(scope.armed_count(), 1);
            scope.key_down(Key::Tab);
            build_content()?;
            Ok(())
        }

        let mut layer = DismissLayer::new();
        assert!(open_and_fail(&mut layer).is_err());
        assert_eq!(layer.armed_count(), 0);
    }
}
