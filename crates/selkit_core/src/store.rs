//! Value store - controlled/uncontrolled ownership arbitration
//!
//! A [`ValueStore`] is the single source of truth for one widget's
//! [`SelectionValue`]. Ownership is decided once, at construction:
//!
//! - **Uncontrolled**: the store keeps a local value seeded from the initial
//!   value and writes every accepted request into it immediately.
//! - **Controlled**: the store only relays. It reads whatever the owner last
//!   handed it through [`ValueStore::sync_external`] and never writes locally.
//!
//! In both modes `request_change` invokes the owner's `on_change` callback
//! with the proposed value, so a controlled owner decides on its own whether
//! to honor it.
//!
//! # Example
//!
//! ```rust
//! use selkit_core::store::{OwnershipMode, ValueStore};
//! use selkit_core::value::SelectionValue;
//!
//! let mut store = ValueStore::new(OwnershipMode::uncontrolled(SelectionValue::none()));
//! store.request_change(SelectionValue::single("item-2")).unwrap();
//! assert_eq!(store.current(), &SelectionValue::single("item-2"));
//! ```

use std::fmt;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::error::{EngineError, Result};
use crate::value::{SelectionValue, ValueShape};

/// Callback receiving a proposed or committed value
pub type ChangeCallback = Arc<dyn Fn(&SelectionValue) + Send + Sync>;

new_key_type! {
    /// Handle for a change subscription on a store
    pub struct SubscriptionId;
}

/// Which side owns a widget's value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OwnershipKind {
    Controlled,
    Uncontrolled,
}

/// Ownership chosen for a widget at construction
pub enum OwnershipMode {
    /// Value supplied and owned by the caller
    Controlled {
        value: SelectionValue,
        on_change: Option<ChangeCallback>,
    },
    /// Value owned by the widget, seeded from `initial`
    Uncontrolled {
        initial: SelectionValue,
        on_change: Option<ChangeCallback>,
    },
}

impl OwnershipMode {
    /// Controlled by `value`; `on_change` receives every proposal
    pub fn controlled<F>(value: SelectionValue, on_change: F) -> Self
    where
        F: Fn(&SelectionValue) + Send + Sync + 'static,
    {
        Self::Controlled {
            value,
            on_change: Some(Arc::new(on_change)),
        }
    }

    pub fn uncontrolled(initial: SelectionValue) -> Self {
        Self::Uncontrolled {
            initial,
            on_change: None,
        }
    }

    /// Pick the mode the way a component reads its props: controlled if and
    /// only if an external value is present
    pub fn from_props(
        value: Option<SelectionValue>,
        default_value: SelectionValue,
        on_change: Option<ChangeCallback>,
    ) -> Self {
        match value {
            Some(value) => Self::Controlled { value, on_change },
            None => Self::Uncontrolled {
                initial: default_value,
                on_change,
            },
        }
    }

    /// Attach (or replace) the change callback
    pub fn with_on_change<F>(self, on_change: F) -> Self
    where
        F: Fn(&SelectionValue) + Send + Sync + 'static,
    {
        let on_change: Option<ChangeCallback> = Some(Arc::new(on_change));
        match self {
            Self::Controlled { value, .. } => Self::Controlled { value, on_change },
            Self::Uncontrolled { initial, .. } => Self::Uncontrolled { initial, on_change },
        }
    }

    pub fn kind(&self) -> OwnershipKind {
        match self {
            Self::Controlled { .. } => OwnershipKind::Controlled,
            Self::Uncontrolled { .. } => OwnershipKind::Uncontrolled,
        }
    }
}

impl fmt::Debug for OwnershipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controlled { value, on_change } => f
                .debug_struct("Controlled")
                .field("value", value)
                .field("on_change", &on_change.is_some())
                .finish(),
            Self::Uncontrolled { initial, on_change } => f
                .debug_struct("Uncontrolled")
                .field("initial", initial)
                .field("on_change", &on_change.is_some())
                .finish(),
        }
    }
}

/// Store behavior switches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreOptions {
    /// Re-requesting the selected `Single` id clears the selection
    pub collapsible: bool,
}

impl StoreOptions {
    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }
}

enum Slot {
    /// Last value the owner handed us
    Controlled { external: SelectionValue },
    /// Our own copy
    Uncontrolled { local: SelectionValue },
}

/// Single source of truth for one widget's value
pub struct ValueStore {
    slot: Slot,
    shape: ValueShape,
    options: StoreOptions,
    on_change: Option<ChangeCallback>,
    subscribers: SlotMap<SubscriptionId, ChangeCallback>,
}

impl ValueStore {
    /// Create a store; the shape of the initial/external value is committed
    /// for the store's lifetime
    pub fn new(mode: OwnershipMode) -> Self {
        Self::with_options(mode, StoreOptions::default())
    }

    pub fn with_options(mode: OwnershipMode, options: StoreOptions) -> Self {
        let (slot, on_change) = match mode {
            OwnershipMode::Controlled { value, on_change } => {
                (Slot::Controlled { external: value }, on_change)
            }
            OwnershipMode::Uncontrolled { initial, on_change } => {
                (Slot::Uncontrolled { local: initial }, on_change)
            }
        };
        let shape = match &slot {
            Slot::Controlled { external } => external.shape(),
            Slot::Uncontrolled { local } => local.shape(),
        };

        Self {
            slot,
            shape,
            options,
            on_change,
            subscribers: SlotMap::with_key(),
        }
    }

    /// The external value when controlled, the local value otherwise
    pub fn current(&self) -> &SelectionValue {
        match &self.slot {
            Slot::Controlled { external } => external,
            Slot::Uncontrolled { local } => local,
        }
    }

    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    pub fn kind(&self) -> OwnershipKind {
        match self.slot {
            Slot::Controlled { .. } => OwnershipKind::Controlled,
            Slot::Uncontrolled { .. } => OwnershipKind::Uncontrolled,
        }
    }

    pub fn is_controlled(&self) -> bool {
        self.kind() == OwnershipKind::Controlled
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Propose a new value
    ///
    /// Uncontrolled stores commit `next` before returning, so a following
    /// [`current`](Self::current) observes it. The `on_change` callback runs
    /// in both modes. A value of another shape is rejected untouched.
    pub fn request_change(&mut self, next: SelectionValue) -> Result<()> {
        next.ensure_shape(self.shape)?;
        let next = self.resolve(next);

        let committed = match &mut self.slot {
            Slot::Uncontrolled { local } if *local != next => {
                *local = next.clone();
                true
            }
            _ => false,
        };

        tracing::debug!(kind = ?self.kind(), value = ?next, committed, "request_change");

        if let Some(on_change) = self.on_change.clone() {
            on_change(&next);
        }
        if committed {
            self.notify_subscribers();
        }
        Ok(())
    }

    /// Toggle `id` under the disclosure convention and propose the result
    pub fn toggle(&mut self, id: &crate::value::Identifier) -> Result<()> {
        let next = self.current().toggled(id);
        self.request_change(next)
    }

    /// Hand the store the owner's latest external value
    ///
    /// Called on every re-render with whatever the owner passes as its
    /// `value` prop. A controlled store adopts `Some(value)`. Presence that
    /// disagrees with the mode chosen at construction is reported as
    /// `OwnershipModeChange` and otherwise ignored.
    pub fn sync_external(&mut self, external: Option<SelectionValue>) -> Result<()> {
        match (&mut self.slot, external) {
            (Slot::Controlled { external: current }, Some(value)) => {
                value.ensure_shape(self.shape)?;
                if *current != value {
                    tracing::debug!(value = ?value, "sync_external");
                    *current = value;
                    self.notify_subscribers();
                }
                Ok(())
            }
            (Slot::Uncontrolled { .. }, None) => Ok(()),
            (Slot::Controlled { .. }, None) => Err(mode_change(
                OwnershipKind::Controlled,
                OwnershipKind::Uncontrolled,
            )),
            (Slot::Uncontrolled { .. }, Some(_)) => Err(mode_change(
                OwnershipKind::Uncontrolled,
                OwnershipKind::Controlled,
            )),
        }
    }

    /// Subscribe to committed value changes
    ///
    /// Subscribers fire when the value `current()` returns actually changes,
    /// not on proposals a controlled owner has yet to accept.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&SelectionValue) + Send + Sync + 'static,
    {
        self.subscribers.insert(Arc::new(callback))
    }

    /// Remove a subscription, returning whether it existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn resolve(&self, next: SelectionValue) -> SelectionValue {
        if !self.options.collapsible {
            return next;
        }
        match (self.current(), &next) {
            (SelectionValue::Single(Some(current)), SelectionValue::Single(Some(requested)))
                if current == requested =>
            {
                SelectionValue::Single(None)
            }
            _ => next,
        }
    }

    fn notify_subscribers(&self) {
        let value = self.current();
        for callback in self.subscribers.values() {
            callback(value);
        }
    }
}

impl fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueStore")
            .field("kind", &self.kind())
            .field("value", self.current())
            .field("options", &self.options)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn mode_change(from: OwnershipKind, to: OwnershipKind) -> EngineError {
    tracing::warn!(
        ?from,
        ?to,
        "widget switched ownership mode after mount; keeping {:?}",
        from
    );
    EngineError::OwnershipModeChange { from, to }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Identifier;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<SelectionValue>>>, ChangeCallback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let callback: ChangeCallback = Arc::new(move |v: &SelectionValue| {
            sink.lock().unwrap().push(v.clone());
        });
        (log, callback)
    }

    #[test]
    fn test_controlled_relay() {
        let (log, callback) = recorder();
        let mut store = ValueStore::new(OwnershipMode::Controlled {
            value: SelectionValue::single("a"),
            on_change: Some(callback),
        });

        let requests = [
            SelectionValue::single("b"),
            SelectionValue::none(),
            SelectionValue::single("c"),
        ];
        for next in requests.iter().cloned() {
            store.request_change(next).unwrap();
            assert_eq!(store.current(), &SelectionValue::single("a"));
        }

        assert_eq!(*log.lock().unwrap(), requests);
    }

    #[test]
    fn test_uncontrolled_self_management() {
        let (log, callback) = recorder();
        let mut store = ValueStore::new(OwnershipMode::Uncontrolled {
            initial: SelectionValue::none(),
            on_change: Some(callback),
        });

        for next in [
            SelectionValue::single("x"),
            SelectionValue::single("x"),
            SelectionValue::none(),
            SelectionValue::single("y"),
        ] {
            store.request_change(next.clone()).unwrap();
            assert_eq!(store.current(), &next);
        }
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let (log, callback) = recorder();
        let mut store = ValueStore::new(OwnershipMode::Uncontrolled {
            initial: SelectionValue::closed(),
            on_change: Some(callback),
        });

        let err = store.request_change(SelectionValue::single("a")).unwrap_err();
        assert_eq!(
            err,
            EngineError::ShapeMismatch {
                expected: ValueShape::Boolean,
                found: ValueShape::Single,
            }
        );
        assert_eq!(store.current(), &SelectionValue::closed());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_single_select_disclosure_toggle() {
        let mut store = ValueStore::with_options(
            OwnershipMode::uncontrolled(SelectionValue::none()),
            StoreOptions::default().collapsible(true),
        );

        store.request_change(SelectionValue::single("item-2")).unwrap();
        assert_eq!(store.current(), &SelectionValue::single("item-2"));

        store.request_change(SelectionValue::single("item-2")).unwrap();
        assert_eq!(store.current(), &SelectionValue::none());
    }

    #[test]
    fn test_multi_select_toggle() {
        let mut store = ValueStore::new(OwnershipMode::uncontrolled(SelectionValue::empty_set()));

        store.request_change(SelectionValue::multiple(["a"])).unwrap();
        store.request_change(SelectionValue::multiple(["b"])).unwrap();
        assert_eq!(store.current(), &SelectionValue::multiple(["b"]));

        store.toggle(&Identifier::from("c")).unwrap();
        assert_eq!(store.current(), &SelectionValue::multiple(["b", "c"]));
    }

    #[test]
    fn test_sync_external() {
        let mut store = ValueStore::new(OwnershipMode::controlled(SelectionValue::closed(), |_| {}));

        store.sync_external(Some(SelectionValue::open())).unwrap();
        assert_eq!(store.current(), &SelectionValue::open());

        assert!(matches!(
            store.sync_external(Some(SelectionValue::none())),
            Err(EngineError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_ownership_mode_change_reported() {
        let mut controlled =
            ValueStore::new(OwnershipMode::controlled(SelectionValue::single("a"), |_| {}));
        assert_eq!(
            controlled.sync_external(None),
            Err(EngineError::OwnershipModeChange {
                from: OwnershipKind::Controlled,
                to: OwnershipKind::Uncontrolled,
            })
        );
        assert!(controlled.is_controlled());
        assert_eq!(controlled.current(), &SelectionValue::single("a"));

        let mut uncontrolled = ValueStore::new(OwnershipMode::uncontrolled(SelectionValue::none()));
        assert!(uncontrolled.sync_external(None).is_ok());
        assert_eq!(
            uncontrolled.sync_external(Some(SelectionValue::single("b"))),
            Err(EngineError::OwnershipModeChange {
                from: OwnershipKind::Uncontrolled,
                to: OwnershipKind::Controlled,
            })
        );
        assert_eq!(uncontrolled.current(), &SelectionValue::none());
    }

    #[test]
    fn test_subscribers_see_commits_only() {
        let (log, callback) = recorder();
        let mut store = ValueStore::new(OwnershipMode::controlled(SelectionValue::closed(), |_| {}));
        let sub = store.subscribe(move |v| callback(v));

        store.request_change(SelectionValue::open()).unwrap();
        assert!(log.lock().unwrap().is_empty());

        store.sync_external(Some(SelectionValue::open())).unwrap();
        assert_eq!(*log.lock().unwrap(), [SelectionValue::open()]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_from_props() {
        let mode = OwnershipMode::from_props(None, SelectionValue::closed(), None);
        assert_eq!(mode.kind(), OwnershipKind::Uncontrolled);
        let mode = OwnershipMode::from_props(Some(SelectionValue::open()), SelectionValue::closed(), None);
        assert_eq!(mode.kind(), OwnershipKind::Controlled);
    }
}
