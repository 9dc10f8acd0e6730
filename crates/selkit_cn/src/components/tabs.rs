//! Tabs component for tabbed navigation
//!
//! One tab of a list is active at a time. Arrow keys move between triggers
//! along the list's orientation, skipping disabled tabs and wrapping at the
//! ends.
//!
//! # Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let tabs = cn::tabs()
//!     .tab("account")
//!     .tab("password")
//!     .tab_disabled("billing")
//!     .tab("notifications")
//!     .default_value("account")
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! // Automatic activation: arrows select as they move
//! let focused = Identifier::from("password");
//! tabs.key_down(&mut rt, &focused, Key::ArrowRight).unwrap();
//! assert_eq!(tabs.active(&rt), Some(Identifier::from("notifications")));
//! ```
//!
//! # Manual Activation
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//! let tabs = cn::tabs()
//!     .activation_mode(ActivationMode::Manual)
//!     .tab("a")
//!     .tab("b")
//!     .default_value("a")
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! // Arrows only move focus; Enter activates
//! let next = tabs.key_down(&mut rt, &"a".into(), Key::ArrowRight).unwrap();
//! assert_eq!(next, Some(Identifier::from("b")));
//! assert_eq!(tabs.active(&rt), Some(Identifier::from("a")));
//! tabs.key_down(&mut rt, &"b".into(), Key::Enter).unwrap();
//! assert_eq!(tabs.active(&rt), Some(Identifier::from("b")));
//! ```

use std::sync::Arc;

use selkit_core::{
    ChangeCallback, ContextId, ContextKind, Identifier, Key, NavKey, NavigationConfig,
    Orientation, OwnershipMode, Result, SelectionValue, SelkitRuntime, StoreOptions,
};

pub const TABS: ContextKind = ContextKind::new("Tabs");

/// When keyboard focus activates a tab
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivationMode {
    /// Moving focus activates the tab (default)
    #[default]
    Automatic,
    /// Focus moves freely; Enter/Space activates
    Manual,
}

/// Builder for a tabs root
pub struct TabsBuilder {
    tabs: Vec<(Identifier, bool)>,
    default_value: Option<Identifier>,
    value: Option<Option<Identifier>>,
    on_change: Option<ChangeCallback>,
    activation: ActivationMode,
    navigation: NavigationConfig,
}

/// Create a tab list
pub fn tabs() -> TabsBuilder {
    TabsBuilder {
        tabs: Vec::new(),
        default_value: None,
        value: None,
        on_change: None,
        activation: ActivationMode::default(),
        navigation: NavigationConfig::default(),
    }
}

impl TabsBuilder {
    /// Add a tab
    pub fn tab(mut self, value: impl Into<Identifier>) -> Self {
        self.tabs.push((value.into(), false));
        self
    }

    /// Add a tab that cannot be activated or focused
    pub fn tab_disabled(mut self, value: impl Into<Identifier>) -> Self {
        self.tabs.push((value.into(), true));
        self
    }

    /// Initially active tab (uncontrolled)
    pub fn default_value(mut self, value: impl Into<Identifier>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Active tab owned by the caller (controlled)
    pub fn value(mut self, value: Option<Identifier>) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(move |value: &SelectionValue| {
            if let Some(Some(tab)) = value.as_single() {
                callback(tab.as_str());
            }
        }));
        self
    }

    pub fn activation_mode(mut self, mode: ActivationMode) -> Self {
        self.activation = mode;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.navigation = self.navigation.orientation(orientation);
        self
    }

    /// Wrap between the first and last tab (default: true)
    pub fn looping(mut self, looping: bool) -> Self {
        self.navigation = self.navigation.looping(looping);
        self
    }

    pub fn mount(self, rt: &mut SelkitRuntime) -> Result<Tabs> {
        let mode = OwnershipMode::from_props(
            self.value.map(SelectionValue::Single),
            SelectionValue::Single(self.default_value),
            self.on_change,
        );
        let id = rt.mount(TABS, mode, StoreOptions::default());

        for (tab, disabled) in self.tabs {
            if let Err(err) = rt.register_item(id, tab, disabled) {
                rt.unmount(id);
                return Err(err);
            }
        }

        Ok(Tabs {
            id,
            activation: self.activation,
            navigation: self.navigation,
        })
    }
}

/// A mounted tab list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tabs {
    id: ContextId,
    activation: ActivationMode,
    navigation: NavigationConfig,
}

impl Tabs {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn scoped<R>(&self, rt: &mut SelkitRuntime, f: impl FnOnce(&mut SelkitRuntime) -> R) -> R {
        rt.scoped(TABS, self.id, f)
    }

    /// The active tab
    pub fn active(&self, rt: &SelkitRuntime) -> Option<Identifier> {
        rt.current(self.id)
            .ok()
            .and_then(|value| value.as_single().flatten().cloned())
    }

    /// Activate a tab; disabled and unknown tabs are ignored
    pub fn select(&self, rt: &mut SelkitRuntime, tab: impl Into<Identifier>) -> Result<()> {
        activate(rt, self.id, tab.into())
    }

    /// Keyboard handling on a focused trigger
    ///
    /// Arrows move from `focused`; returns the trigger that should receive
    /// focus next.
    pub fn key_down(&self, rt: &mut SelkitRuntime, focused: &Identifier, key: Key) -> Result<Option<Identifier>> {
        if key.is_activation() {
            activate(rt, self.id, focused.clone())?;
            return Ok(None);
        }
        let Some(nav) = NavKey::from_key(key, self.navigation.orientation) else {
            return Ok(None);
        };

        let target = rt
            .items(self.id)?
            .navigate(Some(focused), nav, self.navigation.looping);
        if let (ActivationMode::Automatic, Some(tab)) = (self.activation, &target) {
            if self.active(rt).as_ref() != Some(tab) {
                activate(rt, self.id, tab.clone())?;
            }
        }
        Ok(target)
    }

    pub fn set_disabled(&self, rt: &mut SelkitRuntime, tab: &str, disabled: bool) -> Result<bool> {
        rt.set_item_disabled(self.id, tab, disabled)
    }

    pub fn sync(&self, rt: &mut SelkitRuntime, value: Option<Option<Identifier>>) -> Result<()> {
        rt.sync_external(self.id, value.map(SelectionValue::Single))
    }

    pub fn unmount(self, rt: &mut SelkitRuntime) -> bool {
        rt.unmount(self.id)
    }
}

fn activate(rt: &mut SelkitRuntime, id: ContextId, tab: Identifier) -> Result<()> {
    let items = rt.items(id)?;
    if !items.contains(&tab) || items.is_disabled(&tab) {
        tracing::trace!(%tab, "tab activation ignored");
        return Ok(());
    }
    rt.request_change(id, SelectionValue::Single(Some(tab)))
}

/// The clickable trigger of one tab
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabsTrigger {
    value: Identifier,
}

impl TabsTrigger {
    pub fn new(value: impl Into<Identifier>) -> Self {
        Self { value: value.into() }
    }

    pub fn press(&self, rt: &mut SelkitRuntime) -> Result<()> {
        let id = rt.lookup(TABS)?;
        activate(rt, id, self.value.clone())
    }

    /// Whether this trigger's tab (and so its content) is active
    pub fn is_active(&self, rt: &SelkitRuntime) -> Result<bool> {
        let id = rt.lookup(TABS)?;
        Ok(rt.current(id)?.is_selected(&self.value))
    }
}
