//! Selkit Core Engine
//!
//! This crate provides the headless primitives behind selkit's composite
//! widgets (accordions, tabs, selects, menus, popovers, tooltips):
//!
//! - **Value Stores**: One value per widget, owned by the widget or by its owner
//! - **Context Arena**: Roots share their store with their parts by ambient lookup
//! - **Dismiss Layer**: Outside pointer-down and Escape close open widgets
//! - **Hover Machine**: Debounced open/close driven by hover and focus
//! - **Keyboard Navigation**: Arrow/Home/End movement over registered items
//!
//! [`SelkitRuntime`] wires all of them together. Platform code feeds it
//! pointer, key and hover events plus the current time; widgets read their
//! values back from it.
//!
//! # Example
//!
//! ```rust
//! use selkit_core::prelude::*;
//!
//! const POPOVER: ContextKind = ContextKind::new("Popover");
//!
//! let mut rt = SelkitRuntime::new();
//! let popover = rt.mount(
//!     POPOVER,
//!     OwnershipMode::uncontrolled(SelectionValue::closed()),
//!     StoreOptions::default(),
//! );
//!
//! // Node 1 is the trigger, node 2 the content
//! rt.bind_dismiss(popover, |node| node.0 == 1 || node.0 == 2, DismissConfig::default())
//!     .unwrap();
//!
//! rt.request_change(popover, SelectionValue::open()).unwrap();
//! assert_eq!(rt.is_open(popover), Ok(true));
//!
//! // A click somewhere else closes it
//! rt.pointer_down(NodeId(7)).unwrap();
//! assert_eq!(rt.is_open(popover), Ok(false));
//! ```

pub mod context;
pub mod dismiss;
pub mod error;
pub mod events;
pub mod hover;
pub mod navigation;
pub mod runtime;
pub mod store;
pub mod timer;
pub mod value;

pub use context::{ContextArena, ContextId, ContextKind, WidgetContext};
pub use dismiss::{DismissConfig, DismissLayer, DismissReason, Dismissal, WatcherId};
pub use error::{EngineError, Result};
pub use events::{Key, NodeId};
pub use hover::{
    HoverConfig, HoverEffects, HoverMachine, HoverPhase, HoverSignal, DEFAULT_CLOSE_DELAY_MS,
    DEFAULT_OPEN_DELAY_MS,
};
pub use navigation::{
    next_index, next_index_with, ItemRegistry, NavKey, NavigationConfig, Orientation,
    RegisteredItem,
};
pub use runtime::{RuntimeStats, SelkitRuntime};
pub use store::{
    ChangeCallback, OwnershipKind, OwnershipMode, StoreOptions, SubscriptionId, ValueStore,
};
pub use timer::{TimerId, TimerQueue};
pub use value::{IdSet, Identifier, SelectionValue, ValueShape};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{ContextId, ContextKind};
    pub use crate::dismiss::{DismissConfig, DismissReason};
    pub use crate::error::{EngineError, Result};
    pub use crate::events::{Key, NodeId};
    pub use crate::hover::{HoverConfig, HoverPhase, HoverSignal};
    pub use crate::navigation::{NavKey, NavigationConfig, Orientation};
    pub use crate::runtime::SelkitRuntime;
    pub use crate::store::{OwnershipMode, StoreOptions};
    pub use crate::value::{Identifier, SelectionValue};
}
