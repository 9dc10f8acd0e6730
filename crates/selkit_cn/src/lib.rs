//! # Selkit Component Library (selkit_cn)
//!
//! Headless, shadcn-style components built on `selkit_core`.
//!
//! ## Philosophy
//!
//! Like shadcn/ui builds styled components on top of Radix UI primitives,
//! `selkit_cn` builds the state half of those components on top of
//! `selkit_core`. Nothing here draws: a rendering layer mounts a component,
//! forwards pointer, key and hover events, and paints whatever the handles
//! report as open, selected or highlighted.
//!
//! - **Engine**: `selkit_core` provides value stores, context lookup, dismissal, hover timers
//! - **Components**: `selkit_cn` wires those into accordion, tabs, select and friends
//!
//! ## Example
//!
//! ```rust
//! use selkit_cn::prelude::*;
//!
//! let mut rt = SelkitRuntime::new();
//!
//! let tabs = cn::tabs()
//!     .tab("account")
//!     .tab("password")
//!     .default_value("account")
//!     .on_change(|tab| println!("switched to {tab}"))
//!     .mount(&mut rt)
//!     .unwrap();
//!
//! let tip = cn::tooltip().mount(&mut rt).unwrap();
//!
//! tabs.scoped(&mut rt, |rt| TabsTrigger::new("password").press(rt)).unwrap();
//! tip.pointer_enter(&mut rt).unwrap();
//! rt.advance_time(700).unwrap();
//!
//! assert_eq!(tabs.active(&rt), Some(Identifier::from("password")));
//! assert!(tip.is_open(&rt));
//! ```
//!
//! ## Components
//!
//! - **Accordion** - Stacked sections, single or multi open
//! - **Collapsible** - One section shown or hidden
//! - **Tabs** - One active tab, automatic or manual keyboard activation
//! - **Select** - One option chosen from a dismissable list
//! - **DropdownMenu** - Actions in a dismissable list
//! - **Popover** - Floating content closed by outside interaction
//! - **Tooltip** - Hint shown after hover or focus
//! - **HoverCard** - Rich content shown after hover

pub mod components;


pub use components::*;

/// Convenience module for accessing components with `cn::` prefix
pub mod cn {
    pub use crate::components::accordion::accordion;
    pub use crate::components::collapsible::collapsible;
    pub use crate::components::dropdown_menu::dropdown_menu;
    pub use crate::components::hover_card::hover_card;
    pub use crate::components::popover::popover;
    pub use crate::components::select::select;
    pub use crate::components::tabs::tabs;
    pub use crate::components::tooltip::tooltip;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cn;
    pub use crate::components::accordion::{Accordion, AccordionMode, AccordionTrigger};
    pub use crate::components::collapsible::{Collapsible, CollapsibleTrigger};
    pub use crate::components::dropdown_menu::{DropdownMenu, DropdownMenuItem};
    pub use crate::components::hover_card::HoverCard;
    pub use crate::components::popover::{Popover, PopoverClose, PopoverTrigger};
    pub use crate::components::select::{Select, SelectItem, SelectTrigger};
    pub use crate::components::tabs::{ActivationMode, Tabs, TabsTrigger};
    pub use crate::components::tooltip::Tooltip;
    // Re-export the engine types components are driven with
    pub use selkit_core::prelude::*;
}
