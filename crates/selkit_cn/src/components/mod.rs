//! Headless components built on selkit_core primitives
//!
//! Each component follows a consistent pattern:
//! - Builder function (e.g., `accordion()`)
//! - Controlled (`value`) or uncontrolled (`default_value`) ownership, plus `on_change`
//! - `mount(&mut SelkitRuntime)` returning a handle to the mounted root
//! - Part types (triggers, items, content) that find their root by ambient lookup

use std::sync::Arc;

use selkit_core::{ChangeCallback, OwnershipMode, SelectionValue};

pub mod accordion;
pub mod collapsible;
pub mod dropdown_menu;
pub mod hover_card;
pub mod popover;
pub mod select;
pub mod tabs;
pub mod tooltip;

pub use accordion::{accordion, Accordion, AccordionBuilder, AccordionMode, AccordionTrigger};
pub use collapsible::{collapsible, Collapsible, CollapsibleBuilder, CollapsibleTrigger};
pub use dropdown_menu::{dropdown_menu, DropdownMenu, DropdownMenuBuilder, DropdownMenuItem};
pub use hover_card::{hover_card, HoverCard, HoverCardBuilder};
pub use popover::{popover, Popover, PopoverBuilder, PopoverClose, PopoverTrigger};
pub use select::{select, Select, SelectBuilder, SelectItem, SelectTrigger};
pub use tabs::{tabs, ActivationMode, Tabs, TabsBuilder, TabsTrigger};
pub use tooltip::{tooltip, Tooltip, TooltipBuilder};

/// Open-state callback shared by the disclosure components
pub type OpenChangeCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Ownership of a `Boolean` root from its `open`/`default_open` props
pub(crate) fn open_mode(
    open: Option<bool>,
    default_open: bool,
    on_open_change: Option<OpenChangeCallback>,
) -> OwnershipMode {
    let on_change = on_open_change.map(|callback| -> ChangeCallback {
        Arc::new(move |value: &SelectionValue| {
            if let Some(open) = value.as_bool() {
                callback(open);
            }
        })
    });
    OwnershipMode::from_props(
        open.map(SelectionValue::Boolean),
        SelectionValue::Boolean(default_open),
        on_change,
    )
}
