//! Platform event primitives consumed by the engine
//!
//! The engine never sees real DOM nodes or OS key events. The platform layer
//! translates its own events into these small types before handing them to
//! the runtime.

/// Opaque identity of an element on screen, assigned by the platform layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Keys the engine reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Escape,
    Enter,
    Space,
    Tab,
    Character(char),
}

impl Key {
    /// Enter or Space
    pub fn is_activation(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}
