//! Engine error types

use thiserror::Error;

use crate::store::OwnershipKind;
use crate::value::{Identifier, ValueShape};

/// Integration errors raised by the engine
///
/// These are developer-facing: every variant points at a misuse of the API
/// by the rendering layer, never at an end-user condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A value of the wrong variant was handed to a store
    #[error("selection shape mismatch: store holds {expected:?}, got {found:?}")]
    ShapeMismatch {
        expected: ValueShape,
        found: ValueShape,
    },

    /// A part looked up its root outside of any enclosing root
    #[error("`{kind}` part rendered outside of a `{kind}` root")]
    MissingContext { kind: &'static str },

    /// A widget flipped between controlled and uncontrolled after mount
    #[error("widget switched from {from:?} to {to:?} after mount")]
    OwnershipModeChange {
        from: OwnershipKind,
        to: OwnershipKind,
    },

    /// A context handle outlived the root that created it
    #[error("context handle refers to an unmounted root")]
    UnknownContext,

    /// Two items registered under the same id in one collection
    #[error("item `{id}` is already registered")]
    DuplicateItem { id: Identifier },
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
