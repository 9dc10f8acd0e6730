//! Selection values
//!
//! Every widget holds exactly one [`SelectionValue`] whose variant is fixed
//! when the widget is created:
//!
//! - `Single` - one selected id, or none (tabs, select, single accordion)
//! - `Multiple` - a set of ids (multi accordion, multi-select lists)
//! - `Boolean` - open/closed (popover, tooltip, collapsible, menus)
//!
//! `Multiple` is backed by an [`IndexSet`] so iteration follows the order in
//! which ids were added, while equality is plain set equality.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::error::{EngineError, Result};

/// Identifier of an item, trigger or option
///
/// Cheap to clone (shared string), compared by content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub struct Identifier(Arc<str>);

impl Identifier {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0.to_string()
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered set of identifiers used by `Multiple`
pub type IdSet = IndexSet<Identifier, FxBuildHasher>;

/// The variant a value store commits to for its lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueShape {
    Single,
    Multiple,
    Boolean,
}

/// Current state of a widget
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionValue {
    /// One selected id, `None` when nothing is selected
    Single(Option<Identifier>),
    /// Any number of selected ids
    Multiple(IdSet),
    /// Open / closed
    Boolean(bool),
}

impl SelectionValue {
    /// `Single` with `id` selected
    pub fn single(id: impl Into<Identifier>) -> Self {
        Self::Single(Some(id.into()))
    }

    /// `Single` with nothing selected
    pub fn none() -> Self {
        Self::Single(None)
    }

    /// `Multiple` holding the given ids
    pub fn multiple<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Identifier>,
    {
        Self::Multiple(ids.into_iter().map(Into::into).collect())
    }

    /// `Multiple` with nothing selected
    pub fn empty_set() -> Self {
        Self::Multiple(IdSet::default())
    }

    pub fn open() -> Self {
        Self::Boolean(true)
    }

    pub fn closed() -> Self {
        Self::Boolean(false)
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Single(_) => ValueShape::Single,
            Self::Multiple(_) => ValueShape::Multiple,
            Self::Boolean(_) => ValueShape::Boolean,
        }
    }

    /// Fail with `ShapeMismatch` unless this value has the `expected` shape
    pub fn ensure_shape(&self, expected: ValueShape) -> Result<()> {
        let found = self.shape();
        if found == expected {
            Ok(())
        } else {
            Err(EngineError::ShapeMismatch { expected, found })
        }
    }

    /// Whether `id` is part of the current selection
    ///
    /// Always false for `Boolean`.
    pub fn is_selected(&self, id: &str) -> bool {
        match self {
            Self::Single(current) => current.as_ref().is_some_and(|c| c.as_str() == id),
            Self::Multiple(ids) => ids.contains(id),
            Self::Boolean(_) => false,
        }
    }

    /// Open flag of a `Boolean` value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(open) => Some(*open),
            _ => None,
        }
    }

    /// Selected id of a `Single` value (outer `None` for other shapes)
    pub fn as_single(&self) -> Option<Option<&Identifier>> {
        match self {
            Self::Single(current) => Some(current.as_ref()),
            _ => None,
        }
    }

    pub fn as_multiple(&self) -> Option<&IdSet> {
        match self {
            Self::Multiple(ids) => Some(ids),
            _ => None,
        }
    }

    /// The value a disclosure toggle of `id` produces
    ///
    /// - `Single(Some(id))` becomes `Single(None)`, any other `Single` selects `id`
    /// - `Multiple` removes `id` when present and appends it otherwise
    /// - `Boolean` flips; `id` is ignored
    pub fn toggled(&self, id: &Identifier) -> Self {
        match self {
            Self::Single(Some(current)) if current == id => Self::Single(None),
            Self::Single(_) => Self::Single(Some(id.clone())),
            Self::Multiple(ids) => {
                let mut next = ids.clone();
                if !next.shift_remove(id) {
                    next.insert(id.clone());
                }
                Self::Multiple(next)
            }
            Self::Boolean(open) => Self::Boolean(!open),
        }
    }
}

impl Default for SelectionValue {
    fn default() -> Self {
        Self::Single(None)
    }
}

impl From<bool> for SelectionValue {
    fn from(open: bool) -> Self {
        Self::Boolean(open)
    }
}
