//! Partial updates.
//!
//! A [`Patch`] records whether a field was left out of an update request,
//! explicitly set to `null`, or given a value. Plain `Option<T>` cannot
//! tell the first two apart.

use serde::{Deserialize, Deserializer};

use super::todo::{Timestamp, Todo};

// =============================================================================
// Patch
// =============================================================================

/// A single field of a partial update.
///
/// Deserializing yields `Null` or `Value`; pair the field with
/// `#[serde(default)]` so that an absent key becomes `Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field was not supplied.
    Missing,
    /// The field was supplied as `null`.
    Null,
    /// The field was supplied with a value.
    Value(T),
}

impl<T> Patch<T> {
    /// Returns true if the field was not supplied.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Overwrites a non-nullable field.
    ///
    /// `Null` leaves the target unchanged, like `Missing`.
    pub fn apply_to(self, target: &mut T) {
        if let Self::Value(value) = self {
            *target = value;
        }
    }

    /// Overwrites a nullable field. `Null` clears it.
    pub fn apply_to_option(self, target: &mut Option<T>) {
        match self {
            Self::Missing => {}
            Self::Null => *target = None,
            Self::Value(value) => *target = Some(value),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// Todo Patch
// =============================================================================

/// The set of changes a partial update may carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoPatch {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub is_complete: Patch<bool>,
    pub allocation_time: Patch<Timestamp>,
}

impl TodoPatch {
    /// Returns true if no field was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_missing()
            && self.description.is_missing()
            && self.is_complete.is_missing()
            && self.allocation_time.is_missing()
    }

    /// Applies every supplied field to `todo`.
    ///
    /// Timestamps are not touched here.
    pub fn apply(self, todo: &mut Todo) {
        self.name.apply_to(&mut todo.name);
        self.description.apply_to(&mut todo.description);
        self.is_complete.apply_to(&mut todo.is_complete);
        self.allocation_time.apply_to_option(&mut todo.allocation_time);
    }
}

// =============================================================================
// Tests
// =============================================================================
