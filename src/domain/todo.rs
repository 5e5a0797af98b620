//! Todo domain model.
//!
//! This module contains the core record of the service together with the
//! value objects it is built from.

use std::str::FromStr;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a todo.
///
/// This is a newtype wrapper around UUID to provide type safety. Identifiers
/// are opaque to clients and are only ever assigned by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a `TodoId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new time-ordered identifier (UUID v7).
    ///
    /// **Note**: This is an impure function (side effect: time + random).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses an identifier from its textual form.
    ///
    /// Surrounding whitespace is not accepted.
    ///
    /// # Errors
    ///
    /// Returns `uuid::Error` if `value` is not a UUID.
    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(value).map(Self)
    }
}

impl FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Errors raised when parsing a [`Timestamp`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid RFC 3339 timestamp: {0}")]
    Invalid(#[from] chrono::ParseError),

    #[error("year {0} is outside 0000-9999")]
    YearOutOfRange(i32),
}

/// A timestamp wrapper for `DateTime<Utc>`.
///
/// Serialized as RFC 3339 with a `Z` suffix on the way out; any RFC 3339
/// offset is accepted on the way in and normalized to UTC. The UTC year
/// must fit in four digits, so every parsed value formats back into
/// something [`Timestamp::parse_rfc3339`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parses an RFC 3339 timestamp, converting it to UTC.
    ///
    /// # Errors
    ///
    /// Returns `TimestampError` if `value` is not valid RFC 3339, or if the
    /// offset moves the UTC year outside `0000..=9999`.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimestampError> {
        let datetime = DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc);
        let year = datetime.year();
        if !(0..=9999).contains(&year) {
            return Err(TimestampError::YearOutOfRange(year));
        }
        Ok(Self(datetime))
    }

    /// Formats the timestamp as RFC 3339 in UTC (`...Z`).
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&value).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Todo Entity
// =============================================================================

/// A persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    /// Store-assigned identifier.
    pub todo_id: TodoId,
    /// Short label. Never empty when created through the API.
    pub name: String,
    /// Free text, empty by default.
    pub description: String,
    /// Completion flag.
    pub is_complete: bool,
    /// Planned or due time.
    pub allocation_time: Option<Timestamp>,
    /// Creation time, never modified.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

/// A fully populated todo that has not been assigned an identifier yet.
///
/// Store adapters turn a draft into a [`Todo`] on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub name: String,
    pub description: String,
    pub is_complete: bool,
    pub allocation_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TodoDraft {
    /// Creates an open draft with an empty description, stamped with `now`.
    #[must_use]
    pub fn new(name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            is_complete: false,
            allocation_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a new draft with the given description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    /// Returns a new draft with the given allocation time.
    #[must_use]
    pub fn with_allocation_time(self, allocation_time: Option<Timestamp>) -> Self {
        Self {
            allocation_time,
            ..self
        }
    }

    /// Attaches an identifier, producing the stored record.
    #[must_use]
    pub fn into_todo(self, todo_id: TodoId) -> Todo {
        Todo {
            todo_id,
            name: self.name,
            description: self.description,
            is_complete: self.is_complete,
            allocation_time: self.allocation_time,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a todo.
///
/// Only the name is mandatory; the service fills in every other field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub name: String,
    pub description: Option<String>,
    pub allocation_time: Option<Timestamp>,
}

impl NewTodo {
    /// Creates input carrying only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            allocation_time: None,
        }
    }

    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_allocation_time(self, allocation_time: Timestamp) -> Self {
        Self {
            allocation_time: Some(allocation_time),
            ..self
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
