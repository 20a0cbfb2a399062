//! Identity types with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An identity value was outside the valid range.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{field} must be positive, got {value}")]
pub struct IdError {
    pub field: &'static str,
    pub value: i64,
}

/// Generates a validated integer ID newtype with common trait implementations.
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: i64) -> Result<Self, IdError> {
                if id <= 0 {
                    return Err(IdError {
                        field: $field_name,
                        value: id,
                    });
                }
                Ok(Self(id))
            }

            /// Returns the raw integer value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_int_id!(
    /// A store-assigned event identifier.
    ///
    /// Event IDs are positive integers assigned by the durable store on
    /// commit; an event built from an input payload has no ID yet.
    EventId, "event ID"
);

define_int_id!(
    /// A validated user identifier.
    UserId, "user ID"
);

/// Who an event belongs to.
///
/// A global event participates in every owner's timeline and is
/// overlap-checked against all events regardless of owner. An owned event
/// is only checked against that owner's events and global ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Global,
    User(UserId),
}

impl Owner {
    /// Decodes a stored or transported owner value.
    ///
    /// Absent and non-positive values both decode to [`Owner::Global`];
    /// the legacy "owner id zero" encoding exists only at this boundary.
    #[must_use]
    pub fn from_raw(id: Option<i64>) -> Self {
        match id.and_then(|id| UserId::new(id).ok()) {
            Some(user) => Self::User(user),
            None => Self::Global,
        }
    }

    #[must_use]
    pub const fn user_id(self) -> Option<UserId> {
        match self {
            Self::Global => None,
            Self::User(id) => Some(id),
        }
    }

    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

impl Serialize for Owner {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Global => serializer.serialize_none(),
            Self::User(id) => serializer.serialize_some(&id.get()),
        }
    }
}

impl<'de> Deserialize<'de> for Owner {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<i64>::deserialize(deserializer)?;
        Ok(Self::from_raw(value))
    }
}
