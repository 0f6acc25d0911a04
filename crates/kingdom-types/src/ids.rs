//! Type-safe identifier wrappers.
//!
//! Content identifiers (resources, buildings, phases, ...) are authored as
//! plain strings in the content files, so they are modelled as `String`
//! newtypes. Wrapping them prevents a phase id from being passed where a
//! resource id is expected. Sessions are runtime entities and use UUID v7.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of a resource (for example `gold`, `happiness`, `council`).
    ResourceId
}

define_id! {
    /// Identifier of a resource group.
    GroupId
}

define_id! {
    /// Identifier of a player within a session.
    PlayerId
}

define_id! {
    /// Identifier of a land tile owned by a player.
    LandId
}

define_id! {
    /// Identifier of a building definition.
    BuildingId
}

define_id! {
    /// Identifier of a development definition (farm, house, ...).
    DevelopmentId
}

define_id! {
    /// Identifier of an action definition.
    ActionId
}

define_id! {
    /// Identifier of an active passive bundle.
    PassiveId
}

define_id! {
    /// Identifier of a turn phase (`growth`, `upkeep`, `main`).
    PhaseId
}

define_id! {
    /// Identifier of a step inside a phase.
    StepId
}

define_id! {
    /// Identifier attributing a skip to whatever requested it.
    SourceId
}

/// Unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn string_ids_serialize_transparently() {
        let id = ResourceId::new("gold");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"gold\"");

        let back: ResourceId = serde_json::from_str(&json).unwrap_or_else(|_| ResourceId::new(""));
        assert_eq!(back, id);
    }

    #[test]
    fn ids_can_be_looked_up_by_str() {
        let mut amounts = BTreeMap::new();
        amounts.insert(ResourceId::new("gold"), 10.0_f64);
        assert!(amounts.contains_key("gold"));
        assert!(!amounts.contains_key("wood"));
    }

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }
}
