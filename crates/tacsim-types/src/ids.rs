//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every persisted entity in the simulator has a strongly-typed ID so that
//! a mission identifier can never be passed where an asset identifier is
//! expected. All IDs use UUID v7 (time-ordered) for efficient database
//! indexing.
//!
//! Row inserts normally rely on the database default; the `new()`
//! constructors exist for app-side generation (tests, scenario seeding).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an exercise scenario.
    ScenarioId
}

define_id! {
    /// Unique identifier for a tasked mission within a scenario.
    MissionId
}

define_id! {
    /// Unique identifier for a scripted simulation event.
    SimEventId
}

define_id! {
    /// Unique identifier for a mission's orbital-capability need.
    SpaceNeedId
}

define_id! {
    /// Unique identifier for an orbital-capability asset.
    SpaceAssetId
}

define_id! {
    /// Unique identifier for a resolved space allocation record.
    SpaceAllocationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let mission = MissionId::new();
        let asset = SpaceAssetId::new();
        // Different newtypes -- the compiler enforces no mixing.
        assert_ne!(mission.into_inner(), Uuid::nil());
        assert_ne!(asset.into_inner(), Uuid::nil());
    }

    #[test]
    fn display_matches_inner_uuid() {
        let id = ScenarioId::new();
        assert_eq!(format!("{id}"), format!("{}", id.into_inner()));
    }

    #[test]
    fn round_trips_through_uuid() {
        let id = SpaceNeedId::new();
        let raw: Uuid = id.into();
        assert_eq!(SpaceNeedId::from(raw), id);
    }

    #[test]
    fn serializes_as_plain_uuid() {
        let id = SimEventId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }
}
