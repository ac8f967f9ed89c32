//! Enum and JSONB codec helpers for the `PostgreSQL` stores.
//!
//! Enumerations are stored as TEXT columns holding their serde variant
//! names, and nested collections (waypoints, coverage windows) as JSONB.
//! Routing both through serde keeps the database encoding and the wire
//! encoding identical.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Encode a unit-variant enum as its serde string form.
///
/// # Errors
///
/// Returns [`StoreError::Config`] if the value does not serialize to a
/// plain string (i.e. it is not a unit-variant enum).
pub(crate) fn enum_to_text<T: Serialize>(value: &T) -> Result<String, StoreError> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(StoreError::Config(format!(
            "expected string-encoded enum, got {other}"
        ))),
    }
}

/// Decode a unit-variant enum from its serde string form.
pub(crate) fn enum_from_text<T: DeserializeOwned>(text: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_value(serde_json::Value::String(
        text.to_owned(),
    ))?)
}

/// Encode an optional unit-variant enum.
pub(crate) fn opt_enum_to_text<T: Serialize>(
    value: Option<&T>,
) -> Result<Option<String>, StoreError> {
    value.map(enum_to_text).transpose()
}

/// Decode an optional unit-variant enum.
pub(crate) fn opt_enum_from_text<T: DeserializeOwned>(
    text: Option<&str>,
) -> Result<Option<T>, StoreError> {
    text.map(enum_from_text).transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tacsim_types::{AssetStatus, CapabilityType, MissionStatus};

    use super::*;

    #[test]
    fn enums_round_trip_through_text() {
        let text = enum_to_text(&MissionStatus::OnStation).unwrap();
        assert_eq!(text, "OnStation");
        let back: MissionStatus = enum_from_text(&text).unwrap();
        assert_eq!(back, MissionStatus::OnStation);
    }

    #[test]
    fn unknown_text_fails_to_decode() {
        let result: Result<AssetStatus, _> = enum_from_text("Vaporized");
        assert!(result.is_err());
    }

    #[test]
    fn optional_enums_pass_none_through() {
        let none: Option<&CapabilityType> = None;
        assert_eq!(opt_enum_to_text(none).unwrap(), None);
        let decoded: Option<CapabilityType> = opt_enum_from_text(None).unwrap();
        assert_eq!(decoded, None);
    }
}
