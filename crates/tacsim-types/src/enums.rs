//! Enumeration types for the Tacsim exercise simulator.
//!
//! Lifecycle, domain, and capability taxonomies shared by the clock,
//! the allocator, and the data layer. Variant declaration order is
//! meaningful where noted (arbitration weights, lifecycle order).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Simulation run lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of the single simulation run owned by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RunStatus {
    /// No run exists yet for the scenario.
    Idle,
    /// The tick loop is advancing virtual time.
    Running,
    /// The run exists but the tick loop is halted.
    Paused,
    /// The run has been terminated; a new start creates a fresh run.
    Stopped,
}

// ---------------------------------------------------------------------------
// Missions
// ---------------------------------------------------------------------------

/// Operating domain of a tasked mission.
///
/// The domain selects the nominal transit speed used by position
/// interpolation when no waypoint declares its own speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MissionDomain {
    /// Fixed- or rotary-wing air missions.
    Air,
    /// Surface and sub-surface maritime missions.
    Maritime,
    /// Ground maneuver missions.
    Land,
    /// Orbital-support missions (no route transit).
    Space,
}

/// Ordered mission lifecycle.
///
/// Transitions are driven by the status machine from the offset between
/// the current virtual instant and the mission's time-on-target anchor.
/// Declaration order is lifecycle order; `Recovered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MissionStatus {
    /// Tasked but not yet briefed.
    Planned,
    /// Crews briefed, awaiting launch.
    Briefed,
    /// Departed the launch point.
    Launched,
    /// Established in the operating medium, in transit.
    Airborne,
    /// Holding at the objective area.
    OnStation,
    /// Executing effects on the target.
    Engaged,
    /// Departing the objective area.
    Egressing,
    /// Returning to base.
    Rtb,
    /// Mission complete; no further transitions.
    Recovered,
}

/// The kind of a mission time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TimeWindowKind {
    /// The anchor instant the mission's primary effect is scheduled.
    TimeOnTarget,
    /// Planned departure window.
    Launch,
    /// Planned recovery window.
    Recovery,
}

// ---------------------------------------------------------------------------
// Scripted events
// ---------------------------------------------------------------------------

/// The type of a scripted simulation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SimEventType {
    /// Kinetic or debris loss of a satellite; the asset becomes `Lost`.
    SatelliteDestroyed,
    /// Uplink or downlink jamming; the asset becomes `Degraded`.
    SatelliteJammed,
    /// Jamming lifted or service restored; the asset returns to `Operational`.
    SatelliteRestored,
}

/// The kind of entity a scripted event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventTargetType {
    /// An orbital-capability asset.
    SpaceAsset,
    /// A tasked mission (no status derivation is defined yet; such
    /// events are skipped by the applicator).
    Mission,
}

// ---------------------------------------------------------------------------
// Space capabilities and allocation
// ---------------------------------------------------------------------------

/// An orbital capability a mission can request and an asset can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CapabilityType {
    /// Wideband satellite communications.
    SatcomWideband,
    /// Protected (anti-jam) satellite communications.
    SatcomProtected,
    /// Electro-optical imagery collection.
    IsrImagery,
    /// Signals-intelligence collection.
    IsrSigint,
    /// Positioning, navigation, and timing.
    PntTiming,
    /// Overhead missile warning.
    MissileWarning,
    /// Environmental and weather sensing.
    WeatherSensing,
}

/// How critical a capability need is to its parent mission.
///
/// Declaration order is the arbitration weight: `Critical` sorts first
/// and wins ties, `Routine` sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MissionCriticality {
    /// The mission fails outright without this capability.
    Critical,
    /// Mission effectiveness is substantially reduced without it.
    Essential,
    /// The capability improves the mission but is not required.
    Enhancing,
    /// Routine support; freely deferrable.
    Routine,
}

/// Health of an orbital-capability asset, derived from scripted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AssetStatus {
    /// Fully mission capable.
    Operational,
    /// Partially mission capable (e.g. jammed).
    Degraded,
    /// Withheld for scheduled maintenance.
    Maintenance,
    /// Destroyed or permanently unavailable.
    Lost,
}

/// Outcome of resolving a single capability need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AllocationStatus {
    /// The need receives its requested capability.
    Fulfilled,
    /// The need falls back to a declared alternate capability.
    Degraded,
    /// The need receives nothing.
    Denied,
}

/// Qualitative risk attached to an allocation outcome or a day summary.
///
/// Declaration order is severity order: `Low` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RiskLevel {
    /// No meaningful risk.
    Low,
    /// Acceptable risk, worth tracking.
    Moderate,
    /// Significant risk to mission effectiveness.
    High,
    /// Mission-defeating risk.
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criticality_order_is_arbitration_weight() {
        assert!(MissionCriticality::Critical < MissionCriticality::Essential);
        assert!(MissionCriticality::Essential < MissionCriticality::Enhancing);
        assert!(MissionCriticality::Enhancing < MissionCriticality::Routine);
    }

    #[test]
    fn risk_order_is_severity() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn mission_status_declaration_order_is_lifecycle_order() {
        assert!(MissionStatus::Planned < MissionStatus::Briefed);
        assert!(MissionStatus::Rtb < MissionStatus::Recovered);
    }
}
