//! Core entity structs for the Tacsim exercise simulator.
//!
//! Scenario and run state, mission plans, scripted events, and the space
//! tasking entities consumed by the allocator. Derived projections
//! (positions, tick summaries, allocation reports) live here too so they
//! flow to the dashboard through one set of bindings.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{
    AllocationStatus, AssetStatus, CapabilityType, EventTargetType, MissionCriticality,
    MissionDomain, MissionStatus, RiskLevel, RunStatus, SimEventType, TimeWindowKind,
};
use crate::ids::{
    MissionId, ScenarioId, SimEventId, SpaceAllocationId, SpaceAssetId, SpaceNeedId,
};

// ---------------------------------------------------------------------------
// Scenario and run state
// ---------------------------------------------------------------------------

/// An exercise scenario: the container for missions, assets, and events.
///
/// The `epoch` is the virtual instant at which exercise day 1 begins; day
/// numbers are always derived from it, never counted incrementally, so
/// seeking the clock stays idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Scenario {
    /// Scenario identifier.
    pub id: ScenarioId,
    /// Exercise name (e.g. "RESOLUTE WATCH 26").
    pub name: String,
    /// Virtual instant at which exercise day 1 begins.
    pub epoch: DateTime<Utc>,
    /// Free-form exercise description.
    pub description: String,
    /// Real-world creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The single simulation run owned by the clock, persisted as a checkpoint.
///
/// Exactly one `Running` run may exist per process. A checkpoint row is
/// written every tick so a new process can resume a paused or running
/// exercise where it left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationRun {
    /// The scenario this run advances.
    pub scenario_id: ScenarioId,
    /// Lifecycle state of the run.
    pub status: RunStatus,
    /// Current virtual instant.
    pub sim_time: DateTime<Utc>,
    /// Wall-clock instant the run was started.
    pub real_start_time: DateTime<Utc>,
    /// Simulated seconds per real second.
    pub compression_ratio: f64,
    /// Exercise day number (1-based, derived from the scenario epoch).
    pub current_day_number: u32,
}

// ---------------------------------------------------------------------------
// Missions
// ---------------------------------------------------------------------------

/// An ordered point along a mission route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Waypoint {
    /// Position in the route (0-based, ordered).
    pub sequence: u32,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Longitude in degrees east.
    pub lon: f64,
    /// Altitude in feet (0 for surface missions).
    pub altitude_ft: f64,
    /// Planned speed in knots, overriding the domain nominal when set.
    pub speed_kts: Option<f64>,
}

/// A planning time window attached to a mission.
///
/// Every interpolatable mission carries at least one
/// [`TimeWindowKind::TimeOnTarget`] window; its `start` is the TOT anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeWindow {
    /// What this window represents.
    pub kind: TimeWindowKind,
    /// Window open instant (the anchor for `TimeOnTarget`).
    pub start: DateTime<Utc>,
    /// Window close instant, if bounded.
    pub end: Option<DateTime<Utc>>,
}

/// A named objective a mission is tasked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionTarget {
    /// Target designator.
    pub name: String,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Longitude in degrees east.
    pub lon: f64,
    /// Free-form target description.
    pub description: String,
}

/// A tasked mission: route, timing, and lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Mission {
    /// Mission identifier.
    pub id: MissionId,
    /// Owning scenario.
    pub scenario_id: ScenarioId,
    /// Mission callsign (e.g. "VIPER 11").
    pub callsign: String,
    /// Operating domain.
    pub domain: MissionDomain,
    /// Current lifecycle status, advanced by the status machine.
    pub status: MissionStatus,
    /// Ordered route. Interpolation requires at least two waypoints.
    pub waypoints: Vec<Waypoint>,
    /// Planning windows; at least one time-on-target anchor.
    pub time_windows: Vec<TimeWindow>,
    /// Tasked objectives.
    pub targets: Vec<MissionTarget>,
}

// ---------------------------------------------------------------------------
// Scripted events
// ---------------------------------------------------------------------------

/// A scripted discrete event injected into the exercise timeline.
///
/// Events are immutable once created. Entity status is always derived
/// from the latest event at or before the current instant, never applied
/// as a delta, so replay and seek are idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimEvent {
    /// Event identifier.
    pub id: SimEventId,
    /// Owning scenario.
    pub scenario_id: ScenarioId,
    /// What happens.
    pub event_type: SimEventType,
    /// What kind of entity it happens to.
    pub target_type: EventTargetType,
    /// The targeted entity's raw identifier.
    pub target_id: Uuid,
    /// Virtual instant at which the event takes effect.
    pub sim_time: DateTime<Utc>,
    /// Free-form narrative for the event log.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Space tasking
// ---------------------------------------------------------------------------

/// An AOS/LOS interval during which an asset provides a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CoverageWindow {
    /// The capability available during this window.
    pub capability: CapabilityType,
    /// Acquisition of signal.
    pub start: DateTime<Utc>,
    /// Loss of signal.
    pub end: DateTime<Utc>,
}

/// An orbital-capability asset with its coverage schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpaceAsset {
    /// Asset identifier.
    pub id: SpaceAssetId,
    /// Owning scenario.
    pub scenario_id: ScenarioId,
    /// Asset designator (e.g. "MILSTAR-4").
    pub name: String,
    /// Current health, derived from scripted events.
    pub status: AssetStatus,
    /// Capabilities the asset can provide.
    pub capabilities: BTreeSet<CapabilityType>,
    /// Ordered coverage intervals per capability.
    pub coverage_windows: Vec<CoverageWindow>,
}

/// A mission's request for an orbital capability over a time interval.
///
/// Created during document ingestion (an external collaborator); the
/// allocator consumes needs read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpaceNeed {
    /// Need identifier.
    pub id: SpaceNeedId,
    /// Owning scenario.
    pub scenario_id: ScenarioId,
    /// The mission the need supports.
    pub mission_id: MissionId,
    /// The requested capability.
    pub capability: CapabilityType,
    /// Package priority rank (1 = highest).
    pub priority: u32,
    /// Need start instant.
    pub start_time: DateTime<Utc>,
    /// Need end instant.
    pub end_time: DateTime<Utc>,
    /// How critical the capability is to the mission.
    pub criticality: MissionCriticality,
    /// Declared alternate capability, if any.
    pub fallback_capability: Option<CapabilityType>,
    /// Narrative consequence of denial, if stated.
    pub risk_if_denied: Option<String>,
    /// Rank traced from the commander's priority list, if any.
    pub traced_priority_rank: Option<u32>,
    /// Exercise day the need belongs to.
    pub day_number: u32,
}

/// The resolved outcome for a single space need.
///
/// Allocations are a derived, rebuildable projection: every allocator run
/// for a day deletes and recreates that day's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpaceAllocation {
    /// Allocation identifier.
    pub id: SpaceAllocationId,
    /// The need this allocation resolves.
    pub space_need_id: SpaceNeedId,
    /// Outcome for the need.
    pub status: AllocationStatus,
    /// The capability actually granted, if any.
    pub allocated_capability: Option<CapabilityType>,
    /// Why the need resolved the way it did.
    pub rationale: String,
    /// Risk attached to the outcome.
    pub risk_level: RiskLevel,
    /// Shared group tag when the need was resolved under contention.
    pub contention_group: Option<Uuid>,
}

/// Summary of one contention group's arbitration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ContentionEvent {
    /// The shared contention-group tag.
    pub id: Uuid,
    /// The contended capability.
    pub capability: CapabilityType,
    /// Envelope start across the group's needs.
    pub window_start: DateTime<Utc>,
    /// Envelope end across the group's needs.
    pub window_end: DateTime<Utc>,
    /// Competitors in arbitration order (winner first).
    pub competitors: Vec<SpaceNeedId>,
    /// Why the winner won.
    pub rationale: String,
}

/// Counts and overall risk for one allocator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllocationSummary {
    /// Number of needs considered.
    pub total_needs: u32,
    /// Needs granted their requested capability.
    pub fulfilled: u32,
    /// Needs granted a fallback capability.
    pub degraded: u32,
    /// Needs granted nothing.
    pub denied: u32,
    /// Number of contention groups arbitrated.
    pub contention_groups: u32,
    /// Worst-case risk across the day's outcomes.
    pub overall_risk: RiskLevel,
}

/// The full output of one allocator run for a scenario day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllocationReport {
    /// One row per resolved need.
    pub allocations: Vec<SpaceAllocation>,
    /// One event per contention group.
    pub contentions: Vec<ContentionEvent>,
    /// Day-level counts and risk.
    pub summary: AllocationSummary,
}

// ---------------------------------------------------------------------------
// Derived projections
// ---------------------------------------------------------------------------

/// A mission's interpolated position at an instant. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPosition {
    /// Latitude in degrees north.
    pub lat: f64,
    /// Longitude in degrees east.
    pub lon: f64,
    /// Course over ground in degrees true, [0, 360).
    pub heading_deg: f64,
    /// Altitude in feet.
    pub altitude_ft: f64,
    /// Speed in knots.
    pub speed_kts: f64,
}

/// The per-tick snapshot broadcast to scenario subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClockSnapshot {
    /// The scenario channel this snapshot belongs to.
    pub scenario_id: ScenarioId,
    /// Current virtual instant.
    pub sim_time: DateTime<Utc>,
    /// Wall-clock instant of the tick.
    pub real_time: DateTime<Utc>,
    /// Simulated seconds per real second.
    pub compression_ratio: f64,
    /// Exercise day number.
    pub current_day_number: u32,
}

/// One mission's observable state after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionTickState {
    /// The mission.
    pub mission_id: MissionId,
    /// Lifecycle status after this tick.
    pub status: MissionStatus,
    /// Interpolated position, when the route supports it.
    pub position: Option<GeoPosition>,
}

/// A status change applied during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatusTransition {
    /// The mission that transitioned.
    pub mission_id: MissionId,
    /// Status before the tick.
    pub from: MissionStatus,
    /// Status after the tick.
    pub to: MissionStatus,
}

/// Everything a tick produced, handed to the broadcast/observer layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickSummary {
    /// The broadcast snapshot for this tick.
    pub snapshot: ClockSnapshot,
    /// Per-mission observable state.
    pub mission_states: Vec<MissionTickState>,
    /// Status transitions applied this tick.
    pub transitions: Vec<StatusTransition>,
    /// Number of asset-status derivations applied this tick.
    pub events_applied: u32,
}
