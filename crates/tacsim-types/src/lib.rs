//! Shared type definitions for the Tacsim exercise simulator.
//!
//! This crate is the single source of truth for all types used across the
//! Tacsim workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the exercise dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (lifecycles, domains, capabilities)
//! - [`structs`] -- Entity structs (scenario, run, missions, space tasking)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AllocationStatus, AssetStatus, CapabilityType, EventTargetType, MissionCriticality,
    MissionDomain, MissionStatus, RiskLevel, RunStatus, SimEventType, TimeWindowKind,
};
pub use ids::{
    MissionId, ScenarioId, SimEventId, SpaceAllocationId, SpaceAssetId, SpaceNeedId,
};
pub use structs::{
    AllocationReport, AllocationSummary, ClockSnapshot, ContentionEvent, CoverageWindow,
    GeoPosition, Mission, MissionTarget, MissionTickState, Scenario, SimEvent, SimulationRun,
    SpaceAllocation, SpaceAsset, SpaceNeed, StatusTransition, TickSummary, TimeWindow, Waypoint,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::ScenarioId::export_all();
        let _ = crate::ids::MissionId::export_all();
        let _ = crate::ids::SimEventId::export_all();
        let _ = crate::ids::SpaceNeedId::export_all();
        let _ = crate::ids::SpaceAssetId::export_all();
        let _ = crate::ids::SpaceAllocationId::export_all();

        // Enums
        let _ = crate::enums::RunStatus::export_all();
        let _ = crate::enums::MissionDomain::export_all();
        let _ = crate::enums::MissionStatus::export_all();
        let _ = crate::enums::TimeWindowKind::export_all();
        let _ = crate::enums::SimEventType::export_all();
        let _ = crate::enums::EventTargetType::export_all();
        let _ = crate::enums::CapabilityType::export_all();
        let _ = crate::enums::MissionCriticality::export_all();
        let _ = crate::enums::AssetStatus::export_all();
        let _ = crate::enums::AllocationStatus::export_all();
        let _ = crate::enums::RiskLevel::export_all();

        // Structs
        let _ = crate::structs::Scenario::export_all();
        let _ = crate::structs::SimulationRun::export_all();
        let _ = crate::structs::Waypoint::export_all();
        let _ = crate::structs::TimeWindow::export_all();
        let _ = crate::structs::MissionTarget::export_all();
        let _ = crate::structs::Mission::export_all();
        let _ = crate::structs::SimEvent::export_all();
        let _ = crate::structs::CoverageWindow::export_all();
        let _ = crate::structs::SpaceAsset::export_all();
        let _ = crate::structs::SpaceNeed::export_all();
        let _ = crate::structs::SpaceAllocation::export_all();
        let _ = crate::structs::ContentionEvent::export_all();
        let _ = crate::structs::AllocationSummary::export_all();
        let _ = crate::structs::AllocationReport::export_all();
        let _ = crate::structs::GeoPosition::export_all();
        let _ = crate::structs::ClockSnapshot::export_all();
        let _ = crate::structs::MissionTickState::export_all();
        let _ = crate::structs::StatusTransition::export_all();
        let _ = crate::structs::TickSummary::export_all();
    }
}
