//! The persistence contract consumed by the simulation core.
//!
//! [`SimStore`] is the injectable seam between the clock/allocator and
//! whatever durable store backs them. Production uses the `PostgreSQL`
//! implementation; tests and the no-database engine fallback use
//! [`MemoryStore`](crate::memory::MemoryStore). The core never touches a
//! connection pool directly.
//!
//! # Contract notes
//!
//! - Reads are scoped by scenario (and day, for space tasking rows).
//! - One checkpoint row exists per scenario; [`SimStore::save_checkpoint`]
//!   upserts it.
//! - [`SimStore::replace_allocations`] is delete-and-recreate for the
//!   given (scenario, day): allocations are a rebuildable projection,
//!   never incrementally updated.

use async_trait::async_trait;
use tacsim_types::{
    AssetStatus, Mission, MissionId, MissionStatus, Scenario, ScenarioId, SimEvent, SimulationRun,
    SpaceAllocation, SpaceAsset, SpaceAssetId, SpaceNeed,
};

use crate::error::StoreError;

/// Read/write contract over the simulator's durable state.
#[async_trait]
pub trait SimStore: Send + Sync {
    /// Fetch a scenario by ID, or `None` if it does not exist.
    async fn fetch_scenario(&self, scenario_id: ScenarioId)
    -> Result<Option<Scenario>, StoreError>;

    /// Fetch all missions belonging to a scenario.
    async fn fetch_missions(&self, scenario_id: ScenarioId) -> Result<Vec<Mission>, StoreError>;

    /// Persist a mission's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the mission does not exist.
    async fn update_mission_status(
        &self,
        mission_id: MissionId,
        status: MissionStatus,
    ) -> Result<(), StoreError>;

    /// Load the checkpoint row for a scenario, if one exists.
    async fn load_checkpoint(
        &self,
        scenario_id: ScenarioId,
    ) -> Result<Option<SimulationRun>, StoreError>;

    /// Upsert the checkpoint row for the run's scenario.
    async fn save_checkpoint(&self, run: &SimulationRun) -> Result<(), StoreError>;

    /// Fetch all scripted events for a scenario, ordered by sim time.
    async fn fetch_events(&self, scenario_id: ScenarioId) -> Result<Vec<SimEvent>, StoreError>;

    /// Fetch all space assets for a scenario.
    async fn fetch_assets(&self, scenario_id: ScenarioId) -> Result<Vec<SpaceAsset>, StoreError>;

    /// Persist an asset's derived status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the asset does not exist.
    async fn set_asset_status(
        &self,
        asset_id: SpaceAssetId,
        status: AssetStatus,
    ) -> Result<(), StoreError>;

    /// Fetch the space needs for one exercise day of a scenario.
    async fn fetch_needs_for_day(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
    ) -> Result<Vec<SpaceNeed>, StoreError>;

    /// Replace the allocation rows for one exercise day of a scenario.
    ///
    /// Deletes any existing rows for the (scenario, day) key and writes
    /// the new set.
    async fn replace_allocations(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
        allocations: &[SpaceAllocation],
    ) -> Result<(), StoreError>;

    /// Fetch the allocation rows for one exercise day of a scenario.
    async fn fetch_allocations_for_day(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
    ) -> Result<Vec<SpaceAllocation>, StoreError>;
}
