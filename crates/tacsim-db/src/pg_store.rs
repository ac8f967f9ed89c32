//! `PostgreSQL` implementation of the [`SimStore`] contract.
//!
//! A thin facade over the per-concern stores so the simulation core can
//! stay store-agnostic. Each trait method borrows the pool and delegates;
//! no state lives here beyond the pool handle itself.

use async_trait::async_trait;
use sqlx::PgPool;
use tacsim_types::{
    AssetStatus, Mission, MissionId, MissionStatus, Scenario, ScenarioId, SimEvent, SimulationRun,
    SpaceAllocation, SpaceAsset, SpaceAssetId, SpaceNeed,
};

use crate::error::StoreError;
use crate::event_store::EventStore;
use crate::mission_store::MissionStore;
use crate::postgres::PostgresPool;
use crate::run_store::RunStore;
use crate::space_store::SpaceStore;
use crate::store::SimStore;

/// [`SimStore`] backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an established connection pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    /// Return the underlying [`PgPool`] (seed data, integration tests).
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SimStore for PgStore {
    async fn fetch_scenario(
        &self,
        scenario_id: ScenarioId,
    ) -> Result<Option<Scenario>, StoreError> {
        RunStore::new(&self.pool)
            .fetch_scenario(scenario_id.into_inner())
            .await
    }

    async fn fetch_missions(&self, scenario_id: ScenarioId) -> Result<Vec<Mission>, StoreError> {
        MissionStore::new(&self.pool)
            .fetch_for_scenario(scenario_id.into_inner())
            .await
    }

    async fn update_mission_status(
        &self,
        mission_id: MissionId,
        status: MissionStatus,
    ) -> Result<(), StoreError> {
        MissionStore::new(&self.pool)
            .update_status(mission_id, status)
            .await
    }

    async fn load_checkpoint(
        &self,
        scenario_id: ScenarioId,
    ) -> Result<Option<SimulationRun>, StoreError> {
        RunStore::new(&self.pool)
            .load_checkpoint(scenario_id.into_inner())
            .await
    }

    async fn save_checkpoint(&self, run: &SimulationRun) -> Result<(), StoreError> {
        RunStore::new(&self.pool).save_checkpoint(run).await
    }

    async fn fetch_events(&self, scenario_id: ScenarioId) -> Result<Vec<SimEvent>, StoreError> {
        EventStore::new(&self.pool)
            .fetch_for_scenario(scenario_id.into_inner())
            .await
    }

    async fn fetch_assets(&self, scenario_id: ScenarioId) -> Result<Vec<SpaceAsset>, StoreError> {
        SpaceStore::new(&self.pool)
            .fetch_assets(scenario_id.into_inner())
            .await
    }

    async fn set_asset_status(
        &self,
        asset_id: SpaceAssetId,
        status: AssetStatus,
    ) -> Result<(), StoreError> {
        SpaceStore::new(&self.pool)
            .set_asset_status(asset_id, status)
            .await
    }

    async fn fetch_needs_for_day(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
    ) -> Result<Vec<SpaceNeed>, StoreError> {
        SpaceStore::new(&self.pool)
            .fetch_needs_for_day(scenario_id.into_inner(), day_number)
            .await
    }

    async fn replace_allocations(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
        allocations: &[SpaceAllocation],
    ) -> Result<(), StoreError> {
        SpaceStore::new(&self.pool)
            .replace_allocations(scenario_id.into_inner(), day_number, allocations)
            .await
    }

    async fn fetch_allocations_for_day(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
    ) -> Result<Vec<SpaceAllocation>, StoreError> {
        SpaceStore::new(&self.pool)
            .fetch_allocations_for_day(scenario_id.into_inner(), day_number)
            .await
    }
}
