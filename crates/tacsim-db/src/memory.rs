//! In-memory [`SimStore`] implementation.
//!
//! Backs unit tests across the workspace and the engine's no-database
//! fallback mode. All maps live behind a single [`RwLock`] so the store
//! is cheap to clone and safe to share across tasks; the production
//! `PostgreSQL` implementation carries the real durability guarantees.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tacsim_types::{
    AssetStatus, Mission, MissionId, MissionStatus, Scenario, ScenarioId, SimEvent, SimEventId,
    SimulationRun, SpaceAllocation, SpaceAsset, SpaceAssetId, SpaceNeed, SpaceNeedId,
};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::SimStore;

/// All tables of the in-memory store.
#[derive(Debug, Default)]
struct MemoryInner {
    scenarios: BTreeMap<ScenarioId, Scenario>,
    missions: BTreeMap<MissionId, Mission>,
    checkpoints: BTreeMap<ScenarioId, SimulationRun>,
    events: BTreeMap<SimEventId, SimEvent>,
    assets: BTreeMap<SpaceAssetId, SpaceAsset>,
    needs: BTreeMap<SpaceNeedId, SpaceNeed>,
    allocations: BTreeMap<(ScenarioId, u32), Vec<SpaceAllocation>>,
}

/// An in-memory, shareable implementation of [`SimStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a scenario.
    pub async fn insert_scenario(&self, scenario: Scenario) {
        let mut inner = self.inner.write().await;
        inner.scenarios.insert(scenario.id, scenario);
    }

    /// Insert or replace a mission.
    pub async fn insert_mission(&self, mission: Mission) {
        let mut inner = self.inner.write().await;
        inner.missions.insert(mission.id, mission);
    }

    /// Insert or replace a scripted event.
    pub async fn insert_event(&self, event: SimEvent) {
        let mut inner = self.inner.write().await;
        inner.events.insert(event.id, event);
    }

    /// Insert or replace a space asset.
    pub async fn insert_asset(&self, asset: SpaceAsset) {
        let mut inner = self.inner.write().await;
        inner.assets.insert(asset.id, asset);
    }

    /// Insert or replace a space need.
    pub async fn insert_need(&self, need: SpaceNeed) {
        let mut inner = self.inner.write().await;
        inner.needs.insert(need.id, need);
    }
}

#[async_trait]
impl SimStore for MemoryStore {
    async fn fetch_scenario(
        &self,
        scenario_id: ScenarioId,
    ) -> Result<Option<Scenario>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.scenarios.get(&scenario_id).cloned())
    }

    async fn fetch_missions(&self, scenario_id: ScenarioId) -> Result<Vec<Mission>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .missions
            .values()
            .filter(|m| m.scenario_id == scenario_id)
            .cloned()
            .collect())
    }

    async fn update_mission_status(
        &self,
        mission_id: MissionId,
        status: MissionStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let mission = inner
            .missions
            .get_mut(&mission_id)
            .ok_or_else(|| StoreError::NotFound(format!("mission {mission_id}")))?;
        mission.status = status;
        Ok(())
    }

    async fn load_checkpoint(
        &self,
        scenario_id: ScenarioId,
    ) -> Result<Option<SimulationRun>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.checkpoints.get(&scenario_id).cloned())
    }

    async fn save_checkpoint(&self, run: &SimulationRun) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.checkpoints.insert(run.scenario_id, run.clone());
        Ok(())
    }

    async fn fetch_events(&self, scenario_id: ScenarioId) -> Result<Vec<SimEvent>, StoreError> {
        let inner = self.inner.read().await;
        let mut events: Vec<SimEvent> = inner
            .events
            .values()
            .filter(|e| e.scenario_id == scenario_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.sim_time);
        Ok(events)
    }

    async fn fetch_assets(&self, scenario_id: ScenarioId) -> Result<Vec<SpaceAsset>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .assets
            .values()
            .filter(|a| a.scenario_id == scenario_id)
            .cloned()
            .collect())
    }

    async fn set_asset_status(
        &self,
        asset_id: SpaceAssetId,
        status: AssetStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let asset = inner
            .assets
            .get_mut(&asset_id)
            .ok_or_else(|| StoreError::NotFound(format!("space asset {asset_id}")))?;
        asset.status = status;
        Ok(())
    }

    async fn fetch_needs_for_day(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
    ) -> Result<Vec<SpaceNeed>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .needs
            .values()
            .filter(|n| n.scenario_id == scenario_id && n.day_number == day_number)
            .cloned()
            .collect())
    }

    async fn replace_allocations(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
        allocations: &[SpaceAllocation],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .allocations
            .insert((scenario_id, day_number), allocations.to_vec());
        Ok(())
    }

    async fn fetch_allocations_for_day(
        &self,
        scenario_id: ScenarioId,
        day_number: u32,
    ) -> Result<Vec<SpaceAllocation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .allocations
            .get(&(scenario_id, day_number))
            .cloned()
            .unwrap_or_default())
    }
}
