//! Space tasking operations: assets, needs, and allocation rows.
//!
//! Assets carry their capability set and AOS/LOS coverage schedule as
//! JSONB documents; only the derived `status` column is mutated after
//! ingestion. Allocation rows are a rebuildable projection replaced
//! wholesale per (scenario, day) on every allocator run.

use sqlx::PgPool;
use tacsim_types::{
    AssetStatus, MissionId, ScenarioId, SpaceAllocation, SpaceAllocationId, SpaceAsset,
    SpaceAssetId, SpaceNeed, SpaceNeedId,
};
use uuid::Uuid;

use crate::codec::{enum_from_text, enum_to_text, opt_enum_from_text, opt_enum_to_text};
use crate::error::StoreError;

/// Operations on the `space_assets`, `space_needs`, and
/// `space_allocations` tables.
pub struct SpaceStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SpaceStore<'a> {
    /// Create a new space store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Insert a space asset (seed data, integration tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the insert fails.
    pub async fn insert_asset(&self, asset: &SpaceAsset) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO space_assets (id, scenario_id, name, status, capabilities, coverage_windows)
              VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(asset.id.into_inner())
        .bind(asset.scenario_id.into_inner())
        .bind(&asset.name)
        .bind(enum_to_text(&asset.status)?)
        .bind(serde_json::to_value(&asset.capabilities)?)
        .bind(serde_json::to_value(&asset.coverage_windows)?)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Fetch all space assets for a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails, or
    /// [`StoreError::Serialization`] if a stored document fails to decode.
    pub async fn fetch_assets(&self, scenario_id: Uuid) -> Result<Vec<SpaceAsset>, StoreError> {
        let rows = sqlx::query_as::<_, AssetRow>(
            r"SELECT id, scenario_id, name, status, capabilities, coverage_windows
              FROM space_assets
              WHERE scenario_id = $1
              ORDER BY name, id",
        )
        .bind(scenario_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SpaceAsset::try_from).collect()
    }

    /// Persist an asset's derived status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the asset does not exist.
    pub async fn set_asset_status(
        &self,
        asset_id: SpaceAssetId,
        status: AssetStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(r"UPDATE space_assets SET status = $2 WHERE id = $1")
            .bind(asset_id.into_inner())
            .bind(enum_to_text(&status)?)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("space asset {asset_id}")));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Needs
    // -----------------------------------------------------------------------

    /// Insert a space need (seed data, integration tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the insert fails.
    pub async fn insert_need(&self, need: &SpaceNeed) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO space_needs
                  (id, scenario_id, mission_id, capability, priority, start_time, end_time,
                   criticality, fallback_capability, risk_if_denied, traced_priority_rank, day_number)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(need.id.into_inner())
        .bind(need.scenario_id.into_inner())
        .bind(need.mission_id.into_inner())
        .bind(enum_to_text(&need.capability)?)
        .bind(i32::try_from(need.priority).unwrap_or(i32::MAX))
        .bind(need.start_time)
        .bind(need.end_time)
        .bind(enum_to_text(&need.criticality)?)
        .bind(opt_enum_to_text(need.fallback_capability.as_ref())?)
        .bind(need.risk_if_denied.as_deref())
        .bind(
            need.traced_priority_rank
                .map(|r| i32::try_from(r).unwrap_or(i32::MAX)),
        )
        .bind(i32::try_from(need.day_number).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Fetch the space needs for one exercise day of a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn fetch_needs_for_day(
        &self,
        scenario_id: Uuid,
        day_number: u32,
    ) -> Result<Vec<SpaceNeed>, StoreError> {
        let day = i32::try_from(day_number).unwrap_or(i32::MAX);
        let rows = sqlx::query_as::<_, NeedRow>(
            r"SELECT id, scenario_id, mission_id, capability, priority, start_time, end_time,
                     criticality, fallback_capability, risk_if_denied, traced_priority_rank, day_number
              FROM space_needs
              WHERE scenario_id = $1 AND day_number = $2
              ORDER BY start_time, id",
        )
        .bind(scenario_id)
        .bind(day)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SpaceNeed::try_from).collect()
    }

    // -----------------------------------------------------------------------
    // Allocations
    // -----------------------------------------------------------------------

    /// Replace the allocation rows for one exercise day of a scenario.
    ///
    /// Delete-and-recreate inside one transaction: allocations are a
    /// derived projection, so a rerun for the day fully rebuilds it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the transaction fails.
    pub async fn replace_allocations(
        &self,
        scenario_id: Uuid,
        day_number: u32,
        allocations: &[SpaceAllocation],
    ) -> Result<(), StoreError> {
        let day = i32::try_from(day_number).unwrap_or(i32::MAX);
        let mut tx = self.pool.begin().await?;

        sqlx::query(r"DELETE FROM space_allocations WHERE scenario_id = $1 AND day_number = $2")
            .bind(scenario_id)
            .bind(day)
            .execute(&mut *tx)
            .await?;

        if !allocations.is_empty() {
            let len = allocations.len();
            let mut ids = Vec::with_capacity(len);
            let mut need_ids = Vec::with_capacity(len);
            let mut statuses = Vec::with_capacity(len);
            let mut capabilities: Vec<Option<String>> = Vec::with_capacity(len);
            let mut rationales = Vec::with_capacity(len);
            let mut risks = Vec::with_capacity(len);
            let mut groups: Vec<Option<Uuid>> = Vec::with_capacity(len);

            for alloc in allocations {
                ids.push(alloc.id.into_inner());
                need_ids.push(alloc.space_need_id.into_inner());
                statuses.push(enum_to_text(&alloc.status)?);
                capabilities.push(opt_enum_to_text(alloc.allocated_capability.as_ref())?);
                rationales.push(alloc.rationale.clone());
                risks.push(enum_to_text(&alloc.risk_level)?);
                groups.push(alloc.contention_group);
            }

            sqlx::query(
                r"INSERT INTO space_allocations
                      (id, scenario_id, day_number, space_need_id, status, allocated_capability, rationale, risk_level, contention_group)
                  SELECT id, $1::UUID, $2::INTEGER, need_id, status, capability, rationale, risk, grp
                  FROM UNNEST($3::UUID[], $4::UUID[], $5::TEXT[], $6::TEXT[], $7::TEXT[], $8::TEXT[], $9::UUID[])
                      AS t(id, need_id, status, capability, rationale, risk, grp)",
            )
            .bind(scenario_id)
            .bind(day)
            .bind(&ids)
            .bind(&need_ids)
            .bind(&statuses)
            .bind(&capabilities)
            .bind(&rationales)
            .bind(&risks)
            .bind(&groups)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            %scenario_id,
            day_number,
            rows = allocations.len(),
            "Replaced space allocations"
        );
        Ok(())
    }

    /// Fetch the allocation rows for one exercise day of a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn fetch_allocations_for_day(
        &self,
        scenario_id: Uuid,
        day_number: u32,
    ) -> Result<Vec<SpaceAllocation>, StoreError> {
        let day = i32::try_from(day_number).unwrap_or(i32::MAX);
        let rows = sqlx::query_as::<_, AllocationRow>(
            r"SELECT id, space_need_id, status, allocated_capability, rationale, risk_level, contention_group
              FROM space_allocations
              WHERE scenario_id = $1 AND day_number = $2
              ORDER BY id",
        )
        .bind(scenario_id)
        .bind(day)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SpaceAllocation::try_from).collect()
    }
}

/// A row from the `space_assets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AssetRow {
    id: Uuid,
    scenario_id: Uuid,
    name: String,
    status: String,
    capabilities: serde_json::Value,
    coverage_windows: serde_json::Value,
}

impl TryFrom<AssetRow> for SpaceAsset {
    type Error = StoreError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SpaceAssetId::from(row.id),
            scenario_id: ScenarioId::from(row.scenario_id),
            name: row.name,
            status: enum_from_text(&row.status)?,
            capabilities: serde_json::from_value(row.capabilities)?,
            coverage_windows: serde_json::from_value(row.coverage_windows)?,
        })
    }
}

/// A row from the `space_needs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct NeedRow {
    id: Uuid,
    scenario_id: Uuid,
    mission_id: Uuid,
    capability: String,
    priority: i32,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
    criticality: String,
    fallback_capability: Option<String>,
    risk_if_denied: Option<String>,
    traced_priority_rank: Option<i32>,
    day_number: i32,
}

impl TryFrom<NeedRow> for SpaceNeed {
    type Error = StoreError;

    fn try_from(row: NeedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SpaceNeedId::from(row.id),
            scenario_id: ScenarioId::from(row.scenario_id),
            mission_id: MissionId::from(row.mission_id),
            capability: enum_from_text(&row.capability)?,
            priority: u32::try_from(row.priority).unwrap_or(0),
            start_time: row.start_time,
            end_time: row.end_time,
            criticality: enum_from_text(&row.criticality)?,
            fallback_capability: opt_enum_from_text(row.fallback_capability.as_deref())?,
            risk_if_denied: row.risk_if_denied,
            traced_priority_rank: row
                .traced_priority_rank
                .map(|r| u32::try_from(r).unwrap_or(0)),
            day_number: u32::try_from(row.day_number).unwrap_or(0),
        })
    }
}

/// A row from the `space_allocations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AllocationRow {
    id: Uuid,
    space_need_id: Uuid,
    status: String,
    allocated_capability: Option<String>,
    rationale: String,
    risk_level: String,
    contention_group: Option<Uuid>,
}

impl TryFrom<AllocationRow> for SpaceAllocation {
    type Error = StoreError;

    fn try_from(row: AllocationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SpaceAllocationId::from(row.id),
            space_need_id: SpaceNeedId::from(row.space_need_id),
            status: enum_from_text(&row.status)?,
            allocated_capability: opt_enum_from_text(row.allocated_capability.as_deref())?,
            rationale: row.rationale,
            risk_level: enum_from_text(&row.risk_level)?,
            contention_group: row.contention_group,
        })
    }
}
