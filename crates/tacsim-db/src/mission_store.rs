//! Mission plan operations.
//!
//! Mission routes, windows, and targets are JSONB documents so the row
//! shape tracks the shared types without per-field migrations. Only the
//! lifecycle `status` column is mutated after ingestion.

use sqlx::PgPool;
use tacsim_types::{Mission, MissionId, MissionStatus, ScenarioId};
use uuid::Uuid;

use crate::codec::{enum_from_text, enum_to_text};
use crate::error::StoreError;

/// Operations on the `missions` table.
pub struct MissionStore<'a> {
    pool: &'a PgPool,
}

impl<'a> MissionStore<'a> {
    /// Create a new mission store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a mission (seed data, integration tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the insert fails, or
    /// [`StoreError::Serialization`] if a nested document fails to encode.
    pub async fn insert(&self, mission: &Mission) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO missions (id, scenario_id, callsign, domain, status, waypoints, time_windows, targets)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(mission.id.into_inner())
        .bind(mission.scenario_id.into_inner())
        .bind(&mission.callsign)
        .bind(enum_to_text(&mission.domain)?)
        .bind(enum_to_text(&mission.status)?)
        .bind(serde_json::to_value(&mission.waypoints)?)
        .bind(serde_json::to_value(&mission.time_windows)?)
        .bind(serde_json::to_value(&mission.targets)?)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Fetch all missions for a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails, or
    /// [`StoreError::Serialization`] if a stored document fails to decode.
    pub async fn fetch_for_scenario(&self, scenario_id: Uuid) -> Result<Vec<Mission>, StoreError> {
        let rows = sqlx::query_as::<_, MissionRow>(
            r"SELECT id, scenario_id, callsign, domain, status, waypoints, time_windows, targets
              FROM missions
              WHERE scenario_id = $1
              ORDER BY callsign, id",
        )
        .bind(scenario_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Mission::try_from).collect()
    }

    /// Persist a mission's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the mission does not exist.
    pub async fn update_status(
        &self,
        mission_id: MissionId,
        status: MissionStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(r"UPDATE missions SET status = $2 WHERE id = $1")
            .bind(mission_id.into_inner())
            .bind(enum_to_text(&status)?)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("mission {mission_id}")));
        }
        Ok(())
    }
}

/// A row from the `missions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct MissionRow {
    id: Uuid,
    scenario_id: Uuid,
    callsign: String,
    domain: String,
    status: String,
    waypoints: serde_json::Value,
    time_windows: serde_json::Value,
    targets: serde_json::Value,
}

impl TryFrom<MissionRow> for Mission {
    type Error = StoreError;

    fn try_from(row: MissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MissionId::from(row.id),
            scenario_id: ScenarioId::from(row.scenario_id),
            callsign: row.callsign,
            domain: enum_from_text(&row.domain)?,
            status: enum_from_text(&row.status)?,
            waypoints: serde_json::from_value(row.waypoints)?,
            time_windows: serde_json::from_value(row.time_windows)?,
            targets: serde_json::from_value(row.targets)?,
        })
    }
}
