//! Scenario and checkpoint operations.
//!
//! The checkpoint row is the durable form of the in-memory
//! `SimulationRun`: exactly one row per scenario, upserted every tick so
//! a fresh process can resume a paused or running exercise.

use sqlx::PgPool;
use tacsim_types::{RunStatus, Scenario, ScenarioId, SimulationRun};
use uuid::Uuid;

use crate::codec::{enum_from_text, enum_to_text};
use crate::error::StoreError;

/// Operations on the `scenarios` and `simulation_runs` tables.
pub struct RunStore<'a> {
    pool: &'a PgPool,
}

impl<'a> RunStore<'a> {
    /// Create a new run store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a scenario by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn fetch_scenario(&self, id: Uuid) -> Result<Option<Scenario>, StoreError> {
        let row = sqlx::query_as::<_, ScenarioRow>(
            r"SELECT id, name, epoch, description, created_at
              FROM scenarios
              WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Scenario::from))
    }

    /// Insert a scenario (seed data, integration tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the insert fails.
    pub async fn insert_scenario(&self, scenario: &Scenario) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO scenarios (id, name, epoch, description, created_at)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(scenario.id.into_inner())
        .bind(&scenario.name)
        .bind(scenario.epoch)
        .bind(&scenario.description)
        .bind(scenario.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Load the checkpoint row for a scenario, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails, or
    /// [`StoreError::Serialization`] if the stored status is unknown.
    pub async fn load_checkpoint(&self, scenario_id: Uuid) -> Result<Option<SimulationRun>, StoreError> {
        let row = sqlx::query_as::<_, RunRow>(
            r"SELECT scenario_id, status, sim_time, real_start_time, compression_ratio, current_day_number
              FROM simulation_runs
              WHERE scenario_id = $1",
        )
        .bind(scenario_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(SimulationRun::try_from).transpose()
    }

    /// Upsert the checkpoint row for the run's scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the upsert fails.
    pub async fn save_checkpoint(&self, run: &SimulationRun) -> Result<(), StoreError> {
        let status = enum_to_text(&run.status)?;
        let day = i32::try_from(run.current_day_number).unwrap_or(i32::MAX);

        sqlx::query(
            r"INSERT INTO simulation_runs
                  (scenario_id, status, sim_time, real_start_time, compression_ratio, current_day_number, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, now())
              ON CONFLICT (scenario_id) DO UPDATE SET
                  status = EXCLUDED.status,
                  sim_time = EXCLUDED.sim_time,
                  real_start_time = EXCLUDED.real_start_time,
                  compression_ratio = EXCLUDED.compression_ratio,
                  current_day_number = EXCLUDED.current_day_number,
                  updated_at = now()",
        )
        .bind(run.scenario_id.into_inner())
        .bind(status)
        .bind(run.sim_time)
        .bind(run.real_start_time)
        .bind(run.compression_ratio)
        .bind(day)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

/// A row from the `scenarios` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ScenarioRow {
    id: Uuid,
    name: String,
    epoch: chrono::DateTime<chrono::Utc>,
    description: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ScenarioRow> for Scenario {
    fn from(row: ScenarioRow) -> Self {
        Self {
            id: ScenarioId::from(row.id),
            name: row.name,
            epoch: row.epoch,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// A row from the `simulation_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct RunRow {
    scenario_id: Uuid,
    status: String,
    sim_time: chrono::DateTime<chrono::Utc>,
    real_start_time: chrono::DateTime<chrono::Utc>,
    compression_ratio: f64,
    current_day_number: i32,
}

impl TryFrom<RunRow> for SimulationRun {
    type Error = StoreError;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        let status: RunStatus = enum_from_text(&row.status)?;
        Ok(Self {
            scenario_id: ScenarioId::from(row.scenario_id),
            status,
            sim_time: row.sim_time,
            real_start_time: row.real_start_time,
            compression_ratio: row.compression_ratio,
            current_day_number: u32::try_from(row.current_day_number).unwrap_or(0),
        })
    }
}
