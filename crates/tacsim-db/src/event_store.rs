//! Scripted event operations.
//!
//! Events are immutable exercise inputs: the applicator re-reads the
//! full set every tick and derives entity status from the latest event
//! at or before the current instant. Inserts happen once at scenario
//! load, in batches.

use sqlx::PgPool;
use tacsim_types::{ScenarioId, SimEvent, SimEventId};
use uuid::Uuid;

use crate::codec::{enum_from_text, enum_to_text};
use crate::error::StoreError;

/// Default batch size for event inserts.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Operations on the `sim_events` table.
pub struct EventStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> EventStore<'a> {
    /// Create a new event store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for inserts.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Batch-insert events into the `sim_events` table.
    ///
    /// Each batch uses a single INSERT with UNNEST arrays instead of N
    /// individual statements, wrapped in a transaction so either all
    /// events in the batch commit or none do.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the insert fails.
    pub async fn batch_insert(&self, events: &[SimEvent]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        for chunk in events.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;

            let len = chunk.len();
            let mut ids = Vec::with_capacity(len);
            let mut scenario_ids = Vec::with_capacity(len);
            let mut event_types = Vec::with_capacity(len);
            let mut target_types = Vec::with_capacity(len);
            let mut target_ids = Vec::with_capacity(len);
            let mut sim_times = Vec::with_capacity(len);
            let mut descriptions = Vec::with_capacity(len);

            for event in chunk {
                ids.push(event.id.into_inner());
                scenario_ids.push(event.scenario_id.into_inner());
                event_types.push(enum_to_text(&event.event_type)?);
                target_types.push(enum_to_text(&event.target_type)?);
                target_ids.push(event.target_id);
                sim_times.push(event.sim_time);
                descriptions.push(event.description.clone());
            }

            sqlx::query(
                r"INSERT INTO sim_events (id, scenario_id, event_type, target_type, target_id, sim_time, description)
                  SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TEXT[], $4::TEXT[], $5::UUID[], $6::TIMESTAMPTZ[], $7::TEXT[])",
            )
            .bind(&ids)
            .bind(&scenario_ids)
            .bind(&event_types)
            .bind(&target_types)
            .bind(&target_ids)
            .bind(&sim_times)
            .bind(&descriptions)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
        }

        tracing::debug!(count = events.len(), "Inserted sim events (batch UNNEST)");
        Ok(())
    }

    /// Fetch all events for a scenario, ordered by sim time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn fetch_for_scenario(&self, scenario_id: Uuid) -> Result<Vec<SimEvent>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT id, scenario_id, event_type, target_type, target_id, sim_time, description
              FROM sim_events
              WHERE scenario_id = $1
              ORDER BY sim_time, id",
        )
        .bind(scenario_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SimEvent::try_from).collect()
    }
}

/// A row from the `sim_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    scenario_id: Uuid,
    event_type: String,
    target_type: String,
    target_id: Uuid,
    sim_time: chrono::DateTime<chrono::Utc>,
    description: String,
}

impl TryFrom<EventRow> for SimEvent {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SimEventId::from(row.id),
            scenario_id: ScenarioId::from(row.scenario_id),
            event_type: enum_from_text(&row.event_type)?,
            target_type: enum_from_text(&row.target_type)?,
            target_id: row.target_id,
            sim_time: row.sim_time,
            description: row.description,
        })
    }
}
