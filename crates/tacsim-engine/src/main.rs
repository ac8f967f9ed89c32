//! Exercise engine binary for the Tacsim simulator.
//!
//! Wires together configuration, logging, the durable store, the
//! simulation clock, and the space allocator, then runs until Ctrl-C
//! or an operator stop.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `tacsim-config.yaml` (defaults if absent)
//! 3. Select the store: `PostgreSQL` when configured, else an in-memory
//!    store seeded with the demo scenario
//! 4. Build the clock with a broadcast sink and day-boundary hook
//! 5. Start the scenario and log every snapshot
//! 6. Run the day-1 allocation and log the report
//! 7. Wait for Ctrl-C, then stop the clock cleanly

mod error;
mod seed;

use std::path::Path;
use std::sync::Arc;

use tacsim_alloc::run_allocation;
use tacsim_core::broadcast::{ChannelSink, DayBoundaryHook, SnapshotSink};
use tacsim_core::{SimulationClock, TacsimConfig};
use tacsim_db::{MemoryStore, PgStore, PostgresPool, SimStore};
use tacsim_types::ScenarioId;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::error::EngineError;

/// Day-boundary hook standing in for the order-generation collaborator.
///
/// The real system calls out to the tasking pipeline here; the engine
/// logs the crossing so operators can see the handoff fire.
struct OrdersHook;

impl DayBoundaryHook for OrdersHook {
    fn on_day_started(&self, scenario_id: ScenarioId, day_number: u32) {
        info!(%scenario_id, day_number, "Day boundary: requesting order generation");
    }
}

/// Application entry point for the exercise engine.
///
/// # Errors
///
/// Returns an error if any initialization step or a clock command fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration first so logging can honor its level.
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!(
        tick_interval_ms = config.clock.tick_interval_ms,
        default_compression_ratio = config.clock.default_compression_ratio,
        "tacsim-engine starting"
    );

    // 2. Select the store and the scenario to run.
    let (store, scenario_id, pool): (Arc<dyn SimStore>, ScenarioId, Option<PostgresPool>) =
        if config.infrastructure.postgres_url.is_empty() {
            info!("No PostgreSQL URL configured, seeding in-memory demo scenario");
            let memory = MemoryStore::new();
            let scenario_id = seed::seed_demo_scenario(&memory).await;
            (Arc::new(memory), scenario_id, None)
        } else {
            let pool = PostgresPool::connect_url(&config.infrastructure.postgres_url).await?;
            pool.run_migrations().await?;
            let scenario_id = scenario_from_env()?;
            info!(%scenario_id, "Using PostgreSQL store");
            (Arc::new(PgStore::new(&pool)), scenario_id, Some(pool))
        };

    // 3. Build the clock with a broadcast sink and the orders hook.
    let sink = Arc::new(ChannelSink::new());
    let clock = SimulationClock::new(
        Arc::clone(&store),
        Arc::clone(&sink) as Arc<dyn SnapshotSink>,
        Arc::new(OrdersHook),
        &config.clock,
    );

    // 4. Log every broadcast snapshot (the dashboard's view of the run).
    let mut snapshots = sink.subscribe();
    tokio::spawn(async move {
        loop {
            match snapshots.recv().await {
                Ok(snapshot) => {
                    info!(
                        sim_time = %snapshot.sim_time,
                        day = snapshot.current_day_number,
                        ratio = snapshot.compression_ratio,
                        "Tick"
                    );
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Snapshot logger lagged, skipping ahead");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // 5. Start the exercise.
    let run = clock.start(scenario_id, None).await?;
    info!(
        %scenario_id,
        sim_time = %run.sim_time,
        compression_ratio = run.compression_ratio,
        "Exercise running"
    );

    // 6. Resolve day-1 space tasking and log the outcome.
    match run_allocation(store.as_ref(), scenario_id, run.current_day_number).await {
        Ok(report) => info!(
            total_needs = report.summary.total_needs,
            fulfilled = report.summary.fulfilled,
            degraded = report.summary.degraded,
            denied = report.summary.denied,
            overall_risk = ?report.summary.overall_risk,
            "Space allocation resolved"
        ),
        Err(err) => error!(error = %err, "Space allocation failed"),
    }

    // 7. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, stopping exercise");

    if let Some(stopped) = clock.stop().await? {
        info!(
            sim_time = %stopped.sim_time,
            day = stopped.current_day_number,
            "Exercise stopped"
        );
    }

    if let Some(pool) = pool {
        pool.close().await;
    }

    info!("tacsim-engine shutdown complete");
    Ok(())
}

/// Load the simulator configuration from `tacsim-config.yaml`.
///
/// Falls back to defaults when the file does not exist.
fn load_config() -> Result<TacsimConfig, EngineError> {
    let config_path = Path::new("tacsim-config.yaml");
    if config_path.exists() {
        Ok(TacsimConfig::from_file(config_path)?)
    } else {
        Ok(TacsimConfig::default())
    }
}

/// Resolve the scenario to run from `TACSIM_SCENARIO_ID`.
///
/// Required for `PostgreSQL` runs, where scenarios are ingested by the
/// external document pipeline rather than seeded here.
fn scenario_from_env() -> Result<ScenarioId, EngineError> {
    let raw = std::env::var("TACSIM_SCENARIO_ID").map_err(|_| {
        EngineError::Scenario(String::from(
            "TACSIM_SCENARIO_ID must be set when a PostgreSQL store is configured",
        ))
    })?;
    let uuid: Uuid = raw
        .parse()
        .map_err(|e| EngineError::Scenario(format!("invalid TACSIM_SCENARIO_ID: {e}")))?;
    Ok(ScenarioId::from(uuid))
}
