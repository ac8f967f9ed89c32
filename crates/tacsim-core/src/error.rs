//! Error types for the simulation core.

use tacsim_db::StoreError;
use tacsim_types::ScenarioId;

/// Errors that can occur on the clock's command surface.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// A run is already active; only one may exist per process.
    #[error("a simulation is already running for scenario {scenario_id}")]
    AlreadyRunning {
        /// The scenario whose run is active.
        scenario_id: ScenarioId,
    },

    /// The command requires an active run and none exists.
    #[error("no active simulation run")]
    NoActiveRun,

    /// The requested scenario does not exist in the store.
    #[error("scenario {0} not found")]
    ScenarioNotFound(ScenarioId),

    /// The requested compression ratio is not positive.
    #[error("compression ratio must be positive, got {0}")]
    InvalidRatio(f64),

    /// A store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
