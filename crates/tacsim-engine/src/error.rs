//! Error type for engine startup and wiring.

use tacsim_core::{ClockError, ConfigError};
use tacsim_db::StoreError;

/// Errors that can occur while wiring and running the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A clock command failed.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// A store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The scenario to run could not be determined.
    #[error("scenario selection error: {0}")]
    Scenario(String),
}
