//! Simulation core for the Tacsim exercise simulator.
//!
//! Owns the compressed virtual clock and everything that happens on a
//! tick:
//!
//! - [`clock`] -- the singleton [`SimulationClock`](clock::SimulationClock)
//!   actor with its start/pause/resume/stop/seek/`set_speed` command
//!   surface.
//! - [`tick`] -- one tick: time advance, mission lifecycle stepping,
//!   position interpolation, event application, checkpoint, broadcast.
//! - [`events`] -- latest-event-wins derivation of asset status from
//!   scripted events, idempotent under replay and seek.
//! - [`broadcast`] -- the [`SnapshotSink`](broadcast::SnapshotSink) and
//!   [`DayBoundaryHook`](broadcast::DayBoundaryHook) collaborator seams.
//! - [`config`] -- YAML configuration with defaults.
//!
//! Persistence is injected through the
//! [`SimStore`](tacsim_db::SimStore) trait; the core never talks to a
//! database directly.

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod tick;

pub use broadcast::{ChannelSink, DayBoundaryHook, NullHook, NullSink, SnapshotSink};
pub use clock::SimulationClock;
pub use config::{ClockConfig, ConfigError, TacsimConfig};
pub use error::ClockError;
pub use events::{apply_events_for_time, derive_asset_status, ApplySummary};
pub use tick::{advance_sim_time, day_number_for, run_tick, TickError};
