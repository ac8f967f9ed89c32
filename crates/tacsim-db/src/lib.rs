//! Data layer for the Tacsim exercise simulator.
//!
//! The simulation core consumes persistence through the [`SimStore`]
//! trait; two implementations live here:
//!
//! - [`MemoryStore`] -- in-memory maps for unit tests and the engine's
//!   no-database fallback.
//! - [`PgStore`] -- `PostgreSQL` via [`sqlx`], composed from per-concern
//!   stores ([`RunStore`], [`MissionStore`], [`EventStore`],
//!   [`SpaceStore`]) with runtime-constructed, parameterized queries.
//!
//! Integration tests against a live database are `#[ignore]`d and run
//! via `cargo test -p tacsim-db -- --ignored` with Docker services up.

mod codec;
pub mod error;
pub mod event_store;
pub mod memory;
pub mod mission_store;
pub mod pg_store;
pub mod postgres;
pub mod run_store;
pub mod space_store;
pub mod store;

pub use error::StoreError;
pub use event_store::EventStore;
pub use memory::MemoryStore;
pub use mission_store::MissionStore;
pub use pg_store::PgStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use run_store::RunStore;
pub use space_store::SpaceStore;
pub use store::SimStore;
