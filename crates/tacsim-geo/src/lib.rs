//! Spherical-earth math and route position interpolation for the Tacsim
//! exercise simulator.
//!
//! Two layers:
//!
//! - [`kernel`] -- pure great-circle math (distance, bearing, route
//!   length) on plain degree pairs, with no dependencies.
//! - [`interpolate`] -- places a mission along its waypoint route at a
//!   virtual instant, anchored on its time-on-target.
//!
//! Everything here is deterministic and side-effect free; the simulation
//! clock calls into this crate every tick, and the same functions are
//! exported for collaborator reuse and testing.

pub mod interpolate;
pub mod kernel;

pub use interpolate::{
    interpolate_position, InterpolateError, AIR_NOMINAL_SPEED_KTS, LAND_NOMINAL_SPEED_KTS,
    MARITIME_NOMINAL_SPEED_KTS, PRE_TOT_TRANSIT_FRACTION,
};
pub use kernel::{bearing_deg, distance_nm, normalize_bearing, route_length_nm, EARTH_RADIUS_NM};
