//! Mission lifecycle logic for the Tacsim exercise simulator.
//!
//! - [`status`] -- the pure nine-state lifecycle machine driven by the
//!   offset from time-on-target.
//! - [`windows`] -- TOT anchor selection and offset math.
//!
//! Both modules are deterministic and free of I/O; the simulation clock
//! applies them to every mission on every tick.

pub mod status;
pub mod windows;

pub use status::next_status;
pub use windows::{hours_from_tot, tot_anchor};
