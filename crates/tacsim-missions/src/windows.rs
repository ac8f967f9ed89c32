//! Time-window helpers for mission timing.
//!
//! Missions carry a list of planning windows; the clock and interpolator
//! only care about the time-on-target (TOT) anchor. Missions without a
//! TOT window are valid data but cannot transition or be interpolated --
//! the tick cycle skips them.

use chrono::{DateTime, Utc};
use tacsim_types::{Mission, TimeWindowKind};

/// Milliseconds per hour, for offset conversion.
const MS_PER_HOUR: f64 = 3_600_000.0;

/// The mission's time-on-target anchor, if it has one.
///
/// When a mission carries more than one TOT window, the earliest wins;
/// ingestion should not produce duplicates, but ordering makes the
/// selection deterministic if it does.
pub fn tot_anchor(mission: &Mission) -> Option<DateTime<Utc>> {
    mission
        .time_windows
        .iter()
        .filter(|w| w.kind == TimeWindowKind::TimeOnTarget)
        .map(|w| w.start)
        .min()
}

/// Signed offset of `now` from the TOT anchor, in fractional hours.
///
/// Negative before TOT. This is the argument the status machine takes.
pub fn hours_from_tot(now: DateTime<Utc>, tot: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let ms = now.signed_duration_since(tot).num_milliseconds() as f64;
    ms / MS_PER_HOUR
}
