//! Route position interpolation anchored on time-on-target.
//!
//! Given a mission's ordered waypoints, its domain, and its TOT anchor,
//! [`interpolate_position`] places the mission along its route at any
//! virtual instant. The mission is assumed to begin transit at
//! `TOT - PRE_TOT_TRANSIT_FRACTION x flight duration`, so it arrives in
//! the objective area shortly before its scheduled effect.
//!
//! Positions are derived state: they are recomputed every tick and never
//! persisted. Before the transit start the mission sits at its first
//! waypoint; after the route completes it sits at its last waypoint.
//! There is no extrapolation past the route bounds.

use chrono::{DateTime, Utc};
use tacsim_types::{GeoPosition, MissionDomain, Waypoint};

use crate::kernel;

/// Fraction of the flight duration spent in transit before TOT.
///
/// Fixed heuristic carried over from the planning model. Tunable; a
/// per-domain split has been considered but not adopted.
pub const PRE_TOT_TRANSIT_FRACTION: f64 = 0.30;

/// Nominal transit speed for air missions, in knots.
pub const AIR_NOMINAL_SPEED_KTS: f64 = 450.0;

/// Nominal transit speed for maritime missions, in knots.
pub const MARITIME_NOMINAL_SPEED_KTS: f64 = 20.0;

/// Nominal transit speed for land missions, in knots.
pub const LAND_NOMINAL_SPEED_KTS: f64 = 120.0;

/// Errors that can occur during position interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InterpolateError {
    /// The route cannot be interpolated with fewer than two waypoints.
    #[error("route has {count} waypoint(s); at least 2 are required")]
    RouteTooShort {
        /// Number of waypoints on the route.
        count: usize,
    },
}

/// Nominal transit speed for a mission domain, in knots.
///
/// Space missions carry no transit route in practice; they fall back to
/// the air nominal so a degenerate route still resolves deterministically.
pub const fn nominal_speed_kts(domain: MissionDomain) -> f64 {
    match domain {
        MissionDomain::Air | MissionDomain::Space => AIR_NOMINAL_SPEED_KTS,
        MissionDomain::Maritime => MARITIME_NOMINAL_SPEED_KTS,
        MissionDomain::Land => LAND_NOMINAL_SPEED_KTS,
    }
}

/// Place a mission along its route at the given virtual instant.
///
/// The route's total length and the mission speed (lead waypoint
/// override, else domain nominal) give the flight duration; the elapsed
/// fraction of that duration, clamped to `[0, 1]`, selects a point on
/// the cumulative-distance table. Latitude, longitude, and altitude are
/// linearly interpolated within the bracketing leg; heading is the
/// initial bearing of that leg.
///
/// # Errors
///
/// Returns [`InterpolateError::RouteTooShort`] when the route has fewer
/// than two waypoints.
pub fn interpolate_position(
    waypoints: &[Waypoint],
    now: DateTime<Utc>,
    domain: MissionDomain,
    tot: DateTime<Utc>,
) -> Result<GeoPosition, InterpolateError> {
    let (Some(first), Some(last)) = (waypoints.first(), waypoints.last()) else {
        return Err(InterpolateError::RouteTooShort { count: 0 });
    };
    if waypoints.len() < 2 {
        return Err(InterpolateError::RouteTooShort {
            count: waypoints.len(),
        });
    }

    let points: Vec<(f64, f64)> = waypoints.iter().map(|w| (w.lat, w.lon)).collect();
    let total_nm = kernel::route_length_nm(&points);

    let speed_kts = first
        .speed_kts
        .filter(|s| *s > 0.0)
        .unwrap_or_else(|| nominal_speed_kts(domain));
    let duration_hours = total_nm / speed_kts;

    // Elapsed time relative to the transit start (TOT minus the pre-TOT
    // transit share), as a fraction of the full flight duration.
    #[allow(clippy::cast_precision_loss)]
    let hours_from_tot = now.signed_duration_since(tot).num_milliseconds() as f64 / 3_600_000.0;
    let elapsed_hours = hours_from_tot + PRE_TOT_TRANSIT_FRACTION * duration_hours;

    let fraction = if duration_hours > 0.0 {
        (elapsed_hours / duration_hours).clamp(0.0, 1.0)
    } else {
        // Degenerate route (all waypoints coincident): treat as complete.
        1.0
    };

    let target_nm = fraction * total_nm;

    // Walk the cumulative-distance table to the bracketing leg.
    let mut cumulative_nm = 0.0;
    for (a, b) in waypoints.iter().zip(waypoints.iter().skip(1)) {
        let leg_nm = kernel::distance_nm(a.lat, a.lon, b.lat, b.lon);
        if cumulative_nm + leg_nm >= target_nm || std::ptr::eq(b, last) {
            let leg_fraction = if leg_nm > 0.0 {
                ((target_nm - cumulative_nm) / leg_nm).clamp(0.0, 1.0)
            } else {
                0.0
            };
            return Ok(position_on_leg(a, b, leg_fraction, speed_kts));
        }
        cumulative_nm += leg_nm;
    }

    // Unreachable for routes of length >= 2, but the compiler cannot see
    // that; resolve to the last waypoint with the final leg's heading.
    Ok(GeoPosition {
        lat: last.lat,
        lon: last.lon,
        heading_deg: kernel::bearing_deg(first.lat, first.lon, last.lat, last.lon),
        altitude_ft: last.altitude_ft,
        speed_kts,
    })
}

/// Linear interpolation within one leg.
fn position_on_leg(a: &Waypoint, b: &Waypoint, fraction: f64, speed_kts: f64) -> GeoPosition {
    GeoPosition {
        lat: lerp(a.lat, b.lat, fraction),
        lon: lerp(a.lon, b.lon, fraction),
        heading_deg: kernel::bearing_deg(a.lat, a.lon, b.lat, b.lon),
        altitude_ft: lerp(a.altitude_ft, b.altitude_ft, fraction),
        speed_kts,
    }
}

/// Linear interpolation between two scalars.
const fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_possible_truncation,
    clippy::arithmetic_side_effects
)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn wp(sequence: u32, lat: f64, lon: f64, altitude_ft: f64) -> Waypoint {
        Waypoint {
            sequence,
            lat,
            lon,
            altitude_ft,
            speed_kts: None,
        }
    }

    fn tot() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    /// A ~300nm due-north route at 25,000 ft.
    fn northbound_route() -> Vec<Waypoint> {
        vec![wp(0, 30.0, 10.0, 25_000.0), wp(1, 35.0, 10.0, 25_000.0)]
    }

    #[test]
    fn empty_route_is_not_interpolatable() {
        let result = interpolate_position(&[], tot(), MissionDomain::Air, tot());
        assert_eq!(result, Err(InterpolateError::RouteTooShort { count: 0 }));
    }

    #[test]
    fn single_waypoint_is_not_interpolatable() {
        let route = vec![wp(0, 30.0, 10.0, 0.0)];
        let result = interpolate_position(&route, tot(), MissionDomain::Air, tot());
        assert_eq!(result, Err(InterpolateError::RouteTooShort { count: 1 }));
    }

    #[test]
    fn before_transit_start_sits_at_first_waypoint() {
        let route = northbound_route();
        let long_before = tot() - chrono::Duration::hours(12);
        let pos = interpolate_position(&route, long_before, MissionDomain::Air, tot()).unwrap();
        assert!((pos.lat - 30.0).abs() < 1e-9);
        assert!((pos.lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn after_route_complete_sits_at_last_waypoint() {
        let route = northbound_route();
        let long_after = tot() + chrono::Duration::hours(12);
        let pos = interpolate_position(&route, long_after, MissionDomain::Air, tot()).unwrap();
        assert!((pos.lat - 35.0).abs() < 1e-9);
        assert!((pos.lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn midpoint_of_flight_is_between_waypoints() {
        let route = northbound_route();
        // Flight duration: ~300nm at 450kt = ~0.667h. Transit starts at
        // TOT - 0.3 * duration; half the duration later is the midpoint.
        let points: Vec<(f64, f64)> = route.iter().map(|w| (w.lat, w.lon)).collect();
        let duration_hours = kernel::route_length_nm(&points) / AIR_NOMINAL_SPEED_KTS;
        let start_offset_ms = (-PRE_TOT_TRANSIT_FRACTION * duration_hours * 3_600_000.0) as i64;
        let midpoint_ms = (0.5 * duration_hours * 3_600_000.0) as i64;
        let now = tot()
            + chrono::Duration::milliseconds(start_offset_ms)
            + chrono::Duration::milliseconds(midpoint_ms);

        let pos = interpolate_position(&route, now, MissionDomain::Air, tot()).unwrap();
        assert!(
            (pos.lat - 32.5).abs() < 0.05,
            "expected ~32.5 deg lat at midpoint, got {}",
            pos.lat
        );
        // Heading due north along the whole leg.
        assert!(pos.heading_deg < 1.0 || pos.heading_deg > 359.0);
    }

    #[test]
    fn altitude_interpolates_within_leg() {
        let route = vec![wp(0, 30.0, 10.0, 10_000.0), wp(1, 35.0, 10.0, 30_000.0)];
        let points: Vec<(f64, f64)> = route.iter().map(|w| (w.lat, w.lon)).collect();
        let duration_hours = kernel::route_length_nm(&points) / AIR_NOMINAL_SPEED_KTS;
        let start_offset_ms = (-PRE_TOT_TRANSIT_FRACTION * duration_hours * 3_600_000.0) as i64;
        let midpoint_ms = (0.5 * duration_hours * 3_600_000.0) as i64;
        let now = tot()
            + chrono::Duration::milliseconds(start_offset_ms)
            + chrono::Duration::milliseconds(midpoint_ms);

        let pos = interpolate_position(&route, now, MissionDomain::Air, tot()).unwrap();
        assert!(
            (pos.altitude_ft - 20_000.0).abs() < 200.0,
            "expected ~20000ft, got {}",
            pos.altitude_ft
        );
    }

    #[test]
    fn lead_waypoint_speed_overrides_domain_nominal() {
        let mut route = northbound_route();
        if let Some(first) = route.first_mut() {
            first.speed_kts = Some(300.0);
        }
        let pos = interpolate_position(&route, tot(), MissionDomain::Air, tot()).unwrap();
        assert!((pos.speed_kts - 300.0).abs() < 1e-9);
    }

    #[test]
    fn maritime_domain_uses_maritime_nominal() {
        let route = vec![wp(0, 30.0, 10.0, 0.0), wp(1, 30.5, 10.0, 0.0)];
        let pos = interpolate_position(&route, tot(), MissionDomain::Maritime, tot()).unwrap();
        assert!((pos.speed_kts - MARITIME_NOMINAL_SPEED_KTS).abs() < 1e-9);
    }

    #[test]
    fn degenerate_coincident_route_resolves_to_last_waypoint() {
        let route = vec![wp(0, 30.0, 10.0, 5000.0), wp(1, 30.0, 10.0, 5000.0)];
        let pos = interpolate_position(&route, tot(), MissionDomain::Land, tot()).unwrap();
        assert!((pos.lat - 30.0).abs() < 1e-9);
        assert!((pos.lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn multi_leg_route_walks_cumulative_distances() {
        // Two equal ~60nm legs: north, then east. Three quarters of the
        // way through the flight the mission is on the second leg.
        let route = vec![
            wp(0, 0.0, 0.0, 1000.0),
            wp(1, 1.0, 0.0, 1000.0),
            wp(2, 1.0, 1.0, 1000.0),
        ];
        let points: Vec<(f64, f64)> = route.iter().map(|w| (w.lat, w.lon)).collect();
        let duration_hours = kernel::route_length_nm(&points) / AIR_NOMINAL_SPEED_KTS;
        let start_offset_ms = (-PRE_TOT_TRANSIT_FRACTION * duration_hours * 3_600_000.0) as i64;
        let three_quarters_ms = (0.75 * duration_hours * 3_600_000.0) as i64;
        let now = tot()
            + chrono::Duration::milliseconds(start_offset_ms)
            + chrono::Duration::milliseconds(three_quarters_ms);

        let pos = interpolate_position(&route, now, MissionDomain::Air, tot()).unwrap();
        assert!((pos.lat - 1.0).abs() < 0.01, "on second leg, lat ~1.0");
        assert!(
            pos.lon > 0.3 && pos.lon < 0.7,
            "partway along the eastbound leg, got lon {}",
            pos.lon
        );
        assert!((pos.heading_deg - 90.0).abs() < 1.5, "eastbound heading");
    }
}
