//! Mission lifecycle status machine.
//!
//! A mission advances through a fixed nine-state lifecycle as virtual
//! time passes relative to its time-on-target (TOT) anchor:
//!
//! ```text
//! Planned -> Briefed   (TOT - 4h)
//!         -> Launched  (TOT - 2h)
//!         -> Airborne  (TOT - 1.5h)
//!         -> OnStation (TOT - 0.5h)
//!         -> Engaged   (TOT + 0h)
//!         -> Egressing (TOT + 0.25h)
//!         -> Rtb       (TOT + 1h)
//!         -> Recovered (TOT + 3h)
//! ```
//!
//! [`next_status`] is a pure, total function over (current status, hours
//! relative to TOT). Each call checks exactly one threshold -- the one
//! leaving the *current* status -- so a mission never skips stages within
//! a single tick; a clock running faster than the lifecycle simply steps
//! one stage per tick until it catches up. Thresholds are inclusive:
//! an offset exactly on the boundary triggers the transition.

use tacsim_types::MissionStatus;

/// Hours relative to TOT at which a planned mission is briefed.
pub const BRIEFED_AT_HOURS: f64 = -4.0;

/// Hours relative to TOT at which a briefed mission launches.
pub const LAUNCHED_AT_HOURS: f64 = -2.0;

/// Hours relative to TOT at which a launched mission is airborne.
pub const AIRBORNE_AT_HOURS: f64 = -1.5;

/// Hours relative to TOT at which an airborne mission is on station.
pub const ON_STATION_AT_HOURS: f64 = -0.5;

/// Hours relative to TOT at which an on-station mission engages.
pub const ENGAGED_AT_HOURS: f64 = 0.0;

/// Hours relative to TOT at which an engaged mission begins egress.
pub const EGRESSING_AT_HOURS: f64 = 0.25;

/// Hours relative to TOT at which an egressing mission turns for home.
pub const RTB_AT_HOURS: f64 = 1.0;

/// Hours relative to TOT at which a returning mission is recovered.
pub const RECOVERED_AT_HOURS: f64 = 3.0;

/// Compute the next lifecycle status for a mission, if any.
///
/// `hours_from_tot` is the signed offset of the current virtual instant
/// from the mission's TOT anchor (negative before TOT). Returns `None`
/// when no transition is due, including for the terminal `Recovered`
/// status.
pub fn next_status(status: MissionStatus, hours_from_tot: f64) -> Option<MissionStatus> {
    let (threshold, next) = match status {
        MissionStatus::Planned => (BRIEFED_AT_HOURS, MissionStatus::Briefed),
        MissionStatus::Briefed => (LAUNCHED_AT_HOURS, MissionStatus::Launched),
        MissionStatus::Launched => (AIRBORNE_AT_HOURS, MissionStatus::Airborne),
        MissionStatus::Airborne => (ON_STATION_AT_HOURS, MissionStatus::OnStation),
        MissionStatus::OnStation => (ENGAGED_AT_HOURS, MissionStatus::Engaged),
        MissionStatus::Engaged => (EGRESSING_AT_HOURS, MissionStatus::Egressing),
        MissionStatus::Egressing => (RTB_AT_HOURS, MissionStatus::Rtb),
        MissionStatus::Rtb => (RECOVERED_AT_HOURS, MissionStatus::Recovered),
        MissionStatus::Recovered => return None,
    };

    (hours_from_tot >= threshold).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planned_briefs_at_minus_four() {
        assert_eq!(
            next_status(MissionStatus::Planned, -4.0),
            Some(MissionStatus::Briefed)
        );
    }

    #[test]
    fn planned_holds_before_minus_four() {
        assert_eq!(next_status(MissionStatus::Planned, -5.0), None);
        assert_eq!(next_status(MissionStatus::Planned, -4.001), None);
    }

    #[test]
    fn exact_boundaries_are_inclusive() {
        assert_eq!(
            next_status(MissionStatus::OnStation, 0.0),
            Some(MissionStatus::Engaged)
        );
        assert_eq!(
            next_status(MissionStatus::Engaged, 0.25),
            Some(MissionStatus::Egressing)
        );
    }

    #[test]
    fn no_stage_skipping_in_one_call() {
        // Well past every threshold, a planned mission still only briefs.
        assert_eq!(
            next_status(MissionStatus::Planned, 10.0),
            Some(MissionStatus::Briefed)
        );
    }

    #[test]
    fn recovered_is_terminal() {
        assert_eq!(next_status(MissionStatus::Recovered, -10.0), None);
        assert_eq!(next_status(MissionStatus::Recovered, 0.0), None);
        assert_eq!(next_status(MissionStatus::Recovered, 1000.0), None);
    }

    #[test]
    fn full_lifecycle_walk_reproduces_nine_states() {
        // Step virtual time through the documented thresholds and apply
        // the machine at each; the sequence must be the full lifecycle.
        let offsets = [-4.0, -2.0, -1.5, -0.5, 0.0, 0.25, 1.0, 3.0];
        let expected = [
            MissionStatus::Briefed,
            MissionStatus::Launched,
            MissionStatus::Airborne,
            MissionStatus::OnStation,
            MissionStatus::Engaged,
            MissionStatus::Egressing,
            MissionStatus::Rtb,
            MissionStatus::Recovered,
        ];

        let mut status = MissionStatus::Planned;
        let mut walked = Vec::new();
        for &hours in &offsets {
            if let Some(next) = next_status(status, hours) {
                status = next;
                walked.push(next);
            }
        }
        assert_eq!(walked, expected);
        assert_eq!(status, MissionStatus::Recovered);
    }

    #[test]
    fn catches_up_one_stage_per_call() {
        // A clock that jumped straight past TOT advances one stage per
        // tick until the lifecycle catches up with virtual time.
        let mut status = MissionStatus::Planned;
        let mut steps: u32 = 0;
        while let Some(next) = next_status(status, 5.0) {
            status = next;
            steps = steps.saturating_add(1);
            assert!(steps <= 8, "lifecycle must terminate");
        }
        assert_eq!(status, MissionStatus::Recovered);
        assert_eq!(steps, 8);
    }
}
