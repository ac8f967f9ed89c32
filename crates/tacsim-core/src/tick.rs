//! One tick of the simulation: time advance, mission evolution, event
//! application, checkpoint, broadcast.
//!
//! Phases, in order:
//!
//! 1. **Advance** -- move virtual time forward by the wall-clock delta
//!    multiplied by the compression ratio, and reconcile the exercise
//!    day number (firing the day-boundary hook once per upward
//!    crossing, fire-and-forget).
//! 2. **Missions** -- for every mission with a TOT anchor, step the
//!    lifecycle status machine (persisting changes) and interpolate the
//!    route position (derived only, never persisted).
//! 3. **Events** -- reconcile scripted events against the new instant
//!    (latest-event-wins; see [`crate::events`]).
//! 4. **Persist** -- upsert the run checkpoint.
//! 5. **Broadcast** -- publish the snapshot to the sink.
//!
//! A tick always runs to completion before the next is scheduled; the
//! clock guarantees no overlap. Per-mission failures inside a tick are
//! logged and skipped so one bad row cannot stall the exercise.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tacsim_db::{SimStore, StoreError};
use tacsim_geo::interpolate_position;
use tacsim_missions::{hours_from_tot, next_status, tot_anchor};
use tacsim_types::{
    ClockSnapshot, MissionTickState, SimulationRun, StatusTransition, TickSummary,
};
use tracing::{debug, info, warn};

use crate::broadcast::{DayBoundaryHook, SnapshotSink};
use crate::events;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Advance a run's virtual time by a wall-clock delta.
///
/// The advance is `wall_delta x compression_ratio`, rounded to the
/// millisecond. Negative wall deltas (clock skew) advance nothing.
pub fn advance_sim_time(run: &mut SimulationRun, wall_delta: TimeDelta) {
    let wall_ms = wall_delta.num_milliseconds().max(0);
    #[allow(clippy::cast_precision_loss)]
    let sim_ms_f = wall_ms as f64 * run.compression_ratio;
    #[allow(clippy::cast_possible_truncation)]
    let sim_ms = sim_ms_f.round() as i64;
    run.sim_time = run
        .sim_time
        .checked_add_signed(TimeDelta::milliseconds(sim_ms))
        .unwrap_or(run.sim_time);
}

/// The 1-based exercise day number for an instant, anchored on the
/// scenario epoch.
///
/// Instants before the epoch count as day 1. Derived, never counted,
/// so seeking in either direction stays consistent.
pub fn day_number_for(epoch: DateTime<Utc>, sim_time: DateTime<Utc>) -> u32 {
    if sim_time < epoch {
        return 1;
    }
    let days = sim_time.signed_duration_since(epoch).num_days();
    u32::try_from(days).map_or(u32::MAX, |d| d.saturating_add(1))
}

/// Execute one complete tick against the store.
///
/// Mutates `run` in place (sim time, day number) and returns the tick's
/// observable output. `wall_last` is the wall-clock instant of the
/// previous tick (or of the start/resume command).
///
/// # Errors
///
/// Returns [`TickError::Store`] when a batch-level store operation
/// (mission fetch, event fetch, checkpoint) fails. Per-mission and
/// per-target failures are logged and skipped instead.
pub async fn run_tick<S: SimStore + ?Sized>(
    store: &S,
    sink: &dyn SnapshotSink,
    hook: &Arc<dyn DayBoundaryHook>,
    run: &mut SimulationRun,
    epoch: DateTime<Utc>,
    wall_now: DateTime<Utc>,
    wall_last: DateTime<Utc>,
) -> Result<TickSummary, TickError> {
    // --- Phase 1: Advance ---
    advance_sim_time(run, wall_now.signed_duration_since(wall_last));

    let new_day = day_number_for(epoch, run.sim_time);
    if new_day > run.current_day_number {
        // Fire the orders hook once per crossed day, without waiting.
        let mut day = run.current_day_number.saturating_add(1);
        while day <= new_day {
            let hook = Arc::clone(hook);
            let scenario_id = run.scenario_id;
            info!(%scenario_id, day, "Day boundary crossed");
            tokio::spawn(async move {
                hook.on_day_started(scenario_id, day);
            });
            day = day.saturating_add(1);
        }
    }
    run.current_day_number = new_day;

    // --- Phase 2: Missions ---
    let missions = store.fetch_missions(run.scenario_id).await?;
    let mut mission_states = Vec::with_capacity(missions.len());
    let mut transitions = Vec::new();

    for mission in &missions {
        let Some(tot) = tot_anchor(mission) else {
            debug!(
                mission_id = %mission.id,
                callsign = mission.callsign.as_str(),
                "Mission has no TOT anchor, skipping"
            );
            continue;
        };

        let hours = hours_from_tot(run.sim_time, tot);
        let mut status = mission.status;
        if let Some(next) = next_status(status, hours) {
            match store.update_mission_status(mission.id, next).await {
                Ok(()) => {
                    info!(
                        mission_id = %mission.id,
                        callsign = mission.callsign.as_str(),
                        from = ?status,
                        to = ?next,
                        "Mission status transition"
                    );
                    transitions.push(StatusTransition {
                        mission_id: mission.id,
                        from: status,
                        to: next,
                    });
                    status = next;
                }
                Err(err) => {
                    warn!(
                        mission_id = %mission.id,
                        error = %err,
                        "Mission status persist failed, keeping current status"
                    );
                }
            }
        }

        let position =
            interpolate_position(&mission.waypoints, run.sim_time, mission.domain, tot).ok();
        mission_states.push(MissionTickState {
            mission_id: mission.id,
            status,
            position,
        });
    }

    // --- Phase 3: Events ---
    let apply = events::apply_events_for_time(store, run.scenario_id, run.sim_time).await?;

    // --- Phase 4: Persist checkpoint ---
    store.save_checkpoint(run).await?;

    // --- Phase 5: Broadcast ---
    let snapshot = ClockSnapshot {
        scenario_id: run.scenario_id,
        sim_time: run.sim_time,
        real_time: wall_now,
        compression_ratio: run.compression_ratio,
        current_day_number: run.current_day_number,
    };
    sink.publish(&snapshot);

    Ok(TickSummary {
        snapshot,
        mission_states,
        transitions,
        events_applied: apply.applied(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::TimeZone;
    use tacsim_db::MemoryStore;
    use tacsim_types::{
        Mission, MissionDomain, MissionId, MissionStatus, RunStatus, Scenario, ScenarioId,
        TimeWindow, TimeWindowKind, Waypoint,
    };

    use super::*;
    use crate::broadcast::{ChannelSink, NullSink};

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap()
    }

    fn make_run(scenario_id: ScenarioId, ratio: f64) -> SimulationRun {
        SimulationRun {
            scenario_id,
            status: RunStatus::Running,
            sim_time: epoch(),
            real_start_time: Utc::now(),
            compression_ratio: ratio,
            current_day_number: 1,
        }
    }

    fn make_mission(scenario_id: ScenarioId, tot: DateTime<Utc>) -> Mission {
        Mission {
            id: MissionId::new(),
            scenario_id,
            callsign: String::from("VIPER 11"),
            domain: MissionDomain::Air,
            status: MissionStatus::Planned,
            waypoints: vec![
                Waypoint {
                    sequence: 0,
                    lat: 30.0,
                    lon: 10.0,
                    altitude_ft: 25_000.0,
                    speed_kts: None,
                },
                Waypoint {
                    sequence: 1,
                    lat: 35.0,
                    lon: 10.0,
                    altitude_ft: 25_000.0,
                    speed_kts: None,
                },
            ],
            time_windows: vec![TimeWindow {
                kind: TimeWindowKind::TimeOnTarget,
                start: tot,
                end: None,
            }],
            targets: Vec::new(),
        }
    }

    /// Hook that counts invocations per day.
    #[derive(Default)]
    struct CountingHook {
        calls: AtomicU32,
    }

    impl DayBoundaryHook for CountingHook {
        fn on_day_started(&self, _scenario_id: ScenarioId, _day_number: u32) {
            let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn advance_scales_by_compression_ratio() {
        let mut run = make_run(ScenarioId::new(), 60.0);
        // 1 real second at 60x => 1 simulated minute.
        advance_sim_time(&mut run, TimeDelta::seconds(1));
        assert_eq!(run.sim_time, epoch() + TimeDelta::seconds(60));
    }

    #[test]
    fn advance_ignores_negative_wall_delta() {
        let mut run = make_run(ScenarioId::new(), 60.0);
        advance_sim_time(&mut run, TimeDelta::seconds(-5));
        assert_eq!(run.sim_time, epoch());
    }

    #[test]
    fn day_numbers_derive_from_epoch() {
        assert_eq!(day_number_for(epoch(), epoch()), 1);
        assert_eq!(
            day_number_for(epoch(), epoch() + TimeDelta::hours(23)),
            1
        );
        assert_eq!(
            day_number_for(epoch(), epoch() + TimeDelta::hours(24)),
            2
        );
        assert_eq!(
            day_number_for(epoch(), epoch() + TimeDelta::days(6)),
            7
        );
        // Before the epoch still counts as day 1.
        assert_eq!(
            day_number_for(epoch(), epoch() - TimeDelta::hours(5)),
            1
        );
    }

    #[tokio::test]
    async fn tick_advances_time_and_checkpoints() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let mut run = make_run(scenario_id, 60.0);
        let hook: Arc<dyn DayBoundaryHook> = Arc::new(crate::broadcast::NullHook);

        let wall_last = Utc::now();
        let wall_now = wall_last + TimeDelta::seconds(2);
        let summary = run_tick(&store, &NullSink, &hook, &mut run, epoch(), wall_now, wall_last)
            .await
            .unwrap();

        // 2 real seconds at 60x => 2 simulated minutes.
        assert_eq!(run.sim_time, epoch() + TimeDelta::seconds(120));
        assert_eq!(summary.snapshot.sim_time, run.sim_time);

        let checkpoint = store.load_checkpoint(scenario_id).await.unwrap().unwrap();
        assert_eq!(checkpoint.sim_time, run.sim_time);
    }

    #[tokio::test]
    async fn tick_transitions_missions_and_interpolates() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        // TOT four hours after epoch: at epoch the mission is exactly at
        // the T-4h briefing threshold.
        let tot = epoch() + TimeDelta::hours(4);
        let mission = make_mission(scenario_id, tot);
        let mission_id = mission.id;
        store.insert_mission(mission).await;

        let mut run = make_run(scenario_id, 60.0);
        let hook: Arc<dyn DayBoundaryHook> = Arc::new(crate::broadcast::NullHook);

        let wall = Utc::now();
        let summary = run_tick(&store, &NullSink, &hook, &mut run, epoch(), wall, wall)
            .await
            .unwrap();

        assert_eq!(summary.transitions.len(), 1);
        let transition = summary.transitions.first().unwrap();
        assert_eq!(transition.from, MissionStatus::Planned);
        assert_eq!(transition.to, MissionStatus::Briefed);

        // The transition was persisted.
        let missions = store.fetch_missions(scenario_id).await.unwrap();
        assert_eq!(missions.first().unwrap().status, MissionStatus::Briefed);

        // A two-waypoint route always yields a position.
        let state = summary
            .mission_states
            .iter()
            .find(|s| s.mission_id == mission_id)
            .unwrap();
        assert!(state.position.is_some());
    }

    #[tokio::test]
    async fn tick_broadcasts_snapshot() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let mut run = make_run(scenario_id, 60.0);
        let hook: Arc<dyn DayBoundaryHook> = Arc::new(crate::broadcast::NullHook);
        let sink = ChannelSink::new();
        let mut rx = sink.subscribe();

        let wall = Utc::now();
        let _ = run_tick(&store, &sink, &hook, &mut run, epoch(), wall, wall)
            .await
            .unwrap();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.scenario_id, scenario_id);
        assert!((snapshot.compression_ratio - 60.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn day_crossing_fires_hook_once_per_day() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        // One real second simulates a full day.
        let mut run = make_run(scenario_id, 86_400.0);
        let counting = Arc::new(CountingHook::default());
        let hook: Arc<dyn DayBoundaryHook> = Arc::clone(&counting) as Arc<dyn DayBoundaryHook>;

        let wall_last = Utc::now();
        let wall_now = wall_last + TimeDelta::seconds(1);
        let _ = run_tick(&store, &NullSink, &hook, &mut run, epoch(), wall_now, wall_last)
            .await
            .unwrap();

        assert_eq!(run.current_day_number, 2);

        // The hook runs on a spawned task; yield until it lands.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);

        // The next tick within the same day fires nothing new.
        let wall_next = wall_now + TimeDelta::milliseconds(10);
        let _ = run_tick(&store, &NullSink, &hook, &mut run, epoch(), wall_next, wall_now)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mission_without_tot_is_skipped() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let mut mission = make_mission(scenario_id, epoch());
        mission.time_windows.clear();
        store.insert_mission(mission).await;

        let mut run = make_run(scenario_id, 60.0);
        let hook: Arc<dyn DayBoundaryHook> = Arc::new(crate::broadcast::NullHook);

        let wall = Utc::now();
        let summary = run_tick(&store, &NullSink, &hook, &mut run, epoch(), wall, wall)
            .await
            .unwrap();
        assert!(summary.mission_states.is_empty());
        assert!(summary.transitions.is_empty());
    }
}
