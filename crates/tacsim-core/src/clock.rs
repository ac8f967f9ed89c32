//! The simulation clock: the single owner of the running exercise.
//!
//! [`SimulationClock`] is a singleton actor over the run lifecycle
//! {`Idle`, `Running`, `Paused`, `Stopped`}. Exactly one run may be
//! active per process; `start` fails loudly if one already is. All
//! commands (`start`, `pause`, `resume`, `stop`, `seek`, `set_speed`)
//! and the tick handler serialize on one `tokio` mutex, so a command
//! can never race a tick's read of the run state.
//!
//! The tick loop is a cooperative periodic task: each tick fully
//! completes -- including checkpoint persistence and snapshot broadcast
//! -- before the next is scheduled (`MissedTickBehavior::Delay`).
//! `stop` takes the command mutex and aborts the task, which guarantees
//! no tick fires and no broadcast lands after it returns.
//!
//! The run is persisted as a checkpoint row every tick and on every
//! command, so a fresh process can `start` the same scenario and resume
//! a `Running` or `Paused` checkpoint where it left off.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tacsim_db::SimStore;
use tacsim_types::{RunStatus, ScenarioId, SimulationRun};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::broadcast::{DayBoundaryHook, SnapshotSink};
use crate::config::ClockConfig;
use crate::error::ClockError;
use crate::tick;

/// State shared between the command surface and the tick task.
struct ClockShared {
    /// The active run, if any. `None` means idle.
    run: Option<SimulationRun>,
    /// Wall-clock instant of the previous tick (or start/resume).
    last_wall: DateTime<Utc>,
    /// The active scenario's day-1 epoch.
    epoch: DateTime<Utc>,
    /// Handle of the spawned tick task, for abort on stop.
    task: Option<JoinHandle<()>>,
}

/// The single-owner simulation clock.
///
/// Cheap to share: commands take `&self` and serialize internally.
/// `S` may be a concrete store or `dyn SimStore`.
pub struct SimulationClock<S: ?Sized> {
    store: Arc<S>,
    sink: Arc<dyn SnapshotSink>,
    hook: Arc<dyn DayBoundaryHook>,
    tick_interval: Duration,
    default_ratio: f64,
    shared: Arc<Mutex<ClockShared>>,
}

impl<S: SimStore + ?Sized + 'static> SimulationClock<S> {
    /// Create an idle clock over a store, sink, and day-boundary hook.
    pub fn new(
        store: Arc<S>,
        sink: Arc<dyn SnapshotSink>,
        hook: Arc<dyn DayBoundaryHook>,
        config: &ClockConfig,
    ) -> Self {
        Self {
            store,
            sink,
            hook,
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            default_ratio: config.default_compression_ratio,
            shared: Arc::new(Mutex::new(ClockShared {
                run: None,
                last_wall: Utc::now(),
                epoch: Utc::now(),
                task: None,
            })),
        }
    }

    /// Start (or resume from checkpoint) a run for a scenario.
    ///
    /// Fails fast -- before any state mutation -- when the scenario is
    /// unknown, and refuses to start while any run is active (a paused
    /// run must be resumed or stopped first). A `Running` or `Paused`
    /// checkpoint is resumed at its persisted sim time; anything else
    /// begins a fresh run at the scenario epoch.
    ///
    /// # Errors
    ///
    /// [`ClockError::AlreadyRunning`], [`ClockError::ScenarioNotFound`],
    /// [`ClockError::InvalidRatio`], or [`ClockError::Store`].
    pub async fn start(
        &self,
        scenario_id: ScenarioId,
        compression_ratio: Option<f64>,
    ) -> Result<SimulationRun, ClockError> {
        let mut shared = self.shared.lock().await;

        if let Some(active) = &shared.run {
            return Err(ClockError::AlreadyRunning {
                scenario_id: active.scenario_id,
            });
        }

        let ratio = compression_ratio.unwrap_or(self.default_ratio);
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(ClockError::InvalidRatio(ratio));
        }

        let scenario = self
            .store
            .fetch_scenario(scenario_id)
            .await?
            .ok_or(ClockError::ScenarioNotFound(scenario_id))?;

        let run = match self.store.load_checkpoint(scenario_id).await? {
            Some(mut checkpoint)
                if matches!(checkpoint.status, RunStatus::Running | RunStatus::Paused) =>
            {
                info!(
                    %scenario_id,
                    sim_time = %checkpoint.sim_time,
                    day = checkpoint.current_day_number,
                    "Resuming run from checkpoint"
                );
                checkpoint.status = RunStatus::Running;
                checkpoint.real_start_time = Utc::now();
                if let Some(requested) = compression_ratio {
                    checkpoint.compression_ratio = requested;
                }
                checkpoint
            }
            _ => SimulationRun {
                scenario_id,
                status: RunStatus::Running,
                sim_time: scenario.epoch,
                real_start_time: Utc::now(),
                compression_ratio: ratio,
                current_day_number: 1,
            },
        };

        self.store.save_checkpoint(&run).await?;

        shared.epoch = scenario.epoch;
        shared.last_wall = Utc::now();
        shared.run = Some(run.clone());
        shared.task = Some(tokio::spawn(tick_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.sink),
            Arc::clone(&self.hook),
            Arc::clone(&self.shared),
            self.tick_interval,
        )));

        info!(
            %scenario_id,
            scenario = scenario.name.as_str(),
            compression_ratio = run.compression_ratio,
            tick_interval_ms = u64::try_from(self.tick_interval.as_millis()).unwrap_or(u64::MAX),
            "Simulation started"
        );

        Ok(run)
    }

    /// Pause the running exercise.
    ///
    /// Returns `Ok(None)` when nothing is running -- the caller must
    /// check. The tick task stays alive but skips work until resumed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Store`] if the checkpoint write fails.
    pub async fn pause(&self) -> Result<Option<SimulationRun>, ClockError> {
        let mut shared = self.shared.lock().await;
        match shared.run.as_mut() {
            Some(run) if run.status == RunStatus::Running => {
                run.status = RunStatus::Paused;
                let paused = run.clone();
                self.store.save_checkpoint(&paused).await?;
                info!(scenario_id = %paused.scenario_id, sim_time = %paused.sim_time, "Simulation paused");
                Ok(Some(paused))
            }
            _ => Ok(None),
        }
    }

    /// Resume a paused exercise.
    ///
    /// Re-anchors the wall-clock delta so time spent paused is never
    /// compressed into sim time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::NoActiveRun`] when no paused run exists, or
    /// [`ClockError::Store`] if the checkpoint write fails.
    pub async fn resume(&self) -> Result<SimulationRun, ClockError> {
        let mut shared = self.shared.lock().await;
        let resumed = match shared.run.as_mut() {
            Some(run) if run.status == RunStatus::Paused => {
                run.status = RunStatus::Running;
                run.clone()
            }
            _ => return Err(ClockError::NoActiveRun),
        };
        shared.last_wall = Utc::now();
        self.store.save_checkpoint(&resumed).await?;
        info!(scenario_id = %resumed.scenario_id, sim_time = %resumed.sim_time, "Simulation resumed");
        Ok(resumed)
    }

    /// Stop the exercise and clear the in-memory run.
    ///
    /// After this returns, no further tick fires and no further snapshot
    /// is broadcast; [`SimulationClock::get_state`] returns `None`.
    /// Returns `Ok(None)` when nothing was active.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Store`] if the final checkpoint write fails
    /// (the run is cleared regardless).
    pub async fn stop(&self) -> Result<Option<SimulationRun>, ClockError> {
        let mut shared = self.shared.lock().await;

        // Abort under the command mutex: the task is either sleeping or
        // waiting for this mutex, never mid-tick.
        if let Some(task) = shared.task.take() {
            task.abort();
        }

        let Some(mut run) = shared.run.take() else {
            return Ok(None);
        };
        run.status = RunStatus::Stopped;

        let result = self.store.save_checkpoint(&run).await;
        info!(scenario_id = %run.scenario_id, sim_time = %run.sim_time, "Simulation stopped");
        result?;

        Ok(Some(run))
    }

    /// Jump the virtual clock to an instant (running or paused).
    ///
    /// The day number is re-derived from the scenario epoch; the orders
    /// hook does not fire for seeks. Asset status re-derives on the next
    /// event application, in either direction.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::NoActiveRun`] when no run is active, or
    /// [`ClockError::Store`] if the checkpoint write fails.
    pub async fn seek(&self, instant: DateTime<Utc>) -> Result<SimulationRun, ClockError> {
        let mut shared = self.shared.lock().await;
        let epoch = shared.epoch;
        let updated = match shared.run.as_mut() {
            Some(run) if matches!(run.status, RunStatus::Running | RunStatus::Paused) => {
                run.sim_time = instant;
                run.current_day_number = tick::day_number_for(epoch, instant);
                run.clone()
            }
            _ => return Err(ClockError::NoActiveRun),
        };
        shared.last_wall = Utc::now();
        self.store.save_checkpoint(&updated).await?;
        info!(scenario_id = %updated.scenario_id, sim_time = %updated.sim_time, day = updated.current_day_number, "Clock seek");
        Ok(updated)
    }

    /// Change the compression ratio without restarting the loop.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidRatio`] for non-positive ratios,
    /// [`ClockError::NoActiveRun`] when no run is active, or
    /// [`ClockError::Store`] if the checkpoint write fails.
    pub async fn set_speed(&self, ratio: f64) -> Result<SimulationRun, ClockError> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(ClockError::InvalidRatio(ratio));
        }
        let mut shared = self.shared.lock().await;
        let updated = match shared.run.as_mut() {
            Some(run) if matches!(run.status, RunStatus::Running | RunStatus::Paused) => {
                run.compression_ratio = ratio;
                run.clone()
            }
            _ => return Err(ClockError::NoActiveRun),
        };
        self.store.save_checkpoint(&updated).await?;
        info!(scenario_id = %updated.scenario_id, compression_ratio = ratio, "Compression ratio changed");
        Ok(updated)
    }

    /// The current run state, or `None` when idle or stopped.
    pub async fn get_state(&self) -> Option<SimulationRun> {
        self.shared.lock().await.run.clone()
    }
}

/// The periodic tick task.
///
/// Locks the shared state for the full tick body, so commands serialize
/// against it. A paused run skips work; a cleared or stopped run ends
/// the task.
async fn tick_loop<S: SimStore + ?Sized + 'static>(
    store: Arc<S>,
    sink: Arc<dyn SnapshotSink>,
    hook: Arc<dyn DayBoundaryHook>,
    shared: Arc<Mutex<ClockShared>>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; consume it so the
    // first real tick lands one interval after start.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let mut guard = shared.lock().await;
        let epoch = guard.epoch;
        let wall_last = guard.last_wall;

        match guard.run.as_ref().map(|r| r.status) {
            Some(RunStatus::Running) => {}
            Some(RunStatus::Paused) => continue,
            _ => break,
        }

        let wall_now = Utc::now();
        let Some(run) = guard.run.as_mut() else { break };

        match tick::run_tick(
            store.as_ref(),
            sink.as_ref(),
            &hook,
            run,
            epoch,
            wall_now,
            wall_last,
        )
        .await
        {
            Ok(summary) => {
                tracing::trace!(
                    sim_time = %summary.snapshot.sim_time,
                    missions = summary.mission_states.len(),
                    transitions = summary.transitions.len(),
                    events_applied = summary.events_applied,
                    "Tick complete"
                );
            }
            Err(err) => {
                warn!(error = %err, "Tick failed, will retry next interval");
            }
        }

        guard.last_wall = wall_now;
    }
}
