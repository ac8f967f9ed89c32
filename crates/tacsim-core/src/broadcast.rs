//! Broadcast and day-boundary seams between the clock and its
//! collaborators.
//!
//! The HTTP/`WebSocket` transport that fans snapshots out to dashboard
//! clients is an external collaborator; the core only knows the
//! [`SnapshotSink`] trait. [`ChannelSink`] is the production
//! implementation: a capacity-bounded `tokio` broadcast channel the
//! transport subscribes to. Subscribers that fall behind skip ahead to
//! the newest snapshot rather than back-pressuring the tick loop.
//!
//! [`DayBoundaryHook`] is the once-per-day-crossing callout ("generate
//! orders for day N"); the clock invokes it fire-and-forget and never
//! waits on the result.

use tacsim_types::{ClockSnapshot, ScenarioId};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for clock snapshots.
///
/// A subscriber lagging by more than this many messages receives a
/// `Lagged` error and resumes from the newest snapshot.
const BROADCAST_CAPACITY: usize = 256;

/// Best-effort, per-tick snapshot publication.
///
/// Implementations must not block: the tick loop calls
/// [`SnapshotSink::publish`] synchronously between persistence and the
/// next tick.
pub trait SnapshotSink: Send + Sync {
    /// Publish a snapshot to whoever is listening. Best-effort.
    fn publish(&self, snapshot: &ClockSnapshot);
}

/// A [`SnapshotSink`] that discards everything (tests, headless runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn publish(&self, _snapshot: &ClockSnapshot) {}
}

/// A [`SnapshotSink`] backed by a `tokio` broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: broadcast::Sender<ClockSnapshot>,
}

impl ChannelSink {
    /// Create a sink with the default channel capacity.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Subscribe to the snapshot stream.
    ///
    /// Returns a receiver yielding one [`ClockSnapshot`] per tick for as
    /// long as the clock runs.
    pub fn subscribe(&self) -> broadcast::Receiver<ClockSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSink for ChannelSink {
    fn publish(&self, snapshot: &ClockSnapshot) {
        // send() errors only when no receiver exists; that is the normal
        // idle state for a headless clock, not a fault.
        let receivers = self.tx.send(*snapshot).unwrap_or(0);
        tracing::trace!(
            scenario_id = %snapshot.scenario_id,
            receivers,
            "Snapshot broadcast"
        );
    }
}

/// The once-per-day-crossing callout to the order-generation collaborator.
///
/// Invoked fire-and-forget from a spawned task when a tick carries the
/// run across a day boundary; the clock never waits on the result.
pub trait DayBoundaryHook: Send + Sync {
    /// Called once when exercise day `day_number` begins.
    fn on_day_started(&self, scenario_id: ScenarioId, day_number: u32);
}

/// A [`DayBoundaryHook`] that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHook;

impl DayBoundaryHook for NullHook {
    fn on_day_started(&self, _scenario_id: ScenarioId, _day_number: u32) {}
}
