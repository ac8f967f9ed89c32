//! Latest-event-wins application of scripted events.
//!
//! Asset status is never mutated incrementally. Every application
//! re-reads the scenario's full event list and derives, per targeted
//! entity, the status implied by the *latest* event at or before the
//! given instant. A target whose events all lie in the future is
//! explicitly reset to its `Operational` baseline. The derivation is
//! therefore a pure function of (events, instant) -- safe to re-run
//! after a seek in either direction, and safe to replay.
//!
//! Per-target failures (a referenced asset that vanished, a target kind
//! with no derivation) are logged and skipped; one bad event never
//! aborts the batch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tacsim_db::{SimStore, StoreError};
use tacsim_types::{
    AssetStatus, EventTargetType, ScenarioId, SimEvent, SimEventType, SpaceAssetId,
};
use tracing::{debug, warn};

/// Counts from one applicator pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Targets whose status was derived from a past event.
    pub targets_updated: u32,
    /// Targets reset to baseline because no event precedes the instant.
    pub targets_reset: u32,
    /// Targets skipped due to per-target failures.
    pub targets_skipped: u32,
}

impl ApplySummary {
    /// Total status derivations applied (updates plus resets).
    pub const fn applied(&self) -> u32 {
        self.targets_updated.saturating_add(self.targets_reset)
    }
}

/// The asset status implied by an event type.
const fn status_for_event(event_type: SimEventType) -> AssetStatus {
    match event_type {
        SimEventType::SatelliteDestroyed => AssetStatus::Lost,
        SimEventType::SatelliteJammed => AssetStatus::Degraded,
        SimEventType::SatelliteRestored => AssetStatus::Operational,
    }
}

/// Derive a target's status from its events as of `instant`.
///
/// Picks the latest event with `sim_time <= instant` (ties broken by
/// event ID for determinism). Returns the baseline `Operational` when
/// no event qualifies -- the explicit reset that makes backward seeks
/// idempotent.
pub fn derive_asset_status(events: &[&SimEvent], instant: DateTime<Utc>) -> AssetStatus {
    events
        .iter()
        .filter(|e| e.sim_time <= instant)
        .max_by_key(|e| (e.sim_time, e.id))
        .map_or(AssetStatus::Operational, |e| status_for_event(e.event_type))
}

/// Reconcile all scripted events for a scenario against an instant.
///
/// Fetches the scenario's events, groups them by target, derives each
/// target's status, and persists it. Per-target update failures are
/// caught, logged, and counted -- never propagated.
///
/// # Errors
///
/// Returns [`StoreError`] only if the event fetch itself fails; from
/// that point on the batch always completes.
pub async fn apply_events_for_time<S: SimStore + ?Sized>(
    store: &S,
    scenario_id: ScenarioId,
    instant: DateTime<Utc>,
) -> Result<ApplySummary, StoreError> {
    let events = store.fetch_events(scenario_id).await?;

    let mut by_target: BTreeMap<(EventTargetType, uuid::Uuid), Vec<&SimEvent>> = BTreeMap::new();
    for event in &events {
        by_target
            .entry((event.target_type, event.target_id))
            .or_default()
            .push(event);
    }

    let mut summary = ApplySummary::default();

    for ((target_type, target_id), target_events) in by_target {
        if target_type != EventTargetType::SpaceAsset {
            debug!(
                ?target_type,
                %target_id,
                "No status derivation for target kind, skipping"
            );
            summary.targets_skipped = summary.targets_skipped.saturating_add(1);
            continue;
        }

        let has_past_event = target_events.iter().any(|e| e.sim_time <= instant);
        let status = derive_asset_status(&target_events, instant);

        match store
            .set_asset_status(SpaceAssetId::from(target_id), status)
            .await
        {
            Ok(()) => {
                if has_past_event {
                    summary.targets_updated = summary.targets_updated.saturating_add(1);
                } else {
                    summary.targets_reset = summary.targets_reset.saturating_add(1);
                }
            }
            Err(err) => {
                warn!(
                    %target_id,
                    ?status,
                    error = %err,
                    "Asset status update failed, skipping target"
                );
                summary.targets_skipped = summary.targets_skipped.saturating_add(1);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use tacsim_db::MemoryStore;
    use tacsim_types::{SimEventId, SpaceAsset};

    use super::*;

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn event(
        scenario_id: ScenarioId,
        target_id: uuid::Uuid,
        event_type: SimEventType,
        hour: u32,
    ) -> SimEvent {
        SimEvent {
            id: SimEventId::new(),
            scenario_id,
            event_type,
            target_type: EventTargetType::SpaceAsset,
            target_id,
            sim_time: instant(hour),
            description: String::new(),
        }
    }

    fn asset(scenario_id: ScenarioId) -> SpaceAsset {
        SpaceAsset {
            id: SpaceAssetId::new(),
            scenario_id,
            name: String::from("MILSTAR-4"),
            status: AssetStatus::Operational,
            capabilities: std::collections::BTreeSet::new(),
            coverage_windows: Vec::new(),
        }
    }

    #[test]
    fn latest_event_at_or_before_instant_wins() {
        let scenario_id = ScenarioId::new();
        let target = uuid::Uuid::now_v7();
        let jam = event(scenario_id, target, SimEventType::SatelliteJammed, 6);
        let kill = event(scenario_id, target, SimEventType::SatelliteDestroyed, 9);
        let events = vec![&jam, &kill];

        assert_eq!(derive_asset_status(&events, instant(7)), AssetStatus::Degraded);
        assert_eq!(derive_asset_status(&events, instant(9)), AssetStatus::Lost);
        assert_eq!(derive_asset_status(&events, instant(23)), AssetStatus::Lost);
    }

    #[test]
    fn no_past_event_resets_to_baseline() {
        let scenario_id = ScenarioId::new();
        let target = uuid::Uuid::now_v7();
        let kill = event(scenario_id, target, SimEventType::SatelliteDestroyed, 9);
        let events = vec![&kill];

        // Before the event exists on the timeline: baseline.
        assert_eq!(
            derive_asset_status(&events, instant(3)),
            AssetStatus::Operational
        );
    }

    #[test]
    fn restore_event_returns_asset_to_operational() {
        let scenario_id = ScenarioId::new();
        let target = uuid::Uuid::now_v7();
        let jam = event(scenario_id, target, SimEventType::SatelliteJammed, 6);
        let restore = event(scenario_id, target, SimEventType::SatelliteRestored, 10);
        let events = vec![&jam, &restore];

        assert_eq!(derive_asset_status(&events, instant(8)), AssetStatus::Degraded);
        assert_eq!(
            derive_asset_status(&events, instant(11)),
            AssetStatus::Operational
        );
    }

    #[tokio::test]
    async fn applies_statuses_through_the_store() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let a = asset(scenario_id);
        store.insert_asset(a.clone()).await;
        store
            .insert_event(event(
                scenario_id,
                a.id.into_inner(),
                SimEventType::SatelliteJammed,
                6,
            ))
            .await;

        let summary = apply_events_for_time(&store, scenario_id, instant(7))
            .await
            .unwrap();
        assert_eq!(summary.targets_updated, 1);
        assert_eq!(summary.targets_skipped, 0);

        let assets = store.fetch_assets(scenario_id).await.unwrap();
        assert_eq!(assets.first().unwrap().status, AssetStatus::Degraded);
    }

    #[tokio::test]
    async fn seek_backward_rederives_baseline() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let a = asset(scenario_id);
        store.insert_asset(a.clone()).await;
        store
            .insert_event(event(
                scenario_id,
                a.id.into_inner(),
                SimEventType::SatelliteDestroyed,
                9,
            ))
            .await;

        // Forward past the event, then seek back before it.
        let _ = apply_events_for_time(&store, scenario_id, instant(12))
            .await
            .unwrap();
        assert_eq!(
            store.fetch_assets(scenario_id).await.unwrap().first().unwrap().status,
            AssetStatus::Lost
        );

        let summary = apply_events_for_time(&store, scenario_id, instant(3))
            .await
            .unwrap();
        assert_eq!(summary.targets_reset, 1);
        assert_eq!(
            store.fetch_assets(scenario_id).await.unwrap().first().unwrap().status,
            AssetStatus::Operational
        );
    }

    #[tokio::test]
    async fn missing_target_is_skipped_not_fatal() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let a = asset(scenario_id);
        store.insert_asset(a.clone()).await;

        // One event references an asset that no longer exists.
        store
            .insert_event(event(
                scenario_id,
                uuid::Uuid::now_v7(),
                SimEventType::SatelliteDestroyed,
                2,
            ))
            .await;
        store
            .insert_event(event(
                scenario_id,
                a.id.into_inner(),
                SimEventType::SatelliteJammed,
                2,
            ))
            .await;

        let summary = apply_events_for_time(&store, scenario_id, instant(5))
            .await
            .unwrap();
        assert_eq!(summary.targets_skipped, 1);
        assert_eq!(summary.targets_updated, 1);
        assert_eq!(
            store.fetch_assets(scenario_id).await.unwrap().first().unwrap().status,
            AssetStatus::Degraded
        );
    }

    #[tokio::test]
    async fn mission_targets_have_no_derivation_yet() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let mut e = event(
            scenario_id,
            uuid::Uuid::now_v7(),
            SimEventType::SatelliteJammed,
            2,
        );
        e.target_type = EventTargetType::Mission;
        store.insert_event(e).await;

        let summary = apply_events_for_time(&store, scenario_id, instant(5))
            .await
            .unwrap();
        assert_eq!(summary.targets_skipped, 1);
        assert_eq!(summary.applied(), 0);
    }

    #[tokio::test]
    async fn reapplying_is_idempotent() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let a = asset(scenario_id);
        store.insert_asset(a.clone()).await;
        store
            .insert_event(event(
                scenario_id,
                a.id.into_inner(),
                SimEventType::SatelliteJammed,
                6,
            ))
            .await;

        for _ in 0..3 {
            let _ = apply_events_for_time(&store, scenario_id, instant(7))
                .await
                .unwrap();
            assert_eq!(
                store.fetch_assets(scenario_id).await.unwrap().first().unwrap().status,
                AssetStatus::Degraded
            );
        }
    }
}
