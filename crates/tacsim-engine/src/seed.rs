//! Demo scenario seeding for database-less runs.
//!
//! When no `PostgreSQL` URL is configured the engine runs against an
//! in-memory store seeded with a small but complete exercise: three
//! missions across domains with routes and TOT anchors, two space
//! assets with coverage schedules, a contended pair of SATCOM needs,
//! and a scripted jam/restore/kill event sequence. Every core path --
//! interpolation, lifecycle stepping, event application, allocation --
//! is exercised by this data.

use chrono::{DateTime, TimeDelta, Utc};
use tacsim_db::MemoryStore;
use tacsim_types::{
    CapabilityType, CoverageWindow, EventTargetType, Mission, MissionCriticality, MissionDomain,
    MissionId, MissionStatus, MissionTarget, Scenario, ScenarioId, SimEvent, SimEventId,
    SimEventType, SpaceAsset, SpaceAssetId, SpaceNeed, SpaceNeedId, TimeWindow, TimeWindowKind,
    Waypoint,
};
use tracing::info;

/// Build and seed the demo scenario; returns its ID.
pub async fn seed_demo_scenario(store: &MemoryStore) -> ScenarioId {
    let epoch = midnight_today();
    let scenario = Scenario {
        id: ScenarioId::new(),
        name: String::from("RESOLUTE WATCH 26"),
        epoch,
        description: String::from(
            "Seeded demo exercise: three-domain strike package with contested SATCOM",
        ),
        created_at: Utc::now(),
    };
    let scenario_id = scenario.id;
    store.insert_scenario(scenario).await;

    seed_missions(store, scenario_id, epoch).await;
    let (milstar, keyhole) = seed_assets(store, scenario_id, epoch).await;
    seed_needs(store, scenario_id, epoch).await;
    seed_events(store, scenario_id, epoch, milstar, keyhole).await;

    info!(%scenario_id, epoch = %epoch, "Demo scenario seeded");
    scenario_id
}

/// Today's 00:00 UTC, the exercise day-1 epoch.
fn midnight_today() -> DateTime<Utc> {
    let now = Utc::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |naive| naive.and_utc())
}

async fn seed_missions(store: &MemoryStore, scenario_id: ScenarioId, epoch: DateTime<Utc>) {
    let air_tot = hours_after(epoch, 10);
    store
        .insert_mission(Mission {
            id: MissionId::new(),
            scenario_id,
            callsign: String::from("VIPER 11"),
            domain: MissionDomain::Air,
            status: MissionStatus::Planned,
            waypoints: vec![
                waypoint(0, 34.9, 33.6, 28_000.0),
                waypoint(1, 35.8, 35.1, 30_000.0),
                waypoint(2, 36.2, 36.9, 24_000.0),
            ],
            time_windows: vec![tot_window(air_tot)],
            targets: vec![MissionTarget {
                name: String::from("OBJ COPPER"),
                lat: 36.2,
                lon: 36.9,
                description: String::from("Integrated air-defense node"),
            }],
        })
        .await;

    let maritime_tot = hours_after(epoch, 14);
    store
        .insert_mission(Mission {
            id: MissionId::new(),
            scenario_id,
            callsign: String::from("TRIDENT 2"),
            domain: MissionDomain::Maritime,
            status: MissionStatus::Planned,
            waypoints: vec![
                waypoint(0, 33.5, 28.0, 0.0),
                waypoint(1, 34.2, 30.5, 0.0),
            ],
            time_windows: vec![tot_window(maritime_tot)],
            targets: Vec::new(),
        })
        .await;

    let land_tot = hours_after(epoch, 12);
    store
        .insert_mission(Mission {
            id: MissionId::new(),
            scenario_id,
            callsign: String::from("SABER 6"),
            domain: MissionDomain::Land,
            status: MissionStatus::Planned,
            waypoints: vec![
                waypoint(0, 36.0, 37.0, 0.0),
                waypoint(1, 36.4, 37.4, 0.0),
            ],
            time_windows: vec![tot_window(land_tot)],
            targets: Vec::new(),
        })
        .await;
}

async fn seed_assets(
    store: &MemoryStore,
    scenario_id: ScenarioId,
    epoch: DateTime<Utc>,
) -> (SpaceAssetId, SpaceAssetId) {
    let milstar = SpaceAsset {
        id: SpaceAssetId::new(),
        scenario_id,
        name: String::from("MILSTAR-4"),
        status: tacsim_types::AssetStatus::Operational,
        capabilities: [
            CapabilityType::SatcomWideband,
            CapabilityType::SatcomProtected,
        ]
        .into_iter()
        .collect(),
        coverage_windows: vec![
            CoverageWindow {
                capability: CapabilityType::SatcomWideband,
                start: epoch,
                end: hours_after(epoch, 24),
            },
            CoverageWindow {
                capability: CapabilityType::SatcomProtected,
                start: epoch,
                end: hours_after(epoch, 24),
            },
        ],
    };
    let milstar_id = milstar.id;
    store.insert_asset(milstar).await;

    let keyhole = SpaceAsset {
        id: SpaceAssetId::new(),
        scenario_id,
        name: String::from("KEYHOLE-9"),
        status: tacsim_types::AssetStatus::Operational,
        capabilities: [CapabilityType::IsrImagery].into_iter().collect(),
        coverage_windows: vec![
            CoverageWindow {
                capability: CapabilityType::IsrImagery,
                start: hours_after(epoch, 6),
                end: hours_after(epoch, 9),
            },
            CoverageWindow {
                capability: CapabilityType::IsrImagery,
                start: hours_after(epoch, 18),
                end: hours_after(epoch, 21),
            },
        ],
    };
    let keyhole_id = keyhole.id;
    store.insert_asset(keyhole).await;

    (milstar_id, keyhole_id)
}

async fn seed_needs(store: &MemoryStore, scenario_id: ScenarioId, epoch: DateTime<Utc>) {
    // Two overlapping wideband requests force a contention group.
    store
        .insert_need(SpaceNeed {
            id: SpaceNeedId::new(),
            scenario_id,
            mission_id: MissionId::new(),
            capability: CapabilityType::SatcomWideband,
            priority: 1,
            start_time: hours_after(epoch, 9),
            end_time: hours_after(epoch, 12),
            criticality: MissionCriticality::Critical,
            fallback_capability: None,
            risk_if_denied: Some(String::from("strike package loses C2 relay")),
            traced_priority_rank: Some(1),
            day_number: 1,
        })
        .await;
    store
        .insert_need(SpaceNeed {
            id: SpaceNeedId::new(),
            scenario_id,
            mission_id: MissionId::new(),
            capability: CapabilityType::SatcomWideband,
            priority: 2,
            start_time: hours_after(epoch, 11),
            end_time: hours_after(epoch, 13),
            criticality: MissionCriticality::Essential,
            fallback_capability: Some(CapabilityType::SatcomProtected),
            risk_if_denied: None,
            traced_priority_rank: Some(4),
            day_number: 1,
        })
        .await;

    // Uncontended imagery request inside a KEYHOLE-9 pass.
    store
        .insert_need(SpaceNeed {
            id: SpaceNeedId::new(),
            scenario_id,
            mission_id: MissionId::new(),
            capability: CapabilityType::IsrImagery,
            priority: 1,
            start_time: hours_after(epoch, 7),
            end_time: hours_after(epoch, 8),
            criticality: MissionCriticality::Enhancing,
            fallback_capability: None,
            risk_if_denied: None,
            traced_priority_rank: None,
            day_number: 1,
        })
        .await;
}

async fn seed_events(
    store: &MemoryStore,
    scenario_id: ScenarioId,
    epoch: DateTime<Utc>,
    milstar: SpaceAssetId,
    keyhole: SpaceAssetId,
) {
    store
        .insert_event(SimEvent {
            id: SimEventId::new(),
            scenario_id,
            event_type: SimEventType::SatelliteJammed,
            target_type: EventTargetType::SpaceAsset,
            target_id: milstar.into_inner(),
            sim_time: hours_after(epoch, 8),
            description: String::from("Uplink jamming against MILSTAR-4"),
        })
        .await;
    store
        .insert_event(SimEvent {
            id: SimEventId::new(),
            scenario_id,
            event_type: SimEventType::SatelliteRestored,
            target_type: EventTargetType::SpaceAsset,
            target_id: milstar.into_inner(),
            sim_time: hours_after(epoch, 10),
            description: String::from("Jamming source neutralized, service restored"),
        })
        .await;
    store
        .insert_event(SimEvent {
            id: SimEventId::new(),
            scenario_id,
            event_type: SimEventType::SatelliteDestroyed,
            target_type: EventTargetType::SpaceAsset,
            target_id: keyhole.into_inner(),
            sim_time: hours_after(epoch, 16),
            description: String::from("KEYHOLE-9 lost to direct-ascent ASAT"),
        })
        .await;
}

/// `epoch` plus a number of hours, saturating at the epoch on overflow.
fn hours_after(epoch: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    epoch
        .checked_add_signed(TimeDelta::hours(hours))
        .unwrap_or(epoch)
}

const fn waypoint(sequence: u32, lat: f64, lon: f64, altitude_ft: f64) -> Waypoint {
    Waypoint {
        sequence,
        lat,
        lon,
        altitude_ft,
        speed_kts: None,
    }
}

const fn tot_window(start: DateTime<Utc>) -> TimeWindow {
    TimeWindow {
        kind: TimeWindowKind::TimeOnTarget,
        start,
        end: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tacsim_db::SimStore;

    use super::*;

    #[tokio::test]
    async fn seeded_scenario_is_complete() {
        let store = MemoryStore::new();
        let scenario_id = seed_demo_scenario(&store).await;

        assert!(store.fetch_scenario(scenario_id).await.unwrap().is_some());
        assert_eq!(store.fetch_missions(scenario_id).await.unwrap().len(), 3);
        assert_eq!(store.fetch_assets(scenario_id).await.unwrap().len(), 2);
        assert_eq!(
            store.fetch_needs_for_day(scenario_id, 1).await.unwrap().len(),
            3
        );
        assert_eq!(store.fetch_events(scenario_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn seeded_missions_are_interpolatable() {
        let store = MemoryStore::new();
        let scenario_id = seed_demo_scenario(&store).await;

        for mission in store.fetch_missions(scenario_id).await.unwrap() {
            assert!(mission.waypoints.len() >= 2, "{} route", mission.callsign);
            assert!(
                mission
                    .time_windows
                    .iter()
                    .any(|w| w.kind == TimeWindowKind::TimeOnTarget),
                "{} TOT anchor",
                mission.callsign
            );
        }
    }
}
