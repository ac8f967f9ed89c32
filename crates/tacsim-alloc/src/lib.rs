//! Priority-weighted space resource allocation.
//!
//! On-demand batch process, independent of the tick loop: given one
//! exercise day's capability needs and the operational assets with their
//! coverage windows, group contending needs
//! ([`grouping::group_needs`]), arbitrate each group by priority
//! ([`resolve::resolve_group`]), and roll the outcomes into a day
//! summary ([`resolve::summarize`]).
//!
//! [`allocate`] is the pure core -- deterministic, no I/O -- and
//! [`run_allocation`] is the store-facing orchestration that reads the
//! day's inputs and rebuilds that day's allocation rows.

use tacsim_db::{SimStore, StoreError};
use tacsim_types::{AllocationReport, ScenarioId, SpaceAsset, SpaceNeed};
use tracing::info;

pub mod grouping;
pub mod resolve;

pub use grouping::{group_needs, ContentionGroup};
pub use resolve::{resolve_group, summarize, MISSING_TRACED_RANK};

/// Errors that can occur while running an allocation.
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    /// A store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Resolve one day's needs against the available assets. Pure.
///
/// Zero needs yield an empty, valid report. Assets in any status may be
/// passed; only operational ones satisfy coverage checks.
pub fn allocate(needs: &[SpaceNeed], assets: &[SpaceAsset]) -> AllocationReport {
    let groups = group_needs(needs);

    let mut allocations = Vec::with_capacity(needs.len());
    let mut contentions = Vec::new();

    for group in &groups {
        let (mut group_allocations, event) = resolve_group(group, assets);
        allocations.append(&mut group_allocations);
        if let Some(event) = event {
            contentions.push(event);
        }
    }

    let summary = summarize(
        &allocations,
        u32::try_from(contentions.len()).unwrap_or(u32::MAX),
    );

    AllocationReport {
        allocations,
        contentions,
        summary,
    }
}

/// Run the allocator for one scenario day and persist the result.
///
/// Reads the day's needs and the scenario's assets, computes the report,
/// and replaces that day's allocation rows (delete-and-recreate; the
/// rows are a rebuildable projection). Stateless and re-entrant across
/// scenarios and days; two concurrent runs for the *same* (scenario,
/// day) race on the row replacement and must be serialized upstream.
///
/// # Errors
///
/// Returns [`AllocError::Store`] if a read or the row replacement fails.
pub async fn run_allocation<S: SimStore + ?Sized>(
    store: &S,
    scenario_id: ScenarioId,
    day_number: u32,
) -> Result<AllocationReport, AllocError> {
    let needs = store.fetch_needs_for_day(scenario_id, day_number).await?;
    let assets = store.fetch_assets(scenario_id).await?;

    let report = allocate(&needs, &assets);

    store
        .replace_allocations(scenario_id, day_number, &report.allocations)
        .await?;

    info!(
        %scenario_id,
        day_number,
        total_needs = report.summary.total_needs,
        fulfilled = report.summary.fulfilled,
        degraded = report.summary.degraded,
        denied = report.summary.denied,
        contention_groups = report.summary.contention_groups,
        overall_risk = ?report.summary.overall_risk,
        "Allocation run complete"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use tacsim_db::MemoryStore;
    use tacsim_types::{
        AllocationStatus, AssetStatus, CapabilityType, CoverageWindow, MissionCriticality,
        MissionId, RiskLevel, SpaceAssetId, SpaceNeedId,
    };

    use super::*;

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn need(
        scenario_id: ScenarioId,
        capability: CapabilityType,
        start_hour: u32,
        end_hour: u32,
    ) -> SpaceNeed {
        SpaceNeed {
            id: SpaceNeedId::new(),
            scenario_id,
            mission_id: MissionId::new(),
            capability,
            priority: 1,
            start_time: instant(start_hour),
            end_time: instant(end_hour),
            criticality: MissionCriticality::Essential,
            fallback_capability: None,
            risk_if_denied: None,
            traced_priority_rank: None,
            day_number: 1,
        }
    }

    fn covering_asset(scenario_id: ScenarioId, capability: CapabilityType) -> SpaceAsset {
        SpaceAsset {
            id: SpaceAssetId::new(),
            scenario_id,
            name: String::from("MILSTAR-4"),
            status: AssetStatus::Operational,
            capabilities: [capability].into_iter().collect(),
            coverage_windows: vec![CoverageWindow {
                capability,
                start: instant(0),
                end: instant(23),
            }],
        }
    }

    #[test]
    fn zero_needs_is_an_empty_valid_report() {
        let report = allocate(&[], &[]);
        assert!(report.allocations.is_empty());
        assert!(report.contentions.is_empty());
        assert_eq!(report.summary.total_needs, 0);
        assert_eq!(report.summary.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn sole_need_with_coverage_is_fulfilled() {
        let scenario_id = ScenarioId::new();
        let needs = vec![need(scenario_id, CapabilityType::IsrImagery, 2, 4)];
        let assets = vec![covering_asset(scenario_id, CapabilityType::IsrImagery)];

        let report = allocate(&needs, &assets);
        assert_eq!(report.summary.total_needs, 1);
        assert_eq!(report.summary.fulfilled, 1);
        assert_eq!(report.summary.overall_risk, RiskLevel::Low);

        let allocation = report.allocations.first().unwrap();
        assert_eq!(allocation.status, AllocationStatus::Fulfilled);
        assert_eq!(
            allocation.allocated_capability,
            Some(CapabilityType::IsrImagery)
        );
        assert_eq!(allocation.risk_level, RiskLevel::Low);
        assert!(allocation.contention_group.is_none());
    }

    #[test]
    fn sole_need_without_coverage_is_denied() {
        let scenario_id = ScenarioId::new();
        let needs = vec![need(scenario_id, CapabilityType::IsrImagery, 2, 4)];

        let report = allocate(&needs, &[]);
        let allocation = report.allocations.first().unwrap();
        assert_eq!(allocation.status, AllocationStatus::Denied);
        assert_eq!(allocation.risk_level, RiskLevel::Moderate);
        assert_eq!(report.summary.overall_risk, RiskLevel::High);
    }

    #[test]
    fn critical_uncovered_denial_is_critical_risk() {
        let scenario_id = ScenarioId::new();
        let mut n = need(scenario_id, CapabilityType::MissileWarning, 2, 4);
        n.criticality = MissionCriticality::Critical;

        let report = allocate(&[n], &[]);
        let allocation = report.allocations.first().unwrap();
        assert_eq!(allocation.risk_level, RiskLevel::Critical);
        assert_eq!(report.summary.overall_risk, RiskLevel::Critical);
    }

    #[test]
    fn non_operational_asset_does_not_cover() {
        let scenario_id = ScenarioId::new();
        let needs = vec![need(scenario_id, CapabilityType::IsrImagery, 2, 4)];
        let mut asset = covering_asset(scenario_id, CapabilityType::IsrImagery);
        asset.status = AssetStatus::Degraded;

        let report = allocate(&needs, &[asset]);
        assert_eq!(
            report.allocations.first().unwrap().status,
            AllocationStatus::Denied
        );
    }

    #[test]
    fn coverage_window_must_overlap_the_need() {
        let scenario_id = ScenarioId::new();
        let needs = vec![need(scenario_id, CapabilityType::IsrImagery, 10, 12)];
        let mut asset = covering_asset(scenario_id, CapabilityType::IsrImagery);
        asset.coverage_windows = vec![CoverageWindow {
            capability: CapabilityType::IsrImagery,
            start: instant(2),
            end: instant(4),
        }];

        let report = allocate(&needs, &[asset]);
        assert_eq!(
            report.allocations.first().unwrap().status,
            AllocationStatus::Denied
        );
    }

    #[test]
    fn contention_ranks_by_traced_priority() {
        let scenario_id = ScenarioId::new();
        let mut first = need(scenario_id, CapabilityType::SatcomWideband, 2, 6);
        first.traced_priority_rank = Some(1);
        let mut second = need(scenario_id, CapabilityType::SatcomWideband, 3, 7);
        second.traced_priority_rank = Some(2);
        second.fallback_capability = Some(CapabilityType::SatcomProtected);

        let report = allocate(
            &[second.clone(), first.clone()],
            &[covering_asset(scenario_id, CapabilityType::SatcomWideband)],
        );

        assert_eq!(report.summary.fulfilled, 1);
        assert_eq!(report.summary.degraded, 1);
        assert_eq!(report.summary.contention_groups, 1);

        let winner = report
            .allocations
            .iter()
            .find(|a| a.space_need_id == first.id)
            .unwrap();
        assert_eq!(winner.status, AllocationStatus::Fulfilled);

        let loser = report
            .allocations
            .iter()
            .find(|a| a.space_need_id == second.id)
            .unwrap();
        assert_eq!(loser.status, AllocationStatus::Degraded);
        assert_eq!(
            loser.allocated_capability,
            Some(CapabilityType::SatcomProtected)
        );
        assert_eq!(loser.risk_level, RiskLevel::Moderate);

        // Both rows share the contention group tag.
        assert!(winner.contention_group.is_some());
        assert_eq!(winner.contention_group, loser.contention_group);

        // One contention event lists both competitors in rank order.
        let event = report.contentions.first().unwrap();
        assert_eq!(event.competitors, vec![first.id, second.id]);
        assert_eq!(event.capability, CapabilityType::SatcomWideband);
    }

    #[test]
    fn contention_loser_without_fallback_is_denied() {
        let scenario_id = ScenarioId::new();
        let mut first = need(scenario_id, CapabilityType::IsrSigint, 2, 6);
        first.traced_priority_rank = Some(1);
        let mut second = need(scenario_id, CapabilityType::IsrSigint, 3, 7);
        second.traced_priority_rank = Some(2);
        second.criticality = MissionCriticality::Critical;

        let report = allocate(
            &[first, second.clone()],
            &[covering_asset(scenario_id, CapabilityType::IsrSigint)],
        );

        let loser = report
            .allocations
            .iter()
            .find(|a| a.space_need_id == second.id)
            .unwrap();
        assert_eq!(loser.status, AllocationStatus::Denied);
        assert_eq!(loser.risk_level, RiskLevel::Critical);
        assert_eq!(report.summary.overall_risk, RiskLevel::Critical);
    }

    #[test]
    fn missing_traced_rank_sorts_after_real_ranks() {
        let scenario_id = ScenarioId::new();
        let mut traced = need(scenario_id, CapabilityType::IsrImagery, 2, 6);
        traced.traced_priority_rank = Some(7);
        traced.criticality = MissionCriticality::Routine;
        let mut untraced = need(scenario_id, CapabilityType::IsrImagery, 3, 7);
        untraced.traced_priority_rank = None;
        untraced.criticality = MissionCriticality::Critical;

        let report = allocate(
            &[untraced.clone(), traced.clone()],
            &[covering_asset(scenario_id, CapabilityType::IsrImagery)],
        );

        // A traced rank, however low, beats criticality without one.
        let winner = report
            .allocations
            .iter()
            .find(|a| a.status == AllocationStatus::Fulfilled)
            .unwrap();
        assert_eq!(winner.space_need_id, traced.id);
    }

    #[test]
    fn criticality_breaks_traced_rank_ties() {
        let scenario_id = ScenarioId::new();
        let mut routine = need(scenario_id, CapabilityType::IsrImagery, 2, 6);
        routine.criticality = MissionCriticality::Routine;
        let mut critical = need(scenario_id, CapabilityType::IsrImagery, 3, 7);
        critical.criticality = MissionCriticality::Critical;

        let report = allocate(
            &[routine, critical.clone()],
            &[covering_asset(scenario_id, CapabilityType::IsrImagery)],
        );

        let winner = report
            .allocations
            .iter()
            .find(|a| a.status == AllocationStatus::Fulfilled)
            .unwrap();
        assert_eq!(winner.space_need_id, critical.id);
    }

    #[test]
    fn package_priority_breaks_remaining_ties() {
        let scenario_id = ScenarioId::new();
        let mut low = need(scenario_id, CapabilityType::IsrImagery, 2, 6);
        low.priority = 5;
        let mut high = need(scenario_id, CapabilityType::IsrImagery, 3, 7);
        high.priority = 1;

        let report = allocate(
            &[low, high.clone()],
            &[covering_asset(scenario_id, CapabilityType::IsrImagery)],
        );

        let winner = report
            .allocations
            .iter()
            .find(|a| a.status == AllocationStatus::Fulfilled)
            .unwrap();
        assert_eq!(winner.space_need_id, high.id);
    }

    #[test]
    fn three_way_contention_has_one_winner() {
        let scenario_id = ScenarioId::new();
        let mut needs = Vec::new();
        for rank in 1..=3 {
            let mut n = need(scenario_id, CapabilityType::SatcomWideband, 2, 8);
            n.traced_priority_rank = Some(rank);
            needs.push(n);
        }

        let report = allocate(
            &needs,
            &[covering_asset(scenario_id, CapabilityType::SatcomWideband)],
        );
        assert_eq!(report.summary.fulfilled, 1);
        assert_eq!(report.summary.denied, 2);
        assert_eq!(report.summary.contention_groups, 1);
        assert_eq!(report.contentions.first().unwrap().competitors.len(), 3);
    }

    #[tokio::test]
    async fn run_allocation_persists_the_day() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();
        let n = need(scenario_id, CapabilityType::IsrImagery, 2, 4);
        store.insert_need(n).await;
        store
            .insert_asset(covering_asset(scenario_id, CapabilityType::IsrImagery))
            .await;

        let report = run_allocation(&store, scenario_id, 1).await.unwrap();
        assert_eq!(report.summary.fulfilled, 1);

        let persisted = store.fetch_allocations_for_day(scenario_id, 1).await.unwrap();
        assert_eq!(persisted.len(), 1);

        // A rerun rebuilds the projection rather than appending.
        let _ = run_allocation(&store, scenario_id, 1).await.unwrap();
        let persisted = store.fetch_allocations_for_day(scenario_id, 1).await.unwrap();
        assert_eq!(persisted.len(), 1);
    }

    #[tokio::test]
    async fn run_allocation_for_empty_day_is_valid() {
        let store = MemoryStore::new();
        let scenario_id = ScenarioId::new();

        let report = run_allocation(&store, scenario_id, 4).await.unwrap();
        assert_eq!(report.summary.total_needs, 0);
        assert!(report.allocations.is_empty());
        assert!(report.contentions.is_empty());
    }
}
