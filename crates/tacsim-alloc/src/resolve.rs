//! Per-group resolution and day summary.
//!
//! Uncontended needs are granted iff an operational asset provides the
//! capability with a coverage window overlapping the need. Contended
//! groups are arbitrated purely by priority: competitors sort by
//! (traced commander's-list rank, mission criticality, package priority)
//! and the first competitor wins; everyone else degrades to a declared
//! fallback capability or is denied outright.

use tacsim_types::{
    AllocationStatus, AllocationSummary, AssetStatus, ContentionEvent, MissionCriticality,
    RiskLevel, SpaceAllocation, SpaceAllocationId, SpaceAsset, SpaceNeed, SpaceNeedId,
};
use uuid::Uuid;

use crate::grouping::ContentionGroup;

/// Rank assigned to needs with no traced commander's-list entry.
///
/// Sorts after every real rank, so untraced needs only win on the
/// later tie-breakers.
pub const MISSING_TRACED_RANK: u32 = 99;

/// Arbitration key: traced rank, then criticality weight, then package
/// priority, then need ID for full determinism.
fn arbitration_key(need: &SpaceNeed) -> (u32, MissionCriticality, u32, SpaceNeedId) {
    (
        need.traced_priority_rank.unwrap_or(MISSING_TRACED_RANK),
        need.criticality,
        need.priority,
        need.id,
    )
}

/// Whether any operational asset covers the capability over the window.
fn has_coverage(assets: &[SpaceAsset], need: &SpaceNeed) -> Option<String> {
    assets
        .iter()
        .filter(|a| a.status == AssetStatus::Operational)
        .filter(|a| a.capabilities.contains(&need.capability))
        .find(|a| {
            a.coverage_windows.iter().any(|w| {
                w.capability == need.capability
                    && w.start <= need.end_time
                    && w.end >= need.start_time
            })
        })
        .map(|a| a.name.clone())
}

/// Resolve one contention group into allocation rows and, for contended
/// groups, a contention event.
pub fn resolve_group(
    group: &ContentionGroup,
    assets: &[SpaceAsset],
) -> (Vec<SpaceAllocation>, Option<ContentionEvent>) {
    if let [need] = group.needs.as_slice() {
        return (vec![resolve_singleton(need, assets)], None);
    }

    let mut ranked: Vec<&SpaceNeed> = group.needs.iter().collect();
    ranked.sort_by_key(|n| arbitration_key(n));

    let group_id = Uuid::now_v7();
    let mut allocations = Vec::with_capacity(ranked.len());
    let mut winner_rationale = String::new();

    for (index, need) in ranked.iter().enumerate() {
        let allocation = if index == 0 {
            winner_rationale = format!(
                "{:?} granted to the top-ranked competitor (traced rank {}, {:?}, package priority {})",
                need.capability,
                need.traced_priority_rank.unwrap_or(MISSING_TRACED_RANK),
                need.criticality,
                need.priority,
            );
            SpaceAllocation {
                id: SpaceAllocationId::new(),
                space_need_id: need.id,
                status: AllocationStatus::Fulfilled,
                allocated_capability: Some(need.capability),
                rationale: winner_rationale.clone(),
                risk_level: RiskLevel::Low,
                contention_group: Some(group_id),
            }
        } else {
            resolve_loser(need, group_id)
        };
        allocations.push(allocation);
    }

    let event = ContentionEvent {
        id: group_id,
        capability: group.capability,
        window_start: group.window_start,
        window_end: group.window_end,
        competitors: ranked.iter().map(|n| n.id).collect(),
        rationale: winner_rationale,
    };

    (allocations, Some(event))
}

/// Resolve an uncontended need against asset coverage.
fn resolve_singleton(need: &SpaceNeed, assets: &[SpaceAsset]) -> SpaceAllocation {
    match has_coverage(assets, need) {
        Some(asset_name) => SpaceAllocation {
            id: SpaceAllocationId::new(),
            space_need_id: need.id,
            status: AllocationStatus::Fulfilled,
            allocated_capability: Some(need.capability),
            rationale: format!("Sole requester; covered by {asset_name}"),
            risk_level: RiskLevel::Low,
            contention_group: None,
        },
        None => SpaceAllocation {
            id: SpaceAllocationId::new(),
            space_need_id: need.id,
            status: AllocationStatus::Denied,
            allocated_capability: None,
            rationale: format!(
                "No operational asset provides {:?} over the requested window",
                need.capability
            ),
            risk_level: denial_risk(need.criticality),
            contention_group: None,
        },
    }
}

/// Resolve a contention loser: degrade to fallback or deny.
fn resolve_loser(need: &SpaceNeed, group_id: Uuid) -> SpaceAllocation {
    need.fallback_capability.map_or_else(
        || SpaceAllocation {
            id: SpaceAllocationId::new(),
            space_need_id: need.id,
            status: AllocationStatus::Denied,
            allocated_capability: None,
            rationale: format!(
                "Lost contention for {:?} with no declared fallback",
                need.capability
            ),
            risk_level: if need.criticality == MissionCriticality::Critical {
                RiskLevel::Critical
            } else {
                RiskLevel::High
            },
            contention_group: Some(group_id),
        },
        |fallback| SpaceAllocation {
            id: SpaceAllocationId::new(),
            space_need_id: need.id,
            status: AllocationStatus::Degraded,
            allocated_capability: Some(fallback),
            rationale: format!(
                "Lost contention for {:?}; degraded to fallback {fallback:?}",
                need.capability
            ),
            risk_level: if need.criticality == MissionCriticality::Critical {
                RiskLevel::High
            } else {
                RiskLevel::Moderate
            },
            contention_group: Some(group_id),
        },
    )
}

/// Risk attached to an uncontended denial.
const fn denial_risk(criticality: MissionCriticality) -> RiskLevel {
    match criticality {
        MissionCriticality::Critical => RiskLevel::Critical,
        _ => RiskLevel::Moderate,
    }
}

/// Roll allocation outcomes up into the day summary.
///
/// Overall risk: `Critical` if any denial carries critical risk, else
/// `High` if anything was denied, else `Moderate` if anything was
/// degraded, else `Low`.
pub fn summarize(allocations: &[SpaceAllocation], contention_groups: u32) -> AllocationSummary {
    let mut fulfilled: u32 = 0;
    let mut degraded: u32 = 0;
    let mut denied: u32 = 0;
    let mut critical_denial = false;

    for allocation in allocations {
        match allocation.status {
            AllocationStatus::Fulfilled => fulfilled = fulfilled.saturating_add(1),
            AllocationStatus::Degraded => degraded = degraded.saturating_add(1),
            AllocationStatus::Denied => {
                denied = denied.saturating_add(1);
                if allocation.risk_level == RiskLevel::Critical {
                    critical_denial = true;
                }
            }
        }
    }

    let overall_risk = if critical_denial {
        RiskLevel::Critical
    } else if denied > 0 {
        RiskLevel::High
    } else if degraded > 0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    AllocationSummary {
        total_needs: u32::try_from(allocations.len()).unwrap_or(u32::MAX),
        fulfilled,
        degraded,
        denied,
        contention_groups,
        overall_risk,
    }
}
