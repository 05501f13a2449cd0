use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use super::domain::{PolicyDetail, Recommendation, NATIONWIDE_REGION_CODE};
use super::reference::ReferenceCatalog;

pub const NATIONWIDE_DISPLAY_NAME: &str = "nationwide";
pub const UNREGISTERED_DISPLAY_NAME: &str = "unregistered";

/// Policies recommended for one selected region.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationGroupView {
    pub rank_group: u32,
    pub selected_region_code: String,
    pub region_display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_description: Option<String>,
    pub policies: Vec<RankedPolicyView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedPolicyView {
    /// Stored rank within the group.
    pub rank: u32,
    pub policy: PolicyDetail,
}

/// Read-side view that regroups persisted rows for display.
pub struct RecommendationGrouper<'a> {
    catalog: &'a ReferenceCatalog,
    policy_limit: usize,
}

impl<'a> RecommendationGrouper<'a> {
    pub fn new(catalog: &'a ReferenceCatalog, policy_limit: usize) -> Self {
        Self {
            catalog,
            policy_limit,
        }
    }

    /// Groups rows of a single run by rank group, best group first.
    pub fn group(&self, rows: &[Recommendation]) -> Vec<RecommendationGroupView> {
        let mut groups: BTreeMap<u32, Vec<&Recommendation>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.rank_group).or_default().push(row);
        }

        groups
            .into_iter()
            .map(|(rank_group, rows)| self.group_view(rank_group, &rows))
            .collect()
    }

    fn group_view(&self, rank_group: u32, rows: &[&Recommendation]) -> RecommendationGroupView {
        let selected_region_code = selected_region(rows);

        let (nationwide, local): (Vec<&Recommendation>, Vec<&Recommendation>) =
            rows.iter().copied().partition(|row| row.is_nationwide());

        let mut seen = HashSet::new();
        let policies: Vec<RankedPolicyView> = lowest_ranks(&local)
            .into_iter()
            .chain(lowest_ranks(&nationwide))
            .filter(|(policy_code, _)| seen.insert(*policy_code))
            .filter_map(|(policy_code, rank)| match self.catalog.policy_detail(policy_code) {
                Some(detail) => Some(RankedPolicyView {
                    rank,
                    policy: detail.clone(),
                }),
                None => {
                    warn!(
                        policy = %policy_code,
                        rank_group,
                        "recommended policy has no detail record"
                    );
                    None
                }
            })
            .take(self.policy_limit)
            .collect();

        RecommendationGroupView {
            rank_group,
            region_display_name: region_display_name(self.catalog, &selected_region_code),
            region_description: self
                .catalog
                .region(&selected_region_code)
                .and_then(|region| region.description.clone()),
            selected_region_code,
            policies,
        }
    }
}

/// Display name of a region code: the nationwide label, the registered name, or the
/// unregistered label.
pub fn region_display_name(catalog: &ReferenceCatalog, region_code: &str) -> String {
    if region_code == NATIONWIDE_REGION_CODE {
        return NATIONWIDE_DISPLAY_NAME.to_string();
    }
    catalog
        .region(region_code)
        .map(|region| region.name.clone())
        .unwrap_or_else(|| UNREGISTERED_DISPLAY_NAME.to_string())
}

/// Region of the best ranked local row, or the nationwide code when the group only
/// holds nationwide policies.
pub(crate) fn selected_region(rows: &[&Recommendation]) -> String {
    rows.iter()
        .filter(|row| !row.is_nationwide())
        .min_by_key(|row| row.rank)
        .map(|row| row.region_code.clone())
        .unwrap_or_else(|| NATIONWIDE_REGION_CODE.to_string())
}

// Policy codes ordered by rank; a policy stored more than once keeps its lowest rank.
fn lowest_ranks<'r>(rows: &[&'r Recommendation]) -> Vec<(&'r str, u32)> {
    let mut ranks: HashMap<&'r str, u32> = HashMap::new();
    for &row in rows {
        ranks
            .entry(row.policy_code.as_str())
            .and_modify(|rank| *rank = (*rank).min(row.rank))
            .or_insert(row.rank);
    }

    let mut ordered: Vec<(&'r str, u32)> = ranks.into_iter().collect();
    ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    ordered
}
