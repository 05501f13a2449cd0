use std::cmp::Ordering;
use std::collections::HashSet;

use super::super::domain::RecommendedRegion;
use super::{PlannedRecommendation, ScoredPolicy};

/// Builds the ranked policy list of every selected region. Group numbers follow the
/// order of `regions`, starting at 1.
pub(crate) fn assemble(
    regions: &[RecommendedRegion],
    policies: &[ScoredPolicy],
) -> Vec<PlannedRecommendation> {
    regions
        .iter()
        .zip(1u32..)
        .flat_map(|(region, rank_group)| assemble_group(region, rank_group, policies))
        .collect()
}

// Local policies always precede nationwide ones; score only orders within each part.
fn assemble_group(
    region: &RecommendedRegion,
    rank_group: u32,
    policies: &[ScoredPolicy],
) -> Vec<PlannedRecommendation> {
    let mut local: Vec<&ScoredPolicy> = policies
        .iter()
        .filter(|policy| policy.region.is_local_to(&region.region_code))
        .collect();
    let mut nationwide: Vec<&ScoredPolicy> = policies
        .iter()
        .filter(|policy| policy.region.is_nationwide())
        .collect();

    local.sort_by(|a, b| by_score_desc(a, b));
    nationwide.sort_by(|a, b| by_score_desc(a, b));

    let mut seen = HashSet::new();
    local
        .into_iter()
        .chain(nationwide)
        .filter(|policy| seen.insert(policy.policy_code.as_str()))
        .zip(1u32..)
        .map(|(policy, rank)| PlannedRecommendation {
            region_code: policy.region.code().to_string(),
            policy_code: policy.policy_code.clone(),
            rank_group,
            rank,
            score: policy.score,
        })
        .collect()
}

fn by_score_desc(a: &ScoredPolicy, b: &ScoredPolicy) -> Ordering {
    b.score.total_cmp(&a.score)
}
