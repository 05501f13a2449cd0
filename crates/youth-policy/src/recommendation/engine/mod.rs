mod assembler;
mod config;
mod eligibility;
mod interest;
mod regions;

pub use config::{CategoryMatch, EngineConfig, InterestTable, PriorityMultiplier, RegionWeights};
pub use eligibility::{check as check_eligibility, is_eligible, Ineligibility};
pub use interest::{category_match, score as interest_score};
pub use regions::{score_region, score_regions, select_top, RegionScoreBreakdown};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::answers::AnswerIndex;
use super::domain::{PolicyRegion, RecommendedRegion};
use super::reference::ReferenceCatalog;

/// Stateless engine turning one survey response into ranked recommendations.
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn plan(
        &self,
        answers: &AnswerIndex,
        catalog: &ReferenceCatalog,
    ) -> Result<RecommendationPlan, EngineError> {
        if catalog.policies().is_empty() {
            return Err(EngineError::NoCandidateData(CandidateTable::Policies));
        }
        if catalog.infra_profiles().is_empty() {
            return Err(EngineError::NoCandidateData(CandidateTable::RegionInfra));
        }

        let policies = self.score_policies(answers, catalog);
        let scored_regions = score_regions(catalog.infra_profiles(), answers, &self.config.regions);
        let regions = select_top(scored_regions, self.config.top_regions);
        let entries = assembler::assemble(&regions, &policies);

        Ok(RecommendationPlan {
            eligible_policies: policies.len(),
            regions,
            entries,
        })
    }

    /// Eligible policies with their interest score, in catalog order.
    pub fn score_policies(
        &self,
        answers: &AnswerIndex,
        catalog: &ReferenceCatalog,
    ) -> Vec<ScoredPolicy> {
        catalog
            .policies()
            .iter()
            .filter(|policy| match eligibility::check(policy, answers) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(
                        policy = %policy.policy_code,
                        reason = %reason.summary(),
                        "policy excluded"
                    );
                    false
                }
            })
            .map(|policy| ScoredPolicy {
                policy_code: policy.policy_code.clone(),
                region: policy.region.clone(),
                score: interest::score(policy, answers, &self.config.interest),
            })
            .collect()
    }
}

/// Eligible policy paired with its interest score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPolicy {
    pub policy_code: String,
    pub region: PolicyRegion,
    pub score: f64,
}

/// One ranked policy of a region group, before it is stamped with run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRecommendation {
    pub region_code: String,
    pub policy_code: String,
    pub rank_group: u32,
    pub rank: u32,
    pub score: f64,
}

/// Engine output for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPlan {
    pub regions: Vec<RecommendedRegion>,
    pub entries: Vec<PlannedRecommendation>,
    pub eligible_policies: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateTable {
    Policies,
    RegionInfra,
}

impl CandidateTable {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateTable::Policies => "policy scoring table",
            CandidateTable::RegionInfra => "region infrastructure table",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no candidate data: {} is empty", .0.label())]
    NoCandidateData(CandidateTable),
}
