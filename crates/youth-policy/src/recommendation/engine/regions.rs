use serde::{Deserialize, Serialize};

use super::super::answers::{questions, AnswerIndex};
use super::super::domain::{Grade, RecommendedRegion, RegionInfraProfile};
use super::config::RegionWeights;

/// Per-dimension contributions to a region's composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionScoreBreakdown {
    pub medical_infra: f64,
    pub medical_access: f64,
    pub transport: f64,
    pub housing: f64,
}

impl RegionScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.medical_infra + self.medical_access + self.transport + self.housing
    }
}

pub fn score_region(
    profile: &RegionInfraProfile,
    answers: &AnswerIndex,
    weights: &RegionWeights,
) -> RegionScoreBreakdown {
    let selected = |question: &str| answers.get(question).and_then(Grade::parse);

    let medical_infra = weights.weight(selected(questions::MEDICAL_INFRA), profile.medical_infra);
    let medical_access =
        weights.weight(selected(questions::MEDICAL_ACCESS), profile.medical_access);
    let transport = weights.weight(selected(questions::TRANSPORT_GRADE), profile.transport)
        * weights
            .transport
            .factor(answers.get(questions::TRANSPORT_PRIORITY));
    let housing = weights.weight(selected(questions::HOUSING_GRADE), profile.housing)
        * weights.housing.factor(answers.get(questions::HOUSING_PRIORITY));

    RegionScoreBreakdown {
        medical_infra,
        medical_access,
        transport,
        housing,
    }
}

/// Scores every region, keeping the order of `profiles`.
pub fn score_regions(
    profiles: &[RegionInfraProfile],
    answers: &AnswerIndex,
    weights: &RegionWeights,
) -> Vec<RecommendedRegion> {
    profiles
        .iter()
        .map(|profile| RecommendedRegion {
            region_code: profile.region_code.clone(),
            total_infra_score: score_region(profile, answers, weights).total(),
        })
        .collect()
}

/// Highest scoring regions first; equal scores keep their input order.
pub fn select_top(mut regions: Vec<RecommendedRegion>, count: usize) -> Vec<RecommendedRegion> {
    regions.sort_by(|a, b| b.total_infra_score.total_cmp(&a.total_infra_score));
    regions.truncate(count);
    regions
}
